//! Owned DOM tree as materialized by a page session
//!
//! Field names follow the DevTools protocol (`nodeId`, `nodeName`, ...) so a
//! tree dumped from a live session can be reloaded as a test fixture.

use serde::{Deserialize, Serialize};

/// Backend-assigned node identifier (CDP `DOM.NodeId`)
pub type NodeId = u32;

/// `nodeName` of text nodes
pub const TEXT_NODE_NAME: &str = "#text";

/// `nodeName` of image elements
pub const IMAGE_NODE_NAME: &str = "IMG";

/// A DOM node and the subtree it owns.
///
/// `child_node_count` is what the backend reported; it can be non-zero while
/// `children` is still empty if the subtree was not requested deep enough.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_name: String,
    #[serde(default)]
    pub node_value: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub child_node_count: u32,
    #[serde(default)]
    pub children: Vec<DomNode>,
}

impl DomNode {
    pub fn element(node_id: NodeId, name: &str, children: Vec<DomNode>) -> Self {
        Self {
            node_id,
            node_name: name.to_string(),
            child_node_count: u32::try_from(children.len()).unwrap_or(u32::MAX),
            children,
            ..Default::default()
        }
    }

    pub fn text(node_id: NodeId, value: &str) -> Self {
        Self {
            node_id,
            node_name: TEXT_NODE_NAME.to_string(),
            node_value: value.to_string(),
            ..Default::default()
        }
    }

    pub fn is_text(&self) -> bool {
        self.node_name == TEXT_NODE_NAME
    }

    pub fn is_image(&self) -> bool {
        self.node_name.eq_ignore_ascii_case(IMAGE_NODE_NAME)
    }

    /// Trimmed text content, or `None` for non-text nodes and blank text
    pub fn visible_text(&self) -> Option<&str> {
        if !self.is_text() {
            return None;
        }
        let content = self.node_value.trim();
        (!content.is_empty()).then_some(content)
    }

    /// Number of nodes in this subtree, counting only populated children
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(DomNode::node_count).sum::<usize>()
    }
}

#[cfg(feature = "cdp")]
impl From<&headless_chrome::protocol::cdp::DOM::Node> for DomNode {
    fn from(node: &headless_chrome::protocol::cdp::DOM::Node) -> Self {
        let children: Vec<DomNode> = node
            .children
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(DomNode::from)
            .collect();
        Self {
            node_id: node.node_id,
            node_name: node.node_name.clone(),
            node_value: node.node_value.clone(),
            attributes: node.attributes.clone().unwrap_or_default(),
            // Chrome omits the count on some node types even when it sent children.
            child_node_count: node
                .child_node_count
                .unwrap_or_else(|| u32::try_from(children.len()).unwrap_or(u32::MAX)),
            children,
        }
    }
}
