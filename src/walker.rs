//! Pre-order walk over a materialized DOM tree, forwarding the boxes of text
//! and image nodes to an [`AnnotationSink`].

use crate::dom::{DomNode, NodeId};
use crate::geometry::{BoundingBox, Quad};
use crate::rendering::annotate::{Annotation, AnnotationKind};
use serde::Serialize;
use thiserror::Error;

/// The box model of a node could not be obtained (not rendered, detached,
/// protocol failure, malformed quad, ...).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("box model unavailable for node {node_id}: {reason}")]
pub struct GeometryUnavailable {
    pub node_id: NodeId,
    pub reason: String,
}

impl GeometryUnavailable {
    pub fn new(node_id: NodeId, reason: impl Into<String>) -> Self {
        Self { node_id, reason: reason.into() }
    }
}

/// Source of node geometry, typically `DOM.getBoxModel`.
pub trait GeometrySource {
    /// Border quad of the node
    fn box_model(&self, node_id: NodeId) -> Result<Quad, GeometryUnavailable>;
}

/// Receiver of annotations produced by the walk.
pub trait AnnotationSink {
    fn annotate(&mut self, annotation: Annotation);
}

impl AnnotationSink for Vec<Annotation> {
    fn annotate(&mut self, annotation: Annotation) {
        self.push(annotation);
    }
}

/// Counters for a single walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkStats {
    /// Nodes visited
    pub visited: usize,
    /// Annotations forwarded to the sink
    pub annotated: usize,
    /// Matching nodes dropped because their geometry was unavailable
    pub skipped: usize,
}

/// Visit `root` and its descendants depth-first, node before children.
///
/// Children are only entered when the node reports `child_node_count > 0`.
/// Geometry failures never stop the walk: the node is counted as skipped and
/// its children are still visited.
pub fn walk<G, S>(root: &DomNode, geometry: &G, sink: &mut S) -> WalkStats
where
    G: GeometrySource + ?Sized,
    S: AnnotationSink + ?Sized,
{
    let mut stats = WalkStats::default();
    visit(root, geometry, sink, &mut stats);
    stats
}

fn visit<G, S>(node: &DomNode, geometry: &G, sink: &mut S, stats: &mut WalkStats)
where
    G: GeometrySource + ?Sized,
    S: AnnotationSink + ?Sized,
{
    stats.visited += 1;

    if let Some(kind) = annotation_kind(node) {
        match geometry.box_model(node.node_id) {
            Ok(quad) => {
                sink.annotate(Annotation {
                    node_id: node.node_id,
                    kind,
                    bbox: BoundingBox::from_quad(&quad),
                });
                stats.annotated += 1;
            }
            Err(_) => stats.skipped += 1,
        }
    }

    if node.child_node_count > 0 {
        for child in &node.children {
            visit(child, geometry, sink, stats);
        }
    }
}

fn annotation_kind(node: &DomNode) -> Option<AnnotationKind> {
    if let Some(content) = node.visible_text() {
        return Some(AnnotationKind::Text { content: content.to_string() });
    }
    if node.is_image() {
        return Some(AnnotationKind::Image { attributes: node.attributes.clone() });
    }
    None
}
