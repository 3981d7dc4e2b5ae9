//! Chrome DevTools Protocol session driver

use crate::dom::{DomNode, NodeId};
use crate::geometry::Quad;
use crate::walker::{GeometrySource, GeometryUnavailable};
use crate::{Error, PageSession, Result, SessionConfig};
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::{Debugger, DOMDebugger, DOM};
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, info, warn};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

/// How deep `DOM.getDocument` expands the tree. The protocol's `-1`
/// ("entire subtree") is not representable in the generated bindings.
const SUBTREE_DEPTH: u32 = 4096;

/// Slack added to the idle timeout on top of the settle pause.
const IDLE_MARGIN_MS: u64 = 10_000;

/// CDP-based page session (uses the `headless_chrome` crate)
///
/// Launches Chrome, manages a single tab, and serves DOM subtrees and box
/// models from it.
pub struct CdpSession {
    browser: Browser,
    tab: Arc<Tab>,
    config: SessionConfig,
}

impl CdpSession {
    fn document(&self) -> Result<DOM::Node> {
        let doc = self
            .tab
            .call_method(DOM::GetDocument {
                depth: Some(SUBTREE_DEPTH),
                pierce: Some(false),
            })
            .map_err(|e| Error::QueryError(format!("Failed to get document: {}", e)))?;
        Ok(doc.root)
    }
}

impl PageSession for CdpSession {
    fn new(config: SessionConfig) -> Result<Self>
    where
        Self: Sized,
    {
        config.validate()?;

        // The connection must survive the settle pause without traffic.
        let idle = Duration::from_millis(config.timeout_ms.max(config.settle_ms) + IDLE_MARGIN_MS);
        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .idle_browser_timeout(idle)
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_millis(config.timeout_ms));

        if let Some(user_agent) = &config.user_agent {
            tab.set_user_agent(user_agent, None, None)
                .map_err(|e| Error::InitializationError(format!("Failed to set user agent: {}", e)))?;
        }

        if config.resume_on_pause {
            install_pause_guard(&tab)?;
        }

        Ok(Self { browser, tab, config })
    }

    fn load_url(&mut self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| Error::LoadError(format!("Navigation failed: {}", e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::LoadError(format!("Wait for navigation failed: {}", e)))?;

        // Let scripts and lazy content settle before the DOM is captured
        info!("Loaded {}, settling for {}ms", url, self.config.settle_ms);
        thread::sleep(Duration::from_millis(self.config.settle_ms));
        Ok(())
    }

    fn subtree(&mut self, selector: &str) -> Result<DomNode> {
        let root = self.document()?;

        let found = self
            .tab
            .call_method(DOM::QuerySelector {
                node_id: root.node_id,
                selector: selector.to_string(),
            })
            .map_err(|e| Error::QueryError(format!("querySelector('{}') failed: {}", selector, e)))?;

        // Chrome answers a miss with node id 0
        if found.node_id == 0 {
            return Err(Error::QueryError(format!("No node matches '{}'", selector)));
        }

        find_node(&root, found.node_id)
            .map(DomNode::from)
            .ok_or_else(|| Error::QueryError(format!("Node {} for '{}' is outside the fetched document", found.node_id, selector)))
    }

    fn close(self) -> Result<()> {
        // Drop the tab first so the browser process goes away promptly.
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}

impl GeometrySource for CdpSession {
    fn box_model(&self, node_id: NodeId) -> std::result::Result<Quad, GeometryUnavailable> {
        let res = self
            .tab
            .call_method(DOM::GetBoxModel {
                node_id: Some(node_id),
                backend_node_id: None,
                object_id: None,
            })
            .map_err(|e| GeometryUnavailable::new(node_id, e.to_string()))
            .and_then(|r| Quad::new(r.model.border).map_err(|e| GeometryUnavailable::new(node_id, e.to_string())));

        if let Err(e) = &res {
            debug!("{}", e);
        }
        res
    }
}

fn find_node(node: &DOM::Node, node_id: NodeId) -> Option<&DOM::Node> {
    if node.node_id == node_id {
        return Some(node);
    }
    node.children
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find_map(|child| find_node(child, node_id))
}

/// Break on `click` listeners and resume every pause from a detached thread.
///
/// The listener only holds a weak reference to the tab and shares nothing
/// with the tree walk.
fn install_pause_guard(tab: &Arc<Tab>) -> Result<()> {
    tab.enable_debugger()
        .map_err(|e| Error::InitializationError(format!("Failed to enable debugger: {}", e)))?;

    tab.call_method(DOMDebugger::SetEventListenerBreakpoint {
        event_name: "click".to_string(),
        target_name: None,
    })?;

    let weak: Weak<Tab> = Arc::downgrade(tab);
    tab.add_event_listener(Arc::new(move |event: &Event| {
        if let Event::DebuggerPaused(paused) = event {
            info!("Debugger paused ({:?}), resuming", paused.params.reason);
            let weak = weak.clone();
            thread::spawn(move || {
                if let Some(tab) = weak.upgrade() {
                    resume(&tab);
                }
            });
        }
    }))?;
    Ok(())
}

fn resume(tab: &Tab) {
    let _ = tab
        .call_method(Debugger::SetSkipAllPauses { skip: true })
        .map_err(|e| warn!("Failed to skip pauses: {}", e));
    let _ = tab
        .call_method(Debugger::Resume {
            terminate_on_resume: Some(false),
        })
        .map_err(|e| warn!("Failed to resume debugger: {}", e));
    let _ = tab
        .call_method(Debugger::SetSkipAllPauses { skip: false })
        .map_err(|e| warn!("Failed to restore pauses: {}", e));
}
