//! domboxes
//!
//! Loads a page in headless Chrome, materializes the DOM subtree under a
//! selector, and outlines the box of every visible text node and image
//! element on a raster canvas.
//!
//! # Features
//!
//! - **CDP Backend** (default): `cdp::CdpSession` drives Chrome over the DevTools protocol
//! - **Backend-agnostic core**: the walker only needs a [`walker::GeometrySource`],
//!   so trees and geometry can come from fixtures in tests
//!
//! # Example
//!
//! ```no_run
//! use domboxes::{PageTarget, SessionConfig};
//! use domboxes::rendering::{AnnotationStyle, Canvas};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::default();
//! let mut canvas = Canvas::for_viewport(config.viewport);
//! let mut session = domboxes::new_session(config)?;
//!
//! let target = PageTarget::new("https://example.com", "body")?;
//! let report = domboxes::annotate_page(&mut session, &target, &mut canvas, AnnotationStyle::default())?;
//! canvas.save("test.jpg")?;
//! println!("{} boxes", report.annotations.len());
//! # Ok(())
//! # }
//! ```

use log::info;
use serde::Serialize;
use url::Url;

pub mod error;
pub use error::{Error, Result};

pub mod dom;
pub mod geometry;
pub mod rendering;
pub mod walker;

#[cfg(feature = "cdp")]
pub mod cdp;

use dom::DomNode;
use rendering::{Annotation, AnnotationStyle, Annotator, Canvas};
use walker::{GeometrySource, WalkStats};

/// Configuration for a page session
///
/// The defaults match the annotated output: a 1920x2000 viewport (the canvas
/// is the same size), headless, and the pause guard enabled.
///
/// # Examples
///
/// ```
/// let cfg = domboxes::SessionConfig::default();
/// assert_eq!(cfg.viewport.width, 1920);
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Viewport (browser window) dimensions
    pub viewport: Viewport,
    /// Run Chrome without a visible window
    pub headless: bool,
    /// Timeout for individual protocol calls, in milliseconds
    pub timeout_ms: u64,
    /// How long to let the page settle after navigation, in milliseconds
    pub settle_ms: u64,
    /// Optional user agent override
    pub user_agent: Option<String>,
    /// Break on `click` listeners and resume automatically whenever the debugger pauses
    pub resume_on_pause: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            headless: true,
            timeout_ms: 30000,
            settle_ms: 5000,
            user_agent: None,
            resume_on_pause: true,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::ConfigError(format!(
                "Viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if self.timeout_ms == 0 {
            return Err(Error::ConfigError("Timeout must be greater than zero".into()));
        }
        Ok(())
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 2000,
        }
    }
}

/// Page to load and the selector whose subtree gets annotated
#[derive(Debug, Clone)]
pub struct PageTarget {
    pub url: Url,
    pub selector: String,
}

impl PageTarget {
    pub fn new(url: &str, selector: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::ConfigError(format!("Invalid URL '{}': {}", url, e)))?;
        let selector = selector.trim();
        if selector.is_empty() {
            return Err(Error::ConfigError("Selector must not be empty".into()));
        }
        Ok(Self {
            url,
            selector: selector.to_string(),
        })
    }
}

/// Outcome of a single annotation run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub url: String,
    pub selector: String,
    pub stats: WalkStats,
    pub annotations: Vec<Annotation>,
}

/// A browser page that can be navigated, queried for a DOM subtree, and
/// asked for node geometry.
pub trait PageSession: GeometrySource {
    /// Create a new session with the given configuration
    fn new(config: SessionConfig) -> Result<Self>
    where
        Self: Sized;

    /// Load a URL and wait for the page to settle
    fn load_url(&mut self, url: &str) -> Result<()>;

    /// Fully expanded subtree rooted at the first node matching `selector`
    fn subtree(&mut self, selector: &str) -> Result<DomNode>;

    /// Close the session and release the browser
    fn close(self) -> Result<()>;
}

/// Load `target`, walk the subtree under its selector, and outline every
/// text and image box on `canvas`.
pub fn annotate_page<P>(session: &mut P, target: &PageTarget, canvas: &mut Canvas, style: AnnotationStyle) -> Result<RunReport>
where
    P: PageSession,
{
    style.validate()?;
    session.load_url(target.url.as_str())?;
    let root = session.subtree(&target.selector)?;
    info!("Walking {} nodes under '{}'", root.node_count(), target.selector);

    annotate_tree(&*session, &root, target, canvas, style)
}

/// Walk an already materialized tree; used by [`annotate_page`] and by
/// callers that replay a dumped tree.
pub fn annotate_tree<G>(geometry: &G, root: &DomNode, target: &PageTarget, canvas: &mut Canvas, style: AnnotationStyle) -> Result<RunReport>
where
    G: GeometrySource + ?Sized,
{
    let mut annotator = Annotator::new(canvas, style);
    let stats = walker::walk(root, geometry, &mut annotator);
    let annotations = annotator.into_annotations();
    info!(
        "Visited {} nodes: {} annotated, {} without geometry",
        stats.visited, stats.annotated, stats.skipped
    );

    Ok(RunReport {
        url: target.url.to_string(),
        selector: target.selector.clone(),
        stats,
        annotations,
    })
}

/// Create a session with the default backend
#[cfg(feature = "cdp")]
pub fn new_session(config: SessionConfig) -> Result<impl PageSession> {
    cdp::CdpSession::new(config)
}
