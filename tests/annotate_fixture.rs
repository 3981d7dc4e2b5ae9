//! End-to-end annotation runs against a recorded DOM tree, without Chrome

use domboxes::dom::{DomNode, NodeId};
use domboxes::geometry::{BoundingBox, Quad};
use domboxes::rendering::{AnnotationKind, AnnotationStyle, Canvas};
use domboxes::walker::{GeometrySource, GeometryUnavailable, WalkStats};
use domboxes::{Error, PageSession, PageTarget, Result, SessionConfig};
use image::Rgb;
use std::collections::HashMap;
use std::fs;

const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Serves `tests/fixtures/news_body.json` for `body` and canned border quads.
struct FixtureSession {
    tree: DomNode,
    quads: HashMap<NodeId, Vec<f64>>,
    loaded: Option<String>,
}

impl PageSession for FixtureSession {
    fn new(_config: SessionConfig) -> Result<Self> {
        let json = fs::read_to_string("tests/fixtures/news_body.json")?;
        let tree: DomNode = serde_json::from_str(&json)?;
        let quads = HashMap::from([
            (14, vec![20.0, 30.0, 120.0, 30.0, 120.0, 50.0, 20.0, 50.0]),
            (15, vec![300.5, 10.2, 364.9, 10.2, 364.9, 74.6, 300.5, 74.6]),
            (18, vec![40.0, 100.0, 200.0, 98.0, 202.0, 120.0, 42.0, 122.0]),
            // below the canvas
            (22, vec![40.0, 2500.0, 200.0, 2500.0, 200.0, 2520.0, 40.0, 2520.0]),
        ]);
        Ok(Self { tree, quads, loaded: None })
    }

    fn load_url(&mut self, url: &str) -> Result<()> {
        self.loaded = Some(url.to_string());
        Ok(())
    }

    fn subtree(&mut self, selector: &str) -> Result<DomNode> {
        if self.loaded.is_none() {
            return Err(Error::QueryError("no page loaded".into()));
        }
        match selector {
            "body" => Ok(self.tree.clone()),
            other => Err(Error::QueryError(format!("No node matches '{}'", other))),
        }
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}

impl GeometrySource for FixtureSession {
    fn box_model(&self, node_id: NodeId) -> std::result::Result<Quad, GeometryUnavailable> {
        let coords = self
            .quads
            .get(&node_id)
            .cloned()
            .ok_or_else(|| GeometryUnavailable::new(node_id, "Could not compute box model."))?;
        Quad::new(coords).map_err(|e| GeometryUnavailable::new(node_id, e.to_string()))
    }
}

fn run_fixture() -> (domboxes::RunReport, Canvas) {
    let config = SessionConfig::default();
    let mut canvas = Canvas::for_viewport(config.viewport);
    let mut session = FixtureSession::new(config).expect("fixture session");
    let target = PageTarget::new("http://news.baidu.com/", "body").unwrap();
    let report = domboxes::annotate_page(&mut session, &target, &mut canvas, AnnotationStyle::default())
        .expect("annotate fixture");
    session.close().unwrap();
    (report, canvas)
}

#[test]
fn fixture_run_annotates_text_and_images() {
    let (report, _) = run_fixture();

    assert_eq!(report.url, "http://news.baidu.com/");
    assert_eq!(report.selector, "body");
    assert_eq!(report.stats, WalkStats { visited: 14, annotated: 4, skipped: 1 });

    let ids: Vec<NodeId> = report.annotations.iter().map(|a| a.node_id).collect();
    assert_eq!(ids, vec![14, 15, 18, 22]);

    assert_eq!(report.annotations[0].kind, AnnotationKind::Text { content: "Top stories".into() });
    assert_eq!(
        report.annotations[1].kind,
        AnnotationKind::Image { attributes: vec!["src".into(), "/logo.png".into(), "alt".into(), "logo".into()] }
    );
    assert_eq!(report.annotations[2].bbox, BoundingBox { xmin: 40.0, ymin: 98.0, xmax: 202.0, ymax: 122.0 });
}

#[test]
fn fixture_run_draws_outlines() {
    let (_, canvas) = run_fixture();

    // "Top stories": (20, 30)-(120, 50)
    assert_eq!(canvas.pixel(20, 30), Some(BLUE));
    assert_eq!(canvas.pixel(19, 29), Some(BLUE));
    assert_eq!(canvas.pixel(18, 28), Some(BLACK));
    assert_eq!(canvas.pixel(70, 40), Some(BLACK));
    assert_eq!(canvas.pixel(120, 50), Some(BLUE));

    // logo, truncated to (300, 10)-(364, 74)
    assert_eq!(canvas.pixel(300, 40), Some(BLUE));
    assert_eq!(canvas.pixel(365, 40), Some(BLUE));
    assert_eq!(canvas.pixel(366, 40), Some(BLACK));
}

#[test]
fn fixture_run_is_deterministic() {
    let (_, a) = run_fixture();
    let (_, b) = run_fixture();
    assert_eq!(a.digest(), b.digest());
    assert_ne!(a.digest(), Canvas::new(1920, 2000).digest());
}

#[test]
fn report_serializes_to_json() {
    let (report, _) = run_fixture();
    let v = serde_json::to_value(&report).unwrap();
    assert_eq!(v["stats"]["visited"], 14);
    assert_eq!(v["annotations"][0]["type"], "text");
    assert_eq!(v["annotations"][0]["content"], "Top stories");
}

#[test]
fn unknown_selector_fails_the_run() {
    let config = SessionConfig::default();
    let mut canvas = Canvas::new(10, 10);
    let mut session = FixtureSession::new(config).unwrap();
    let target = PageTarget::new("http://news.baidu.com/", "#missing").unwrap();
    let res = domboxes::annotate_page(&mut session, &target, &mut canvas, AnnotationStyle::default());
    assert!(matches!(res, Err(Error::QueryError(_))));
}

#[test]
fn zero_stroke_is_rejected_before_loading() {
    let mut canvas = Canvas::new(10, 10);
    let mut session = FixtureSession::new(SessionConfig::default()).unwrap();
    let target = PageTarget::new("http://news.baidu.com/", "body").unwrap();
    let style = AnnotationStyle { stroke: 0, ..Default::default() };
    let res = domboxes::annotate_page(&mut session, &target, &mut canvas, style);
    assert!(matches!(res, Err(Error::ConfigError(_))));
    assert!(session.loaded.is_none());
}

#[test]
fn saved_output_is_jpeg() {
    let (_, canvas) = run_fixture();
    let path = std::env::temp_dir().join(format!("domboxes-fixture-{}.jpg", std::process::id()));
    canvas.save(&path).unwrap();
    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1920, 2000));
    fs::remove_file(&path).ok();
}

#[test]
fn recorded_tree_replays_through_dyn_geometry() {
    let session = FixtureSession::new(SessionConfig::default()).unwrap();
    let geometry: &dyn GeometrySource = &session;
    let target = PageTarget::new("http://news.baidu.com/", "body").unwrap();
    let mut canvas = Canvas::new(400, 200);

    let report = domboxes::annotate_tree(geometry, &session.tree, &target, &mut canvas, AnnotationStyle::default())
        .expect("replay recorded tree");
    assert_eq!(report.stats, WalkStats { visited: 14, annotated: 4, skipped: 1 });
    assert_eq!(canvas.pixel(20, 30), Some(BLUE));
}
