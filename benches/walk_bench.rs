use criterion::{black_box, criterion_group, criterion_main, Criterion};
use domboxes::dom::{DomNode, NodeId};
use domboxes::geometry::{BoundingBox, Quad};
use domboxes::rendering::{AnnotationStyle, Annotator, Canvas};
use domboxes::walker::{self, GeometrySource, GeometryUnavailable};

struct GridGeometry;

impl GeometrySource for GridGeometry {
    fn box_model(&self, node_id: NodeId) -> Result<Quad, GeometryUnavailable> {
        if node_id % 7 == 0 {
            return Err(GeometryUnavailable::new(node_id, "not rendered"));
        }
        let x = f64::from(node_id % 60) * 32.0;
        let y = f64::from(node_id / 60) * 24.0;
        Quad::new(vec![x, y, x + 30.0, y, x + 30.0, y + 20.0, x, y + 20.0])
            .map_err(|e| GeometryUnavailable::new(node_id, e.to_string()))
    }
}

/// `sections` blocks of `items` paragraphs, each with a text node and every third with an image.
fn page(sections: u32, items: u32) -> DomNode {
    let mut next: NodeId = 1;
    let mut id = || {
        next += 1;
        next
    };
    let blocks = (0..sections)
        .map(|_| {
            let paragraphs = (0..items)
                .map(|i| {
                    let mut children = vec![DomNode::text(id(), " headline text ")];
                    if i % 3 == 0 {
                        children.push(DomNode::element(id(), "IMG", vec![]));
                    }
                    DomNode::element(id(), "P", children)
                })
                .collect();
            DomNode::element(id(), "SECTION", paragraphs)
        })
        .collect();
    DomNode::element(1, "BODY", blocks)
}

fn bench_quad_to_box(c: &mut Criterion) {
    let quad = Quad::new(vec![5.0, -2.0, 12.5, 4.0, 6.0, 11.0, -1.5, 3.0]).unwrap();
    c.bench_function("bounding_box_from_quad", |b| {
        b.iter(|| BoundingBox::from_quad(black_box(&quad)))
    });
}

fn bench_walk(c: &mut Criterion) {
    let root = page(20, 50);
    c.bench_function("walk_collect", |b| {
        b.iter(|| {
            let mut out = Vec::new();
            walker::walk(black_box(&root), &GridGeometry, &mut out)
        })
    });

    let mut canvas = Canvas::new(1920, 2000);
    c.bench_function("walk_annotate", |b| {
        b.iter(|| {
            let mut annotator = Annotator::new(&mut canvas, AnnotationStyle::default());
            walker::walk(black_box(&root), &GridGeometry, &mut annotator)
        })
    });
}

criterion_group!(benches, bench_quad_to_box, bench_walk);
criterion_main!(benches);
