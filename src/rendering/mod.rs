//! Raster side: the canvas boxes are drawn on, and the annotator that draws them

pub mod annotate;
pub mod canvas;

pub use annotate::{Annotation, AnnotationKind, AnnotationStyle, Annotator};
pub use canvas::Canvas;
