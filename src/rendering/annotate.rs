//! Annotation records and the annotator that paints them onto a [`Canvas`]

use crate::dom::NodeId;
use crate::geometry::BoundingBox;
use crate::rendering::Canvas;
use crate::walker::AnnotationSink;
use crate::{Error, Result};
use image::Rgb;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a box was drawn for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnnotationKind {
    /// Text node; `content` is the trimmed node value
    Text { content: String },
    /// Image element with its flat name/value attribute list
    Image { attributes: Vec<String> },
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationKind::Text { content } => f.write_str(content),
            AnnotationKind::Image { attributes } => write!(f, "{:?}", attributes),
        }
    }
}

/// A node's box, as forwarded by the walker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub node_id: NodeId,
    #[serde(flatten)]
    pub kind: AnnotationKind,
    pub bbox: BoundingBox,
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.bbox)
    }
}

/// Outline color and stroke width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationStyle {
    pub color: Rgb<u8>,
    /// Stroke width in pixels
    pub stroke: u32,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            color: Rgb([0, 0, 255]),
            stroke: 3,
        }
    }
}

impl AnnotationStyle {
    /// Parse a `rrggbb` hex color, with or without a leading `#`.
    pub fn parse_color(s: &str) -> Result<Rgb<u8>> {
        let digits = s.trim().trim_start_matches('#');
        let bytes = hex::decode(digits)
            .map_err(|e| Error::ConfigError(format!("Invalid color '{}': {}", s, e)))?;
        match bytes.as_slice() {
            [r, g, b] => Ok(Rgb([*r, *g, *b])),
            _ => Err(Error::ConfigError(format!(
                "Invalid color '{}': expected 3 bytes, got {}",
                s,
                bytes.len()
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.stroke == 0 {
            return Err(Error::ConfigError("Stroke width must be at least 1px".into()));
        }
        Ok(())
    }
}

/// Draws every annotation it receives and keeps the records.
pub struct Annotator<'a> {
    canvas: &'a mut Canvas,
    style: AnnotationStyle,
    annotations: Vec<Annotation>,
}

impl<'a> Annotator<'a> {
    pub fn new(canvas: &'a mut Canvas, style: AnnotationStyle) -> Self {
        Self {
            canvas,
            style,
            annotations: Vec::new(),
        }
    }

    pub fn into_annotations(self) -> Vec<Annotation> {
        self.annotations
    }
}

impl AnnotationSink for Annotator<'_> {
    fn annotate(&mut self, annotation: Annotation) {
        self.canvas
            .stroke_rect(annotation.bbox.to_pixels(), self.style.color, self.style.stroke);
        info!("{}", annotation);
        self.annotations.push(annotation);
    }
}
