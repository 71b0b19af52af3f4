//! User-tunable markup settings.
//!
//! Every field has a default so partial settings files stay valid.

use serde::{Deserialize, Serialize};
use viewer_core::ZoomSettings;

use crate::annotation::{AnnotationType, Style};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrawSettings {
    /// Stroke color for kinds without a fixed color
    pub color: String,
    pub stroke_width: f64,
    pub font_size: f64,
    pub font_family: String,
    pub highlight_color: String,
    pub highlight_opacity: f64,
    pub sticky_note_color: String,
    /// Minimum pointer travel, in view pixels, before a polyline gains a vertex
    pub polyline_min_segment: f64,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            color: "#ff0000".to_owned(),
            stroke_width: 2.0,
            font_size: 16.0,
            font_family: "Helvetica".to_owned(),
            highlight_color: "#ffff00".to_owned(),
            highlight_opacity: 0.4,
            sticky_note_color: "#ffd54f".to_owned(),
            polyline_min_segment: 10.0,
        }
    }
}

impl DrawSettings {
    /// Style a new annotation of `kind` starts with.
    pub fn style_for(&self, kind: &AnnotationType) -> Style {
        let stroked = |color: &str| Style {
            color: color.to_owned(),
            stroke_width: Some(self.stroke_width),
            ..Style::default()
        };
        match kind {
            AnnotationType::Highlight => Style {
                color: self.highlight_color.clone(),
                opacity: self.highlight_opacity,
                fill_color: Some(self.highlight_color.clone()),
                ..Style::default()
            },
            AnnotationType::Text => Style {
                color: self.color.clone(),
                font_size: Some(self.font_size),
                font_family: Some(self.font_family.clone()),
                ..Style::default()
            },
            AnnotationType::StickyNote => Style {
                color: self.color.clone(),
                fill_color: Some(self.sticky_note_color.clone()),
                font_size: Some(self.font_size),
                font_family: Some(self.font_family.clone()),
                ..Style::default()
            },
            AnnotationType::Measurement => stroked("#ff6b00"),
            AnnotationType::Calibrate => stroked("red"),
            AnnotationType::Line => stroked("black"),
            _ => stroked(&self.color),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkupSettings {
    pub draw: DrawSettings,
    pub zoom: ZoomSettings,
    /// Selection tolerance in document units
    pub hit_tolerance: f64,
}

impl Default for MarkupSettings {
    fn default() -> Self {
        Self { draw: DrawSettings::default(), zoom: ZoomSettings::default(), hit_tolerance: 4.0 }
    }
}
