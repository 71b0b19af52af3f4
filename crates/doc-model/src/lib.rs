use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const EXPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AnnotationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Annotation kind as stored in the `type` column.
///
/// Unrecognized strings are kept verbatim in `Other` so a record written by a
/// newer client survives a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnnotationType {
    Highlight,
    Text,
    StickyNote,
    Rectangle,
    Circle,
    Ellipse,
    Line,
    Arrow,
    Measurement,
    Calibrate,
    Arc,
    Cloud,
    Freehand,
    Polyline,
    Other(String),
}

impl AnnotationType {
    pub const KNOWN: [AnnotationType; 14] = [
        AnnotationType::Highlight,
        AnnotationType::Text,
        AnnotationType::StickyNote,
        AnnotationType::Rectangle,
        AnnotationType::Circle,
        AnnotationType::Ellipse,
        AnnotationType::Line,
        AnnotationType::Arrow,
        AnnotationType::Measurement,
        AnnotationType::Calibrate,
        AnnotationType::Arc,
        AnnotationType::Cloud,
        AnnotationType::Freehand,
        AnnotationType::Polyline,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Highlight => "highlight",
            Self::Text => "text",
            Self::StickyNote => "sticky-note",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
            Self::Line => "line",
            Self::Arrow => "arrow",
            Self::Measurement => "measurement",
            Self::Calibrate => "calibrate",
            Self::Arc => "arc",
            Self::Cloud => "cloud",
            Self::Freehand => "freehand",
            Self::Polyline => "polyline",
            Self::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Text-like kinds take their content from a prompt instead of a drag.
    pub fn is_text_like(&self) -> bool {
        matches!(self, Self::Text | Self::StickyNote)
    }
}

impl From<&str> for AnnotationType {
    fn from(value: &str) -> Self {
        match value {
            "highlight" => Self::Highlight,
            "text" => Self::Text,
            "sticky-note" | "sticky_note" => Self::StickyNote,
            "rectangle" => Self::Rectangle,
            "circle" => Self::Circle,
            "ellipse" => Self::Ellipse,
            "line" => Self::Line,
            "arrow" => Self::Arrow,
            "measurement" => Self::Measurement,
            "calibrate" => Self::Calibrate,
            "arc" => Self::Arc,
            "cloud" => Self::Cloud,
            "freehand" => Self::Freehand,
            "polyline" => Self::Polyline,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for AnnotationType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<AnnotationType> for String {
    fn from(value: AnnotationType) -> Self {
        match value {
            AnnotationType::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for AnnotationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
}

impl PointRecord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Flat position record.
///
/// `width`/`height` are overloaded by kind: a size for boxes, the radius for
/// circles (`width` only), `rx`/`ry` for ellipses, and the end point `x2`/`y2`
/// for line-like kinds. Arc and point-list kinds use the optional fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<PointRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_point: Option<PointRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_point: Option<PointRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_angle: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_flag",
        deserialize_with = "deserialize_flag"
    )]
    pub sweep_flag: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_flag",
        deserialize_with = "deserialize_flag"
    )]
    pub large_arc_flag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<PointRecord>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Int(i64),
    Float(f64),
}

// SVG arc flags are written as 0/1; older clients stored booleans.
fn serialize_flag<S: Serializer>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(flag) => serializer.serialize_some(&u8::from(*flag)),
        None => serializer.serialize_none(),
    }
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(Option::<FlagRepr>::deserialize(deserializer)?.map(|repr| match repr {
        FlagRepr::Bool(flag) => flag,
        FlagRepr::Int(value) => value != 0,
        FlagRepr::Float(value) => value != 0.0,
    }))
}

fn default_color() -> String {
    "#000000".to_owned()
}

fn default_opacity() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRecord {
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

impl Default for StyleRecord {
    fn default() -> Self {
        Self {
            color: default_color(),
            opacity: default_opacity(),
            stroke_width: None,
            stroke_color: None,
            fill_color: None,
            font_size: None,
            font_family: None,
        }
    }
}

/// Derived measurement values. Field names are part of the stored format,
/// including the snake_case `area_px`/`length_px` duplicates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perimeter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ry: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_px: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_px: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AnnotationId>,
    pub document_id: DocumentId,
    pub page: u32,
    #[serde(rename = "type")]
    pub kind: AnnotationType,
    #[serde(default)]
    pub position: PositionRecord,
    #[serde(default)]
    pub style: StyleRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Envelope written by annotation export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationExport {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<DocumentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    pub annotations: Vec<AnnotationRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn annotation_type_uses_kebab_case_names() {
        let value = serde_json::to_value(AnnotationType::StickyNote).expect("serialize");
        assert_eq!(value, json!("sticky-note"));

        let parsed: AnnotationType = serde_json::from_value(json!("calibrate")).expect("parse");
        assert_eq!(parsed, AnnotationType::Calibrate);
    }

    #[test]
    fn unknown_type_survives_round_trip() {
        let parsed: AnnotationType = serde_json::from_value(json!("stamp")).expect("parse");
        assert_eq!(parsed, AnnotationType::Other("stamp".to_owned()));
        assert!(!parsed.is_known());

        let back = serde_json::to_value(&parsed).expect("serialize");
        assert_eq!(back, json!("stamp"));
    }

    #[test]
    fn record_defaults_fill_missing_fields() {
        let record: AnnotationRecord = serde_json::from_value(json!({
            "documentId": "doc-1",
            "page": 2,
            "type": "rectangle",
            "position": { "x": 10, "y": 20, "width": 30, "height": 40 }
        }))
        .expect("minimal record should parse");

        assert!(record.is_visible);
        assert_eq!(record.style.opacity, 1.0);
        assert_eq!(record.style.color, "#000000");
        assert_eq!(record.position.width, 30.0);
        assert!(record.id.is_none());
    }

    #[test]
    fn record_uses_camel_case_wire_names() {
        let record = AnnotationRecord {
            id: Some(AnnotationId::new("a-1")),
            document_id: DocumentId::new("doc-1"),
            page: 1,
            kind: AnnotationType::Line,
            position: PositionRecord {
                x: 1.0,
                y: 2.0,
                width: 3.0,
                height: 4.0,
                ..PositionRecord::default()
            },
            style: StyleRecord { stroke_width: Some(2.0), ..StyleRecord::default() },
            content: None,
            metrics: Some(Metrics { length_px: Some(2.0), ..Metrics::default() }),
            is_visible: false,
            author: None,
            created_at: None,
            updated_at: None,
        };

        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["documentId"], json!("doc-1"));
        assert_eq!(value["type"], json!("line"));
        assert_eq!(value["isVisible"], json!(false));
        assert_eq!(value["style"]["strokeWidth"], json!(2.0));
        assert_eq!(value["metrics"]["length_px"], json!(2.0));
        assert!(value["position"].get("startPoint").is_none());
    }

    #[test]
    fn arc_flags_accept_booleans_and_numbers() {
        let position: PositionRecord = serde_json::from_value(json!({
            "sweepFlag": true,
            "largeArcFlag": 0
        }))
        .expect("flags should parse");
        assert_eq!(position.sweep_flag, Some(true));
        assert_eq!(position.large_arc_flag, Some(false));

        let value = serde_json::to_value(&position).expect("serialize");
        assert_eq!(value["sweepFlag"], json!(1));
        assert_eq!(value["largeArcFlag"], json!(0));
    }
}
