//! SVG output for rendered drawables.

use std::collections::BTreeMap;

use viewer_core::Size;

use crate::draw::{DrawingSurface, ElementId};
use crate::render::{Drawable, Paint, Primitive};
use crate::shapes::format_number;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn paint_attributes(paint: &Paint) -> String {
    let mut attrs = String::new();
    match &paint.stroke {
        Some(stroke) => {
            attrs.push_str(&format!(
                r#" stroke="{}" stroke-width="{}""#,
                escape(stroke),
                format_number(paint.stroke_width)
            ));
            if paint.dashed {
                attrs.push_str(r#" stroke-dasharray="6 4""#);
            }
        }
        None => attrs.push_str(r#" stroke="none""#),
    }
    let fill = paint.fill.as_deref().unwrap_or("none");
    attrs.push_str(&format!(r#" fill="{}""#, escape(fill)));
    if paint.opacity < 1.0 {
        attrs.push_str(&format!(r#" opacity="{}""#, format_number(paint.opacity)));
    }
    attrs
}

/// Render one drawable as a single SVG element.
pub fn element_to_svg(drawable: &Drawable) -> String {
    let id = drawable
        .annotation_id
        .as_ref()
        .map(|id| format!(r#" data-annotation-id="{}""#, escape(id.as_str())))
        .unwrap_or_default();
    let paint = paint_attributes(&drawable.paint);

    match &drawable.primitive {
        Primitive::Rect { x, y, width, height } => format!(
            r#"<rect{id} x="{}" y="{}" width="{}" height="{}"{paint}/>"#,
            format_number(*x),
            format_number(*y),
            format_number(*width),
            format_number(*height)
        ),
        Primitive::Circle { cx, cy, r } => format!(
            r#"<circle{id} cx="{}" cy="{}" r="{}"{paint}/>"#,
            format_number(*cx),
            format_number(*cy),
            format_number(*r)
        ),
        Primitive::Ellipse { cx, cy, rx, ry } => format!(
            r#"<ellipse{id} cx="{}" cy="{}" rx="{}" ry="{}"{paint}/>"#,
            format_number(*cx),
            format_number(*cy),
            format_number(*rx),
            format_number(*ry)
        ),
        Primitive::Line { x1, y1, x2, y2 } => format!(
            r#"<line{id} x1="{}" y1="{}" x2="{}" y2="{}"{paint}/>"#,
            format_number(*x1),
            format_number(*y1),
            format_number(*x2),
            format_number(*y2)
        ),
        Primitive::Path { d } => format!(r#"<path{id} d="{d}"{paint}/>"#),
        Primitive::Text { x, y, content } => {
            let mut font = String::new();
            if let Some(size) = drawable.paint.font_size {
                font.push_str(&format!(r#" font-size="{}""#, format_number(size)));
            }
            if let Some(family) = &drawable.paint.font_family {
                font.push_str(&format!(r#" font-family="{}""#, escape(family)));
            }
            format!(
                r#"<text{id} x="{}" y="{}"{font}{paint}>{}</text>"#,
                format_number(*x),
                format_number(*y),
                escape(content)
            )
        }
    }
}

/// Render a standalone SVG document of `size` view pixels.
pub fn render_svg(size: Size, drawables: &[Drawable]) -> String {
    let width = format_number(size.width);
    let height = format_number(size.height);
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    svg.push('\n');
    for drawable in drawables {
        svg.push_str("  ");
        svg.push_str(&element_to_svg(drawable));
        svg.push('\n');
    }
    svg.push_str("</svg>\n");
    svg
}

/// In-memory [`DrawingSurface`] that can be serialized to SVG.
#[derive(Debug, Default)]
pub struct SvgSurface {
    size: Size,
    next_id: u64,
    elements: BTreeMap<ElementId, Vec<Drawable>>,
}

impl SvgSurface {
    pub fn new(size: Size) -> Self {
        Self { size, ..Self::default() }
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Elements in creation order.
    pub fn to_svg(&self) -> String {
        let drawables: Vec<Drawable> = self.elements.values().flatten().cloned().collect();
        render_svg(self.size, &drawables)
    }
}

impl DrawingSurface for SvgSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn create(&mut self, drawables: &[Drawable]) -> ElementId {
        self.next_id += 1;
        let id = ElementId(self.next_id);
        self.elements.insert(id, drawables.to_vec());
        id
    }

    fn update(&mut self, element: ElementId, drawables: &[Drawable]) {
        if let Some(existing) = self.elements.get_mut(&element) {
            *existing = drawables.to_vec();
        }
    }

    fn remove(&mut self, element: ElementId) {
        self.elements.remove(&element);
    }
}
