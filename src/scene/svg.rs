use std::fmt::Write;

use super::{Color, Drawable, Shape, Surface};

/// Render surface that serializes primitives into an SVG document.
///
/// Primitives are emitted in draw order, which is the paint order, so the
/// engine's z-ordering carries straight through to the SVG element order.
pub struct SvgSurface {
    width: f32,
    height: f32,
    view_y: f32,
    background: Option<Color>,
    body: String,
}

impl SvgSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            view_y: 0.0,
            background: None,
            body: String::new(),
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Pan the viewBox down by `y` pixels. Primitives keep their content
    /// coordinates; the document shows the slice a scrolled viewport would.
    pub fn with_view_offset(mut self, y: f32) -> Self {
        self.view_y = y;
        self
    }

    /// Number of elements drawn since the last clear
    pub fn element_count(&self) -> usize {
        self.body.matches('\n').count()
    }

    /// Assemble the complete SVG document
    pub fn document(&self) -> String {
        let mut doc = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 {} {} {}\">\n",
            self.width, self.height, self.view_y, self.width, self.height
        );
        if let Some(bg) = self.background {
            let _ = writeln!(
                doc,
                "<rect x=\"0\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
                self.view_y,
                self.width,
                self.height,
                bg.to_css_hex()
            );
        }
        doc.push_str(&self.body);
        doc.push_str("</svg>\n");
        doc
    }
}

fn escape_xml(text: &str) -> String {
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

fn push_fill(attrs: &mut String, fill: Option<Color>) {
    match fill {
        Some(c) => {
            let _ = write!(attrs, " fill=\"{}\"", c.to_css_hex());
            if c.a < 1.0 {
                let _ = write!(attrs, " fill-opacity=\"{}\"", c.a);
            }
        }
        None => attrs.push_str(" fill=\"none\""),
    }
}

fn push_stroke(attrs: &mut String, drawable: &Drawable) {
    if let Some(stroke) = drawable.stroke {
        let _ = write!(
            attrs,
            " stroke=\"{}\" stroke-width=\"{}\"",
            stroke.color.to_css_hex(),
            stroke.width
        );
        if stroke.color.a < 1.0 {
            let _ = write!(attrs, " stroke-opacity=\"{}\"", stroke.color.a);
        }
    }
}

impl Surface for SvgSurface {
    fn draw(&mut self, drawable: &Drawable) {
        let mut attrs = String::new();
        match &drawable.shape {
            Shape::Circle { cx, cy, radius } => {
                let _ = write!(attrs, "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{radius}\"");
                push_fill(&mut attrs, drawable.fill);
                push_stroke(&mut attrs, drawable);
                attrs.push_str("/>");
            }
            Shape::Line { x1, y1, x2, y2 } => {
                let _ = write!(attrs, "<line x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\"");
                push_stroke(&mut attrs, drawable);
                attrs.push_str("/>");
            }
            Shape::Curve { x1, y1, c1x, c1y, c2x, c2y, x2, y2 } => {
                let _ = write!(
                    attrs,
                    "<path d=\"M {x1} {y1} C {c1x} {c1y}, {c2x} {c2y}, {x2} {y2}\""
                );
                push_fill(&mut attrs, drawable.fill);
                push_stroke(&mut attrs, drawable);
                attrs.push_str("/>");
            }
            Shape::RoundedRect { rect, corner_radius } => {
                let _ = write!(
                    attrs,
                    "<rect x=\"{}\" y=\"{}\" rx=\"{corner_radius}\" ry=\"{corner_radius}\" width=\"{}\" height=\"{}\"",
                    rect.x, rect.y, rect.width, rect.height
                );
                push_fill(&mut attrs, drawable.fill);
                push_stroke(&mut attrs, drawable);
                attrs.push_str("/>");
            }
            Shape::Text { x, y, content, size } => {
                let _ = write!(attrs, "<text x=\"{x}\" y=\"{y}\" font-size=\"{size}\"");
                push_fill(&mut attrs, drawable.fill);
                let _ = write!(attrs, ">{}</text>", escape_xml(content));
            }
        }
        attrs.push('\n');
        self.body.push_str(&attrs);
    }

    fn clear(&mut self) {
        self.body.clear();
    }
}
