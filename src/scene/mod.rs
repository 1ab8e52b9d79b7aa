//! Scene primitives - colors, geometry, and the abstract render surface

mod svg;

pub use svg::SvgSurface;

/// RGBA color
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Set the alpha value
    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self {
            r: self.r,
            g: self.g,
            b: self.b,
            a: alpha,
        }
    }

    /// CSS hex form (`#RRGGBB`); alpha is carried separately as opacity
    pub fn to_css_hex(&self) -> String {
        format!(
            "#{:02X}{:02X}{:02X}",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgba(1.0, 1.0, 1.0, 1.0)
    }
}

/// The four lane colors, applied as `lane % 4`
pub const LANE_COLORS: [Color; 4] = [
    Color::rgb8(0x00, 0xCC, 0x19),
    Color::rgb8(0x01, 0x98, 0xA6),
    Color::rgb8(0xFF, 0x78, 0x00),
    Color::rgb8(0xFF, 0x0D, 0x00),
];

/// Color for a lane index
pub fn lane_color(lane: usize) -> Color {
    LANE_COLORS[lane % LANE_COLORS.len()]
}

pub const TEXT_COLOR: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
pub const HIT_REGION_COLOR: Color = Color::rgba(1.0, 1.0, 1.0, 0.1);
pub const HIT_REGION_ACTIVE_COLOR: Color = Color::rgba(1.0, 1.0, 1.0, 0.25);

/// Chip fill for a local branch
pub const CHIP_LOCAL: Color = Color::rgba(1.0, 0.0, 0.0, 0.5);
/// Chip fill for a remote branch
pub const CHIP_REMOTE: Color = Color::rgba(0.0, 0.5, 0.0, 0.5);
/// Chip fill for a tag
pub const CHIP_TAG: Color = Color::rgba(0.5, 0.5, 0.5, 0.5);
/// Chip fill for anything else (stash markers, unknown ref kinds)
pub const CHIP_OTHER: Color = Color::rgba(1.0, 1.0, 0.0, 0.5);

/// A rectangle in graph coordinates (pixels, origin top-left)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Geometry of a single drawable primitive
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    /// Cubic bezier from (x1, y1) to (x2, y2) with two control points
    Curve {
        x1: f32,
        y1: f32,
        c1x: f32,
        c1y: f32,
        c2x: f32,
        c2y: f32,
        x2: f32,
        y2: f32,
    },
    RoundedRect {
        rect: Rect,
        corner_radius: f32,
    },
    Text {
        x: f32,
        y: f32,
        content: String,
        size: f32,
    },
}

/// Stroke attributes for line-like shapes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

/// One materialized primitive: geometry plus paint attributes.
///
/// Geometry is mutable so a primitive can be moved (e.g. when rows shift
/// vertically) without being rebuilt; `dirty` flags it for the next paint.
#[derive(Clone, Debug, PartialEq)]
pub struct Drawable {
    pub shape: Shape,
    pub fill: Option<Color>,
    pub stroke: Option<Stroke>,
    pub dirty: bool,
}

impl Drawable {
    pub fn filled(shape: Shape, fill: Color) -> Self {
        Self { shape, fill: Some(fill), stroke: None, dirty: true }
    }

    pub fn stroked(shape: Shape, color: Color, width: f32) -> Self {
        Self {
            shape,
            fill: None,
            stroke: Some(Stroke { color, width }),
            dirty: true,
        }
    }

    /// Shift the primitive vertically in place
    pub fn translate_y(&mut self, dy: f32) {
        match &mut self.shape {
            Shape::Circle { cy, .. } => *cy += dy,
            Shape::Line { y1, y2, .. } => {
                *y1 += dy;
                *y2 += dy;
            }
            Shape::Curve { y1, c1y, c2y, y2, .. } => {
                *y1 += dy;
                *c1y += dy;
                *c2y += dy;
                *y2 += dy;
            }
            Shape::RoundedRect { rect, .. } => rect.y += dy,
            Shape::Text { y, .. } => *y += dy,
        }
        self.dirty = true;
    }
}

/// Render target for the engine's primitives.
///
/// Implementations only need "draw this primitive" and "remove everything";
/// draw order is the paint order.
pub trait Surface {
    fn draw(&mut self, drawable: &Drawable);
    fn clear(&mut self);
}

/// Text width source for label and chip sizing
pub trait TextMetrics {
    fn text_width(&self, text: &str, size: f32) -> f32;
}

/// Fixed-advance estimator used when no real font metrics are available.
/// Deterministic, so headless layout is reproducible.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonospaceMetrics;

impl TextMetrics for MonospaceMetrics {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_css_hex() {
        assert_eq!(LANE_COLORS[0].to_css_hex(), "#00CC19");
        assert_eq!(LANE_COLORS[1].to_css_hex(), "#0198A6");
        assert_eq!(LANE_COLORS[2].to_css_hex(), "#FF7800");
        assert_eq!(LANE_COLORS[3].to_css_hex(), "#FF0D00");
    }

    #[test]
    fn test_lane_color_cycles_mod_4() {
        for lane in 0..12 {
            assert_eq!(lane_color(lane), LANE_COLORS[lane % 4]);
        }
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(10.0, 20.0, 30.0, 10.0);
        assert!(r.contains(10.0, 20.0));
        assert!(r.contains(39.9, 29.9));
        assert!(!r.contains(40.0, 25.0));
        assert!(!r.contains(9.9, 25.0));
    }

    #[test]
    fn test_translate_y_moves_all_points() {
        let mut d = Drawable::stroked(
            Shape::Curve {
                x1: 0.0,
                y1: 0.0,
                c1x: 1.0,
                c1y: 2.0,
                c2x: 3.0,
                c2y: 4.0,
                x2: 5.0,
                y2: 6.0,
            },
            Color::default(),
            2.0,
        );
        d.dirty = false;
        d.translate_y(10.0);
        assert!(d.dirty);
        match d.shape {
            Shape::Curve { y1, c1y, c2y, y2, .. } => {
                assert!((y1 - 10.0).abs() < 0.01);
                assert!((c1y - 12.0).abs() < 0.01);
                assert!((c2y - 14.0).abs() < 0.01);
                assert!((y2 - 16.0).abs() < 0.01);
            }
            _ => panic!("shape changed variant"),
        }
    }

    #[test]
    fn test_monospace_metrics_scales_with_length() {
        let m = MonospaceMetrics;
        let short = m.text_width("ab", 13.0);
        let long = m.text_width("abcd", 13.0);
        assert!((long - short * 2.0).abs() < 0.01);
    }
}
