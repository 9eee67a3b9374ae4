//! Render and serialization settings parsed from the JSON request
//! document's `render_settings` / `serialization_settings` keys.

/// A CSS color, an `[r, g, b]` triple, or an `[r, g, b, a]` quadruple.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    Named(String),
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, f64),
}

impl Color {
    /// Renders as a CSS color string suitable for an SVG `stroke`/`fill`
    /// attribute.
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Named(name) => name.clone(),
            Self::Rgb(r, g, b) => format!("rgb({r},{g},{b})"),
            Self::Rgba(r, g, b, a) => format!("rgba({r},{g},{b},{a})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

/// Map rendering parameters, parsed from a `render_settings` object.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub line_width: f64,
    pub stop_radius: f64,
    pub bus_label_font_size: f64,
    pub bus_label_offset: Offset,
    pub stop_label_font_size: f64,
    pub stop_label_offset: Offset,
    pub underlayer_color: Color,
    pub underlayer_width: f64,
    pub color_palette: Vec<Color>,
}

/// Where the binary artifact is read from / written to.
#[derive(Debug, Clone)]
pub struct SerializationSettings {
    pub file: std::path::PathBuf,
}
