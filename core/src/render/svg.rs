//! Low-level SVG element builders: escaping, polylines, circles, text.

/// Escapes XML character data / attribute content for `"`, `'`, `<`,
/// `>`, and `&`.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[must_use]
pub fn format_number(n: f64) -> String {
    // Trim to a stable, SVG-friendly precision so output is
    // byte-identical across runs for the same input.
    let rounded = (n * 1e6).round() / 1e6;
    let mut s = format!("{rounded}");
    if !s.contains('.') {
        s.push_str(".0");
    }
    s
}

pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[must_use]
pub fn polyline(points: &[Point], stroke: &str, width: f64) -> String {
    let points_attr = points
        .iter()
        .map(|p| format!("{},{}", format_number(p.x), format_number(p.y)))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        r#"<polyline points="{points_attr}" stroke="{stroke}" stroke-width="{}" stroke-linecap="round" stroke-linejoin="round" fill="none"/>"#,
        format_number(width)
    )
}

#[must_use]
pub fn circle(center: &Point, radius: f64, fill: &str) -> String {
    format!(
        r#"<circle cx="{}" cy="{}" r="{}" fill="{fill}"/>"#,
        format_number(center.x),
        format_number(center.y),
        format_number(radius)
    )
}

pub struct TextSpec<'a> {
    pub point: &'a Point,
    pub offset_dx: f64,
    pub offset_dy: f64,
    pub font_size: f64,
    pub bold: bool,
    pub fill: &'a str,
    pub stroke: Option<(&'a str, f64)>,
    pub content: &'a str,
}

#[must_use]
pub fn text(spec: &TextSpec) -> String {
    let mut attrs = format!(
        r#"x="{}" y="{}" dx="{}" dy="{}" font-size="{}" font-family="Verdana""#,
        format_number(spec.point.x + spec.offset_dx),
        format_number(spec.point.y + spec.offset_dy),
        format_number(spec.offset_dx),
        format_number(spec.offset_dy),
        format_number(spec.font_size),
    );
    if spec.bold {
        attrs.push_str(r#" font-weight="bold""#);
    }
    attrs.push_str(&format!(r#" fill="{}""#, spec.fill));
    if let Some((color, width)) = spec.stroke {
        attrs.push_str(&format!(r#" stroke="{}" stroke-width="{}" stroke-linecap="round" stroke-linejoin="round""#, color, format_number(width)));
    }
    format!("<text {attrs}>{}</text>", escape(spec.content))
}
