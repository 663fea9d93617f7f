use crate::canvas::{Canvas, Painter, TextRun};
use crate::color::Color;
use std::fmt::Write;

/// Renders the canvas as Encapsulated PostScript.
///
/// Text uses the standard PostScript fonts, picked from the generic family
/// of the style's font list. Alpha is ignored.
pub fn render_eps(canvas: &Canvas) -> String {
    let mut painter = EpsPainter::default();
    canvas.paint(&mut painter);
    painter.out
}

#[derive(Debug, Default)]
struct EpsPainter {
    out: String,
    height: f64,
    font: &'static str,
}

impl EpsPainter {
    fn set_color(&mut self, color: Color) {
        let (r, g, b) = color.unit_rgb();
        let _ = writeln!(self.out, "{r:.3} {g:.3} {b:.3} setrgbcolor");
    }

    fn show(&mut self, x: f64, baseline: f64, size: f64, text: &str) {
        let _ = writeln!(
            self.out,
            "/{} findfont {size:.2} scalefont setfont {x:.2} {:.2} moveto ({}) show",
            self.font,
            self.height - baseline,
            escape_ps_string(text)
        );
    }
}

impl Painter for EpsPainter {
    fn begin(&mut self, width: f64, height: f64, font_family: &str) {
        self.height = height;
        self.font = standard_font(font_family);
        let _ = writeln!(self.out, "%!PS-Adobe-3.0 EPSF-3.0");
        let _ = writeln!(
            self.out,
            "%%BoundingBox: 0 0 {} {}",
            width.ceil() as i64,
            height.ceil() as i64
        );
        let _ = writeln!(self.out, "%%HiResBoundingBox: 0 0 {width:.3} {height:.3}");
        let _ = writeln!(self.out, "%%Creator: graph-figure");
        let _ = writeln!(self.out, "%%LanguageLevel: 2");
        let _ = writeln!(self.out, "%%Pages: 1");
        let _ = writeln!(self.out, "%%EndComments");
        let _ = writeln!(self.out, "%%Page: 1 1");
        let _ = writeln!(self.out, "gsave");
        let _ = writeln!(self.out, "1 setlinecap 1 setlinejoin");
    }

    fn dots(&mut self, centers: &[(f64, f64)], diameter: f64, color: Color) {
        self.set_color(color);
        let radius = diameter / 2.0;
        for (x, y) in centers {
            let _ = writeln!(
                self.out,
                "newpath {x:.2} {:.2} {radius:.2} 0 360 arc closepath fill",
                self.height - y
            );
        }
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Color) {
        self.set_color(color);
        let _ = writeln!(
            self.out,
            "{width:.2} setlinewidth newpath {:.2} {:.2} moveto {:.2} {:.2} lineto stroke",
            from.0,
            self.height - from.1,
            to.0,
            self.height - to.1
        );
    }

    fn text(&mut self, run: &TextRun<'_>) {
        self.set_color(run.color);
        self.show(run.x, run.baseline, run.font_size, run.base);
        if let Some(sub) = &run.subscript {
            self.show(sub.x, sub.baseline, sub.font_size, sub.text);
        }
    }

    fn finish(&mut self) {
        let _ = writeln!(self.out, "grestore");
        let _ = writeln!(self.out, "showpage");
        let _ = writeln!(self.out, "%%EOF");
    }
}

const SANS_HINTS: [&str; 4] = ["sans", "helvetica", "arial", "inter"];

/// Standard-14 italic face matching the first generic family in a CSS font list.
pub(crate) fn standard_font(font_family: &str) -> &'static str {
    for part in font_family.split(',') {
        let name = part.trim().trim_matches('"').trim_matches('\'').to_ascii_lowercase();
        if name.contains("mono") || name.contains("courier") {
            return "Courier-Oblique";
        }
        if SANS_HINTS.iter().any(|hint| name.contains(*hint)) || name == "system-ui" {
            return "Helvetica-Oblique";
        }
        if name.contains("serif") || name.contains("times") {
            return "Times-Italic";
        }
    }
    "Times-Italic"
}

/// Escapes a PostScript/PDF literal string. Non-ASCII characters become `?`.
pub(crate) fn escape_ps_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Frame, HAlign, LabelText, Primitive, VAlign};
    use crate::graph::Point;
    use crate::style::DrawStyle;

    #[test]
    fn eps_has_header_bounding_box_and_trailer() {
        let mut canvas = Canvas::new(&DrawStyle::classic());
        canvas.push(Primitive::Segment {
            from: Point::new(0.0, 0.0),
            to: Point::new(2.0, 1.0),
            color: Color::BLACK,
            width: 1.5,
            end_markers: Some(10.0),
        });
        canvas.push(Primitive::Text {
            anchor: Point::new(1.0, 1.5),
            text: LabelText::indexed("v", "(2)"),
            font_size: 25.0,
            color: Color::BLACK,
            h_align: HAlign::Center,
            v_align: VAlign::Center,
        });
        canvas.set_frame(Frame::illustration());
        let eps = render_eps(&canvas);
        assert!(eps.starts_with("%!PS-Adobe-3.0 EPSF-3.0\n%%BoundingBox: 0 0 "));
        assert!(eps.trim_end().ends_with("%%EOF"));
        assert_eq!(eps.matches(" arc closepath fill").count(), 2);
        assert_eq!(eps.matches(" lineto stroke").count(), 1);
        assert!(eps.contains("(v) show"));
        assert!(eps.contains("(\\(2\\)) show"));
        assert!(eps.contains("/Times-Italic findfont"));
    }

    #[test]
    fn picks_fonts_from_family_lists() {
        assert_eq!(standard_font("DejaVu Serif, serif"), "Times-Italic");
        assert_eq!(standard_font("Inter, sans-serif"), "Helvetica-Oblique");
        assert_eq!(standard_font("\"Fira Mono\""), "Courier-Oblique");
        assert_eq!(standard_font("Arial"), "Helvetica-Oblique");
        assert_eq!(standard_font("system-ui, serif"), "Helvetica-Oblique");
        assert_eq!(standard_font(""), "Times-Italic");
    }

    #[test]
    fn escapes_postscript_strings() {
        assert_eq!(escape_ps_string(r"a(b)\c"), r"a\(b\)\\c");
        assert_eq!(escape_ps_string("θ1"), "?1");
    }
}
