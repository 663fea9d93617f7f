use crate::canvas::{Canvas, Painter, TextRun};
use crate::color::Color;
use std::fmt::Write;

/// Renders the canvas as a standalone SVG document sized in points.
///
/// No background is painted, so the figure stays transparent.
pub fn render_svg(canvas: &Canvas) -> String {
    let mut painter = SvgPainter::default();
    canvas.paint(&mut painter);
    painter.svg
}

#[derive(Debug, Default)]
struct SvgPainter {
    svg: String,
    font_family: String,
}

impl Painter for SvgPainter {
    fn begin(&mut self, width: f64, height: f64, font_family: &str) {
        self.font_family = escape_xml(font_family);
        let _ = write!(
            self.svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}pt\" height=\"{height:.2}pt\" viewBox=\"0 0 {width:.2} {height:.2}\">",
        );
    }

    fn dots(&mut self, centers: &[(f64, f64)], diameter: f64, color: Color) {
        let radius = diameter / 2.0;
        for (cx, cy) in centers {
            let _ = write!(
                self.svg,
                "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{radius:.2}\" fill=\"{}\"{}/>",
                color.to_hex(),
                opacity_attr("fill-opacity", color)
            );
        }
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Color) {
        let _ = write!(
            self.svg,
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{width:.2}\" stroke-linecap=\"round\"{}/>",
            from.0,
            from.1,
            to.0,
            to.1,
            color.to_hex(),
            opacity_attr("stroke-opacity", color)
        );
    }

    fn text(&mut self, run: &TextRun<'_>) {
        let _ = write!(
            self.svg,
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{:.2}\" font-style=\"italic\" fill=\"{}\"{}>{}",
            run.x,
            run.baseline,
            self.font_family,
            run.font_size,
            run.color.to_hex(),
            opacity_attr("fill-opacity", run.color),
            escape_xml(run.base)
        );
        if let Some(sub) = &run.subscript {
            let _ = write!(
                self.svg,
                "<tspan x=\"{:.2}\" y=\"{:.2}\" font-size=\"{:.2}\">{}</tspan>",
                sub.x,
                sub.baseline,
                sub.font_size,
                escape_xml(sub.text)
            );
        }
        self.svg.push_str("</text>");
    }

    fn finish(&mut self) {
        self.svg.push_str("</svg>");
    }
}

fn opacity_attr(name: &str, color: Color) -> String {
    if color.is_opaque() {
        String::new()
    } else {
        format!(" {name}=\"{:.3}\"", color.alpha())
    }
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Frame, HAlign, LabelText, Primitive, VAlign};
    use crate::graph::Point;
    use crate::style::DrawStyle;

    #[test]
    fn writes_circles_lines_and_subscripts() {
        let mut canvas = Canvas::new(&DrawStyle::classic());
        canvas.push(Primitive::Segment {
            from: Point::new(0.0, 0.0),
            to: Point::new(1.0, 0.0),
            color: Color::BLACK,
            width: 1.5,
            end_markers: None,
        });
        canvas.push(Primitive::Points {
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            color: Color::RED,
            diameter: 10.0,
        });
        canvas.push(Primitive::Text {
            anchor: Point::new(0.0, 0.3),
            text: LabelText::indexed("v", "<1>"),
            font_size: 25.0,
            color: Color::BLACK,
            h_align: HAlign::Center,
            v_align: VAlign::Center,
        });
        canvas.set_frame(Frame::illustration());
        let svg = render_svg(&canvas);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert_eq!(svg.matches("<line").count(), 1);
        assert!(svg.contains("fill=\"#ff0000\""));
        assert!(svg.contains(">v<tspan"));
        assert!(svg.contains("&lt;1&gt;</tspan>"));
        assert!(!svg.contains("<rect"), "figures have no background");
    }

    #[test]
    fn translucent_colors_carry_opacity() {
        let mut canvas = Canvas::new(&DrawStyle::classic());
        canvas.push(Primitive::Points {
            points: vec![Point::new(0.0, 0.0)],
            color: Color::new(0, 0, 255, 128),
            diameter: 8.0,
        });
        let svg = render_svg(&canvas);
        assert!(svg.contains("fill-opacity=\"0.502\""));
    }
}
