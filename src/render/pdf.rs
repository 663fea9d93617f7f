use super::eps::{escape_ps_string, standard_font};
use crate::canvas::{Canvas, Painter, TextRun};
use crate::color::Color;
use std::fmt::Write;

/// Bezier control distance for a quarter circle of unit radius.
const KAPPA: f64 = 0.552_284_749_8;

/// Renders the canvas as a single-page PDF with an uncompressed content stream.
pub fn render_pdf(canvas: &Canvas) -> Vec<u8> {
    let mut painter = PdfPainter::default();
    canvas.paint(&mut painter);
    painter.into_document()
}

#[derive(Debug, Default)]
struct PdfPainter {
    content: String,
    width: f64,
    height: f64,
    font: &'static str,
}

impl PdfPainter {
    fn flip(&self, y: f64) -> f64 {
        self.height - y
    }

    fn show(&mut self, x: f64, baseline: f64, size: f64, text: &str) {
        let y = self.flip(baseline);
        let _ = writeln!(
            self.content,
            "BT /F1 {size:.2} Tf {x:.2} {y:.2} Td ({}) Tj ET",
            escape_ps_string(text)
        );
    }

    fn into_document(self) -> Vec<u8> {
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.3} {:.3}] /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>",
                self.width, self.height
            ),
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                self.font
            ),
            format!(
                "<< /Length {} >>\nstream\n{}endstream",
                self.content.len(),
                self.content
            ),
        ];

        let mut doc = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (idx, body) in objects.iter().enumerate() {
            offsets.push(doc.len());
            let _ = write!(doc, "{} 0 obj\n{body}\nendobj\n", idx + 1);
        }
        let xref_at = doc.len();
        let _ = write!(doc, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = write!(doc, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            doc,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        );
        doc.into_bytes()
    }
}

impl Painter for PdfPainter {
    fn begin(&mut self, width: f64, height: f64, font_family: &str) {
        self.width = width;
        self.height = height;
        self.font = standard_font(font_family);
        self.content.push_str("1 J 1 j\n");
    }

    fn dots(&mut self, centers: &[(f64, f64)], diameter: f64, color: Color) {
        let (r, g, b) = color.unit_rgb();
        let _ = writeln!(self.content, "{r:.3} {g:.3} {b:.3} rg");
        let rad = diameter / 2.0;
        let k = rad * KAPPA;
        for &(cx, cy) in centers {
            let cy = self.flip(cy);
            let _ = writeln!(
                self.content,
                "{:.2} {cy:.2} m {:.2} {:.2} {:.2} {:.2} {cx:.2} {:.2} c {:.2} {:.2} {:.2} {:.2} {:.2} {cy:.2} c {:.2} {:.2} {:.2} {:.2} {cx:.2} {:.2} c {:.2} {:.2} {:.2} {:.2} {:.2} {cy:.2} c f",
                cx + rad,
                cx + rad, cy + k, cx + k, cy + rad, cy + rad,
                cx - k, cy + rad, cx - rad, cy + k, cx - rad,
                cx - rad, cy - k, cx - k, cy - rad, cy - rad,
                cx + k, cy - rad, cx + rad, cy - k, cx + rad,
            );
        }
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Color) {
        let (r, g, b) = color.unit_rgb();
        let _ = writeln!(
            self.content,
            "{r:.3} {g:.3} {b:.3} RG {width:.2} w {:.2} {:.2} m {:.2} {:.2} l S",
            from.0,
            self.flip(from.1),
            to.0,
            self.flip(to.1)
        );
    }

    fn text(&mut self, run: &TextRun<'_>) {
        let (r, g, b) = run.color.unit_rgb();
        let _ = writeln!(self.content, "{r:.3} {g:.3} {b:.3} rg");
        self.show(run.x, run.baseline, run.font_size, run.base);
        if let Some(sub) = &run.subscript {
            self.show(sub.x, sub.baseline, sub.font_size, sub.text);
        }
    }

    fn finish(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Frame, HAlign, LabelText, Primitive, VAlign};
    use crate::graph::Point;
    use crate::style::DrawStyle;

    fn sample_canvas() -> Canvas {
        let mut canvas = Canvas::new(&DrawStyle::classic());
        canvas.push(Primitive::Segment {
            from: Point::new(0.0, 0.0),
            to: Point::new(1.0, 1.0),
            color: Color::BLACK,
            width: 1.5,
            end_markers: None,
        });
        canvas.push(Primitive::Points {
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            color: Color::BLACK,
            diameter: 10.0,
        });
        canvas.push(Primitive::Text {
            anchor: Point::new(0.5, 1.2),
            text: LabelText::plain("G"),
            font_size: 25.0,
            color: Color::BLACK,
            h_align: HAlign::Center,
            v_align: VAlign::Baseline,
        });
        canvas.set_frame(Frame::illustration());
        canvas
    }

    #[test]
    fn pdf_structure_is_well_formed() {
        let pdf = String::from_utf8(render_pdf(&sample_canvas())).unwrap();
        assert!(pdf.starts_with("%PDF-1.4\n"));
        assert!(pdf.ends_with("%%EOF\n"));
        assert_eq!(pdf.matches(" 0 obj\n").count(), 5);
        assert!(pdf.contains("/BaseFont /Times-Italic"));
        assert!(pdf.contains("(G) Tj"));
        assert_eq!(pdf.matches(" c f\n").count(), 2);
        assert_eq!(pdf.matches(" l S\n").count(), 1);
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let pdf = String::from_utf8(render_pdf(&sample_canvas())).unwrap();
        let xref_at: usize = pdf
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|line| line.parse().ok())
            .unwrap();
        assert!(pdf[xref_at..].starts_with("xref\n"));
        let entries: Vec<usize> = pdf[xref_at..]
            .lines()
            .skip(3)
            .take(5)
            .map(|line| line[..10].parse().unwrap())
            .collect();
        for (idx, offset) in entries.iter().enumerate() {
            assert!(pdf[*offset..].starts_with(&format!("{} 0 obj", idx + 1)));
        }
    }
}
