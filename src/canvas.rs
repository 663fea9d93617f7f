//! Backend-neutral drawing surface.
//!
//! Primitives are stored in data coordinates (y up). Exporters never see
//! data coordinates: [`Canvas::paint`] maps everything to page space (points,
//! y down, tightly cropped) and hands the result to a [`Painter`].

use crate::color::Color;
use crate::graph::Point;
use crate::style::DrawStyle;
use crate::text_metrics::measure_text_width;

/// Subscript size relative to the base text.
const SUBSCRIPT_SCALE: f64 = 0.7;
/// Ascent and descent as fractions of the font size.
const ASCENT: f64 = 0.75;
const DESCENT: f64 = 0.25;
/// How far a subscript baseline sits below the base baseline, in base font sizes.
const SUBSCRIPT_DROP: f64 = 0.22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Baseline,
    Bottom,
}

/// Text of a label: a base string with an optional subscript, as in `v_3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelText {
    pub base: String,
    pub subscript: Option<String>,
}

impl LabelText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            base: text.into(),
            subscript: None,
        }
    }

    pub fn indexed(base: impl Into<String>, subscript: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            subscript: Some(subscript.into()),
        }
    }

    /// Splits `C_4` or `K_{3,3}` at the first underscore into base and subscript.
    pub fn parse(text: &str) -> Self {
        let Some((base, sub)) = text.split_once('_') else {
            return Self::plain(text);
        };
        let sub = sub
            .strip_prefix('{')
            .and_then(|inner| inner.strip_suffix('}'))
            .unwrap_or(sub);
        if base.is_empty() || sub.is_empty() {
            return Self::plain(text);
        }
        Self::indexed(base, sub)
    }
}

impl std::fmt::Display for LabelText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.subscript {
            Some(sub) => write!(f, "{}_{}", self.base, sub),
            None => f.write_str(&self.base),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Filled dots of the given diameter (points).
    Points {
        points: Vec<Point>,
        color: Color,
        diameter: f64,
    },
    /// A straight segment; `end_markers` draws dots of that diameter on both ends.
    Segment {
        from: Point,
        to: Point,
        color: Color,
        width: f64,
        end_markers: Option<f64>,
    },
    Text {
        anchor: Point,
        text: LabelText,
        font_size: f64,
        color: Color,
        h_align: HAlign,
        v_align: VAlign,
    },
}

/// Page framing. The canvas never paints axes, spines or ticks; the frame
/// only decides how data units map to the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    pub equal_aspect: bool,
}

impl Frame {
    /// Equal scaling on both axes.
    pub fn illustration() -> Self {
        Self { equal_aspect: true }
    }
}

/// A text run resolved to page space: left edge and baseline are final.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun<'a> {
    pub x: f64,
    pub baseline: f64,
    pub base: &'a str,
    pub font_size: f64,
    pub subscript: Option<SubscriptRun<'a>>,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptRun<'a> {
    pub x: f64,
    pub baseline: f64,
    pub text: &'a str,
    pub font_size: f64,
}

/// Output backend fed by [`Canvas::paint`]. Coordinates are page points, y down.
pub trait Painter {
    fn begin(&mut self, width: f64, height: f64, font_family: &str);

    fn dots(&mut self, centers: &[(f64, f64)], diameter: f64, color: Color);

    fn line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Color);

    fn text(&mut self, run: &TextRun<'_>);

    fn finish(&mut self);
}

#[derive(Debug, Clone)]
pub struct Canvas {
    page_size: (f64, f64),
    margin: f64,
    font_family: String,
    frame: Frame,
    primitives: Vec<Primitive>,
}

impl Canvas {
    pub fn new(style: &DrawStyle) -> Self {
        Self {
            page_size: style.page_size(),
            margin: style.margin.max(0.0),
            font_family: style.font_family.clone(),
            frame: Frame::default(),
            primitives: Vec::new(),
        }
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn segments(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Segment { .. }))
    }

    pub fn point_sets(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Points { .. }))
    }

    pub fn texts(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Text { .. }))
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Computes the data-to-page mapping, including the tight crop.
    pub fn layout(&self) -> PageLayout {
        let (min, max) = self.data_bounds();
        let (min, max) = pad_range(min, max, self.margin);
        let span_x = max.x - min.x;
        let span_y = max.y - min.y;
        let (page_w, page_h) = self.page_size;
        let (scale_x, scale_y) = if self.frame.equal_aspect {
            let scale = (page_w / span_x).min(page_h / span_y);
            (scale, scale)
        } else {
            (page_w / span_x, page_h / span_y)
        };
        // Center the data on the page before cropping.
        let mut layout = PageLayout {
            min,
            max,
            scale_x,
            scale_y,
            offset_x: (page_w - span_x * scale_x) / 2.0,
            offset_y: (page_h - span_y * scale_y) / 2.0,
            width: page_w,
            height: page_h,
        };

        let mut ink = Extent::empty();
        for primitive in &self.primitives {
            self.ink_extent(primitive, &layout, &mut ink);
        }
        if ink.is_empty() {
            return layout;
        }
        layout.offset_x -= ink.min_x;
        layout.offset_y -= ink.min_y;
        layout.width = (ink.max_x - ink.min_x).max(1.0);
        layout.height = (ink.max_y - ink.min_y).max(1.0);
        layout
    }

    /// Feeds every primitive, mapped to page space, to `painter`.
    pub fn paint<P: Painter>(&self, painter: &mut P) {
        let layout = self.layout();
        painter.begin(layout.width, layout.height, &self.font_family);
        for primitive in &self.primitives {
            match primitive {
                Primitive::Points {
                    points,
                    color,
                    diameter,
                } => {
                    let centers: Vec<(f64, f64)> =
                        points.iter().map(|p| layout.to_page(*p)).collect();
                    painter.dots(&centers, *diameter, *color);
                }
                Primitive::Segment {
                    from,
                    to,
                    color,
                    width,
                    end_markers,
                } => {
                    let from = layout.to_page(*from);
                    let to = layout.to_page(*to);
                    painter.line(from, to, *width, *color);
                    if let Some(diameter) = end_markers {
                        painter.dots(&[from, to], *diameter, *color);
                    }
                }
                Primitive::Text { .. } => {
                    if let Some(run) = self.text_run(primitive, &layout) {
                        painter.text(&run);
                    }
                }
            }
        }
        painter.finish();
    }

    fn data_bounds(&self) -> (Point, Point) {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        let mut include = |p: &Point| {
            if p.x.is_finite() && p.y.is_finite() {
                min.x = min.x.min(p.x);
                min.y = min.y.min(p.y);
                max.x = max.x.max(p.x);
                max.y = max.y.max(p.y);
            }
        };
        for primitive in &self.primitives {
            match primitive {
                Primitive::Points { points, .. } => points.iter().for_each(&mut include),
                Primitive::Segment { from, to, .. } => {
                    include(from);
                    include(to);
                }
                Primitive::Text { anchor, .. } => include(anchor),
            }
        }
        if min.x > max.x {
            return (Point::ORIGIN, Point::ORIGIN);
        }
        (min, max)
    }

    fn ink_extent(&self, primitive: &Primitive, layout: &PageLayout, ink: &mut Extent) {
        match primitive {
            Primitive::Points {
                points, diameter, ..
            } => {
                for p in points {
                    ink.include_disc(layout.to_page(*p), diameter / 2.0);
                }
            }
            Primitive::Segment {
                from,
                to,
                width,
                end_markers,
                ..
            } => {
                let pad = end_markers.unwrap_or(0.0).max(*width) / 2.0;
                ink.include_disc(layout.to_page(*from), pad);
                ink.include_disc(layout.to_page(*to), pad);
            }
            Primitive::Text { .. } => {
                if let Some(run) = self.text_run(primitive, layout) {
                    let right = run
                        .subscript
                        .as_ref()
                        .map(|sub| sub.x + measure_text_width(sub.text, sub.font_size, &self.font_family))
                        .unwrap_or_else(|| {
                            run.x + measure_text_width(run.base, run.font_size, &self.font_family)
                        });
                    let bottom = run
                        .subscript
                        .as_ref()
                        .map(|sub| sub.baseline + sub.font_size * DESCENT)
                        .unwrap_or(run.baseline + run.font_size * DESCENT);
                    ink.include(run.x, run.baseline - run.font_size * ASCENT);
                    ink.include(right, bottom);
                }
            }
        }
    }

    fn text_run<'a>(&self, primitive: &'a Primitive, layout: &PageLayout) -> Option<TextRun<'a>> {
        let Primitive::Text {
            anchor,
            text,
            font_size,
            color,
            h_align,
            v_align,
        } = primitive
        else {
            return None;
        };
        let (ax, ay) = layout.to_page(*anchor);
        let base_width = measure_text_width(&text.base, *font_size, &self.font_family);
        let sub_size = font_size * SUBSCRIPT_SCALE;
        let sub_width = text
            .subscript
            .as_deref()
            .map(|sub| measure_text_width(sub, sub_size, &self.font_family))
            .unwrap_or(0.0);
        let drop = if text.subscript.is_some() {
            font_size * SUBSCRIPT_DROP
        } else {
            0.0
        };
        let total_width = base_width + sub_width;

        let x = match h_align {
            HAlign::Left => ax,
            HAlign::Center => ax - total_width / 2.0,
            HAlign::Right => ax - total_width,
        };
        let ascent = font_size * ASCENT;
        let descent = font_size * DESCENT + drop;
        let baseline = match v_align {
            VAlign::Baseline => ay,
            VAlign::Top => ay + ascent,
            VAlign::Bottom => ay - descent,
            VAlign::Center => ay + (ascent - descent) / 2.0,
        };

        Some(TextRun {
            x,
            baseline,
            base: &text.base,
            font_size: *font_size,
            subscript: text.subscript.as_deref().map(|sub| SubscriptRun {
                x: x + base_width,
                baseline: baseline + drop,
                text: sub,
                font_size: sub_size,
            }),
            color: *color,
        })
    }
}

/// Maps data coordinates to cropped page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub min: Point,
    pub max: Point,
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Output size in points.
    pub width: f64,
    pub height: f64,
}

impl PageLayout {
    pub fn to_page(&self, p: Point) -> (f64, f64) {
        (
            self.offset_x + (p.x - self.min.x) * self.scale_x,
            self.offset_y + (self.max.y - p.y) * self.scale_y,
        )
    }
}

fn pad_range(min: Point, max: Point, margin: f64) -> (Point, Point) {
    let pad = |lo: f64, hi: f64| {
        let span = hi - lo;
        if span <= f64::EPSILON {
            (lo - 0.5, hi + 0.5)
        } else {
            (lo - span * margin, hi + span * margin)
        }
    };
    let (x0, x1) = pad(min.x, max.x);
    let (y0, y1) = pad(min.y, max.y);
    (Point::new(x0, y0), Point::new(x1, y1))
}

#[derive(Debug, Clone, Copy)]
struct Extent {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Extent {
    fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    fn include(&mut self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn include_disc(&mut self, (x, y): (f64, f64), radius: f64) {
        self.include(x - radius, y - radius);
        self.include(x + radius, y + radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> DrawStyle {
        DrawStyle {
            margin: 0.0,
            ..DrawStyle::with_fig_size(4.0, 2.0)
        }
    }

    fn dots(points: &[(f64, f64)], diameter: f64) -> Primitive {
        Primitive::Points {
            points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            color: Color::BLACK,
            diameter,
        }
    }

    #[test]
    fn parses_subscripted_labels() {
        assert_eq!(LabelText::parse("C_4"), LabelText::indexed("C", "4"));
        assert_eq!(LabelText::parse("K_{3,3}"), LabelText::indexed("K", "3,3"));
        assert_eq!(LabelText::parse("G"), LabelText::plain("G"));
        assert_eq!(LabelText::parse("_x"), LabelText::plain("_x"));
        assert_eq!(LabelText::indexed("v", "12").to_string(), "v_12");
    }

    #[test]
    fn equal_aspect_uses_one_scale() {
        let mut canvas = Canvas::new(&style());
        canvas.push(dots(&[(0.0, 0.0), (1.0, 1.0)], 0.0));
        canvas.set_frame(Frame::illustration());
        let layout = canvas.layout();
        // 288 x 144 points; the square data range is limited by the height.
        assert_eq!(layout.scale_x, layout.scale_y);
        assert!((layout.scale_x - 144.0).abs() < 1e-9);
        assert!((layout.width - 144.0).abs() < 1e-9);
        assert!((layout.height - 144.0).abs() < 1e-9);
    }

    #[test]
    fn free_aspect_stretches_to_the_page() {
        let mut canvas = Canvas::new(&style());
        canvas.push(dots(&[(0.0, 0.0), (1.0, 1.0)], 0.0));
        let layout = canvas.layout();
        assert!((layout.scale_x - 288.0).abs() < 1e-9);
        assert!((layout.scale_y - 144.0).abs() < 1e-9);
    }

    #[test]
    fn crop_is_tight_around_markers() {
        let mut canvas = Canvas::new(&style());
        canvas.push(dots(&[(0.0, 0.0), (1.0, 0.0)], 10.0));
        canvas.set_frame(Frame::illustration());
        let layout = canvas.layout();
        let (x0, y0) = layout.to_page(Point::new(0.0, 0.0));
        assert!((x0 - 5.0).abs() < 1e-9, "left dot edge touches the crop: {x0}");
        assert!((y0 - 5.0).abs() < 1e-9, "top dot edge touches the crop: {y0}");
        assert!((layout.height - 10.0).abs() < 1e-9);
    }

    #[test]
    fn page_space_flips_the_y_axis() {
        let mut canvas = Canvas::new(&style());
        canvas.push(dots(&[(0.0, 0.0), (0.0, 2.0)], 0.0));
        canvas.set_frame(Frame::illustration());
        let layout = canvas.layout();
        let (_, low) = layout.to_page(Point::new(0.0, 0.0));
        let (_, high) = layout.to_page(Point::new(0.0, 2.0));
        assert!(high < low);
    }

    #[test]
    fn single_point_gets_a_unit_range() {
        let mut canvas = Canvas::new(&style());
        canvas.push(dots(&[(3.0, 3.0)], 4.0));
        canvas.set_frame(Frame::illustration());
        let layout = canvas.layout();
        assert!(layout.scale_x.is_finite() && layout.scale_x > 0.0);
        assert!((layout.width - 4.0).abs() < 1e-9);
    }

    struct Recorder {
        size: (f64, f64),
        dots: usize,
        lines: usize,
        texts: Vec<String>,
        finished: bool,
    }

    impl Painter for Recorder {
        fn begin(&mut self, width: f64, height: f64, _font_family: &str) {
            self.size = (width, height);
        }

        fn dots(&mut self, centers: &[(f64, f64)], _diameter: f64, _color: Color) {
            self.dots += centers.len();
        }

        fn line(&mut self, _from: (f64, f64), _to: (f64, f64), _width: f64, _color: Color) {
            self.lines += 1;
        }

        fn text(&mut self, run: &TextRun<'_>) {
            let sub = run.subscript.as_ref().map(|s| s.text).unwrap_or("");
            self.texts.push(format!("{}|{}", run.base, sub));
        }

        fn finish(&mut self) {
            self.finished = true;
        }
    }

    #[test]
    fn paint_expands_segment_markers_into_dots() {
        let mut canvas = Canvas::new(&style());
        canvas.push(Primitive::Segment {
            from: Point::new(0.0, 0.0),
            to: Point::new(1.0, 1.0),
            color: Color::BLACK,
            width: 1.5,
            end_markers: Some(10.0),
        });
        canvas.push(Primitive::Text {
            anchor: Point::new(0.5, 0.5),
            text: LabelText::indexed("v", "1"),
            font_size: 12.0,
            color: Color::BLACK,
            h_align: HAlign::Center,
            v_align: VAlign::Center,
        });
        canvas.set_frame(Frame::illustration());
        let mut recorder = Recorder {
            size: (0.0, 0.0),
            dots: 0,
            lines: 0,
            texts: Vec::new(),
            finished: false,
        };
        canvas.paint(&mut recorder);
        assert_eq!(recorder.lines, 1);
        assert_eq!(recorder.dots, 2);
        assert_eq!(recorder.texts, vec!["v|1".to_string()]);
        assert!(recorder.finished);
        assert!(recorder.size.0 > 0.0 && recorder.size.1 > 0.0);
    }

    #[test]
    fn centered_text_straddles_its_anchor() {
        let mut canvas = Canvas::new(&style());
        canvas.push(dots(&[(0.0, 0.0), (1.0, 1.0)], 0.0));
        canvas.push(Primitive::Text {
            anchor: Point::new(0.5, 0.5),
            text: LabelText::plain("G"),
            font_size: 20.0,
            color: Color::BLACK,
            h_align: HAlign::Center,
            v_align: VAlign::Baseline,
        });
        canvas.set_frame(Frame::illustration());
        let layout = canvas.layout();
        let run = canvas.text_run(&canvas.primitives()[1], &layout).unwrap();
        let (ax, ay) = layout.to_page(Point::new(0.5, 0.5));
        assert!(run.x < ax);
        assert_eq!(run.baseline, ay);
    }

    #[test]
    fn painting_adds_no_axis_decoration() {
        for frame in [Frame::default(), Frame::illustration()] {
            let mut canvas = Canvas::new(&style());
            canvas.push(dots(&[(0.0, 0.0), (2.0, 1.0)], 4.0));
            canvas.set_frame(frame);
            let mut recorder = Recorder {
                size: (0.0, 0.0),
                dots: 0,
                lines: 0,
                texts: Vec::new(),
                finished: false,
            };
            canvas.paint(&mut recorder);
            assert_eq!(recorder.lines, 0);
            assert_eq!(recorder.dots, 2);
        }
    }
}
