use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

/// Advance used per character when no font can be found, as a fraction of the font size.
const FALLBACK_ADVANCE: f64 = 0.56;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Width of `text` in points, measured with the first installed family of
/// `font_family` (a CSS-style list). Falls back to an average advance when
/// no font is available, so the result is always usable for cropping.
pub fn measure_text_width(text: &str, font_size: f64, font_family: &str) -> f64 {
    if text.is_empty() || font_size <= 0.0 {
        return 0.0;
    }
    let measured = TEXT_MEASURER
        .lock()
        .ok()
        .and_then(|mut guard| guard.measure(text, font_size, font_family));
    measured.unwrap_or_else(|| estimate_width(text, font_size))
}

pub fn estimate_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * FALLBACK_ADVANCE
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f64, font_family: &str) -> Option<f64> {
        let key = font_family.trim().to_string();
        if !self.cache.contains_key(&key) {
            let face = self.load_face(font_family);
            if face.is_none() {
                log::debug!("no installed font for {font_family:?}, estimating text widths");
            }
            self.cache.insert(key.clone(), face);
        }
        self.cache.get(&key)?.as_ref()?.measure_width(text, font_size)
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        enum Token {
            Generic(Family<'static>),
            Name(String),
        }

        let mut tokens = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            tokens.push(match raw.to_ascii_lowercase().as_str() {
                "serif" => Token::Generic(Family::Serif),
                "sans-serif" | "system-ui" | "-apple-system" => Token::Generic(Family::SansSerif),
                "monospace" => Token::Generic(Family::Monospace),
                _ => Token::Name(raw.to_string()),
            });
        }

        let mut families: Vec<Family<'_>> = Vec::with_capacity(tokens.len());
        for token in &tokens {
            match token {
                Token::Generic(family) => families.push(*family),
                Token::Name(name) => families.push(Family::Name(name.as_str())),
            }
        }
        if families.is_empty() {
            families.push(Family::Serif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Italic,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::new(data.to_vec(), index))
            .flatten()
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: f64,
    ascii_advances: [u16; 128],
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        let units_per_em = f64::from(face.units_per_em().max(1));
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
        })
    }

    fn measure_width(&self, text: &str, font_size: f64) -> Option<f64> {
        let scale = font_size / self.units_per_em;
        let fallback = font_size * FALLBACK_ADVANCE;
        let advance_of = |units: u16| {
            if units == 0 {
                fallback
            } else {
                f64::from(units) * scale
            }
        };

        if text.is_ascii() {
            return Some(
                text.bytes()
                    .map(|byte| advance_of(self.ascii_advances[byte as usize]))
                    .sum(),
            );
        }

        let face = Face::parse(&self.data, self.index).ok()?;
        Some(
            text.chars()
                .map(|ch| {
                    let units = face
                        .glyph_index(ch)
                        .and_then(|glyph| face.glyph_hor_advance(glyph))
                        .unwrap_or(0);
                    advance_of(units)
                })
                .sum(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_width() {
        assert_eq!(measure_text_width("", 12.0, "serif"), 0.0);
        assert_eq!(measure_text_width("abc", 0.0, "serif"), 0.0);
    }

    #[test]
    fn width_grows_with_text_and_size() {
        let short = measure_text_width("v", 20.0, "serif");
        let long = measure_text_width("vvvvvv", 20.0, "serif");
        let bigger = measure_text_width("vvvvvv", 40.0, "serif");
        assert!(short > 0.0);
        assert!(long > short);
        assert!(bigger > long);
    }

    #[test]
    fn estimate_is_proportional_to_char_count() {
        assert!((estimate_width("abcd", 10.0) - 22.4).abs() < 1e-9);
    }
}
