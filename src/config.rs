use crate::color::Color;
use crate::style::DrawStyle;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StyleFile {
    theme: Option<String>,
    fig_size: Option<(f64, f64)>,
    font_size: Option<f64>,
    marker_size: Option<f64>,
    line_width: Option<f64>,
    font_family: Option<String>,
    vertex_color: Option<Color>,
    edge_color: Option<Color>,
    text_color: Option<Color>,
    margin: Option<f64>,
}

impl StyleFile {
    /// Applies the overrides on top of `base`; a `theme` entry replaces the base first.
    pub(crate) fn apply(self, base: DrawStyle) -> DrawStyle {
        let mut style = match self.theme.as_deref() {
            Some("modern") => DrawStyle::modern(),
            Some("classic") | Some("default") => DrawStyle::classic(),
            Some(other) => {
                log::warn!("unknown style theme {other:?}, keeping the current style");
                base
            }
            None => base,
        };
        if let Some(v) = self.fig_size {
            style.fig_size = v;
        }
        if let Some(v) = self.font_size {
            style.font_size = v;
        }
        if let Some(v) = self.marker_size {
            style.marker_size = v;
        }
        if let Some(v) = self.line_width {
            style.line_width = v;
        }
        if let Some(v) = self.font_family {
            style.font_family = v;
        }
        if let Some(v) = self.vertex_color {
            style.vertex_color = v;
        }
        if let Some(v) = self.edge_color {
            style.edge_color = v;
        }
        if let Some(v) = self.text_color {
            style.text_color = v;
        }
        if let Some(v) = self.margin {
            style.margin = v;
        }
        style
    }
}

/// Parses a style document. JSON5 is accepted, which covers plain JSON too.
pub fn parse_style(contents: &str) -> anyhow::Result<DrawStyle> {
    let parsed: StyleFile = json5::from_str(contents)?;
    Ok(parsed.apply(DrawStyle::default()))
}

/// Loads a style file, or the default style when no path is given.
pub fn load_style(path: Option<&Path>) -> anyhow::Result<DrawStyle> {
    let Some(path) = path else {
        return Ok(DrawStyle::default());
    };

    let contents = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        let parsed: StyleFile = serde_json::from_str(&contents)?;
        return Ok(parsed.apply(DrawStyle::default()));
    }
    parse_style(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_path_gives_default_style() {
        assert_eq!(load_style(None).unwrap(), DrawStyle::classic());
    }

    #[test]
    fn json5_overrides_apply_over_theme() {
        let style = parse_style(
            r##"{
                // comments are fine in json5
                theme: "modern",
                figSize: [4, 3],
                markerSize: 12,
                vertexColor: "#ff0000",
            }"##,
        )
        .unwrap();
        assert_eq!(style.fig_size, (4.0, 3.0));
        assert_eq!(style.marker_size, 12.0);
        assert_eq!(style.vertex_color, Color::RED);
        assert_eq!(style.font_size, DrawStyle::modern().font_size);
    }

    #[test]
    fn loads_plain_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"fontSize": 11, "edgeColor": "b"}}"#).unwrap();
        let style = load_style(Some(file.path())).unwrap();
        assert_eq!(style.font_size, 11.0);
        assert_eq!(style.edge_color, Color::BLUE);
    }

    #[test]
    fn bad_color_is_an_error() {
        assert!(parse_style(r#"{ textColor: "not-a-color" }"#).is_err());
    }
}
