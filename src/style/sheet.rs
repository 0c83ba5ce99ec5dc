//! Per-tag style sheets: the built-in defaults, caller overrides, and the
//! external sheet of layout-only virtual properties.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::value::{
    Color, FontStyle, FontWeight, StyleKey, StyleValue, TextDecorationLine, TextDecorationStyle,
};
use super::Style;
use crate::{Error, Result};

/// Tag name -> style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleSheet {
    rules: BTreeMap<String, Style>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tag: &str, style: Style) -> Self {
        self.insert(tag, style);
        self
    }

    /// Replace the rule for `tag`. Tag names are matched case-insensitively.
    pub fn insert(&mut self, tag: &str, style: Style) -> Option<Style> {
        self.rules.insert(tag.to_ascii_lowercase(), style)
    }

    pub fn get(&self, tag: &str) -> Option<&Style> {
        self.rules.get(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let sheet: StyleSheet =
            serde_json::from_str(json).map_err(|e| Error::StyleError(e.to_string()))?;
        Ok(sheet.normalized())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The built-in default sheet.
    pub fn builtin() -> &'static StyleSheet {
        static BUILTIN: OnceLock<StyleSheet> = OnceLock::new();
        BUILTIN.get_or_init(builtin_styles)
    }

    /// `builtin[tag]` merged with `self[tag]`; unknown tags resolve to an
    /// empty style.
    pub fn resolve(&self, tag: &str) -> Style {
        let base = Self::builtin().get(tag).cloned().unwrap_or_default();
        match self.get(tag) {
            Some(over) => base.merge(over),
            None => base,
        }
    }

    fn normalized(self) -> Self {
        let mut out = StyleSheet::new();
        for (tag, style) in self.rules {
            out.insert(&tag, style);
        }
        out
    }
}

/// Largest `textIndent` accepted from a sheet; larger values are clamped
/// when the indent is rendered.
pub const MAX_TEXT_INDENT: u32 = 256;

/// Layout-affecting virtual properties that have no direct primitive style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExternalStyle {
    /// Number of leading space characters emulating `text-indent`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_indent: Option<u32>,
}

impl ExternalStyle {
    pub fn text_indent(n: u32) -> Self {
        ExternalStyle {
            text_indent: Some(n),
        }
    }

    pub fn merge(&self, over: &ExternalStyle) -> ExternalStyle {
        ExternalStyle {
            text_indent: over.text_indent.or(self.text_indent),
        }
    }

    pub fn indent(&self) -> u32 {
        self.text_indent.unwrap_or(0).min(MAX_TEXT_INDENT)
    }
}

/// Tag name -> external style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalStyleSheet {
    rules: BTreeMap<String, ExternalStyle>,
}

impl ExternalStyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tag: &str, style: ExternalStyle) -> Self {
        self.rules.insert(tag.to_ascii_lowercase(), style);
        self
    }

    pub fn get(&self, tag: &str) -> Option<&ExternalStyle> {
        self.rules.get(tag)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let sheet: ExternalStyleSheet =
            serde_json::from_str(json).map_err(|e| Error::StyleError(e.to_string()))?;
        let mut out = ExternalStyleSheet::new();
        for (tag, style) in sheet.rules {
            if let Some(n) = style.text_indent.filter(|n| *n > MAX_TEXT_INDENT) {
                return Err(Error::StyleError(format!(
                    "textIndent {} for '{}' exceeds {}",
                    n, tag, MAX_TEXT_INDENT
                )));
            }
            out = out.with(&tag, style);
        }
        Ok(out)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn builtin() -> &'static ExternalStyleSheet {
        static BUILTIN: OnceLock<ExternalStyleSheet> = OnceLock::new();
        BUILTIN.get_or_init(|| ExternalStyleSheet::new().with("p", ExternalStyle::text_indent(0)))
    }

    pub fn resolve(&self, tag: &str) -> ExternalStyle {
        let base = Self::builtin().get(tag).copied().unwrap_or_default();
        match self.get(tag) {
            Some(over) => base.merge(over),
            None => base,
        }
    }
}

fn heading(size: f32, margin: f32) -> Style {
    Style::new()
        .with(StyleKey::FontWeight, FontWeight::W500)
        .with(StyleKey::FontSize, size)
        .with(StyleKey::MarginVertical, margin)
}

fn decoration(line: TextDecorationLine) -> Style {
    Style::new()
        .with(StyleKey::TextDecorationLine, line)
        .with(StyleKey::TextDecorationStyle, TextDecorationStyle::Solid)
}

fn builtin_styles() -> StyleSheet {
    let bold = Style::new().with(StyleKey::FontWeight, FontWeight::Bold);
    let italic = Style::new().with(StyleKey::FontStyle, FontStyle::Italic);

    StyleSheet::new()
        .with("h1", heading(36.0, 5.0))
        .with("h2", heading(30.0, 5.0))
        .with("h3", heading(24.0, 5.0))
        .with("h4", heading(18.0, 5.0))
        .with("h5", heading(14.0, 5.0))
        .with("h6", heading(12.0, 10.0))
        .with(
            "a",
            Style::new()
                .with(StyleKey::Color, Color::rgb(0x00, 0x7a, 0xff))
                .with(StyleKey::FontWeight, FontWeight::W500),
        )
        .with("b", bold.clone())
        .with("strong", bold)
        .with("i", italic.clone())
        .with("em", italic)
        .with("big", Style::new().with(StyleKey::FontSize, 16.0))
        .with("small", Style::new().with(StyleKey::FontSize, 10.0))
        .with("u", decoration(TextDecorationLine::Underline))
        .with("ins", decoration(TextDecorationLine::Underline))
        .with("del", decoration(TextDecorationLine::LineThrough))
        .with("s", decoration(TextDecorationLine::LineThrough))
        .with("strike", decoration(TextDecorationLine::LineThrough))
        .with(
            "mark",
            Style::new()
                .with(StyleKey::BackgroundColor, Color::rgb(0xfc, 0xf8, 0xe3))
                .with(StyleKey::BorderRadius, 3.0),
        )
        .with(
            "code",
            Style::new()
                .with(StyleKey::FontFamily, StyleValue::FontFamily("Menlo".to_string()))
                .with(StyleKey::Color, Color::rgb(0xc9, 0x31, 0x4e))
                .with(StyleKey::BackgroundColor, Color::rgb(0xfa, 0xf3, 0xf4))
                .with(StyleKey::BorderRadius, 3.0),
        )
        .with(
            "blockquote",
            Style::new()
                .with(StyleKey::BorderLeftWidth, 5.0)
                .with(StyleKey::BorderLeftColor, Color::rgb(0xee, 0xee, 0xee))
                .with(StyleKey::PaddingVertical, 5.0)
                .with(StyleKey::PaddingHorizontal, 10.0),
        )
        .with("p", Style::new().with(StyleKey::MarginVertical, 5.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_heading_matches_defaults() {
        let h1 = StyleSheet::new().resolve("h1");
        assert_eq!(h1.dimension(StyleKey::FontSize), Some(36.0));
        assert_eq!(h1.dimension(StyleKey::MarginVertical), Some(5.0));
        assert_eq!(
            h1.get(StyleKey::FontWeight),
            Some(&StyleValue::FontWeight(FontWeight::W500))
        );
        assert_eq!(StyleSheet::new().resolve("h6").dimension(StyleKey::MarginVertical), Some(10.0));
    }

    #[test]
    fn unknown_tag_resolves_empty() {
        assert!(StyleSheet::new().resolve("article").is_empty());
    }

    #[test]
    fn override_merges_over_builtin() {
        let sheet = StyleSheet::from_json_str(r#"{"B": {"color": "red"}}"#).unwrap();
        let b = sheet.resolve("b");
        assert_eq!(b.len(), 2);
        assert_eq!(b.get(StyleKey::Color), Some(&StyleValue::Color(Color::rgb(255, 0, 0))));

        let sheet = StyleSheet::from_json_str(r#"{"b": {"fontWeight": "normal"}}"#).unwrap();
        assert_eq!(
            sheet.resolve("b").get(StyleKey::FontWeight),
            Some(&StyleValue::FontWeight(FontWeight::Normal))
        );
    }

    #[test]
    fn bad_sheet_is_a_style_error() {
        let err = StyleSheet::from_json_str(r#"{"p": {"color": 12}}"#).unwrap_err();
        assert!(matches!(err, Error::StyleError(_)));
        let err = ExternalStyleSheet::from_json_str(r#"{"p": {"textIndent": -1}}"#).unwrap_err();
        assert!(matches!(err, Error::StyleError(_)));
    }

    #[test]
    fn external_indent_defaults_to_zero_for_p() {
        let sheet = ExternalStyleSheet::new();
        assert_eq!(sheet.resolve("p").text_indent, Some(0));
        assert_eq!(sheet.resolve("div").text_indent, None);

        let sheet = ExternalStyleSheet::from_json_str(r#"{"p": {"textIndent": 2}}"#).unwrap();
        assert_eq!(sheet.resolve("p").indent(), 2);
    }

    #[test]
    fn oversized_text_indent_is_rejected_on_load() {
        let err = ExternalStyleSheet::from_json_str(r#"{"p": {"textIndent": 4000000000}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::StyleError(_)));
        assert!(ExternalStyleSheet::from_json_str(r#"{"p": {"textIndent": 256}}"#).is_ok());
    }

    #[test]
    fn programmatic_text_indent_is_clamped() {
        assert_eq!(ExternalStyle::text_indent(u32::MAX).indent(), MAX_TEXT_INDENT);
    }
}
