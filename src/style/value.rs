//! Typed style properties and their values.

use std::fmt;
use std::str::FromStr;

use csscolorparser::Color as CssColor;
use serde::{Serialize, Serializer};

/// Property names understood by the host's native primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleKey {
    FontWeight,
    FontSize,
    FontStyle,
    FontFamily,
    Color,
    BackgroundColor,
    BorderRadius,
    BorderLeftWidth,
    BorderLeftColor,
    MarginVertical,
    MarginHorizontal,
    PaddingVertical,
    PaddingHorizontal,
    TextDecorationLine,
    TextDecorationStyle,
    TextAlign,
    LineHeight,
    Width,
    Height,
}

/// The semantic type a [`StyleKey`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Dimension,
    Color,
    FontWeight,
    FontStyle,
    FontFamily,
    TextDecorationLine,
    TextDecorationStyle,
    TextAlign,
}

impl StyleKey {
    pub const ALL: [StyleKey; 19] = [
        StyleKey::FontWeight,
        StyleKey::FontSize,
        StyleKey::FontStyle,
        StyleKey::FontFamily,
        StyleKey::Color,
        StyleKey::BackgroundColor,
        StyleKey::BorderRadius,
        StyleKey::BorderLeftWidth,
        StyleKey::BorderLeftColor,
        StyleKey::MarginVertical,
        StyleKey::MarginHorizontal,
        StyleKey::PaddingVertical,
        StyleKey::PaddingHorizontal,
        StyleKey::TextDecorationLine,
        StyleKey::TextDecorationStyle,
        StyleKey::TextAlign,
        StyleKey::LineHeight,
        StyleKey::Width,
        StyleKey::Height,
    ];

    /// camelCase property name as used in style sheets.
    pub fn name(self) -> &'static str {
        match self {
            StyleKey::FontWeight => "fontWeight",
            StyleKey::FontSize => "fontSize",
            StyleKey::FontStyle => "fontStyle",
            StyleKey::FontFamily => "fontFamily",
            StyleKey::Color => "color",
            StyleKey::BackgroundColor => "backgroundColor",
            StyleKey::BorderRadius => "borderRadius",
            StyleKey::BorderLeftWidth => "borderLeftWidth",
            StyleKey::BorderLeftColor => "borderLeftColor",
            StyleKey::MarginVertical => "marginVertical",
            StyleKey::MarginHorizontal => "marginHorizontal",
            StyleKey::PaddingVertical => "paddingVertical",
            StyleKey::PaddingHorizontal => "paddingHorizontal",
            StyleKey::TextDecorationLine => "textDecorationLine",
            StyleKey::TextDecorationStyle => "textDecorationStyle",
            StyleKey::TextAlign => "textAlign",
            StyleKey::LineHeight => "lineHeight",
            StyleKey::Width => "width",
            StyleKey::Height => "height",
        }
    }

    pub fn kind(self) -> ValueKind {
        match self {
            StyleKey::FontWeight => ValueKind::FontWeight,
            StyleKey::FontStyle => ValueKind::FontStyle,
            StyleKey::FontFamily => ValueKind::FontFamily,
            StyleKey::Color | StyleKey::BackgroundColor | StyleKey::BorderLeftColor => {
                ValueKind::Color
            }
            StyleKey::TextDecorationLine => ValueKind::TextDecorationLine,
            StyleKey::TextDecorationStyle => ValueKind::TextDecorationStyle,
            StyleKey::TextAlign => ValueKind::TextAlign,
            StyleKey::FontSize
            | StyleKey::BorderRadius
            | StyleKey::BorderLeftWidth
            | StyleKey::MarginVertical
            | StyleKey::MarginHorizontal
            | StyleKey::PaddingVertical
            | StyleKey::PaddingHorizontal
            | StyleKey::LineHeight
            | StyleKey::Width
            | StyleKey::Height => ValueKind::Dimension,
        }
    }
}

impl FromStr for StyleKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StyleKey::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("unknown style property '{}'", s))
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for StyleKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// Keyword-valued properties share the same parse/print shape.
macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("invalid {} '{}'", stringify!($name), other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

keyword_enum!(
    /// `fontWeight` values.
    FontWeight {
        Normal => "normal",
        Bold => "bold",
        W100 => "100",
        W200 => "200",
        W300 => "300",
        W400 => "400",
        W500 => "500",
        W600 => "600",
        W700 => "700",
        W800 => "800",
        W900 => "900",
    }
);

keyword_enum!(FontStyle {
    Normal => "normal",
    Italic => "italic",
});

keyword_enum!(
    /// `textDecorationLine` values.
    TextDecorationLine {
        None => "none",
        Underline => "underline",
        LineThrough => "line-through",
        UnderlineLineThrough => "underline line-through",
    }
);

keyword_enum!(TextDecorationStyle {
    Solid => "solid",
    Double => "double",
    Dotted => "dotted",
    Dashed => "dashed",
});

keyword_enum!(TextAlign {
    Auto => "auto",
    Left => "left",
    Right => "right",
    Center => "center",
    Justify => "justify",
});

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    /// `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

impl FromStr for Color {
    type Err = String;

    /// Accepts anything CSS accepts: names, hex, `rgb()`, `hsl()`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let c = CssColor::from_str(s.trim()).map_err(|e| format!("invalid color '{}': {}", s, e))?;
        Ok(Color {
            r: channel(c.r),
            g: channel(c.g),
            b: channel(c.b),
            a: channel(c.a),
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A single resolved property value.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Dimension(f32),
    Color(Color),
    FontWeight(FontWeight),
    FontStyle(FontStyle),
    FontFamily(String),
    TextDecorationLine(TextDecorationLine),
    TextDecorationStyle(TextDecorationStyle),
    TextAlign(TextAlign),
}

impl StyleValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            StyleValue::Dimension(_) => ValueKind::Dimension,
            StyleValue::Color(_) => ValueKind::Color,
            StyleValue::FontWeight(_) => ValueKind::FontWeight,
            StyleValue::FontStyle(_) => ValueKind::FontStyle,
            StyleValue::FontFamily(_) => ValueKind::FontFamily,
            StyleValue::TextDecorationLine(_) => ValueKind::TextDecorationLine,
            StyleValue::TextDecorationStyle(_) => ValueKind::TextDecorationStyle,
            StyleValue::TextAlign(_) => ValueKind::TextAlign,
        }
    }

    pub fn as_dimension(&self) -> Option<f32> {
        match self {
            StyleValue::Dimension(v) => Some(*v),
            _ => None,
        }
    }

    /// Interpret a JSON value according to the semantic type of `key`.
    ///
    /// Dimensions must be finite numbers. Font weights may be given either as
    /// a keyword or as a bare number (`500`).
    pub fn from_json(key: StyleKey, value: &serde_json::Value) -> Result<Self, String> {
        use serde_json::Value;

        let text = |v: &Value| -> Result<String, String> {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| format!("'{}' expects a string, got {}", key, v))
        };

        match key.kind() {
            ValueKind::Dimension => match value.as_f64() {
                Some(n) if n.is_finite() => Ok(StyleValue::Dimension(n as f32)),
                _ => Err(format!("'{}' expects a number, got {}", key, value)),
            },
            ValueKind::Color => Ok(StyleValue::Color(text(value)?.parse()?)),
            ValueKind::FontWeight => {
                let raw = match value {
                    Value::Number(n) => n.to_string(),
                    other => text(other)?,
                };
                Ok(StyleValue::FontWeight(raw.parse()?))
            }
            ValueKind::FontStyle => Ok(StyleValue::FontStyle(text(value)?.parse()?)),
            ValueKind::FontFamily => Ok(StyleValue::FontFamily(text(value)?)),
            ValueKind::TextDecorationLine => {
                Ok(StyleValue::TextDecorationLine(text(value)?.parse()?))
            }
            ValueKind::TextDecorationStyle => {
                Ok(StyleValue::TextDecorationStyle(text(value)?.parse()?))
            }
            ValueKind::TextAlign => Ok(StyleValue::TextAlign(text(value)?.parse()?)),
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Dimension(v) => write!(f, "{}", v),
            StyleValue::Color(c) => write!(f, "{}", c),
            StyleValue::FontWeight(w) => write!(f, "{}", w),
            StyleValue::FontStyle(s) => write!(f, "{}", s),
            StyleValue::FontFamily(name) => f.write_str(name),
            StyleValue::TextDecorationLine(l) => write!(f, "{}", l),
            StyleValue::TextDecorationStyle(s) => write!(f, "{}", s),
            StyleValue::TextAlign(a) => write!(f, "{}", a),
        }
    }
}

impl Serialize for StyleValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StyleValue::Dimension(v) => serializer.serialize_f32(*v),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl From<f32> for StyleValue {
    fn from(v: f32) -> Self {
        StyleValue::Dimension(v)
    }
}

impl From<Color> for StyleValue {
    fn from(c: Color) -> Self {
        StyleValue::Color(c)
    }
}

impl From<FontWeight> for StyleValue {
    fn from(w: FontWeight) -> Self {
        StyleValue::FontWeight(w)
    }
}

impl From<FontStyle> for StyleValue {
    fn from(s: FontStyle) -> Self {
        StyleValue::FontStyle(s)
    }
}

impl From<TextDecorationLine> for StyleValue {
    fn from(l: TextDecorationLine) -> Self {
        StyleValue::TextDecorationLine(l)
    }
}

impl From<TextDecorationStyle> for StyleValue {
    fn from(s: TextDecorationStyle) -> Self {
        StyleValue::TextDecorationStyle(s)
    }
}

impl From<TextAlign> for StyleValue {
    fn from(a: TextAlign) -> Self {
        StyleValue::TextAlign(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn style_key_names_parse_back() {
        for key in StyleKey::ALL {
            assert_eq!(key.name().parse::<StyleKey>().unwrap(), key);
        }
        assert!("float".parse::<StyleKey>().is_err());
    }

    #[test]
    fn colors_normalize_to_hex() {
        assert_eq!("red".parse::<Color>().unwrap().to_hex(), "#ff0000");
        assert_eq!("#007AFF".parse::<Color>().unwrap(), Color::rgb(0, 122, 255));
        assert_eq!(
            "rgba(0, 0, 0, 0.5)".parse::<Color>().unwrap().to_hex(),
            "#00000080"
        );
        assert!("not-a-color".parse::<Color>().is_err());
    }

    #[test]
    fn font_weight_accepts_numbers_and_keywords() {
        let w = StyleValue::from_json(StyleKey::FontWeight, &json!(500)).unwrap();
        assert_eq!(w, StyleValue::FontWeight(FontWeight::W500));
        let w = StyleValue::from_json(StyleKey::FontWeight, &json!("bold")).unwrap();
        assert_eq!(w, StyleValue::FontWeight(FontWeight::Bold));
        assert!(StyleValue::from_json(StyleKey::FontWeight, &json!("heavy")).is_err());
    }

    #[test]
    fn dimension_rejects_strings() {
        assert!(StyleValue::from_json(StyleKey::FontSize, &json!("12px")).is_err());
        let v = StyleValue::from_json(StyleKey::FontSize, &json!(12.5)).unwrap();
        assert_eq!(v.as_dimension(), Some(12.5));
    }

    #[test]
    fn display_matches_sheet_syntax() {
        assert_eq!(StyleValue::Dimension(36.0).to_string(), "36");
        assert_eq!(
            StyleValue::TextDecorationLine(TextDecorationLine::LineThrough).to_string(),
            "line-through"
        );
    }
}
