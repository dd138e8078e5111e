//! Subjects that time blocks are tied to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TimetableError, TimetableResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub Uuid);

impl SubjectId {
    pub fn new() -> Self {
        SubjectId(Uuid::new_v4())
    }
}

impl Default for SubjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SubjectId {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(SubjectId)
            .map_err(|_| TimetableError::InvalidSubject(format!("Invalid subject id '{s}'")))
    }
}

/// A display color, always stored as `#RRGGBB` in upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Red, green and blue channels.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let channel = |i: usize| u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or(0);
        (channel(1), channel(3), channel(5))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color("#E5E7EB".to_string())
    }
}

impl FromStr for Color {
    type Err = TimetableError;

    /// Accepts `RRGGBB`, `#RRGGBB` and the `#RGB` shorthand.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TimetableError::InvalidSubject(format!("Invalid color '{s}'")));
        }

        let expanded = match hex.len() {
            6 => hex.to_string(),
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            _ => {
                return Err(TimetableError::InvalidSubject(format!(
                    "Invalid color '{s}'. Expected #RRGGBB"
                )));
            }
        };

        Ok(Color(format!("#{}", expanded.to_ascii_uppercase())))
    }
}

impl TryFrom<String> for Color {
    type Error = TimetableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub color: Color,
}

impl Subject {
    pub fn new(name: &str, color: Color) -> TimetableResult<Self> {
        Ok(Subject {
            id: SubjectId::new(),
            name: normalize_name(name)?,
            color,
        })
    }

    /// Apply a partial update.
    pub fn apply(&mut self, name: Option<&str>, color: Option<Color>) -> TimetableResult<()> {
        if let Some(name) = name {
            self.name = normalize_name(name)?;
        }
        if let Some(color) = color {
            self.color = color;
        }
        Ok(())
    }
}

fn normalize_name(name: &str) -> TimetableResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TimetableError::InvalidSubject("Subject name is empty".into()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_normalizes() {
        assert_eq!("#a1b2c3".parse::<Color>().unwrap().as_str(), "#A1B2C3");
        assert_eq!("a1b2c3".parse::<Color>().unwrap().as_str(), "#A1B2C3");
        assert_eq!("#abc".parse::<Color>().unwrap().as_str(), "#AABBCC");
    }

    #[test]
    fn color_rejects_bad_input() {
        for bad in ["", "#12345", "#1234567", "#GGGGGG", "blue"] {
            assert!(bad.parse::<Color>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn color_channels() {
        let color: Color = "#FF8000".parse().unwrap();
        assert_eq!(color.rgb(), (255, 128, 0));
    }

    #[test]
    fn color_deserialize_goes_through_validation() {
        let color: Color = serde_json::from_str("\"#0f0\"").unwrap();
        assert_eq!(color.as_str(), "#00FF00");
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }

    #[test]
    fn subject_name_is_trimmed_and_required() {
        let subject = Subject::new("  Math ", Color::default()).unwrap();
        assert_eq!(subject.name, "Math");
        assert!(Subject::new("   ", Color::default()).is_err());
    }

    #[test]
    fn partial_update_keeps_untouched_fields() {
        let mut subject = Subject::new("Math", "#112233".parse().unwrap()).unwrap();
        subject.apply(None, Some("#445566".parse().unwrap())).unwrap();
        assert_eq!(subject.name, "Math");
        assert_eq!(subject.color.as_str(), "#445566");
        assert!(subject.apply(Some(""), None).is_err());
        assert_eq!(subject.name, "Math");
    }
}
