//! Domain models shared by the store, the projector, and the TUI. These types
//! stay light-weight data holders; the serde attributes pin the persisted JSON
//! shape (`isComplete` in camel case, `cover` omitted when absent) so a stored
//! collection reads back field-for-field.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Text shown in place of a cover that has not been resolved.
pub const PLACEHOLDER_COVER: &str = "placeholder.png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A single entry on one of the two shelves.
pub struct Book {
    /// Time-derived identifier, unique within the collection.
    #[serde(deserialize_with = "lenient_id")]
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Publication year. `None` stands in for input that did not coerce to a
    /// number and round-trips through JSON as `null`.
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i64>,
    /// The only field that decides which shelf the book sits on.
    #[serde(rename = "isComplete", default)]
    pub is_complete: bool,
    /// Optional cover URL, filled in best-effort after creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

impl Book {
    /// Year rendered for display. Missing years show as `NaN`, matching what
    /// users saw when the value failed to coerce.
    pub fn display_year(&self) -> String {
        match self.year {
            Some(year) => year.to_string(),
            None => "NaN".to_string(),
        }
    }

    /// Cover reference to render, falling back to the placeholder image.
    pub fn cover_or_placeholder(&self) -> &str {
        self.cover.as_deref().unwrap_or(PLACEHOLDER_COVER)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.author.trim().is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} - {}", self.title, self.author)
        }
    }
}

/// Partial update applied by the edit flow. Fields left as `None` keep their
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<Option<i64>>,
}

impl BookPatch {
    /// Copy the populated fields onto `book`.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(year) = self.year {
            book.year = year;
        }
    }
}

/// Coerce raw form input into a year. Blank input becomes `0`, integers parse
/// as-is, finite decimals truncate toward zero, and anything else is `None`.
pub fn parse_year(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    if let Ok(year) = trimmed.parse::<i64>() {
        return Some(year);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value.trunc() as i64),
        _ => None,
    }
}

/// Any JSON number. Stored collections may hold `1965.0` or `1999.5` where an
/// integer is expected.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonNumber {
    Int(i64),
    Float(f64),
}

impl JsonNumber {
    fn truncated(self) -> Option<i64> {
        match self {
            JsonNumber::Int(value) => Some(value),
            JsonNumber::Float(value) if value.is_finite() => Some(value.trunc() as i64),
            JsonNumber::Float(_) => None,
        }
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    JsonNumber::deserialize(deserializer)?
        .truncated()
        .ok_or_else(|| <D::Error as serde::de::Error>::custom("book id is not a finite number"))
}

fn lenient_year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<JsonNumber>::deserialize(deserializer)?.and_then(JsonNumber::truncated))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> Book {
        Book {
            id: 1,
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            year: Some(1965),
            is_complete: false,
            cover: None,
        }
    }

    #[test]
    fn year_coercion_follows_numeric_rules() {
        assert_eq!(parse_year("1965"), Some(1965));
        assert_eq!(parse_year("  1977 "), Some(1977));
        assert_eq!(parse_year(""), Some(0));
        assert_eq!(parse_year("   "), Some(0));
        assert_eq!(parse_year("1999.9"), Some(1999));
        assert_eq!(parse_year("-44"), Some(-44));
        assert_eq!(parse_year("soon"), None);
        assert_eq!(parse_year("inf"), None);
        assert_eq!(parse_year("NaN"), None);
    }

    #[test]
    fn serializes_with_camel_case_completion_flag() {
        let json = serde_json::to_value(dune()).unwrap();
        assert_eq!(json["isComplete"], serde_json::json!(false));
        assert_eq!(json["year"], serde_json::json!(1965));
        assert!(json.get("cover").is_none());
    }

    #[test]
    fn missing_year_serializes_as_null() {
        let mut book = dune();
        book.year = None;
        let json = serde_json::to_value(&book).unwrap();
        assert!(json["year"].is_null());
        let back: Book = serde_json::from_value(json).unwrap();
        assert_eq!(back.year, None);
    }

    #[test]
    fn tolerates_records_without_optional_fields() {
        let book: Book =
            serde_json::from_str(r#"{"id":7,"title":"Emma","author":"Austen","year":1815}"#)
                .unwrap();
        assert!(!book.is_complete);
        assert_eq!(book.cover, None);
        assert_eq!(book.cover_or_placeholder(), PLACEHOLDER_COVER);
    }

    #[test]
    fn patch_only_touches_populated_fields() {
        let mut book = dune();
        let patch = BookPatch {
            author: Some("F. Herbert".into()),
            ..BookPatch::default()
        };
        patch.apply_to(&mut book);
        assert_eq!(book.author, "F. Herbert");
        assert_eq!(book.title, "Dune");
        assert_eq!(book.year, Some(1965));
    }

    #[test]
    fn decimal_numbers_in_stored_records_truncate() {
        let book: Book = serde_json::from_str(
            r#"{"id":1700000000000.0,"title":"Emma","author":"Austen","year":1815.7}"#,
        )
        .unwrap();
        assert_eq!(book.id, 1_700_000_000_000);
        assert_eq!(book.year, Some(1815));

        let book: Book =
            serde_json::from_str(r#"{"id":2,"title":"Dune","author":"","year":1965.0}"#).unwrap();
        assert_eq!(book.year, Some(1965));

        let book: Book = serde_json::from_str(r#"{"id":3,"title":"Dune","author":""}"#).unwrap();
        assert_eq!(book.year, None);

        assert!(serde_json::from_str::<Book>(r#"{"id":"x","title":"","author":""}"#).is_err());
    }

    #[test]
    fn display_includes_author_when_present() {
        assert_eq!(dune().to_string(), "Dune - Frank Herbert");
        let mut anonymous = dune();
        anonymous.author.clear();
        assert_eq!(anonymous.to_string(), "Dune");
        anonymous.year = None;
        assert_eq!(anonymous.display_year(), "NaN");
    }
}
