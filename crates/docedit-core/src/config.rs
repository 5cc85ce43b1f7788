//! Host-page configuration and tunables
//!
//! The server renders the edit page and hands the controller its initial
//! inputs as one JSON object. Everything is optional; missing values fall
//! back to an empty document.

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Upload size limit (50 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Tunables with the values the edit page has always used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorSettings {
    pub max_upload_bytes: u64,
    pub alert_dismiss_ms: u32,
    pub tag_notice_dismiss_ms: u32,
    pub page_alert_dismiss_ms: u32,
    pub blink_ms: u32,
    pub preview_scale: f64,
    pub placeholder_width: u32,
    pub placeholder_height: u32,
    pub notes_preview_chars: usize,
    pub earliest_publish_year: i32,
    pub documents_url: String,
    pub view_url_prefix: String,
    pub edit_url_prefix: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            alert_dismiss_ms: 3000,
            tag_notice_dismiss_ms: 3000,
            page_alert_dismiss_ms: 5000,
            blink_ms: 1800,
            preview_scale: 1.2,
            placeholder_width: 400,
            placeholder_height: 500,
            notes_preview_chars: 100,
            earliest_publish_year: 1900,
            documents_url: "/documents".to_string(),
            view_url_prefix: "/document/view".to_string(),
            edit_url_prefix: "/document/edit".to_string(),
        }
    }
}

impl EditorSettings {
    /// URL the stored PDF is streamed from
    pub fn view_url(&self, document_id: u64) -> String {
        format!("{}/{}", self.view_url_prefix.trim_end_matches('/'), document_id)
    }

    /// URL the edited form posts to
    pub fn edit_url(&self, document_id: u64) -> String {
        format!("{}/{}", self.edit_url_prefix.trim_end_matches('/'), document_id)
    }

    /// Publish years offered by the year select, newest first
    pub fn year_options(&self, current_year: i32) -> Vec<i32> {
        (self.earliest_publish_year..=current_year).rev().collect()
    }
}

/// Initialization inputs supplied by the hosting page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub document_id: u64,
    pub original_file_name: String,
    /// Comma-joined tag names already attached to the document
    pub existing_tags: String,
    /// Comma-joined classification names already attached to the document
    pub existing_classifications: String,
    /// `YYYY-MM`, any common date string, blank or `"null"`
    pub publish_date: String,
    /// Every tag the page offers as a selectable option
    pub available_tags: Vec<String>,
    /// Every classification the page offers as a selectable option
    pub available_classifications: Vec<String>,
    pub settings: EditorSettings,
}

impl EditorConfig {
    pub fn existing_tag_names(&self) -> Vec<String> {
        split_names(&self.existing_tags)
    }

    pub fn existing_classification_names(&self) -> Vec<String> {
        split_names(&self.existing_classifications)
    }
}

/// Split a comma-joined list, dropping blanks and literal `null` entries
pub fn split_names(raw: &str) -> Vec<String> {
    if is_absent(raw) {
        return Vec::new();
    }
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "null")
        .map(str::to_string)
        .collect()
}

fn is_absent(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw == "null"
}

/// Month and year split out of a stored publish date
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishDate {
    /// Zero padded, `"01"`..`"12"`
    pub month: String,
    pub year: String,
}

impl PublishDate {
    fn new(year: i32, month: u32) -> Self {
        Self {
            month: format!("{:02}", month),
            year: year.to_string(),
        }
    }
}

const GENERIC_DATE_FORMATS: [&str; 5] = [
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%a %b %d %Y",
];

/// Parse the stored publish date. Returns `None` when blank or unparseable.
pub fn parse_publish_date(raw: &str) -> Option<PublishDate> {
    if is_absent(raw) {
        return None;
    }
    let raw = raw.trim();

    if raw.contains('-') {
        let mut parts = raw.split('-');
        let year = parts.next().and_then(leading_int)?;
        let month = parts.next().and_then(leading_int)?;
        // Months outside 1..=12 roll into neighbouring years
        let total = year.checked_mul(12)?.checked_add(month - 1)?;
        let year = i32::try_from(total.div_euclid(12)).ok()?;
        let month = u32::try_from(total.rem_euclid(12) + 1).ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1)
            .map(|d| PublishDate::new(d.year(), d.month()));
    }

    if let Ok(dt) =
        DateTime::parse_from_rfc3339(raw).or_else(|_| DateTime::parse_from_rfc2822(raw))
    {
        return Some(PublishDate::new(dt.year(), dt.month()));
    }

    GENERIC_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(|d| PublishDate::new(d.year(), d.month()))
}

/// Integer prefix of a string, ignoring trailing garbage
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| n * sign)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_names_drops_blank_and_null() {
        assert_eq!(split_names("a, b ,,null, c"), vec!["a", "b", "c"]);
        assert!(split_names("null").is_empty());
        assert!(split_names("   ").is_empty());
    }

    #[test]
    fn test_parse_year_month() {
        let date = parse_publish_date("2024-03").unwrap();
        assert_eq!(date.month, "03");
        assert_eq!(date.year, "2024");
    }

    #[test]
    fn test_parse_full_iso_date_keeps_month() {
        let date = parse_publish_date("2019-11-30T00:00:00").unwrap();
        assert_eq!(date, PublishDate::new(2019, 11));
    }

    #[test]
    fn test_parse_month_overflow_rolls_year() {
        assert_eq!(parse_publish_date("2020-13"), Some(PublishDate::new(2021, 1)));
        assert_eq!(parse_publish_date("2020-00"), Some(PublishDate::new(2019, 12)));
    }

    #[test]
    fn test_parse_generic_formats() {
        assert_eq!(
            parse_publish_date("March 5, 2021"),
            Some(PublishDate::new(2021, 3))
        );
        assert_eq!(
            parse_publish_date("2018/07/01"),
            Some(PublishDate::new(2018, 7))
        );
    }

    #[test]
    fn test_parse_absent_or_garbage() {
        assert_eq!(parse_publish_date(""), None);
        assert_eq!(parse_publish_date("null"), None);
        assert_eq!(parse_publish_date("soon"), None);
        assert_eq!(parse_publish_date("x-y"), None);
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"documentId": 42, "existingTags": "a,b"}"#).unwrap();
        assert_eq!(config.document_id, 42);
        assert_eq!(config.existing_tag_names(), vec!["a", "b"]);
        assert_eq!(config.settings.max_upload_bytes, MAX_UPLOAD_BYTES);
        assert_eq!(config.settings.view_url(42), "/document/view/42");
        assert_eq!(config.settings.edit_url(42), "/document/edit/42");
    }

    #[test]
    fn test_settings_override() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"settings": {"notesPreviewChars": 10}}"#).unwrap();
        assert_eq!(config.settings.notes_preview_chars, 10);
        assert_eq!(config.settings.blink_ms, 1800);
    }

    #[test]
    fn test_year_options_newest_first() {
        let settings = EditorSettings {
            earliest_publish_year: 2020,
            ..Default::default()
        };
        assert_eq!(settings.year_options(2023), vec![2023, 2022, 2021, 2020]);
    }
}
