use serde::{Deserialize, Serialize};
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};
use uuid::Uuid;

use crate::codes::status::CodeStatus;
use crate::error::ApiError;

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Create/update payload. Dates travel as `YYYY-MM-DD` strings and are
/// validated here before they reach the repo.
#[derive(Debug, Deserialize)]
pub struct CodePayload {
    pub code: String,
    pub store_name: String,
    #[serde(default)]
    pub store_url: Option<String>,
    #[serde(default)]
    pub discount_value: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_used: bool,
}

/// A validated, trimmed payload ready for persistence.
#[derive(Debug)]
pub struct ValidCode {
    pub code: String,
    pub store_name: String,
    pub store_url: Option<String>,
    pub discount_value: Option<String>,
    pub expiry_date: Option<Date>,
    pub notes: Option<String>,
    pub is_used: bool,
}

impl CodePayload {
    pub fn validate(self) -> Result<ValidCode, ApiError> {
        let code = self.code.trim().to_string();
        let store_name = self.store_name.trim().to_string();
        if code.is_empty() || store_name.is_empty() {
            return Err(ApiError::validation("code and store_name are required"));
        }

        let expiry_date = match non_empty(self.expiry_date) {
            Some(raw) => Some(parse_expiry_date(&raw)?),
            None => None,
        };

        Ok(ValidCode {
            code,
            store_name,
            store_url: non_empty(self.store_url),
            discount_value: non_empty(self.discount_value),
            expiry_date,
            notes: non_empty(self.notes),
            is_used: self.is_used,
        })
    }
}

pub fn parse_expiry_date(raw: &str) -> Result<Date, ApiError> {
    Date::parse(raw.trim(), DATE_FORMAT)
        .map_err(|_| ApiError::validation("expiry_date must be a YYYY-MM-DD date"))
}

pub fn format_date(date: Date) -> String {
    // The format description has no invalid components, formatting cannot fail.
    date.format(DATE_FORMAT).unwrap_or_default()
}

#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub id: Uuid,
    pub code: String,
    pub store_name: String,
    pub store_url: Option<String>,
    pub discount_value: Option<String>,
    pub expiry_date: Option<String>,
    pub notes: Option<String>,
    pub is_used: bool,
    pub status: CodeStatus,
    /// Whole days until expiry as of the request, negative once past.
    pub expires_in_days: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Query parameters for the ledger listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    ExpiringSoon,
    Expired,
    Used,
}

impl StatusFilter {
    pub fn matches(self, status: CodeStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == CodeStatus::Active,
            StatusFilter::ExpiringSoon => status == CodeStatus::ExpiringSoon,
            StatusFilter::Expired => status == CodeStatus::Expired,
            StatusFilter::Used => status == CodeStatus::Used,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn payload() -> CodePayload {
        CodePayload {
            code: "SAVE20".into(),
            store_name: "Acme".into(),
            store_url: None,
            discount_value: Some("20%".into()),
            expiry_date: Some("2025-12-31".into()),
            notes: None,
            is_used: false,
        }
    }

    #[test]
    fn validate_trims_and_parses() {
        let mut p = payload();
        p.code = "  SAVE20  ".into();
        let valid = p.validate().unwrap();
        assert_eq!(valid.code, "SAVE20");
        assert_eq!(valid.expiry_date, Some(date!(2025 - 12 - 31)));
    }

    #[test]
    fn validate_rejects_missing_required_fields() {
        let mut p = payload();
        p.store_name = "   ".into();
        assert!(matches!(p.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn validate_rejects_malformed_date() {
        let mut p = payload();
        p.expiry_date = Some("31/12/2025".into());
        assert!(matches!(p.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn empty_optional_strings_become_none() {
        let mut p = payload();
        p.discount_value = Some("  ".into());
        p.expiry_date = Some(String::new());
        let valid = p.validate().unwrap();
        assert_eq!(valid.discount_value, None);
        assert_eq!(valid.expiry_date, None);
    }

    #[test]
    fn date_roundtrips_through_format() {
        let d = date!(2025 - 01 - 05);
        assert_eq!(format_date(d), "2025-01-05");
        assert_eq!(parse_expiry_date("2025-01-05").unwrap(), d);
    }

    #[test]
    fn status_filter_matches_only_its_status() {
        assert!(StatusFilter::All.matches(CodeStatus::Used));
        assert!(StatusFilter::Expired.matches(CodeStatus::Expired));
        assert!(!StatusFilter::Expired.matches(CodeStatus::Active));
        assert!(StatusFilter::ExpiringSoon.matches(CodeStatus::ExpiringSoon));
    }
}
