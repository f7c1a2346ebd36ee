//! Derived code status. Never persisted: always recomputed from the stored
//! fields and the current date at read time.

use serde::{Deserialize, Serialize};
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeStatus {
    Active,
    ExpiringSoon,
    Expired,
    Used,
}

/// Classify a code as of `today`. `is_used` wins over any date; a code with
/// no expiry date never expires; the lookahead boundary is inclusive, so with
/// a 7-day window a code expiring in exactly 7 days is already expiring soon.
pub fn code_status(
    expiry_date: Option<Date>,
    is_used: bool,
    today: Date,
    lookahead_days: i64,
) -> CodeStatus {
    if is_used {
        return CodeStatus::Used;
    }
    let Some(expiry) = expiry_date else {
        return CodeStatus::Active;
    };
    if expiry < today {
        return CodeStatus::Expired;
    }
    if days_until(expiry, today) <= lookahead_days {
        return CodeStatus::ExpiringSoon;
    }
    CodeStatus::Active
}

/// Whole days from `today` to `expiry`, negative once past.
pub fn days_until(expiry: Date, today: Date) -> i64 {
    (expiry - today).whole_days()
}

/// Only codes that are still redeemable may be shared: a used or expired
/// code cannot be published, even by its owner.
pub fn is_shareable(status: CodeStatus) -> bool {
    matches!(status, CodeStatus::Active | CodeStatus::ExpiringSoon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 06 - 15);

    #[test]
    fn used_wins_over_everything() {
        assert_eq!(
            code_status(Some(date!(2025 - 01 - 01)), true, TODAY, 7),
            CodeStatus::Used
        );
        assert_eq!(code_status(None, true, TODAY, 7), CodeStatus::Used);
        assert_eq!(
            code_status(Some(date!(2026 - 01 - 01)), true, TODAY, 7),
            CodeStatus::Used
        );
    }

    #[test]
    fn no_expiry_date_is_active() {
        assert_eq!(code_status(None, false, TODAY, 7), CodeStatus::Active);
    }

    #[test]
    fn past_expiry_is_expired() {
        assert_eq!(
            code_status(Some(date!(2025 - 06 - 14)), false, TODAY, 7),
            CodeStatus::Expired
        );
    }

    #[test]
    fn expiring_today_is_expiring_soon_not_expired() {
        assert_eq!(
            code_status(Some(TODAY), false, TODAY, 7),
            CodeStatus::ExpiringSoon
        );
    }

    #[test]
    fn lookahead_boundary_is_inclusive() {
        // Exactly 7 days out counts, 8 does not.
        assert_eq!(
            code_status(Some(date!(2025 - 06 - 22)), false, TODAY, 7),
            CodeStatus::ExpiringSoon
        );
        assert_eq!(
            code_status(Some(date!(2025 - 06 - 23)), false, TODAY, 7),
            CodeStatus::Active
        );
    }

    #[test]
    fn moving_today_walks_a_code_through_the_states() {
        // Fixed stored data, only the clock moves.
        let expiry = Some(date!(2025 - 06 - 25));
        assert_eq!(
            code_status(expiry, false, date!(2025 - 06 - 10), 7),
            CodeStatus::Active
        );
        assert_eq!(
            code_status(expiry, false, date!(2025 - 06 - 20), 7),
            CodeStatus::ExpiringSoon
        );
        assert_eq!(
            code_status(expiry, false, date!(2025 - 06 - 26), 7),
            CodeStatus::Expired
        );
    }

    #[test]
    fn lookahead_window_is_configurable() {
        let expiry = Some(date!(2025 - 06 - 25));
        assert_eq!(code_status(expiry, false, TODAY, 7), CodeStatus::Active);
        assert_eq!(
            code_status(expiry, false, TODAY, 14),
            CodeStatus::ExpiringSoon
        );
    }

    #[test]
    fn days_until_counts_and_goes_negative() {
        assert_eq!(days_until(date!(2025 - 06 - 20), TODAY), 5);
        assert_eq!(days_until(TODAY, TODAY), 0);
        assert_eq!(days_until(date!(2025 - 06 - 13), TODAY), -2);
    }

    #[test]
    fn used_and_expired_codes_are_not_shareable() {
        assert!(!is_shareable(CodeStatus::Used));
        assert!(!is_shareable(CodeStatus::Expired));
        assert!(is_shareable(CodeStatus::Active));
        assert!(is_shareable(CodeStatus::ExpiringSoon));
    }

    #[test]
    fn code_with_no_expiry_stays_shareable() {
        assert!(is_shareable(code_status(None, false, TODAY, 7)));
        assert!(!is_shareable(code_status(None, true, TODAY, 7)));
    }

    #[test]
    fn aging_past_expiry_revokes_shareability() {
        let expiry = Some(date!(2025 - 06 - 16));
        assert!(is_shareable(code_status(expiry, false, TODAY, 7)));
        assert!(!is_shareable(code_status(
            expiry,
            false,
            date!(2025 - 06 - 17),
            7
        )));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&CodeStatus::ExpiringSoon).unwrap();
        assert_eq!(json, "\"expiring_soon\"");
    }
}
