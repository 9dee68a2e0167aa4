//! Core of the Pradakshina counter: persisted records, the state manager that
//! owns them, feedback adapters and the values the views derive from state.

use chrono::NaiveDate;

pub mod clock;
pub mod config;
pub mod error;
pub mod feedback;
pub mod intents;
pub mod model;
pub mod route;
pub mod state;
pub mod store;
pub mod theme;

pub use clock::{Clock, SystemClock};
pub use error::{CounterError, Result};
pub use model::{CounterState, HistoryEntry, PreferencesPatch, Theme, UserPreferences};
pub use state::{Snapshot, StateEvent, StateManager, SubscriptionId};
pub use store::{AppStorage, KeyValueStore};

/// Manager wired to the browser: `localStorage` (or its fallback) and the wall clock.
pub type AppStateManager = StateManager<AppStorage, SystemClock>;

/// Percentage of the target reached, capped at 100. Zero for a zero target.
#[inline]
pub fn progress_percent(count: u32, target: u32) -> f64 {
    if target == 0 {
        return 0.0;
    }
    (f64::from(count) / f64::from(target) * 100.0).min(100.0)
}

/// SVG `stroke-dashoffset` for a ring of the given circumference.
#[inline]
pub fn ring_offset(progress: f64, circumference: f64) -> f64 {
    circumference * (1.0 - progress / 100.0)
}

pub fn aria_label(count: u32, target: u32) -> String {
    format!(
        "Count {} of {}, {} percent complete",
        count,
        target,
        progress_percent(count, target).round()
    )
}

/// "Today", "Yesterday", or the date itself.
pub fn history_date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(date) {
        "Yesterday".to_string()
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("{}-{}.json", config::EXPORT_FILE_PREFIX, today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn progress_quarter() {
        assert_eq!(progress_percent(27, 108), 25.0);
    }

    #[test]
    fn progress_caps_and_handles_zero_target() {
        assert_eq!(progress_percent(12, 10), 100.0);
        assert_eq!(progress_percent(5, 0), 0.0);
    }

    #[test]
    fn ring_offset_half_way() {
        let c = config::ring_circumference();
        assert!((ring_offset(50.0, c) - c * 0.5).abs() < 1e-9);
        assert_eq!(ring_offset(100.0, c), 0.0);
        assert_eq!(ring_offset(0.0, c), c);
    }

    #[test]
    fn aria_label_mentions_count_and_percent() {
        let label = aria_label(5, 10);
        assert!(label.contains("Count 5 of 10"));
        assert!(label.contains("50 percent"));
    }

    #[test]
    fn history_labels() {
        let today = date(2026, 3, 1);
        assert_eq!(history_date_label(today, today), "Today");
        assert_eq!(history_date_label(date(2026, 2, 28), today), "Yesterday");
        assert_eq!(history_date_label(date(2026, 2, 3), today), "Feb 3, 2026");
    }

    #[test]
    fn export_name_has_the_day() {
        assert_eq!(
            export_file_name(date(2026, 10, 19)),
            "pradakshina-counter-2026-10-19.json"
        );
    }
}
