//! Persisted records: counter state, daily history and user preferences.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_TARGET;

/// The running tally. `count` never exceeds `target` in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterState {
    pub count: u32,
    pub target: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CounterState {
    /// Fresh state with the default target, created now.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            target: DEFAULT_TARGET,
            created_at: now,
            updated_at: now,
        }
    }

    /// Restore `1 <= target` and `count <= target` on data from outside.
    pub fn normalized(mut self) -> Self {
        self.target = self.target.max(1);
        self.count = self.count.min(self.target);
        self
    }

    pub fn is_complete(&self) -> bool {
        self.count >= self.target
    }
}

/// Count snapshot for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub total: u32,
}

/// Collapse duplicate days, keeping the first position and the last total.
pub fn dedupe_history(entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut out: Vec<HistoryEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match out.iter_mut().find(|e| e.date == entry.date) {
            Some(existing) => existing.total = entry.total,
            None => out.push(entry),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::System];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::System => "System",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

/// Missing fields take their default, so older or partial blobs keep what they have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub theme: Theme,
    pub audio_enabled: bool,
    pub haptics_enabled: bool,
    pub tap_on_ring: bool,
    pub long_press_enabled: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            audio_enabled: true,
            haptics_enabled: true,
            tap_on_ring: false,
            long_press_enabled: false,
        }
    }
}

/// Partial preference update. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    pub theme: Option<Theme>,
    pub audio_enabled: Option<bool>,
    pub haptics_enabled: Option<bool>,
    pub tap_on_ring: Option<bool>,
    pub long_press_enabled: Option<bool>,
}

impl PreferencesPatch {
    pub fn theme(theme: Theme) -> Self {
        Self {
            theme: Some(theme),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, prefs: &UserPreferences) -> UserPreferences {
        UserPreferences {
            theme: self.theme.unwrap_or(prefs.theme),
            audio_enabled: self.audio_enabled.unwrap_or(prefs.audio_enabled),
            haptics_enabled: self.haptics_enabled.unwrap_or(prefs.haptics_enabled),
            tap_on_ring: self.tap_on_ring.unwrap_or(prefs.tap_on_ring),
            long_press_enabled: self.long_press_enabled.unwrap_or(prefs.long_press_enabled),
        }
    }
}

/// All three records plus the time they were taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub state: CounterState,
    pub history: Vec<HistoryEntry>,
    pub preferences: UserPreferences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[test]
    fn counter_state_uses_camel_case_keys() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
        let json = serde_json::to_value(CounterState::new(now)).unwrap();
        assert_eq!(json["count"], 0);
        assert_eq!(json["target"], 108);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn accepts_timestamps_written_by_browsers() {
        let raw = r#"{"count":3,"target":9,"createdAt":"2025-01-02T03:04:05.678Z","updatedAt":"2025-01-02T03:04:05.678Z"}"#;
        let state: CounterState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.count, 3);
        assert_eq!(state.created_at.timestamp(), 1_735_787_045);
    }

    #[test]
    fn normalized_clamps_count_and_target() {
        let now = Utc::now();
        let state = CounterState {
            count: 12,
            target: 0,
            created_at: now,
            updated_at: now,
        }
        .normalized();
        assert_eq!(state.target, 1);
        assert_eq!(state.count, 1);
    }

    #[test]
    fn history_dates_serialize_without_time() {
        let entry = HistoryEntry { date: day(7), total: 42 };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"date":"2026-05-07","total":42}"#);
    }

    #[test]
    fn dedupe_keeps_first_position_and_last_total() {
        let entries = vec![
            HistoryEntry { date: day(1), total: 5 },
            HistoryEntry { date: day(2), total: 8 },
            HistoryEntry { date: day(1), total: 9 },
        ];
        let out = dedupe_history(entries);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], HistoryEntry { date: day(1), total: 9 });
        assert_eq!(out[1].date, day(2));
    }

    #[test]
    fn theme_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::System).unwrap(), r#""system""#);
        let theme: Theme = serde_json::from_str(r#""dark""#).unwrap();
        assert_eq!(theme, Theme::Dark);
        assert!(serde_json::from_str::<Theme>(r#""sepia""#).is_err());
    }

    #[test]
    fn default_preferences() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.theme, Theme::System);
        assert!(prefs.audio_enabled);
        assert!(prefs.haptics_enabled);
        assert!(!prefs.tap_on_ring);
        assert!(!prefs.long_press_enabled);
    }

    #[test]
    fn patch_overwrites_only_given_fields() {
        let prefs = UserPreferences::default();
        let patch = PreferencesPatch {
            audio_enabled: Some(false),
            tap_on_ring: Some(true),
            ..PreferencesPatch::default()
        };
        let merged = patch.apply_to(&prefs);
        assert!(!merged.audio_enabled);
        assert!(merged.tap_on_ring);
        assert!(merged.haptics_enabled);
        assert_eq!(merged.theme, Theme::System);
    }

    #[test]
    fn theme_patch_touches_only_the_theme() {
        let prefs = UserPreferences {
            audio_enabled: false,
            ..UserPreferences::default()
        };
        let merged = PreferencesPatch::theme(Theme::Light).apply_to(&prefs);
        assert_eq!(merged.theme, Theme::Light);
        assert!(!merged.audio_enabled);
    }

    #[test]
    fn partial_preferences_keep_stored_fields() {
        let prefs: UserPreferences = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(prefs.theme, Theme::Dark);
        assert!(prefs.audio_enabled);
        assert!(prefs.haptics_enabled);
        assert!(!prefs.tap_on_ring);
        assert!(!prefs.long_press_enabled);
    }
}
