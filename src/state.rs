//! The state manager: sole owner and mutator of the three persisted records.
//!
//! Every mutation writes its record(s) to the store before replacing the
//! in-memory copy, then notifies subscribers synchronously. A failed write
//! leaves the in-memory record untouched.

use log::{debug, info, warn};

use crate::clock::Clock;
use crate::config::{HISTORY_KEY, PREFS_KEY, STATE_KEY};
use crate::error::{ImportError, Result};
use crate::model::{
    dedupe_history, CounterState, ExportBundle, HistoryEntry, PreferencesPatch, UserPreferences,
};
use crate::store::{encode_record, load_record, save_all, save_record, KeyValueStore};

/// What changed after a committed mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    CounterChanged(CounterState),
    HistoryChanged(Vec<HistoryEntry>),
    PreferencesChanged {
        preferences: UserPreferences,
        theme_changed: bool,
    },
    /// All three records were replaced at once.
    Imported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&StateEvent)>;

/// Consistent copy of all three records.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub state: CounterState,
    pub history: Vec<HistoryEntry>,
    pub preferences: UserPreferences,
}

pub struct StateManager<S: KeyValueStore, C: Clock> {
    store: S,
    clock: C,
    state: CounterState,
    history: Vec<HistoryEntry>,
    preferences: UserPreferences,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: KeyValueStore, C: Clock> StateManager<S, C> {
    /// Load all records from `store`, falling back to defaults record by record.
    pub fn load(store: S, clock: C) -> Self {
        let state = load_record::<CounterState>(&store, STATE_KEY)
            .map(CounterState::normalized)
            .unwrap_or_else(|| CounterState::new(clock.now()));
        let history = load_record::<Vec<HistoryEntry>>(&store, HISTORY_KEY)
            .map(dedupe_history)
            .unwrap_or_default();
        let preferences = load_record::<UserPreferences>(&store, PREFS_KEY).unwrap_or_default();

        info!(
            "Loaded counter {}/{} with {} history day(s)",
            state.count,
            state.target,
            history.len()
        );

        Self {
            store,
            clock,
            state,
            history,
            preferences,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> &CounterState {
        &self.state
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state.clone(),
            history: self.history.clone(),
            preferences: self.preferences.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ── Subscriptions ──────────────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: impl Fn(&StateEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&self, event: StateEvent) {
        for (_, listener) in &self.listeners {
            listener(&event);
        }
    }

    // ── Counter ────────────────────────────────────────────────────────────

    /// Set the count, clamped into `[0, target]`.
    ///
    /// Returns `Ok(false)` without writing anything when the clamped value
    /// equals the current count. The count and today's history entry are
    /// written together; if either write fails neither changes.
    pub fn update_count(&mut self, count: i64) -> Result<bool> {
        let clamped = count.clamp(0, i64::from(self.state.target)) as u32;
        if clamped == self.state.count {
            debug!("update_count({}) is a no-op at {}", count, clamped);
            return Ok(false);
        }

        let next = CounterState {
            count: clamped,
            updated_at: self.clock.now(),
            ..self.state.clone()
        };
        let history = self.history_with_today(clamped);
        save_all(
            &self.store,
            &[
                (STATE_KEY, encode_record(&next)?),
                (HISTORY_KEY, encode_record(&history)?),
            ],
        )?;

        self.state = next;
        self.history = history;
        self.notify(StateEvent::CounterChanged(self.state.clone()));
        self.notify(StateEvent::HistoryChanged(self.history.clone()));
        Ok(true)
    }

    /// Set the target to `max(1, floor(target))` and pull the count down to it.
    pub fn set_target(&mut self, target: f64) -> Result<bool> {
        let target = coerce_target(target);
        if target == self.state.target {
            return Ok(false);
        }

        let next = CounterState {
            target,
            count: self.state.count.min(target),
            updated_at: self.clock.now(),
            ..self.state.clone()
        };
        self.commit_state(next)?;
        Ok(true)
    }

    pub fn reset_count(&mut self) -> Result<bool> {
        self.update_count(0)
    }

    /// Replace the counter with a fresh default one. History and preferences stay.
    pub fn reset_all(&mut self) -> Result<()> {
        self.commit_state(CounterState::new(self.clock.now()))
    }

    fn commit_state(&mut self, next: CounterState) -> Result<()> {
        save_record(&self.store, STATE_KEY, &next)?;
        self.state = next;
        self.notify(StateEvent::CounterChanged(self.state.clone()));
        Ok(())
    }

    // ── History ────────────────────────────────────────────────────────────

    /// Record `total` for today, overwriting today's entry if there is one.
    pub fn append_history(&mut self, total: u32) -> Result<()> {
        let next = self.history_with_today(total);
        self.commit_history(next)
    }

    fn history_with_today(&self, total: u32) -> Vec<HistoryEntry> {
        let today = self.clock.today();
        let mut next = self.history.clone();
        match next.iter_mut().find(|e| e.date == today) {
            Some(entry) => entry.total = total,
            None => next.push(HistoryEntry { date: today, total }),
        }
        next
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.commit_history(Vec::new())
    }

    fn commit_history(&mut self, next: Vec<HistoryEntry>) -> Result<()> {
        save_record(&self.store, HISTORY_KEY, &next)?;
        self.history = next;
        self.notify(StateEvent::HistoryChanged(self.history.clone()));
        Ok(())
    }

    // ── Preferences ────────────────────────────────────────────────────────

    pub fn update_preferences(&mut self, patch: PreferencesPatch) -> Result<()> {
        let next = patch.apply_to(&self.preferences);
        save_record(&self.store, PREFS_KEY, &next)?;
        self.preferences = next;
        self.notify(StateEvent::PreferencesChanged {
            preferences: self.preferences.clone(),
            theme_changed: patch.theme.is_some(),
        });
        Ok(())
    }

    // ── Export / import ────────────────────────────────────────────────────

    /// Pretty-printed JSON of all three records plus `exportedAt`.
    pub fn export_data(&self) -> Result<String> {
        let bundle = ExportBundle {
            state: self.state.clone(),
            history: self.history.clone(),
            preferences: self.preferences.clone(),
            exported_at: Some(self.clock.now()),
        };
        Ok(serde_json::to_string_pretty(&bundle)?)
    }

    /// Replace all three records from an exported blob. All or nothing.
    pub fn import_data(&mut self, blob: &str) -> Result<()> {
        let bundle = match parse_bundle(blob) {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!("Import rejected: {}", e);
                return Err(e.into());
            }
        };

        let state = bundle.state.normalized();
        let history = dedupe_history(bundle.history);
        let preferences = bundle.preferences;

        save_all(
            &self.store,
            &[
                (STATE_KEY, encode_record(&state)?),
                (HISTORY_KEY, encode_record(&history)?),
                (PREFS_KEY, encode_record(&preferences)?),
            ],
        )?;

        self.state = state;
        self.history = history;
        self.preferences = preferences;
        info!("Imported counter {}/{}", self.state.count, self.state.target);

        self.notify(StateEvent::Imported);
        self.notify(StateEvent::PreferencesChanged {
            preferences: self.preferences.clone(),
            theme_changed: true,
        });
        Ok(())
    }
}

/// `max(1, floor(t))`, with non-finite input treated as 0 and large values saturating.
pub fn coerce_target(target: f64) -> u32 {
    if !target.is_finite() || target < 1.0 {
        return 1;
    }
    // `as` saturates at u32::MAX
    target.floor() as u32
}

fn parse_bundle(blob: &str) -> std::result::Result<ExportBundle, ImportError> {
    let value: serde_json::Value =
        serde_json::from_str(blob).map_err(|e| ImportError::Malformed(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| ImportError::Malformed("expected a JSON object".to_string()))?;
    for key in ["state", "history", "preferences"] {
        if object.get(key).map_or(true, |v| v.is_null()) {
            return Err(ImportError::MissingRecord(key));
        }
    }
    serde_json::from_value(value).map_err(|e| ImportError::Malformed(e.to_string()))
}
