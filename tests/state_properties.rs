use chrono::{Duration, TimeZone, Utc};
use pradakshina_counter::clock::FixedClock;
use pradakshina_counter::feedback::{AudioCue, FeedbackCue, HapticPreset};
use pradakshina_counter::intents::{dispatch, CounterIntent};
use pradakshina_counter::store::MemoryStorage;
use pradakshina_counter::{progress_percent, PreferencesPatch, StateManager, Theme};
use std::rc::Rc;

type Manager = StateManager<Rc<MemoryStorage>, Rc<FixedClock>>;

fn manager() -> (Manager, Rc<MemoryStorage>, Rc<FixedClock>) {
    let store = Rc::new(MemoryStorage::new());
    let clock = Rc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap(),
    ));
    let manager = StateManager::load(store.clone(), clock.clone());
    (manager, store, clock)
}

#[test]
fn count_always_lands_within_target() {
    let (mut manager, _, _) = manager();
    for target in [0u32, 1, 5, 108] {
        for count in [0i64, 1, 4, 5, 6, 200, -3] {
            manager.set_target(f64::from(target)).unwrap();
            manager.update_count(count).unwrap();
            let state = manager.state();
            assert!(state.target >= 1);
            assert!(state.count <= state.target, "{:?}", state);
        }
    }
}

#[test]
fn same_count_is_persisted_once() {
    let (mut manager, store, _) = manager();
    assert!(manager.update_count(7).unwrap());
    let writes = store.writes();
    assert!(!manager.update_count(7).unwrap());
    assert_eq!(store.writes(), writes);
}

#[test]
fn one_history_entry_per_day_with_latest_total() {
    let (mut manager, _, clock) = manager();
    manager.append_history(3).unwrap();
    manager.append_history(9).unwrap();
    assert_eq!(manager.history().len(), 1);
    assert_eq!(manager.history()[0].total, 9);

    clock.advance(Duration::days(1));
    manager.append_history(2).unwrap();
    let totals: Vec<u32> = manager.history().iter().map(|e| e.total).collect();
    assert_eq!(totals, vec![9, 2]);
}

#[test]
fn export_then_import_restores_everything() {
    let (mut source, _, _) = manager();
    source.set_target(54.0).unwrap();
    source.update_count(20).unwrap();
    source
        .update_preferences(PreferencesPatch::theme(Theme::Dark))
        .unwrap();
    let exported = source.export_data().unwrap();

    let (mut target, store, _) = manager();
    target.import_data(&exported).unwrap();
    assert_eq!(target.snapshot(), source.snapshot());

    // and it survives a reload
    let reloaded = StateManager::load(store, Rc::new(FixedClock::new(Utc::now())));
    assert_eq!(reloaded.snapshot(), source.snapshot());
}

#[test]
fn malformed_import_changes_nothing() {
    let (mut manager, store, _) = manager();
    manager.update_count(12).unwrap();
    let before = manager.snapshot();
    let writes = store.writes();

    for blob in ["{}", "not json", "[]", r#"{"state":null,"history":[],"preferences":{}}"#] {
        assert!(manager.import_data(blob).is_err(), "{} was accepted", blob);
    }
    assert_eq!(manager.snapshot(), before);
    assert_eq!(store.writes(), writes);
}

#[test]
fn reaching_the_goal_then_tapping_again() {
    let (mut manager, store, _) = manager();
    manager.set_target(10.0).unwrap();
    manager.update_count(9).unwrap();

    let cues = dispatch(&mut manager, CounterIntent::Increment).unwrap();
    assert_eq!(manager.state().count, 10);
    assert!(cues.contains(&FeedbackCue::Haptic(HapticPreset::GoalReached)));
    assert!(cues.contains(&FeedbackCue::Sound(AudioCue::GoalReached)));

    let writes = store.writes();
    assert!(!manager.update_count(11).unwrap());
    assert_eq!(manager.state().count, 10);
    assert_eq!(store.writes(), writes);

    let cues = dispatch(&mut manager, CounterIntent::Increment).unwrap();
    assert!(cues.is_empty());
    assert_eq!(store.writes(), writes);
}

#[test]
fn lowering_target_clamps_count() {
    let (mut manager, _, _) = manager();
    manager.update_count(8).unwrap();
    manager.set_target(5.0).unwrap();
    assert_eq!(manager.state().count, 5);
    assert_eq!(manager.state().target, 5);
}

#[test]
fn quarter_progress() {
    assert_eq!(progress_percent(27, 108), 25.0);
}
