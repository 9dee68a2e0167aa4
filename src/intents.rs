//! User intents from the counter view and the feedback each one produces.

use crate::clock::Clock;
use crate::error::Result;
use crate::feedback::{AudioCue, FeedbackCue, HapticPreset};
use crate::state::StateManager;
use crate::store::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CounterIntent {
    Increment,
    Decrement,
    SetTarget(f64),
    QuickGoal(u32),
    ResetCount,
    ResetAll,
}

const TAP: FeedbackCue = FeedbackCue::Haptic(HapticPreset::LightTap);
const PRESS: FeedbackCue = FeedbackCue::Haptic(HapticPreset::MediumTap);
const CLICK: FeedbackCue = FeedbackCue::Sound(AudioCue::Click);
const GOAL: [FeedbackCue; 2] = [
    FeedbackCue::Haptic(HapticPreset::GoalReached),
    FeedbackCue::Sound(AudioCue::GoalReached),
];

/// Apply `intent` and return the feedback to play, in order.
///
/// Increment and decrement do nothing at their bounds, so a tap on a full
/// counter produces no feedback at all.
pub fn dispatch<S: KeyValueStore, C: Clock>(
    manager: &mut StateManager<S, C>,
    intent: CounterIntent,
) -> Result<Vec<FeedbackCue>> {
    let mut cues = Vec::new();
    match intent {
        CounterIntent::Increment => {
            let state = manager.state();
            if state.count < state.target {
                let next = state.count + 1;
                let target = state.target;
                manager.update_count(i64::from(next))?;
                cues.extend([TAP, CLICK]);
                if next == target {
                    cues.extend(GOAL);
                }
            }
        }
        CounterIntent::Decrement => {
            let count = manager.state().count;
            if count > 0 {
                manager.update_count(i64::from(count) - 1)?;
                cues.push(TAP);
            }
        }
        CounterIntent::SetTarget(target) => {
            manager.set_target(target)?;
        }
        CounterIntent::QuickGoal(target) => {
            manager.set_target(f64::from(target))?;
            cues.push(TAP);
        }
        CounterIntent::ResetCount => {
            manager.reset_count()?;
            cues.push(PRESS);
        }
        CounterIntent::ResetAll => {
            manager.reset_all()?;
            cues.push(PRESS);
        }
    }
    Ok(cues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemoryStorage;
    use chrono::Utc;

    fn manager(target: u32, count: u32) -> StateManager<MemoryStorage, FixedClock> {
        let mut m = StateManager::load(MemoryStorage::new(), FixedClock::new(Utc::now()));
        m.set_target(f64::from(target)).unwrap();
        m.update_count(i64::from(count)).unwrap();
        m
    }

    #[test]
    fn increment_below_target_taps_and_clicks() {
        let mut m = manager(10, 5);
        let cues = dispatch(&mut m, CounterIntent::Increment).unwrap();
        assert_eq!(m.state().count, 6);
        assert_eq!(cues, vec![TAP, CLICK]);
    }

    #[test]
    fn increment_to_target_adds_goal_feedback() {
        let mut m = manager(10, 9);
        let cues = dispatch(&mut m, CounterIntent::Increment).unwrap();
        assert_eq!(m.state().count, 10);
        assert_eq!(
            cues,
            vec![
                TAP,
                CLICK,
                FeedbackCue::Haptic(HapticPreset::GoalReached),
                FeedbackCue::Sound(AudioCue::GoalReached),
            ]
        );
    }

    #[test]
    fn increment_at_target_is_silent() {
        let mut m = manager(10, 10);
        let writes = m.store().writes();
        let cues = dispatch(&mut m, CounterIntent::Increment).unwrap();
        assert!(cues.is_empty());
        assert_eq!(m.state().count, 10);
        assert_eq!(m.store().writes(), writes);
    }

    #[test]
    fn decrement_taps_without_goal() {
        let mut m = manager(10, 10);
        let cues = dispatch(&mut m, CounterIntent::Decrement).unwrap();
        assert_eq!(m.state().count, 9);
        assert_eq!(cues, vec![TAP]);
    }

    #[test]
    fn decrement_at_zero_is_silent() {
        let mut m = manager(10, 0);
        let cues = dispatch(&mut m, CounterIntent::Decrement).unwrap();
        assert!(cues.is_empty());
        assert_eq!(m.state().count, 0);
    }

    #[test]
    fn quick_goal_sets_target_with_a_tap() {
        let mut m = manager(108, 40);
        let cues = dispatch(&mut m, CounterIntent::QuickGoal(21)).unwrap();
        assert_eq!(m.state().target, 21);
        assert_eq!(m.state().count, 21);
        assert_eq!(cues, vec![TAP]);
    }

    #[test]
    fn explicit_target_has_no_feedback() {
        let mut m = manager(108, 0);
        let cues = dispatch(&mut m, CounterIntent::SetTarget(54.7)).unwrap();
        assert_eq!(m.state().target, 54);
        assert!(cues.is_empty());
    }

    #[test]
    fn resets_press() {
        let mut m = manager(21, 7);
        assert_eq!(dispatch(&mut m, CounterIntent::ResetCount).unwrap(), vec![PRESS]);
        assert_eq!(m.state().count, 0);
        assert_eq!(m.state().target, 21);
        assert_eq!(dispatch(&mut m, CounterIntent::ResetAll).unwrap(), vec![PRESS]);
        assert_eq!(m.state().target, 108);
    }
}
