//! Haptic and audio feedback.
//!
//! Both adapters read the relevant preference flag every time they are asked
//! to fire, and swallow backend failures after logging them. Callers never
//! see an error.

use log::{debug, warn};
use std::cell::RefCell;
use wasm_bindgen::JsValue;

use crate::error::FeedbackError;
use crate::model::UserPreferences;

/// Named vibration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticPreset {
    LightTap,
    MediumTap,
    Success,
    Error,
    GoalReached,
}

impl HapticPreset {
    /// Vibration pattern in milliseconds (on, off, on, ...).
    pub fn pattern(self) -> &'static [u32] {
        match self {
            HapticPreset::LightTap => &[10],
            HapticPreset::MediumTap => &[20],
            HapticPreset::Success => &[50, 50, 50],
            HapticPreset::Error => &[100, 50, 100],
            HapticPreset::GoalReached => &[100, 100, 100, 100],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    Click,
    GoalReached,
}

/// A single tone, or a silent gap when `frequency_hz` is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_ms: u32,
}

impl Tone {
    pub const fn new(frequency_hz: f32, duration_ms: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }

    pub const fn pause(duration_ms: u32) -> Self {
        Self::new(0.0, duration_ms)
    }

    pub fn is_pause(&self) -> bool {
        self.frequency_hz <= 0.0
    }
}

impl AudioCue {
    pub fn tones(self) -> &'static [Tone] {
        const CLICK: [Tone; 1] = [Tone::new(880.0, 30)];
        // C5 E5 G5 C6
        const GOAL: [Tone; 5] = [
            Tone::new(523.25, 120),
            Tone::new(659.25, 120),
            Tone::new(783.99, 120),
            Tone::pause(40),
            Tone::new(1046.5, 320),
        ];
        match self {
            AudioCue::Click => &CLICK,
            AudioCue::GoalReached => &GOAL,
        }
    }
}

/// Anything that can vibrate.
pub trait Vibrator {
    fn is_supported(&self) -> bool;
    fn vibrate(&self, pattern: &[u32]) -> Result<(), FeedbackError>;
}

/// Anything that can play a tone sequence.
pub trait TonePlayer {
    fn play(&self, tones: &[Tone]) -> Result<(), FeedbackError>;
}

pub struct Haptics<V: Vibrator> {
    backend: V,
}

impl<V: Vibrator> Haptics<V> {
    pub fn new(backend: V) -> Self {
        Self { backend }
    }

    pub fn play(&self, prefs: &UserPreferences, preset: HapticPreset) {
        if !prefs.haptics_enabled {
            return;
        }
        if !self.backend.is_supported() {
            debug!("Vibration unsupported, skipping {:?}", preset);
            return;
        }
        if let Err(e) = self.backend.vibrate(preset.pattern()) {
            warn!("Haptic feedback failed: {}", e);
        }
    }

    pub fn light_tap(&self, prefs: &UserPreferences) {
        self.play(prefs, HapticPreset::LightTap);
    }

    pub fn medium_tap(&self, prefs: &UserPreferences) {
        self.play(prefs, HapticPreset::MediumTap);
    }

    pub fn success(&self, prefs: &UserPreferences) {
        self.play(prefs, HapticPreset::Success);
    }

    pub fn error(&self, prefs: &UserPreferences) {
        self.play(prefs, HapticPreset::Error);
    }

    pub fn goal_reached(&self, prefs: &UserPreferences) {
        self.play(prefs, HapticPreset::GoalReached);
    }
}

pub struct Audio<P: TonePlayer> {
    backend: P,
}

impl<P: TonePlayer> Audio<P> {
    pub fn new(backend: P) -> Self {
        Self { backend }
    }

    pub fn play(&self, prefs: &UserPreferences, cue: AudioCue) {
        if !prefs.audio_enabled {
            return;
        }
        if let Err(e) = self.backend.play(cue.tones()) {
            warn!("Failed to play {:?} sound: {}", cue, e);
        }
    }

    pub fn click(&self, prefs: &UserPreferences) {
        self.play(prefs, AudioCue::Click);
    }

    pub fn goal_reached(&self, prefs: &UserPreferences) {
        self.play(prefs, AudioCue::GoalReached);
    }
}

/// One effect requested by an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCue {
    Haptic(HapticPreset),
    Sound(AudioCue),
}

/// Both adapters behind one handle.
pub struct Feedback<V: Vibrator, P: TonePlayer> {
    pub haptics: Haptics<V>,
    pub audio: Audio<P>,
}

impl<V: Vibrator, P: TonePlayer> Feedback<V, P> {
    pub fn new(vibrator: V, player: P) -> Self {
        Self {
            haptics: Haptics::new(vibrator),
            audio: Audio::new(player),
        }
    }

    pub fn emit(&self, prefs: &UserPreferences, cues: &[FeedbackCue]) {
        for cue in cues {
            match *cue {
                FeedbackCue::Haptic(preset) => self.haptics.play(prefs, preset),
                FeedbackCue::Sound(sound) => self.audio.play(prefs, sound),
            }
        }
    }
}

// ── Browser backends ───────────────────────────────────────────────────────

/// `navigator.vibrate`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NavigatorVibrator;

impl Vibrator for NavigatorVibrator {
    fn is_supported(&self) -> bool {
        web_sys::window()
            .and_then(|w| js_sys::Reflect::has(&w.navigator(), &JsValue::from_str("vibrate")).ok())
            .unwrap_or(false)
    }

    fn vibrate(&self, pattern: &[u32]) -> Result<(), FeedbackError> {
        let window = web_sys::window().ok_or(FeedbackError::Unsupported("vibration"))?;
        let pattern: js_sys::Array = pattern.iter().map(|&ms| JsValue::from(ms)).collect();
        // `false` means the user agent refused, e.g. before the first user gesture.
        if window.navigator().vibrate_with_pattern(&pattern) {
            Ok(())
        } else {
            Err(FeedbackError::Playback("vibration request refused".to_string()))
        }
    }
}

/// Web Audio oscillator. The context is created lazily on first use, which
/// happens inside a user gesture as browsers require.
#[derive(Default)]
pub struct WebAudioPlayer {
    context: RefCell<Option<web_sys::AudioContext>>,
}

impl WebAudioPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn context(&self) -> Result<web_sys::AudioContext, FeedbackError> {
        if let Some(ctx) = self.context.borrow().as_ref() {
            return Ok(ctx.clone());
        }
        let ctx = web_sys::AudioContext::new()
            .map_err(|e| FeedbackError::Playback(format!("{:?}", e)))?;
        *self.context.borrow_mut() = Some(ctx.clone());
        Ok(ctx)
    }

    fn schedule(ctx: &web_sys::AudioContext, tone: &Tone, start: f64) -> Result<(), JsValue> {
        let seconds = f64::from(tone.duration_ms) / 1000.0;
        let osc = ctx.create_oscillator()?;
        let gain = ctx.create_gain()?;
        osc.set_type(web_sys::OscillatorType::Sine);
        osc.frequency().set_value(tone.frequency_hz);
        gain.gain().set_value_at_time(0.2, start)?;
        gain.gain().exponential_ramp_to_value_at_time(0.001, start + seconds)?;
        osc.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&ctx.destination())?;
        osc.start_with_when(start)?;
        osc.stop_with_when(start + seconds)?;
        Ok(())
    }
}

impl TonePlayer for WebAudioPlayer {
    fn play(&self, tones: &[Tone]) -> Result<(), FeedbackError> {
        let ctx = self.context()?;
        if ctx.state() == web_sys::AudioContextState::Suspended {
            if let Ok(promise) = ctx.resume() {
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                        warn!("Audio context resume rejected: {:?}", e);
                    }
                });
            }
        }

        let mut at = ctx.current_time();
        for tone in tones {
            if !tone.is_pause() {
                Self::schedule(&ctx, tone, at)
                    .map_err(|e| FeedbackError::Playback(format!("{:?}", e)))?;
            }
            at += f64::from(tone.duration_ms) / 1000.0;
        }
        Ok(())
    }
}

pub type BrowserFeedback = Feedback<NavigatorVibrator, WebAudioPlayer>;

impl BrowserFeedback {
    pub fn browser() -> Self {
        Feedback::new(NavigatorVibrator, WebAudioPlayer::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct RecordingVibrator {
        supported: bool,
        fail: bool,
        calls: Rc<RefCell<Vec<Vec<u32>>>>,
    }

    impl Vibrator for RecordingVibrator {
        fn is_supported(&self) -> bool {
            self.supported
        }

        fn vibrate(&self, pattern: &[u32]) -> Result<(), FeedbackError> {
            self.calls.borrow_mut().push(pattern.to_vec());
            if self.fail {
                Err(FeedbackError::Playback("denied".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default, Clone)]
    struct RecordingPlayer {
        fail: bool,
        calls: Rc<RefCell<usize>>,
    }

    impl TonePlayer for RecordingPlayer {
        fn play(&self, _tones: &[Tone]) -> Result<(), FeedbackError> {
            *self.calls.borrow_mut() += 1;
            if self.fail {
                Err(FeedbackError::Unsupported("audio"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn presets_map_to_fixed_patterns() {
        assert_eq!(HapticPreset::LightTap.pattern(), &[10]);
        assert_eq!(HapticPreset::MediumTap.pattern(), &[20]);
        assert_eq!(HapticPreset::Success.pattern(), &[50, 50, 50]);
        assert_eq!(HapticPreset::Error.pattern(), &[100, 50, 100]);
        assert_eq!(HapticPreset::GoalReached.pattern(), &[100, 100, 100, 100]);
    }

    #[test]
    fn haptics_respect_preference() {
        let vibrator = RecordingVibrator {
            supported: true,
            ..Default::default()
        };
        let haptics = Haptics::new(vibrator.clone());
        let mut prefs = UserPreferences::default();

        haptics.light_tap(&prefs);
        prefs.haptics_enabled = false;
        haptics.goal_reached(&prefs);

        assert_eq!(*vibrator.calls.borrow(), vec![vec![10]]);
    }

    #[test]
    fn unsupported_vibration_is_skipped() {
        let vibrator = RecordingVibrator::default();
        let haptics = Haptics::new(vibrator.clone());
        haptics.medium_tap(&UserPreferences::default());
        assert!(vibrator.calls.borrow().is_empty());
    }

    #[test]
    fn vibration_failure_is_swallowed() {
        let vibrator = RecordingVibrator {
            supported: true,
            fail: true,
            ..Default::default()
        };
        let haptics = Haptics::new(vibrator.clone());
        haptics.error(&UserPreferences::default());
        assert_eq!(vibrator.calls.borrow().len(), 1);
    }

    #[test]
    fn audio_respects_preference_and_swallows_failures() {
        let player = RecordingPlayer {
            fail: true,
            ..Default::default()
        };
        let audio = Audio::new(player.clone());
        let mut prefs = UserPreferences::default();
        audio.click(&prefs);
        prefs.audio_enabled = false;
        audio.goal_reached(&prefs);
        assert_eq!(*player.calls.borrow(), 1);
    }

    #[test]
    fn emit_routes_each_cue() {
        let vibrator = RecordingVibrator {
            supported: true,
            ..Default::default()
        };
        let player = RecordingPlayer::default();
        let feedback = Feedback::new(vibrator.clone(), player.clone());
        feedback.emit(
            &UserPreferences::default(),
            &[
                FeedbackCue::Haptic(HapticPreset::LightTap),
                FeedbackCue::Sound(AudioCue::Click),
                FeedbackCue::Haptic(HapticPreset::GoalReached),
            ],
        );
        assert_eq!(vibrator.calls.borrow().len(), 2);
        assert_eq!(*player.calls.borrow(), 1);
    }

    #[test]
    fn goal_cue_ends_on_the_octave() {
        let tones = AudioCue::GoalReached.tones();
        assert!(tones.iter().any(Tone::is_pause));
        assert_eq!(tones.last().unwrap().frequency_hz, 1046.5);
    }
}
