//! Application-level configuration constants.

// Storage keys
pub const STATE_KEY: &str = "pradakshina_counter_v1";
pub const HISTORY_KEY: &str = "pradakshina_history_v1";
pub const PREFS_KEY: &str = "pradakshina_prefs_v1";

// Counter defaults
pub const DEFAULT_TARGET: u32 = 108;
pub const QUICK_GOALS: [u32; 4] = [21, 54, 108, 1008];

// Progress ring geometry (SVG user units)
pub const RING_RADIUS: f64 = 54.0;
pub const RING_STROKE: f64 = 8.0;

// Gestures
pub const LONG_PRESS_MS: u32 = 600;

// Theme
pub const DARK_CLASS: &str = "dark";
pub const DARK_MEDIA_QUERY: &str = "(prefers-color-scheme: dark)";

// Titles and export naming
pub const APP_TITLE: &str = "Pradakshina Counter";
pub const EXPORT_FILE_PREFIX: &str = "pradakshina-counter";

/// Circumference of the progress ring.
pub fn ring_circumference() -> f64 {
    2.0 * std::f64::consts::PI * RING_RADIUS
}
