//! The two views and their paths.

use crate::config::APP_TITLE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Counter,
    Settings,
}

impl Route {
    /// Match a location path. Unknown paths resolve to `None` and should
    /// redirect to the counter.
    pub fn recognize(path: &str) -> Option<Route> {
        match path.trim_end_matches('/') {
            "" | "/index.html" => Some(Route::Counter),
            "/settings" => Some(Route::Settings),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Counter => "/",
            Route::Settings => "/settings",
        }
    }

    pub fn title(self) -> String {
        match self {
            Route::Counter => APP_TITLE.to_string(),
            Route::Settings => format!("Settings - {}", APP_TITLE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_paths() {
        assert_eq!(Route::recognize("/"), Some(Route::Counter));
        assert_eq!(Route::recognize(""), Some(Route::Counter));
        assert_eq!(Route::recognize("/settings"), Some(Route::Settings));
        assert_eq!(Route::recognize("/settings/"), Some(Route::Settings));
    }

    #[test]
    fn unknown_paths_are_unmatched() {
        assert_eq!(Route::recognize("/stats"), None);
        assert_eq!(Route::recognize("/settings/extra"), None);
    }

    #[test]
    fn paths_round_trip() {
        for route in [Route::Counter, Route::Settings] {
            assert_eq!(Route::recognize(route.path()), Some(route));
        }
    }

    #[test]
    fn titles() {
        assert_eq!(Route::Counter.title(), "Pradakshina Counter");
        assert_eq!(Route::Settings.title(), "Settings - Pradakshina Counter");
    }
}
