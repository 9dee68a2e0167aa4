//! Theme resolution and the live `prefers-color-scheme` binding.

use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::config::{DARK_CLASS, DARK_MEDIA_QUERY};
use crate::model::Theme;

/// Whether the document should be dark for `theme`, given the platform signal.
pub fn is_dark(theme: Theme, system_prefers_dark: bool) -> bool {
    match theme {
        Theme::Light => false,
        Theme::Dark => true,
        Theme::System => system_prefers_dark,
    }
}

/// Applies the theme to `<html>`. In `System` mode it keeps a `change`
/// listener on the media query so the page follows the OS setting; the
/// listener is removed as soon as another theme is applied.
#[derive(Default)]
pub struct ThemeBinding {
    media_listener: Option<(web_sys::MediaQueryList, Closure<dyn FnMut(web_sys::MediaQueryListEvent)>)>,
}

impl ThemeBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_following_system(&self) -> bool {
        self.media_listener.is_some()
    }

    pub fn apply(&mut self, theme: Theme) {
        self.detach();

        if theme != Theme::System {
            set_root_dark(is_dark(theme, false));
            return;
        }

        let query = match gloo_utils::window().match_media(DARK_MEDIA_QUERY) {
            Ok(Some(query)) => query,
            Ok(None) | Err(_) => {
                warn!("matchMedia unavailable, defaulting to light");
                set_root_dark(false);
                return;
            }
        };

        set_root_dark(is_dark(theme, query.matches()));

        let listener = Closure::<dyn FnMut(web_sys::MediaQueryListEvent)>::new(
            |event: web_sys::MediaQueryListEvent| {
                debug!("System color scheme changed, dark = {}", event.matches());
                set_root_dark(event.matches());
            },
        );
        if let Err(e) =
            query.add_event_listener_with_callback("change", listener.as_ref().unchecked_ref())
        {
            warn!("Could not follow system theme: {:?}", e);
            return;
        }
        self.media_listener = Some((query, listener));
    }

    fn detach(&mut self) {
        if let Some((query, listener)) = self.media_listener.take() {
            let _ = query
                .remove_event_listener_with_callback("change", listener.as_ref().unchecked_ref());
        }
    }
}

impl Drop for ThemeBinding {
    fn drop(&mut self) {
        self.detach();
    }
}

fn set_root_dark(dark: bool) {
    let root = gloo_utils::document_element();
    if let Err(e) = root.class_list().toggle_with_force(DARK_CLASS, dark) {
        warn!("Failed to toggle dark class: {:?}", e);
    }
}
