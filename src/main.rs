//! Entry point for the Pradakshina counter using Yew.
//! Builds the state manager, binds the theme and mounts the views.

use log::{info, warn};
use pradakshina_counter::feedback::BrowserFeedback;
use pradakshina_counter::route::Route;
use pradakshina_counter::theme::ThemeBinding;
use pradakshina_counter::{AppStorage, StateEvent, StateManager, SystemClock};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use yew::prelude::*;

mod components;
mod hooks;
mod utils;

use components::{CounterView, SettingsSheet};
use hooks::AppContext;
use utils::{current_path, push_route, replace_route, set_title};

/// Route for the current location; unknown paths are rewritten to the counter.
fn resolve_location() -> Route {
    let path = current_path();
    Route::recognize(&path).unwrap_or_else(|| {
        warn!("Unknown path {}, redirecting to the counter", path);
        replace_route(Route::Counter);
        Route::Counter
    })
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub context: AppContext,
}

/// Root component: provides the shared context and switches views by route.
#[function_component(App)]
fn app(props: &AppProps) -> Html {
    let route = use_state(resolve_location);

    // back/forward buttons
    {
        let route = route.clone();
        use_effect_with((), move |_| {
            let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
                route.set(resolve_location());
            });
            let window = gloo_utils::window();
            if let Err(e) =
                window.add_event_listener_with_callback("popstate", listener.as_ref().unchecked_ref())
            {
                warn!("Could not listen for navigation: {:?}", e);
            }
            move || {
                let _ = window.remove_event_listener_with_callback(
                    "popstate",
                    listener.as_ref().unchecked_ref(),
                );
            }
        });
    }

    use_effect_with(*route, |route| {
        set_title(&route.title());
        || ()
    });

    let navigate = |target: Route| {
        let route = route.clone();
        Callback::from(move |_: ()| {
            if *route != target {
                push_route(target);
                route.set(target);
            }
        })
    };

    html! {
        <ContextProvider<AppContext> context={props.context.clone()}>
            <main class="app">
                <CounterView on_open_settings={navigate(Route::Settings)} />
                if *route == Route::Settings {
                    <SettingsSheet on_close={navigate(Route::Counter)} />
                }
            </main>
        </ContextProvider<AppContext>>
    }
}

fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    let mut manager = StateManager::load(AppStorage::detect(), SystemClock);

    let theme = Rc::new(RefCell::new(ThemeBinding::new()));
    theme.borrow_mut().apply(manager.preferences().theme);
    {
        let theme = theme.clone();
        // Imports also report a theme change, so the page picks up the imported theme.
        manager.subscribe(move |event| {
            if let StateEvent::PreferencesChanged {
                preferences,
                theme_changed: true,
            } = event
            {
                theme.borrow_mut().apply(preferences.theme);
            }
        });
    }

    info!("Starting {} v{}", pradakshina_counter::config::APP_TITLE, env!("CARGO_PKG_VERSION"));

    let context = AppContext {
        manager: Rc::new(RefCell::new(manager)),
        feedback: Rc::new(BrowserFeedback::browser()),
    };
    yew::Renderer::<App>::with_props(AppProps { context }).render();
}
