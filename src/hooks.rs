use gloo_timers::callback::Timeout;
use log::error;
use pradakshina_counter::feedback::BrowserFeedback;
use pradakshina_counter::intents::{dispatch, CounterIntent};
use pradakshina_counter::{AppStateManager, PreferencesPatch, Snapshot};
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Everything the views share, owned by `main` and handed down as context.
#[derive(Clone)]
pub struct AppContext {
    pub manager: Rc<RefCell<AppStateManager>>,
    pub feedback: Rc<BrowserFeedback>,
}

impl PartialEq for AppContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.manager, &other.manager) && Rc::ptr_eq(&self.feedback, &other.feedback)
    }
}

impl AppContext {
    /// Run a counter intent and play whatever feedback it asks for.
    pub fn run(&self, intent: CounterIntent) {
        let result = dispatch(&mut self.manager.borrow_mut(), intent);
        match result {
            Ok(cues) => {
                // read after the mutation so a just-toggled preference applies
                let prefs = self.manager.borrow().preferences().clone();
                self.feedback.emit(&prefs, &cues);
            }
            Err(e) => error!("{:?} failed: {}", intent, e),
        }
    }

    pub fn update_preferences(&self, patch: PreferencesPatch) {
        if let Err(e) = self.manager.borrow_mut().update_preferences(patch) {
            error!("Saving preferences failed: {}", e);
        }
    }
}

#[hook]
pub fn use_app() -> AppContext {
    use_context::<AppContext>().expect("AppContext must be provided by App")
}

/// Current snapshot of all records; re-renders the caller on every change.
#[hook]
pub fn use_snapshot() -> Snapshot {
    let app = use_app();
    let force_update = use_force_update();

    {
        let manager = app.manager.clone();
        use_effect_with((), move |_| {
            let id = manager
                .borrow_mut()
                .subscribe(move |_| force_update.force_update());
            move || {
                manager.borrow_mut().unsubscribe(id);
            }
        });
    }

    let snapshot = app.manager.borrow().snapshot();
    snapshot
}

/// Holds the state and callbacks for a validated input field.
#[derive(Clone)]
pub struct ValidatedInput<T: Clone + PartialEq + 'static> {
    /// The current text content of the input field.
    pub text: String,
    /// An optional error message if validation failed.
    pub error: Option<String>,
    /// Callback for the text input's `oninput` event.
    pub on_text_input: Callback<InputEvent>,
    /// Parse the current text and, if valid, hand the value to `on_valid`.
    pub on_commit: Callback<()>,
    _value: std::marker::PhantomData<T>,
}

/// Text field state with parse-on-commit. Valid values are passed to
/// `on_valid`; invalid text keeps its content and shows the error.
#[hook]
pub fn use_validated_input<T: Clone + PartialEq + std::fmt::Display + 'static>(
    initial_value: T,
    parse_and_validate: Rc<dyn Fn(&str) -> Result<T, String>>,
    on_valid: Callback<T>,
) -> ValidatedInput<T> {
    let text_state_handle: UseStateHandle<String> = use_state(|| initial_value.to_string());
    let error_state_handle: UseStateHandle<Option<String>> = use_state(|| None::<String>);

    let on_text_input = {
        let text_setter = text_state_handle.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            text_setter.set(input.value());
        })
    };

    let on_commit = {
        let current_text_handle = text_state_handle.clone();
        let error_setter = error_state_handle.clone();
        Callback::from(move |_| match parse_and_validate(current_text_handle.as_str()) {
            Ok(parsed_val) => {
                error_setter.set(None);
                on_valid.emit(parsed_val);
            }
            Err(err_msg) => error_setter.set(Some(err_msg)),
        })
    };

    // Follow the value when it changes elsewhere (quick goals, reset all, import)
    {
        let text_setter = text_state_handle.clone();
        let error_setter = error_state_handle.clone();
        use_effect_with(initial_value, move |value| {
            text_setter.set(value.to_string());
            error_setter.set(None);
            || ()
        });
    }

    ValidatedInput {
        text: (*text_state_handle).clone(),
        error: (*error_state_handle).clone(),
        on_text_input,
        on_commit,
        _value: std::marker::PhantomData,
    }
}

/// Pointer handlers for press-and-hold detection.
#[derive(Clone)]
pub struct LongPress {
    pub on_pointer_down: Callback<PointerEvent>,
    pub on_pointer_up: Callback<PointerEvent>,
    pub on_pointer_leave: Callback<PointerEvent>,
    /// Set when the last press turned into a long press; the following click
    /// should be ignored. Reading it clears it.
    pub take_fired: Rc<dyn Fn() -> bool>,
}

#[hook]
pub fn use_long_press(enabled: bool, delay_ms: u32, on_long_press: Callback<()>) -> LongPress {
    let timer = use_mut_ref(|| None::<Timeout>);
    let fired = use_mut_ref(|| false);

    let on_pointer_down = {
        let timer = timer.clone();
        let fired = fired.clone();
        Callback::from(move |_: PointerEvent| {
            *fired.borrow_mut() = false;
            if !enabled {
                return;
            }
            let fired = fired.clone();
            let on_long_press = on_long_press.clone();
            let handle = Timeout::new(delay_ms, move || {
                *fired.borrow_mut() = true;
                on_long_press.emit(());
            });
            // replacing the handle drops (cancels) any earlier timer
            *timer.borrow_mut() = Some(handle);
        })
    };

    let cancel = {
        let timer = timer.clone();
        Callback::from(move |_: PointerEvent| {
            timer.borrow_mut().take();
        })
    };

    let take_fired = {
        let fired = fired.clone();
        Rc::new(move || std::mem::replace(&mut *fired.borrow_mut(), false)) as Rc<dyn Fn() -> bool>
    };

    LongPress {
        on_pointer_down,
        on_pointer_up: cancel.clone(),
        on_pointer_leave: cancel,
        take_fired,
    }
}
