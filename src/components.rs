//! Yew views: the counter screen, the settings sheet and their small building blocks.

use log::{error, info};
use pradakshina_counter::config::{ring_circumference, LONG_PRESS_MS, QUICK_GOALS, RING_RADIUS, RING_STROKE};
use pradakshina_counter::intents::CounterIntent;
use pradakshina_counter::{
    aria_label, export_file_name, history_date_label, progress_percent, ring_offset, Clock,
    HistoryEntry, PreferencesPatch, Theme,
};
use chrono::NaiveDate;
use std::rc::Rc;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::hooks::{use_app, use_long_press, use_snapshot, use_validated_input, AppContext};
use crate::utils::{alert, confirm, download_json, read_file_text, validate_target};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum IconName {
    Settings,
    Plus,
    Minus,
    Reset,
    Close,
    Download,
    Upload,
    Trash,
    Target,
    History,
    Info,
    Sun,
    Volume,
}

#[derive(Properties, PartialEq)]
pub struct IconProps {
    pub name: IconName,
    #[prop_or(24)]
    pub size: u32,
}

#[function_component(Icon)]
pub fn icon(props: &IconProps) -> Html {
    let body = match props.name {
        IconName::Settings => html! {
            <>
                <circle cx="12" cy="12" r="3" />
                <path d="M12 1v4M12 19v4M4.22 4.22l2.83 2.83M16.95 16.95l2.83 2.83M1 12h4M19 12h4M4.22 19.78l2.83-2.83M16.95 7.05l2.83-2.83" />
            </>
        },
        IconName::Plus => html! {
            <>
                <line x1="12" y1="5" x2="12" y2="19" />
                <line x1="5" y1="12" x2="19" y2="12" />
            </>
        },
        IconName::Minus => html! { <line x1="5" y1="12" x2="19" y2="12" /> },
        IconName::Reset => html! {
            <>
                <polyline points="1 4 1 10 7 10" />
                <path d="M3.51 15a9 9 0 1 0 2.13-9.36L1 10" />
            </>
        },
        IconName::Close => html! {
            <>
                <line x1="18" y1="6" x2="6" y2="18" />
                <line x1="6" y1="6" x2="18" y2="18" />
            </>
        },
        IconName::Download => html! {
            <>
                <path d="M21 15v4a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2v-4" />
                <polyline points="7 10 12 15 17 10" />
                <line x1="12" y1="15" x2="12" y2="3" />
            </>
        },
        IconName::Upload => html! {
            <>
                <path d="M21 15v4a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2v-4" />
                <polyline points="17 8 12 3 7 8" />
                <line x1="12" y1="3" x2="12" y2="15" />
            </>
        },
        IconName::Trash => html! {
            <>
                <polyline points="3 6 5 6 21 6" />
                <path d="M19 6l-1 14a2 2 0 0 1-2 2H8a2 2 0 0 1-2-2L5 6M10 11v6M14 11v6M9 6V4h6v2" />
            </>
        },
        IconName::Target => html! {
            <>
                <circle cx="12" cy="12" r="10" />
                <circle cx="12" cy="12" r="6" />
                <circle cx="12" cy="12" r="2" />
            </>
        },
        IconName::History => html! {
            <>
                <circle cx="12" cy="12" r="10" />
                <polyline points="12 6 12 12 16 14" />
            </>
        },
        IconName::Info => html! {
            <>
                <circle cx="12" cy="12" r="10" />
                <line x1="12" y1="16" x2="12" y2="12" />
                <line x1="12" y1="8" x2="12.01" y2="8" />
            </>
        },
        IconName::Sun => html! {
            <>
                <circle cx="12" cy="12" r="5" />
                <path d="M12 1v2M12 21v2M4.22 4.22l1.42 1.42M18.36 18.36l1.42 1.42M1 12h2M21 12h2M4.22 19.78l1.42-1.42M18.36 5.64l1.42-1.42" />
            </>
        },
        IconName::Volume => html! {
            <>
                <polygon points="11 5 6 9 2 9 2 15 6 15 11 19 11 5" />
                <path d="M15.54 8.46a5 5 0 0 1 0 7.07M19.07 4.93a10 10 0 0 1 0 14.14" />
            </>
        },
    };

    let size = props.size.to_string();
    html! {
        <svg class="icon" width={size.clone()} height={size} viewBox="0 0 24 24"
            fill="none" stroke="currentColor" stroke-width="2"
            stroke-linecap="round" stroke-linejoin="round" aria-hidden="true">
            { body }
        </svg>
    }
}

// ── Counter ────────────────────────────────────────────────────────────────

#[derive(Properties, PartialEq)]
pub struct CounterViewProps {
    pub on_open_settings: Callback<()>,
}

/// Main screen: progress ring, +/- buttons, target field, quick goals and resets.
#[function_component(CounterView)]
pub fn counter_view(props: &CounterViewProps) -> Html {
    let app = use_app();
    let snapshot = use_snapshot();
    let state = &snapshot.state;
    let prefs = &snapshot.preferences;

    let intent = |intent: CounterIntent| {
        let app = app.clone();
        Callback::from(move |_: MouseEvent| app.run(intent))
    };

    let target_input = {
        let app = app.clone();
        use_validated_input(
            f64::from(state.target),
            Rc::new(validate_target) as Rc<dyn Fn(&str) -> Result<f64, String>>,
            Callback::from(move |target: f64| app.run(CounterIntent::SetTarget(target))),
        )
    };

    let long_press = {
        let app = app.clone();
        use_long_press(
            prefs.long_press_enabled,
            LONG_PRESS_MS,
            Callback::from(move |_| app.run(CounterIntent::ResetCount)),
        )
    };

    let on_ring_click = {
        let app = app.clone();
        let take_fired = long_press.take_fired.clone();
        let tap_on_ring = prefs.tap_on_ring;
        Callback::from(move |_: MouseEvent| {
            if take_fired() {
                return;
            }
            if tap_on_ring {
                app.run(CounterIntent::Increment);
            }
        })
    };

    let on_target_change = {
        let commit = target_input.on_commit.clone();
        Callback::from(move |_: Event| commit.emit(()))
    };

    let open_settings = {
        let cb = props.on_open_settings.clone();
        Callback::from(move |_: MouseEvent| cb.emit(()))
    };

    let progress = progress_percent(state.count, state.target);
    let circumference = ring_circumference();
    let offset = ring_offset(progress, circumference);
    let size = RING_RADIUS * 2.0 + RING_STROKE * 2.0;
    let center = size / 2.0;

    html! {
        <div class={classes!("counter", state.is_complete().then_some("complete"))}>
            <header class="counter-header">
                <h1 class="app-title">{ "Pradakshina" }</h1>
                <button class="icon-button" onclick={open_settings} aria-label="Open settings">
                    <Icon name={IconName::Settings} />
                </button>
            </header>

            <div class={classes!("ring", prefs.tap_on_ring.then_some("tappable"))}
                role="progressbar"
                aria-label={aria_label(state.count, state.target)}
                aria-valuemin="0"
                aria-valuemax={state.target.to_string()}
                aria-valuenow={state.count.to_string()}
                onclick={on_ring_click}
                onpointerdown={long_press.on_pointer_down.clone()}
                onpointerup={long_press.on_pointer_up.clone()}
                onpointerleave={long_press.on_pointer_leave.clone()}>
                <svg viewBox={format!("0 0 {size} {size}")}>
                    <circle class="ring-track" cx={center.to_string()} cy={center.to_string()}
                        r={RING_RADIUS.to_string()} stroke-width={RING_STROKE.to_string()} fill="none" />
                    <circle class="ring-progress" cx={center.to_string()} cy={center.to_string()}
                        r={RING_RADIUS.to_string()} stroke-width={RING_STROKE.to_string()} fill="none"
                        stroke-linecap="round"
                        stroke-dasharray={format!("{:.3}", circumference)}
                        stroke-dashoffset={format!("{:.3}", offset)}
                        transform={format!("rotate(-90 {center} {center})")} />
                </svg>
                <div class="ring-label">
                    <span class="count">{ state.count }</span>
                    <span class="of-target">{ format!("of {}", state.target) }</span>
                </div>
            </div>

            if state.is_complete() {
                <p class="goal-banner">{ "Goal reached!" }</p>
            }

            <div class="step-buttons">
                <button class="step minus" onclick={intent(CounterIntent::Decrement)}
                    disabled={state.count == 0} aria-label="Decrement">
                    <Icon name={IconName::Minus} size={32} />
                </button>
                <button class="step plus" onclick={intent(CounterIntent::Increment)}
                    disabled={state.is_complete()} aria-label="Increment">
                    <Icon name={IconName::Plus} size={32} />
                </button>
            </div>

            <div class="target-row">
                <label for="target-input"><Icon name={IconName::Target} size={16} />{ " Target" }</label>
                <input id="target-input" type="number" min="1" inputmode="numeric"
                    value={target_input.text.clone()}
                    oninput={target_input.on_text_input.clone()}
                    onchange={on_target_change} />
                if let Some(err) = &target_input.error {
                    <span class="field-error">{ err }</span>
                }
            </div>

            <div class="quick-goals">
                { for QUICK_GOALS.iter().map(|&goal| html! {
                    <button class={classes!("chip", (goal == state.target).then_some("active"))}
                        onclick={intent(CounterIntent::QuickGoal(goal))}>
                        { goal }
                    </button>
                }) }
            </div>

            <div class="reset-buttons">
                <button class="secondary" onclick={intent(CounterIntent::ResetCount)}>
                    <Icon name={IconName::Reset} size={16} />{ " Reset count" }
                </button>
                <button class="secondary" onclick={intent(CounterIntent::ResetAll)}>
                    <Icon name={IconName::Reset} size={16} />{ " Reset all" }
                </button>
            </div>
        </div>
    }
}

// ── Settings ───────────────────────────────────────────────────────────────

#[derive(Properties, PartialEq)]
pub struct SheetProps {
    pub on_close: Callback<()>,
    #[prop_or_default]
    pub children: Html,
}

/// Bottom sheet with a backdrop; clicking the backdrop closes it.
#[function_component(Sheet)]
pub fn sheet(props: &SheetProps) -> Html {
    let close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };
    let keep_open = Callback::from(|e: MouseEvent| e.stop_propagation());

    html! {
        <div class="sheet-backdrop open" onclick={close.clone()}>
            <div class="sheet-content open" onclick={keep_open} role="dialog" aria-modal="true">
                <div class="sheet-header">
                    <div class="sheet-handle"></div>
                    <button class="sheet-close" onclick={close} aria-label="Close">
                        <Icon name={IconName::Close} size={20} />
                    </button>
                </div>
                <div class="sheet-body">
                    { props.children.clone() }
                </div>
            </div>
        </div>
    }
}

/// Newest first, one row per day.
pub fn render_history(history: &[HistoryEntry], today: NaiveDate) -> Html {
    if history.is_empty() {
        return html! {
            <p class="no-history">{ "No history yet. Start counting to see your progress!" }</p>
        };
    }

    html! {
        <div class="history-list">
            { for history.iter().rev().map(|entry| html! {
                <div class="history-item">
                    <span class="history-date">{ history_date_label(entry.date, today) }</span>
                    <span class="history-count">{ format!("{} rounds", entry.total) }</span>
                </div>
            }) }
        </div>
    }
}

/// Checkbox `change` handler that saves one boolean preference.
fn preference_toggle(app: &AppContext, patch: fn(bool) -> PreferencesPatch) -> Callback<Event> {
    let app = app.clone();
    Callback::from(move |e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        app.update_preferences(patch(input.checked()));
    })
}

#[derive(Properties, PartialEq)]
pub struct SettingsSheetProps {
    pub on_close: Callback<()>,
}

#[function_component(SettingsSheet)]
pub fn settings_sheet(props: &SettingsSheetProps) -> Html {
    let app = use_app();
    let snapshot = use_snapshot();
    let prefs = &snapshot.preferences;
    let file_input = use_node_ref();
    let today = app.manager.borrow().clock().today();

    let on_theme = {
        let app = app.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            match select.value().parse::<Theme>() {
                Ok(theme) => app.update_preferences(PreferencesPatch::theme(theme)),
                Err(e) => error!("{}", e),
            }
        })
    };

    let on_audio = preference_toggle(&app, |on| PreferencesPatch {
        audio_enabled: Some(on),
        ..PreferencesPatch::default()
    });
    let on_haptics = preference_toggle(&app, |on| PreferencesPatch {
        haptics_enabled: Some(on),
        ..PreferencesPatch::default()
    });
    let on_tap_on_ring = preference_toggle(&app, |on| PreferencesPatch {
        tap_on_ring: Some(on),
        ..PreferencesPatch::default()
    });
    let on_long_press = preference_toggle(&app, |on| PreferencesPatch {
        long_press_enabled: Some(on),
        ..PreferencesPatch::default()
    });

    let on_clear_history = {
        let app = app.clone();
        Callback::from(move |_: MouseEvent| {
            if !confirm("Are you sure you want to clear all history? This cannot be undone.") {
                return;
            }
            if let Err(e) = app.manager.borrow_mut().clear_history() {
                error!("Clearing history failed: {}", e);
            }
        })
    };

    let on_export = {
        let app = app.clone();
        Callback::from(move |_: MouseEvent| {
            let (data, today) = {
                let manager = app.manager.borrow();
                (manager.export_data(), manager.clock().today())
            };
            let result = data
                .map_err(|e| e.to_string())
                .and_then(|json| {
                    download_json(&export_file_name(today), &json).map_err(|e| format!("{:?}", e))
                });
            match result {
                Ok(()) => info!("Exported data"),
                Err(e) => error!("Export failed: {}", e),
            }
        })
    };

    let on_import_click = {
        let file_input = file_input.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(input) = file_input.cast::<HtmlInputElement>() {
                input.click();
            }
        })
    };

    let on_file_selected = {
        let app = app.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let file = input.files().and_then(|files| files.get(0));
            // allow picking the same file again
            input.set_value("");
            let Some(file) = file else {
                return;
            };
            let app = app.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let imported = match read_file_text(file).await {
                    Ok(text) => app.manager.borrow_mut().import_data(&text).is_ok(),
                    Err(e) => {
                        error!("Reading import file failed: {:?}", e);
                        false
                    }
                };
                if imported {
                    alert("Data imported successfully!");
                } else {
                    alert("Failed to import data. Please check the file format.");
                }
            });
        })
    };

    html! {
        <Sheet on_close={props.on_close.clone()}>
            <div class="settings-content">
                <h2 class="settings-title">{ "Settings" }</h2>

                <section class="settings-section">
                    <h3 class="section-title"><Icon name={IconName::Sun} size={20} />{ " Theme" }</h3>
                    <div class="setting-item">
                        <label for="theme-select" class="setting-label">{ "Appearance" }</label>
                        <select id="theme-select" class="setting-select" onchange={on_theme}>
                            { for Theme::ALL.iter().map(|&theme| html! {
                                <option value={theme.as_str()} selected={theme == prefs.theme}>
                                    { theme.label() }
                                </option>
                            }) }
                        </select>
                    </div>
                </section>

                <section class="settings-section">
                    <h3 class="section-title"><Icon name={IconName::Volume} size={20} />{ " Feedback" }</h3>
                    { toggle_row("audio-toggle", "Audio", prefs.audio_enabled, on_audio) }
                    { toggle_row("haptics-toggle", "Haptics", prefs.haptics_enabled, on_haptics) }
                    { toggle_row("tap-ring-toggle", "Tap ring to count", prefs.tap_on_ring, on_tap_on_ring) }
                    { toggle_row("long-press-toggle", "Hold ring to reset", prefs.long_press_enabled, on_long_press) }
                </section>

                <section class="settings-section">
                    <h3 class="section-title"><Icon name={IconName::History} size={20} />{ " History" }</h3>
                    { render_history(&snapshot.history, today) }
                    if !snapshot.history.is_empty() {
                        <button class="danger-button" onclick={on_clear_history} aria-label="Clear history">
                            <Icon name={IconName::Trash} size={16} />{ " Clear History" }
                        </button>
                    }
                </section>

                <section class="settings-section">
                    <h3 class="section-title"><Icon name={IconName::Download} size={20} />{ " Data" }</h3>
                    <div class="data-actions">
                        <button class="action-button" onclick={on_export} aria-label="Export data">
                            <Icon name={IconName::Download} size={16} />{ " Export" }
                        </button>
                        <button class="action-button" onclick={on_import_click} aria-label="Import data">
                            <Icon name={IconName::Upload} size={16} />{ " Import" }
                        </button>
                    </div>
                    <input ref={file_input} type="file" accept=".json,application/json"
                        class="file-input" style="display: none;" onchange={on_file_selected} />
                </section>

                <section class="settings-section">
                    <h3 class="section-title"><Icon name={IconName::Info} size={20} />{ " About" }</h3>
                    <p class="app-description">
                        { "Pradakshina Counter is a mobile-first app for counting rounds. \
                           Your data is stored locally and never shared." }
                    </p>
                    <p class="app-version">{ format!("Version {}", env!("CARGO_PKG_VERSION")) }</p>
                </section>
            </div>
        </Sheet>
    }
}

fn toggle_row(id: &'static str, label: &'static str, checked: bool, onchange: Callback<Event>) -> Html {
    html! {
        <div class="setting-item">
            <label for={id} class="setting-label">{ label }</label>
            <input type="checkbox" class="toggle-input" id={id} {checked} {onchange} />
        </div>
    }
}
