use dioxus::prelude::*;
use rand::rngs::OsRng;

use crate::services::password::{
    generate_passphrase, generate_password, strength, PassphraseOptions, PasswordHistory,
    PasswordOptions, Strength, MAX_LENGTH, MIN_LENGTH,
};
use crate::ui::layout::{Tool, ToolFrame};
use crate::ui::widgets::{checkbox, CopyButton, Panel, BUTTON_CLASS, INPUT_CLASS, SECONDARY_BUTTON_CLASS};
use crate::APP_CONFIG;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Password,
    Passphrase,
}

#[component]
pub fn PasswordPanel() -> Element {
    let default_length = APP_CONFIG
        .get()
        .map(|config| config.default_password_length)
        .unwrap_or(16);

    let mut mode = use_signal(|| Mode::Password);
    let mut options = use_signal(move || PasswordOptions::with_length(default_length));
    let mut phrase = use_signal(PassphraseOptions::default);
    let mut output = use_signal(String::new);
    let mut history = use_signal(PasswordHistory::default);

    let generate = move |_: MouseEvent| {
        let value = match mode() {
            Mode::Password => generate_password(&options.read(), &mut OsRng),
            Mode::Passphrase => generate_passphrase(&phrase.read(), &mut OsRng),
        };
        history.write().push(value.clone());
        output.set(value);
    };

    let current = output();
    let rating = strength(&current);
    let pool_empty = mode() == Mode::Password && options.read().pool().is_empty();
    let opts = *options.read();
    let phrase_opts = phrase.read().clone();

    rsx! {
        ToolFrame { tool: Tool::Password,
            Panel { title: "Generator".to_string(),
                div { class: "flex gap-2 text-xs",
                    button {
                        class: if mode() == Mode::Password { BUTTON_CLASS } else { SECONDARY_BUTTON_CLASS },
                        onclick: move |_| mode.set(Mode::Password),
                        "Password"
                    }
                    button {
                        class: if mode() == Mode::Passphrase { BUTTON_CLASS } else { SECONDARY_BUTTON_CLASS },
                        onclick: move |_| mode.set(Mode::Passphrase),
                        "Passphrase"
                    }
                }

                if mode() == Mode::Password {
                    div { class: "grid gap-2 text-xs md:grid-cols-2",
                        label { class: "flex flex-col gap-1 md:col-span-2",
                            "Length: {opts.length}"
                            input {
                                r#type: "range",
                                min: "{MIN_LENGTH}",
                                max: "{MAX_LENGTH}",
                                value: "{opts.length}",
                                oninput: move |evt| {
                                    if let Ok(length) = evt.value().parse::<usize>() {
                                        options.write().length = length.clamp(MIN_LENGTH, MAX_LENGTH);
                                    }
                                },
                            }
                        }
                        {checkbox("Lowercase (a-z)", opts.lowercase, move |on| options.write().lowercase = on)}
                        {checkbox("Uppercase (A-Z)", opts.uppercase, move |on| options.write().uppercase = on)}
                        {checkbox("Digits (0-9)", opts.digits, move |on| options.write().digits = on)}
                        {checkbox("Symbols", opts.symbols, move |on| options.write().symbols = on)}
                        {checkbox("Exclude look-alikes (il1Lo0O)", opts.exclude_confusing, move |on| options.write().exclude_confusing = on)}
                    }
                } else {
                    div { class: "grid gap-2 text-xs md:grid-cols-2",
                        label { class: "flex flex-col gap-1",
                            "Words"
                            input {
                                class: INPUT_CLASS,
                                r#type: "number",
                                min: "3",
                                max: "10",
                                value: "{phrase_opts.words}",
                                oninput: move |evt| {
                                    if let Ok(words) = evt.value().parse::<usize>() {
                                        phrase.write().words = words.clamp(3, 10);
                                    }
                                },
                            }
                        }
                        label { class: "flex flex-col gap-1",
                            "Separator"
                            input {
                                class: INPUT_CLASS,
                                value: "{phrase_opts.separator}",
                                oninput: move |evt| phrase.write().separator = evt.value(),
                            }
                        }
                        {checkbox("Capitalize words", phrase_opts.capitalize, move |on| phrase.write().capitalize = on)}
                        {checkbox("Append a number", phrase_opts.append_number, move |on| phrase.write().append_number = on)}
                    }
                }

                if pool_empty {
                    p { class: "text-xs text-amber-600", "Select at least one character class." }
                }
                button { class: BUTTON_CLASS, disabled: pool_empty, onclick: generate, "Generate" }

                div { class: "flex items-center gap-2",
                    input { class: "{INPUT_CLASS} font-mono", readonly: true, value: "{current}" }
                    CopyButton { label: "Password".to_string(), text: current.clone() }
                }
                if !current.is_empty() {
                    {strength_meter(rating)}
                }
            }

            Panel {
                title: "History".to_string(),
                subtitle: Some("Kept in memory only; cleared when the page closes.".to_string()),
                if history.read().is_empty() {
                    p { class: "text-xs text-slate-500 italic", "Nothing generated yet." }
                } else {
                    ul { class: "space-y-1",
                        for (index, entry) in history.read().entries().cloned().enumerate() {
                            li { key: "{index}", class: "flex items-center justify-between gap-2 text-xs",
                                span { class: "font-mono break-all", "{entry.value}" }
                                span { class: "rounded px-1.5 text-white {entry.strength.color_class()}", "{entry.strength.label()}" }
                            }
                        }
                    }
                    button { class: SECONDARY_BUTTON_CLASS, onclick: move |_| history.write().clear(), "Clear history" }
                }
            }
        }
    }
}

fn strength_meter(rating: Strength) -> Element {
    let filled = rating.score() as usize + 1;
    let segments: Vec<&'static str> = (0..5)
        .map(|segment| if segment < filled { rating.color_class() } else { "bg-slate-200" })
        .collect();
    rsx! {
        div { class: "space-y-1",
            div { class: "flex gap-1",
                for (index, color) in segments.into_iter().enumerate() {
                    div { key: "{index}", class: "h-1.5 flex-1 rounded {color}" }
                }
            }
            p { class: "text-xs text-slate-600", "Strength: {rating.label()}" }
        }
    }
}
