use dioxus::prelude::*;
use tracing::warn;

use crate::config::AppConfig;
use crate::hooks::browser::copy_to_clipboard;
use crate::state::use_app_actions;
use crate::APP_CONFIG;

pub const INPUT_CLASS: &str =
    "w-full rounded border border-slate-300 px-2 py-1 text-sm text-slate-900 focus:border-slate-500 focus:outline-none";
pub const BUTTON_CLASS: &str =
    "rounded bg-slate-900 px-3 py-1.5 text-xs font-semibold text-white transition hover:bg-slate-700 disabled:opacity-40";
pub const SECONDARY_BUTTON_CLASS: &str =
    "rounded border border-slate-300 px-3 py-1.5 text-xs text-slate-700 transition hover:border-slate-500 disabled:opacity-40";

#[component]
pub fn Panel(title: String, #[props(default)] subtitle: Option<String>, children: Element) -> Element {
    rsx! {
        section { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm space-y-3 text-slate-900",
            header { class: "flex flex-col gap-1",
                h2 { class: "text-sm font-semibold text-slate-800", "{title}" }
                if let Some(subtitle) = subtitle {
                    p { class: "text-xs text-slate-500", "{subtitle}" }
                }
            }
            {children}
        }
    }
}

#[component]
pub fn InlineError(message: Option<String>) -> Element {
    match message {
        Some(message) => rsx! { p { class: "text-xs text-red-600", "{message}" } },
        None => rsx! { Fragment {} },
    }
}

#[component]
pub fn CopyButton(label: String, text: String) -> Element {
    let actions = use_app_actions();
    let disabled = text.is_empty();
    rsx! {
        button {
            class: SECONDARY_BUTTON_CLASS,
            disabled,
            onclick: move |_| copy_to_clipboard(actions, label.clone(), text.clone()),
            "Copy"
        }
    }
}

pub fn upload_limit() -> u64 {
    APP_CONFIG
        .get()
        .map(|config| config.max_upload_bytes)
        .unwrap_or_else(|| AppConfig::default().max_upload_bytes)
}

/// Files chosen in an `<input type="file">`, in selection order.
pub async fn read_uploads(evt: &FormEvent) -> Vec<(String, Vec<u8>)> {
    let Some(engine) = evt.files() else {
        return Vec::new();
    };
    let mut uploads = Vec::new();
    for name in engine.files() {
        match engine.read_file(&name).await {
            Some(bytes) => uploads.push((name, bytes)),
            None => warn!(%name, "file could not be read"),
        }
    }
    uploads
}

pub async fn read_upload_text(evt: &FormEvent) -> Option<(String, String)> {
    let engine = evt.files()?;
    let name = engine.files().into_iter().next()?;
    let text = engine.read_file_to_string(&name).await?;
    Some((name, text))
}

pub fn text_field(
    label: &'static str,
    value: &str,
    mut on_input: impl FnMut(String) + 'static,
) -> Element {
    rsx! {
        label { class: "flex flex-col gap-1 text-xs text-slate-600",
            "{label}"
            input {
                class: INPUT_CLASS,
                value: "{value}",
                oninput: move |evt| on_input(evt.value()),
            }
        }
    }
}

pub fn checkbox(label: &'static str, checked: bool, mut on_change: impl FnMut(bool) + 'static) -> Element {
    rsx! {
        label { class: "flex items-center gap-2 text-xs text-slate-600",
            input {
                r#type: "checkbox",
                checked,
                onchange: move |evt| on_change(evt.checked()),
            }
            "{label}"
        }
    }
}
