use dioxus::prelude::*;

use crate::hooks::browser::offer_download;
use crate::hooks::use_saved_qr_codes;
use crate::models::{format_timestamp, SavedQrCode};
use crate::services::image_convert::OutputFormat;
use crate::services::qr::{
    render_raster, render_svg, ErrorCorrection, QrContent, QrKind, QrStyle, VCard, WifiEncryption,
};
use crate::state::use_app_actions;
use crate::ui::layout::{Tool, ToolFrame};
use crate::ui::widgets::{
    checkbox, text_field, CopyButton, InlineError, Panel, BUTTON_CLASS, INPUT_CLASS,
    SECONDARY_BUTTON_CLASS,
};
use crate::APP_CONFIG;

const RASTER_FORMATS: [OutputFormat; 3] = [OutputFormat::Png, OutputFormat::Jpeg, OutputFormat::Webp];

#[component]
pub fn QrPanel() -> Element {
    let actions = use_app_actions();
    let saved = use_saved_qr_codes();
    let default_size = APP_CONFIG
        .get()
        .map(|config| config.default_qr_size)
        .unwrap_or(256);

    let mut content = use_signal(|| QrKind::Url.empty_content());
    let mut style = use_signal(move || QrStyle {
        size: default_size,
        ..QrStyle::default()
    });
    let mut save_name = use_signal(String::new);

    let current = content.read().clone();
    let current_style = style.read().clone();
    let rendered = current
        .payload()
        .and_then(|payload| render_svg(&payload, &current_style).map(|svg| (payload, svg)));
    let (payload, svg, error) = match rendered {
        Ok((payload, svg)) => (payload, Some(svg), None),
        Err(err) => (String::new(), None, Some(err.to_string())),
    };

    let download_svg = {
        let svg = svg.clone();
        move |_: MouseEvent| {
            if let Some(svg) = svg.as_ref() {
                offer_download(actions, "qr-code.svg", "image/svg+xml", svg.as_bytes());
            }
        }
    };

    rsx! {
        ToolFrame { tool: Tool::Qr,
            div { class: "grid gap-4 lg:grid-cols-2",
                Panel { title: "Content".to_string(),
                    label { class: "flex flex-col gap-1 text-xs text-slate-600",
                        "Type"
                        select {
                            class: INPUT_CLASS,
                            value: "{current.kind().value()}",
                            onchange: move |evt| {
                                if let Some(kind) = QrKind::from_value(&evt.value()) {
                                    content.set(kind.empty_content());
                                }
                            },
                            for kind in QrKind::ALL {
                                option { key: "{kind.value()}", value: "{kind.value()}", "{kind.label()}" }
                            }
                        }
                    }
                    {content_fields(current.clone(), content)}
                }

                Panel { title: "Style".to_string(),
                    div { class: "grid gap-2 md:grid-cols-2",
                        label { class: "flex flex-col gap-1 text-xs text-slate-600",
                            "Size: {current_style.size}px"
                            input {
                                r#type: "range",
                                min: "64",
                                max: "1024",
                                step: "32",
                                value: "{current_style.size}",
                                oninput: move |evt| {
                                    if let Ok(size) = evt.value().parse::<u32>() {
                                        style.write().size = size;
                                    }
                                },
                            }
                        }
                        label { class: "flex flex-col gap-1 text-xs text-slate-600",
                            "Error correction"
                            select {
                                class: INPUT_CLASS,
                                value: "{current_style.error_correction.value()}",
                                onchange: move |evt| {
                                    if let Some(level) = ErrorCorrection::from_value(&evt.value()) {
                                        style.write().error_correction = level;
                                    }
                                },
                                for level in ErrorCorrection::ALL {
                                    option { key: "{level.value()}", value: "{level.value()}", "{level.value()}" }
                                }
                            }
                        }
                        label { class: "flex items-center gap-2 text-xs text-slate-600",
                            "Foreground"
                            input {
                                r#type: "color",
                                value: "{current_style.foreground}",
                                oninput: move |evt| style.write().foreground = evt.value(),
                            }
                        }
                        label { class: "flex items-center gap-2 text-xs text-slate-600",
                            "Background"
                            input {
                                r#type: "color",
                                value: "{current_style.background}",
                                oninput: move |evt| style.write().background = evt.value(),
                            }
                        }
                    }
                }
            }

            Panel { title: "Preview".to_string(),
                InlineError { message: error }
                if let Some(svg) = svg.clone() {
                    div { class: "flex justify-center", dangerous_inner_html: "{svg}" }
                    div { class: "flex items-center gap-2",
                        code { class: "flex-1 truncate rounded bg-slate-100 px-2 py-1 text-[11px]", "{payload}" }
                        CopyButton { label: "QR payload".to_string(), text: payload.clone() }
                    }
                }
                div { class: "flex flex-wrap gap-2",
                    button { class: BUTTON_CLASS, disabled: svg.is_none(), onclick: download_svg, "SVG" }
                    for format in RASTER_FORMATS {
                        button {
                            key: "{format.value()}",
                            class: SECONDARY_BUTTON_CLASS,
                            disabled: svg.is_none(),
                            onclick: {
                                let payload = payload.clone();
                                let style = current_style.clone();
                                move |_| match render_raster(&payload, &style, format) {
                                    Ok(bytes) => offer_download(
                                        actions,
                                        &format!("qr-code.{}", format.extension()),
                                        format.mime(),
                                        &bytes,
                                    ),
                                    Err(err) => actions.record_failure("QR export", err),
                                }
                            },
                            "{format.label()}"
                        }
                    }
                }
            }

            Panel { title: "Saved codes".to_string(),
                div { class: "flex gap-2",
                    input {
                        class: INPUT_CLASS,
                        placeholder: "Name",
                        value: "{save_name}",
                        oninput: move |evt| save_name.set(evt.value()),
                    }
                    button {
                        class: BUTTON_CLASS,
                        disabled: svg.is_none() || save_name.read().trim().is_empty(),
                        onclick: move |_| {
                            let name = save_name.read().trim().to_string();
                            let code = SavedQrCode::new(name.clone(), content.read().clone(), style.read().clone());
                            saved.save(code, format!("Saved \"{name}\""));
                            save_name.set(String::new());
                        },
                        "Save"
                    }
                }
                if saved.records.read().is_empty() {
                    p { class: "text-xs text-slate-500 italic", "No saved codes." }
                }
                ul { class: "divide-y divide-slate-100",
                    for code in saved.records.read().iter().cloned() {
                        li { key: "{code.id}", class: "flex items-center justify-between gap-2 py-2 text-xs",
                            div {
                                p { class: "font-medium", "{code.name}" }
                                p { class: "text-[11px] text-slate-500",
                                    "{code.content.kind().label()} · {format_timestamp(code.created_at)}"
                                }
                            }
                            div { class: "flex gap-2",
                                button {
                                    class: SECONDARY_BUTTON_CLASS,
                                    onclick: {
                                        let code = code.clone();
                                        move |_| {
                                            content.set(code.content.clone());
                                            style.set(code.style.clone());
                                        }
                                    },
                                    "Load"
                                }
                                button {
                                    class: SECONDARY_BUTTON_CLASS,
                                    onclick: {
                                        let id = code.id.clone();
                                        move |_| saved.delete(&id)
                                    },
                                    "Delete"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn content_fields(current: QrContent, mut content: Signal<QrContent>) -> Element {
    match current {
        QrContent::Url { url } => text_field("URL", &url, move |value| {
            content.set(QrContent::Url { url: value })
        }),
        QrContent::Text { text } => rsx! {
            label { class: "flex flex-col gap-1 text-xs text-slate-600",
                "Text"
                textarea {
                    class: "{INPUT_CLASS} h-28",
                    value: "{text}",
                    oninput: move |evt| content.set(QrContent::Text { text: evt.value() }),
                }
            }
        },
        QrContent::Email { to, subject, body } => rsx! {
            {text_field("To", &to, move |value| {
                if let QrContent::Email { to, .. } = &mut *content.write() { *to = value; }
            })}
            {text_field("Subject", &subject, move |value| {
                if let QrContent::Email { subject, .. } = &mut *content.write() { *subject = value; }
            })}
            {text_field("Body", &body, move |value| {
                if let QrContent::Email { body, .. } = &mut *content.write() { *body = value; }
            })}
        },
        QrContent::Phone { number } => text_field("Phone number", &number, move |value| {
            content.set(QrContent::Phone { number: value })
        }),
        QrContent::Sms { number, message } => rsx! {
            {text_field("Phone number", &number, move |value| {
                if let QrContent::Sms { number, .. } = &mut *content.write() { *number = value; }
            })}
            {text_field("Message", &message, move |value| {
                if let QrContent::Sms { message, .. } = &mut *content.write() { *message = value; }
            })}
        },
        QrContent::Wifi { ssid, password, encryption, hidden } => rsx! {
            {text_field("Network name (SSID)", &ssid, move |value| {
                if let QrContent::Wifi { ssid, .. } = &mut *content.write() { *ssid = value; }
            })}
            label { class: "flex flex-col gap-1 text-xs text-slate-600",
                "Encryption"
                select {
                    class: INPUT_CLASS,
                    value: "{encryption.as_str()}",
                    onchange: move |evt| {
                        if let (QrContent::Wifi { encryption, .. }, Some(chosen)) =
                            (&mut *content.write(), WifiEncryption::parse(&evt.value()))
                        {
                            *encryption = chosen;
                        }
                    },
                    for option_value in WifiEncryption::ALL {
                        option { key: "{option_value.as_str()}", value: "{option_value.as_str()}", "{option_value.as_str()}" }
                    }
                }
            }
            if encryption != WifiEncryption::None {
                {text_field("Password", &password, move |value| {
                    if let QrContent::Wifi { password, .. } = &mut *content.write() { *password = value; }
                })}
            }
            {checkbox("Hidden network", hidden, move |on| {
                if let QrContent::Wifi { hidden, .. } = &mut *content.write() { *hidden = on; }
            })}
        },
        QrContent::Vcard(card) => vcard_fields(card, content),
    }
}

fn vcard_fields(card: VCard, mut content: Signal<QrContent>) -> Element {
    fn edit(content: &mut Signal<QrContent>, apply: impl FnOnce(&mut VCard)) {
        if let QrContent::Vcard(card) = &mut *content.write() {
            apply(card);
        }
    }

    rsx! {
        div { class: "grid gap-2 md:grid-cols-2",
            {text_field("First name", &card.first_name, move |value| edit(&mut content, |card| card.first_name = value))}
            {text_field("Last name", &card.last_name, move |value| edit(&mut content, |card| card.last_name = value))}
            {text_field("Organization", &card.organization, move |value| edit(&mut content, |card| card.organization = value))}
            {text_field("Title", &card.title, move |value| edit(&mut content, |card| card.title = value))}
            {text_field("Phone", &card.phone, move |value| edit(&mut content, |card| card.phone = value))}
            {text_field("Email", &card.email, move |value| edit(&mut content, |card| card.email = value))}
            {text_field("Website", &card.website, move |value| edit(&mut content, |card| card.website = value))}
            {text_field("Address", &card.address, move |value| edit(&mut content, |card| card.address = value))}
        }
    }
}
