use dioxus::prelude::*;

use crate::hooks::browser::offer_download;
use crate::hooks::conversion::use_conversion;
use crate::services::browser::format_bytes;
use crate::services::image_convert::{bundle, ConversionStatus, ConvertOptions, OutputFormat};
use crate::state::use_app_actions;
use crate::ui::layout::{Tool, ToolFrame};
use crate::ui::widgets::{
    read_uploads, upload_limit, Panel, BUTTON_CLASS, INPUT_CLASS, SECONDARY_BUTTON_CLASS,
};
use crate::APP_CONFIG;

#[component]
pub fn ImageConverterPanel() -> Element {
    let actions = use_app_actions();
    let conversion = use_conversion();
    let default_quality = APP_CONFIG
        .get()
        .map(|config| config.default_image_quality)
        .unwrap_or(90);
    let mut options = use_signal(move || ConvertOptions {
        quality: default_quality,
        ..ConvertOptions::default()
    });

    let on_upload = move |evt: FormEvent| async move {
        let files = read_uploads(&evt).await;
        conversion.start(files, *options.read(), upload_limit());
    };

    let on_zip = move |_: MouseEvent| match bundle(&conversion.outputs.read()) {
        Ok(bytes) => offer_download(actions, "converted-images.zip", "application/zip", &bytes),
        Err(err) => actions.record_failure("Bundling images", err),
    };

    let current = *options.read();
    let running = *conversion.is_running.read();
    let done = conversion.outputs.read().len();

    rsx! {
        ToolFrame { tool: Tool::Images,
            Panel { title: "Settings".to_string(),
                div { class: "grid gap-2 md:grid-cols-2",
                    label { class: "flex flex-col gap-1 text-xs text-slate-600",
                        "Output format"
                        select {
                            class: INPUT_CLASS,
                            value: "{current.format.value()}",
                            onchange: move |evt| {
                                if let Some(format) = OutputFormat::from_value(&evt.value()) {
                                    options.write().format = format;
                                }
                            },
                            for format in OutputFormat::ALL {
                                option { key: "{format.value()}", value: "{format.value()}", "{format.label()}" }
                            }
                        }
                    }
                    if current.format.supports_quality() {
                        label { class: "flex flex-col gap-1 text-xs text-slate-600",
                            "Quality: {current.quality}"
                            input {
                                r#type: "range",
                                min: "1",
                                max: "100",
                                value: "{current.quality}",
                                oninput: move |evt| {
                                    if let Ok(quality) = evt.value().parse::<u8>() {
                                        options.write().quality = quality.clamp(1, 100);
                                    }
                                },
                            }
                        }
                    }
                }
                input {
                    r#type: "file",
                    accept: "image/*",
                    multiple: true,
                    disabled: running,
                    onchange: on_upload,
                }
                p { class: "text-xs text-slate-500",
                    "Choosing files starts the conversion. Limit per file: {format_bytes(upload_limit() as usize)}."
                }
            }

            Panel { title: "Results".to_string(),
                if conversion.jobs.read().is_empty() {
                    p { class: "text-xs text-slate-500 italic", "No images converted yet." }
                }
                ul { class: "divide-y divide-slate-100",
                    for (index, job) in conversion.jobs.read().iter().cloned().enumerate() {
                        li { key: "{index}", class: "flex items-center justify-between gap-2 py-1.5 text-xs",
                            span { class: "truncate", "{job.name} ({format_bytes(job.input_size)})" }
                            {status_badge(&job.status)}
                        }
                    }
                }
                div { class: "flex flex-wrap gap-2",
                    for file in conversion.outputs.read().iter().cloned() {
                        button {
                            key: "{file.name}",
                            class: SECONDARY_BUTTON_CLASS,
                            onclick: move |_| offer_download(actions, &file.name, file.mime, &file.bytes),
                            "{file.name} ({file.width}×{file.height})"
                        }
                    }
                }
                div { class: "flex gap-2",
                    button { class: BUTTON_CLASS, disabled: running || done == 0, onclick: on_zip, "Download all as ZIP" }
                    button { class: SECONDARY_BUTTON_CLASS, disabled: running, onclick: move |_| conversion.clear(), "Clear" }
                }
            }
        }
    }
}

fn status_badge(status: &ConversionStatus) -> Element {
    match status {
        ConversionStatus::Pending => rsx! { span { class: "text-slate-400", "Pending" } },
        ConversionStatus::Converting => rsx! { span { class: "text-sky-600", "Converting…" } },
        ConversionStatus::Done { output_size } => rsx! {
            span { class: "text-emerald-600", "Done, {format_bytes(*output_size)}" }
        },
        ConversionStatus::Failed(reason) => rsx! { span { class: "text-red-600", "{reason}" } },
    }
}
