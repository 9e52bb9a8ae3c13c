use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use tracing::info;

use crate::hooks::browser::offer_download;
use crate::services::browser::format_bytes;
use crate::services::image_convert::check_size;
use crate::services::pdf::{compress, merge, move_entry, split, split_to_zip, PdfFile};
use crate::state::use_app_actions;
use crate::ui::layout::{Tool, ToolFrame};
use crate::ui::widgets::{
    read_uploads, upload_limit, Panel, BUTTON_CLASS, SECONDARY_BUTTON_CLASS,
};

const PDF_MIME: &str = "application/pdf";

#[component]
pub fn PdfPanel() -> Element {
    let actions = use_app_actions();
    let mut files = use_signal(Vec::<PdfFile>::new);
    let mut selected = use_signal(|| 0usize);
    let mut busy = use_signal(|| false);
    let mut report = use_signal(|| None::<String>);

    let on_upload = move |evt: FormEvent| async move {
        let limit = upload_limit();
        for (name, bytes) in read_uploads(&evt).await {
            let inspected = check_size(&name, bytes.len(), limit)
                .map_err(|err| err.to_string())
                .and_then(|()| PdfFile::inspect(name.clone(), bytes).map_err(|err| err.to_string()));
            match inspected {
                Ok(file) => {
                    info!(name = %file.name, pages = file.pages, "pdf added");
                    files.write().push(file);
                }
                Err(err) => actions.record_failure(format!("Opening {name}"), err),
            }
        }
    };

    let on_merge = move |_: MouseEvent| {
        let result = merge(&files.read());
        match result {
            Ok(bytes) => offer_download(actions, "merged.pdf", PDF_MIME, &bytes),
            Err(err) => actions.record_failure("Merge", err),
        }
    };

    let on_split_zip = move |_: MouseEvent| {
        let Some(file) = files.read().get(selected()).cloned() else {
            return;
        };
        match split_to_zip(&file) {
            Ok(bytes) => offer_download(actions, &format!("{}-pages.zip", file.name), "application/zip", &bytes),
            Err(err) => actions.record_failure("Split", err),
        }
    };

    let on_split_files = move |_: MouseEvent| {
        let Some(file) = files.read().get(selected()).cloned() else {
            return;
        };
        spawn(async move {
            busy.set(true);
            match split(&file) {
                Ok(parts) => {
                    for (name, bytes) in parts {
                        offer_download(actions, &name, PDF_MIME, &bytes);
                        TimeoutFuture::new(0).await;
                    }
                }
                Err(err) => actions.record_failure("Split", err),
            }
            busy.set(false);
        });
    };

    let on_compress = move |_: MouseEvent| {
        let Some(file) = files.read().get(selected()).cloned() else {
            return;
        };
        match compress(&file) {
            Ok((bytes, summary)) => {
                report.set(Some(format!(
                    "{}: {} → {} ({:.1}% saved)",
                    file.name,
                    format_bytes(summary.original_size),
                    format_bytes(summary.compressed_size),
                    summary.saved_percent(),
                )));
                offer_download(actions, &format!("compressed-{}", file.name), PDF_MIME, &bytes);
            }
            Err(err) => actions.record_failure("Compress", err),
        }
    };

    let count = files.read().len();
    let has_selection = selected() < count;

    rsx! {
        ToolFrame { tool: Tool::Pdf,
            Panel {
                title: "Files".to_string(),
                subtitle: Some(format!("Files stay in this browser. Limit per file: {}.", format_bytes(upload_limit() as usize))),
                input {
                    r#type: "file",
                    accept: ".pdf,application/pdf",
                    multiple: true,
                    onchange: on_upload,
                }
                if count == 0 {
                    p { class: "text-xs text-slate-500 italic", "No PDFs added." }
                }
                ul { class: "divide-y divide-slate-100",
                    for (index, file) in files.read().iter().cloned().enumerate() {
                        li {
                            key: "{index}-{file.name}",
                            class: if index == selected() { "flex items-center justify-between gap-2 bg-slate-100 px-2 py-1.5 text-xs" } else { "flex items-center justify-between gap-2 px-2 py-1.5 text-xs" },
                            button {
                                class: "flex-1 text-left",
                                onclick: move |_| selected.set(index),
                                span { class: "font-medium", "{index + 1}. {file.name}" }
                                span { class: "ml-2 text-slate-500",
                                    "{file.pages} page(s), {format_bytes(file.bytes.len())}"
                                }
                            }
                            div { class: "flex gap-1",
                                button {
                                    class: SECONDARY_BUTTON_CLASS,
                                    disabled: index == 0,
                                    onclick: move |_| {
                                        if move_entry(&mut files.write(), index, -1) {
                                            selected.set(index - 1);
                                        }
                                    },
                                    "↑"
                                }
                                button {
                                    class: SECONDARY_BUTTON_CLASS,
                                    disabled: index + 1 == count,
                                    onclick: move |_| {
                                        if move_entry(&mut files.write(), index, 1) {
                                            selected.set(index + 1);
                                        }
                                    },
                                    "↓"
                                }
                                button {
                                    class: SECONDARY_BUTTON_CLASS,
                                    onclick: move |_| {
                                        files.write().remove(index);
                                        selected.set(0);
                                    },
                                    "Remove"
                                }
                            }
                        }
                    }
                }
            }

            Panel { title: "Actions".to_string(),
                div { class: "flex flex-wrap gap-2",
                    button { class: BUTTON_CLASS, disabled: count < 2, onclick: on_merge, "Merge all in order" }
                    button { class: SECONDARY_BUTTON_CLASS, disabled: !has_selection, onclick: on_split_zip, "Split selected (ZIP)" }
                    button { class: SECONDARY_BUTTON_CLASS, disabled: !has_selection || busy(), onclick: on_split_files, "Split selected (separate files)" }
                    button { class: SECONDARY_BUTTON_CLASS, disabled: !has_selection, onclick: on_compress, "Compress selected" }
                }
                if let Some(summary) = report() {
                    p { class: "text-xs text-slate-600", "{summary}" }
                }
            }
        }
    }
}
