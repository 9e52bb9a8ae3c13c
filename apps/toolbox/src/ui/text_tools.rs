use dioxus::prelude::*;

use crate::services::text::{stats, Transform};
use crate::ui::layout::{Tool, ToolFrame};
use crate::ui::widgets::{CopyButton, InlineError, Panel, INPUT_CLASS, SECONDARY_BUTTON_CLASS};

#[component]
pub fn TextToolsPanel() -> Element {
    let mut input = use_signal(String::new);
    let mut output = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let summary = stats(&input.read());

    rsx! {
        ToolFrame { tool: Tool::Text,
            Panel { title: "Input".to_string(),
                textarea {
                    class: "{INPUT_CLASS} h-40 font-mono",
                    value: "{input}",
                    oninput: move |evt| input.set(evt.value()),
                }
                div { class: "flex flex-wrap gap-3 text-[11px] text-slate-500",
                    span { "{summary.characters} characters" }
                    span { "{summary.characters_no_spaces} without spaces" }
                    span { "{summary.words} words" }
                    span { "{summary.lines} lines" }
                    span { "{summary.sentences} sentences" }
                    span { "{summary.paragraphs} paragraphs" }
                }
            }

            Panel { title: "Transform".to_string(),
                div { class: "flex flex-wrap gap-2",
                    for transform in Transform::ALL {
                        button {
                            key: "{transform.label()}",
                            class: SECONDARY_BUTTON_CLASS,
                            onclick: move |_| match transform.apply(&input.read()) {
                                Ok(result) => {
                                    output.set(result);
                                    error.set(None);
                                }
                                Err(err) => error.set(Some(err.to_string())),
                            },
                            "{transform.label()}"
                        }
                    }
                }
                InlineError { message: error() }
            }

            Panel { title: "Output".to_string(),
                textarea { class: "{INPUT_CLASS} h-40 font-mono", readonly: true, value: "{output}" }
                div { class: "flex gap-2",
                    CopyButton { label: "Output".to_string(), text: output() }
                    button {
                        class: SECONDARY_BUTTON_CLASS,
                        disabled: output.read().is_empty(),
                        onclick: move |_| input.set(output()),
                        "Use as input"
                    }
                }
            }
        }
    }
}
