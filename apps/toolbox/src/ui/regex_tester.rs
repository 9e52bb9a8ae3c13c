use dioxus::prelude::*;

use crate::services::regex_tester::{run, CaptureGroup, RegexFlags, TestOutcome};
use crate::ui::layout::{Tool, ToolFrame};
use crate::ui::widgets::{checkbox, InlineError, Panel, INPUT_CLASS};

#[component]
pub fn RegexTesterPanel() -> Element {
    let mut pattern = use_signal(String::new);
    let mut flags = use_signal(|| RegexFlags {
        global: true,
        ..RegexFlags::default()
    });
    let mut subject = use_signal(String::new);
    let mut replacement = use_signal(String::new);
    let mut replace_enabled = use_signal(|| false);

    let current_flags = *flags.read();
    let outcome: Option<Result<TestOutcome, String>> = if pattern.read().is_empty() {
        None
    } else {
        let replacement = replacement.read();
        let replacement = replace_enabled().then_some(replacement.as_str());
        Some(run(&pattern.read(), current_flags, &subject.read(), replacement).map_err(|err| err.to_string()))
    };

    let results = match outcome {
        None => rsx! { p { class: "text-xs text-slate-500 italic", "Enter a pattern to start." } },
        Some(Err(message)) => rsx! { InlineError { message: Some(message) } },
        Some(Ok(outcome)) => render_outcome(outcome),
    };

    rsx! {
        ToolFrame { tool: Tool::Regex,
            Panel { title: "Pattern".to_string(),
                div { class: "flex items-center gap-1 font-mono text-sm",
                    span { class: "text-slate-400", "/" }
                    input {
                        class: "{INPUT_CLASS} font-mono",
                        placeholder: "\\d+",
                        value: "{pattern}",
                        oninput: move |evt| pattern.set(evt.value()),
                    }
                    span { class: "text-slate-400", "/{current_flags.as_string()}" }
                }
                div { class: "flex flex-wrap gap-3",
                    {checkbox("g (all matches)", current_flags.global, move |on| flags.write().global = on)}
                    {checkbox("i (ignore case)", current_flags.case_insensitive, move |on| flags.write().case_insensitive = on)}
                    {checkbox("m (multi-line)", current_flags.multi_line, move |on| flags.write().multi_line = on)}
                    {checkbox("s (dot matches newline)", current_flags.dot_all, move |on| flags.write().dot_all = on)}
                    {checkbox("x (extended)", current_flags.extended, move |on| flags.write().extended = on)}
                }
            }

            Panel { title: "Test string".to_string(),
                textarea {
                    class: "{INPUT_CLASS} h-32 font-mono",
                    value: "{subject}",
                    oninput: move |evt| subject.set(evt.value()),
                }
                {checkbox("Replace", replace_enabled(), move |on| replace_enabled.set(on))}
                if replace_enabled() {
                    input {
                        class: "{INPUT_CLASS} font-mono",
                        placeholder: "$1 or ${{name}}",
                        value: "{replacement}",
                        oninput: move |evt| replacement.set(evt.value()),
                    }
                }
            }

            Panel { title: "Matches".to_string(), {results} }
        }
    }
}

fn render_outcome(outcome: TestOutcome) -> Element {
    let count = outcome.matches.len();
    rsx! {
        p { class: "text-xs text-slate-600", "{count} match(es)" }
        ol { class: "space-y-2",
            for (number, found) in outcome.matches.into_iter().enumerate() {
                li { key: "{number}", class: "rounded border border-slate-200 p-2 text-xs",
                    p {
                        span { class: "font-mono bg-amber-100 px-1", "{found.text}" }
                        span { class: "ml-2 text-slate-500", "at index {found.index}" }
                    }
                    if !found.groups.is_empty() {
                        ul { class: "mt-1 space-y-0.5 text-[11px] text-slate-600",
                            for (key, label, value) in group_rows(found.groups) {
                                li { key: "{key}",
                                    span { class: "font-medium", "{label}: " }
                                    span { class: "font-mono", "{value}" }
                                }
                            }
                        }
                    }
                }
            }
        }
        if let Some(replaced) = outcome.replaced {
            div { class: "space-y-1",
                h3 { class: "text-xs font-semibold text-slate-700", "Replacement result" }
                pre { class: "whitespace-pre-wrap rounded bg-slate-100 p-2 font-mono text-xs", "{replaced}" }
            }
        }
    }
}

fn group_rows(groups: Vec<CaptureGroup>) -> Vec<(usize, String, String)> {
    groups
        .into_iter()
        .map(|group| {
            let label = match group.name {
                Some(name) => format!("${} ({name})", group.index),
                None => format!("${}", group.index),
            };
            let value = group.value.unwrap_or_else(|| "(no match)".to_string());
            (group.index, label, value)
        })
        .collect()
}
