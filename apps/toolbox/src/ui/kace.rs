use std::collections::BTreeMap;

use dioxus::prelude::*;

use crate::hooks::browser::offer_download;
use crate::hooks::rule_builder::{use_rule_builder, RuleBuilderHandle};
use crate::hooks::use_saved_rules;
use crate::models::{format_timestamp, SavedRule};
use crate::services::kace::catalog::{self, Category, ParamKind};
use crate::services::kace::{
    generate, import_rule_string, parse_rule_export, render, Condition, JoinOperator, Node, NodeId,
    RuleTree,
};
use crate::state::use_app_actions;
use crate::ui::layout::{Tool, ToolFrame};
use crate::ui::widgets::{
    read_upload_text, CopyButton, InlineError, Panel, BUTTON_CLASS, INPUT_CLASS,
    SECONDARY_BUTTON_CLASS,
};

const EXPORT_FILE: &str = "kace-rules.json";
const OPERATORS: [JoinOperator; 2] = [JoinOperator::And, JoinOperator::Or];

#[component]
pub fn KacePanel() -> Element {
    let actions = use_app_actions();
    let builder = use_rule_builder();
    let saved = use_saved_rules();
    let mut name = use_signal(String::new);
    let mut description = use_signal(String::new);
    let mut rule_input = use_signal(String::new);
    let mut import_error = use_signal(|| None::<String>);

    let tree = builder.tree.read().clone();
    let outcome = render(&tree);
    let loaded = builder.loaded.read().clone();

    let on_save = move |_: MouseEvent| {
        let tree = builder.tree.read().clone();
        let rule_string = match generate(&tree) {
            Ok(rule) => rule,
            Err(err) => {
                actions.record_failure("Saving rule", err);
                return;
            }
        };
        let record = match builder.loaded.read().clone() {
            Some(mut existing) => {
                existing.name = name.read().trim().to_string();
                existing.description = description.read().clone();
                existing.update(&tree, rule_string);
                existing
            }
            None => SavedRule::new(name.read().trim(), description.read().clone(), &tree, rule_string),
        };
        let message = format!("Saved \"{}\"", record.name);
        let mut loaded = builder.loaded;
        loaded.set(Some(record.clone()));
        saved.save(record, message);
    };

    let on_export = move |_: MouseEvent| match serde_json::to_string_pretty(&*saved.records.read()) {
        Ok(json) => offer_download(actions, EXPORT_FILE, "application/json", json.as_bytes()),
        Err(err) => actions.record_failure("Exporting rules", err),
    };

    let on_import_file = move |evt: FormEvent| async move {
        let Some((file_name, text)) = read_upload_text(&evt).await else {
            return;
        };
        match parse_rule_export(&text) {
            Ok(rules) => {
                let total = rules.len();
                if let Some(added) = saved.import(rules) {
                    actions.set_operation_success(format!(
                        "Imported {added} new of {total} rule(s) from {file_name}"
                    ));
                }
            }
            Err(err) => actions.record_failure(format!("Importing {file_name}"), err),
        }
    };

    let on_import_string = move |_: MouseEvent| match import_rule_string(&rule_input.read()) {
        Ok(restored) => {
            let mut tree = builder.tree;
            tree.set(restored);
            import_error.set(None);
        }
        Err(err) => import_error.set(Some(err.to_string())),
    };

    let generated = if outcome.has_errors() || tree.is_empty() {
        String::new()
    } else {
        outcome.rule.clone()
    };
    let can_save = !generated.is_empty() && !name.read().trim().is_empty();

    rsx! {
        ToolFrame { tool: Tool::Kace,
            Panel {
                title: "Rule".to_string(),
                subtitle: Some("Top-level items are joined left to right with the operators between them.".to_string()),
                div { class: "space-y-2",
                    for (index, id) in tree.roots().iter().copied().enumerate() {
                        div { key: "{id}", class: "space-y-2",
                            if index > 0 {
                                {operator_select(tree.top_operator(index - 1), move |operator| builder.set_top_operator(index - 1, operator))}
                            }
                            {node_view(&tree, id, &outcome.errors, builder)}
                        }
                    }
                }
                if tree.is_empty() {
                    p { class: "text-xs text-slate-500 italic", "Add a condition to start." }
                }
                div { class: "flex flex-wrap gap-2",
                    button { class: BUTTON_CLASS, onclick: move |_| builder.add_condition(None), "Add condition" }
                    button { class: SECONDARY_BUTTON_CLASS, onclick: move |_| builder.add_group(None), "Add group" }
                    button {
                        class: SECONDARY_BUTTON_CLASS,
                        onclick: move |_| {
                            builder.reset();
                            name.set(String::new());
                            description.set(String::new());
                        },
                        "New rule"
                    }
                }
            }

            Panel { title: "Rule string".to_string(),
                pre { class: "whitespace-pre-wrap break-all rounded bg-slate-100 p-2 font-mono text-xs", "{outcome.rule}" }
                if outcome.has_errors() {
                    p { class: "text-xs text-amber-600",
                        "{outcome.errors.len()} condition(s) are incomplete and are shown as [INVALID]."
                    }
                }
                CopyButton { label: "Rule".to_string(), text: generated.clone() }
            }

            Panel { title: "Saved rules".to_string(),
                if let Some(rule) = loaded.as_ref() {
                    p { class: "text-xs text-slate-500", "Editing \"{rule.name}\"; saving overwrites it." }
                }
                div { class: "grid gap-2 md:grid-cols-2",
                    input {
                        class: INPUT_CLASS,
                        placeholder: "Name",
                        value: "{name}",
                        oninput: move |evt| name.set(evt.value()),
                    }
                    input {
                        class: INPUT_CLASS,
                        placeholder: "Description",
                        value: "{description}",
                        oninput: move |evt| description.set(evt.value()),
                    }
                }
                div { class: "flex flex-wrap items-center gap-2",
                    button { class: BUTTON_CLASS, disabled: !can_save, onclick: on_save, "Save" }
                    button {
                        class: SECONDARY_BUTTON_CLASS,
                        disabled: saved.records.read().is_empty(),
                        onclick: on_export,
                        "Export JSON"
                    }
                    label { class: "text-xs text-slate-600",
                        "Import JSON "
                        input { r#type: "file", accept: ".json,application/json", onchange: on_import_file }
                    }
                }
                ul { class: "divide-y divide-slate-100",
                    for rule in saved.records.read().iter().cloned() {
                        li { key: "{rule.id}", class: "flex items-center justify-between gap-2 py-2 text-xs",
                            div { class: "min-w-0",
                                p { class: "font-medium", "{rule.name}" }
                                if !rule.description.is_empty() {
                                    p { class: "text-slate-500", "{rule.description}" }
                                }
                                p { class: "truncate font-mono text-[11px] text-slate-500", "{rule.rule_string}" }
                                p { class: "text-[11px] text-slate-400", "Updated {format_timestamp(rule.updated_at)}" }
                            }
                            div { class: "flex gap-2",
                                button {
                                    class: SECONDARY_BUTTON_CLASS,
                                    onclick: {
                                        let rule = rule.clone();
                                        move |_| {
                                            name.set(rule.name.clone());
                                            description.set(rule.description.clone());
                                            builder.load(rule.clone());
                                        }
                                    },
                                    "Load"
                                }
                                button {
                                    class: SECONDARY_BUTTON_CLASS,
                                    onclick: {
                                        let id = rule.id.clone();
                                        move |_| {
                                            let mut loaded = builder.loaded;
                                            if loaded.read().as_ref().is_some_and(|current| current.id == id) {
                                                loaded.set(None);
                                            }
                                            saved.delete(&id);
                                        }
                                    },
                                    "Delete"
                                }
                            }
                        }
                    }
                }
            }

            Panel {
                title: "Import rule string".to_string(),
                subtitle: Some("Parsing existing KACE rule strings back into a tree is not supported yet.".to_string()),
                textarea {
                    class: "{INPUT_CLASS} h-20 font-mono",
                    value: "{rule_input}",
                    oninput: move |evt| rule_input.set(evt.value()),
                }
                button {
                    class: SECONDARY_BUTTON_CLASS,
                    disabled: rule_input.read().trim().is_empty(),
                    onclick: on_import_string,
                    "Import"
                }
                InlineError { message: import_error() }
            }
        }
    }
}

fn operator_select(current: JoinOperator, mut on_change: impl FnMut(JoinOperator) + 'static) -> Element {
    rsx! {
        select {
            class: "rounded border border-slate-300 px-2 py-0.5 text-xs font-semibold",
            value: "{current.as_str()}",
            onchange: move |evt| {
                if let Some(operator) = JoinOperator::parse(&evt.value()) {
                    on_change(operator);
                }
            },
            for operator in OPERATORS {
                option { key: "{operator.as_str()}", value: "{operator.as_str()}", "{operator.as_str()}" }
            }
        }
    }
}

fn node_controls(id: NodeId, builder: RuleBuilderHandle) -> Element {
    rsx! {
        div { class: "flex gap-1",
            button { class: SECONDARY_BUTTON_CLASS, onclick: move |_| builder.move_by(id, -1), "↑" }
            button { class: SECONDARY_BUTTON_CLASS, onclick: move |_| builder.move_by(id, 1), "↓" }
            button { class: SECONDARY_BUTTON_CLASS, onclick: move |_| builder.remove(id), "Remove" }
        }
    }
}

fn node_view(
    tree: &RuleTree,
    id: NodeId,
    errors: &BTreeMap<NodeId, String>,
    builder: RuleBuilderHandle,
) -> Element {
    match tree.get(id) {
        Some(Node::Condition(condition)) => {
            condition_view(id, condition, errors.get(&id).cloned(), builder)
        }
        Some(Node::Group(group)) => {
            let operator = group.operator;
            rsx! {
                div { class: "space-y-2 rounded border-l-4 border-sky-400 bg-sky-50/50 p-2",
                    div { class: "flex items-center justify-between gap-2",
                        div { class: "flex items-center gap-2 text-xs text-slate-600",
                            "Group joined with"
                            {operator_select(operator, move |operator| builder.set_group_operator(id, operator))}
                        }
                        {node_controls(id, builder)}
                    }
                    if group.children.is_empty() {
                        p { class: "text-[11px] text-slate-500 italic", "Empty groups are left out of the rule." }
                    }
                    for child in group.children.iter().copied() {
                        div { key: "{child}", class: "ml-4", {node_view(tree, child, errors, builder)} }
                    }
                    div { class: "flex gap-2",
                        button { class: SECONDARY_BUTTON_CLASS, onclick: move |_| builder.add_condition(Some(id)), "+ Condition" }
                        button { class: SECONDARY_BUTTON_CLASS, onclick: move |_| builder.add_group(Some(id)), "+ Group" }
                    }
                }
            }
        }
        None => rsx! { Fragment {} },
    }
}

fn condition_view(
    id: NodeId,
    condition: &Condition,
    error: Option<String>,
    builder: RuleBuilderHandle,
) -> Element {
    let function = condition.function;
    let params: Vec<(catalog::ParamDef, String)> = function
        .params
        .iter()
        .map(|param| (*param, condition.value(param.name).to_string()))
        .collect();
    let border = if error.is_some() { "border-red-300" } else { "border-slate-200" };

    rsx! {
        div { class: "space-y-2 rounded border {border} p-2",
            div { class: "flex items-center justify-between gap-2",
                select {
                    class: "rounded border border-slate-300 px-2 py-1 text-xs font-mono",
                    value: "{function.key}",
                    onchange: move |evt| builder.set_function(id, &evt.value()),
                    for category in Category::ALL {
                        optgroup { key: "{category.label()}", label: "{category.label()}",
                            for def in catalog::by_category(category) {
                                option { key: "{def.key}", value: "{def.key}", "{def.key}" }
                            }
                        }
                    }
                }
                {node_controls(id, builder)}
            }
            p { class: "text-[11px] text-slate-500", "{function.description}" }
            div { class: "grid gap-2 md:grid-cols-2",
                for (param, value) in params {
                    label { key: "{param.name}", class: "flex flex-col gap-1 text-xs text-slate-600",
                        if param.required {
                            "{param.label} *"
                        } else {
                            "{param.label}"
                        }
                        {param_input(id, param, value, builder)}
                    }
                }
            }
            InlineError { message: error }
        }
    }
}

fn param_input(id: NodeId, param: catalog::ParamDef, value: String, builder: RuleBuilderHandle) -> Element {
    let name = param.name;
    match param.kind {
        ParamKind::Choice(options) => rsx! {
            select {
                class: INPUT_CLASS,
                value: "{value}",
                onchange: move |evt| builder.set_param(id, name, &evt.value()),
                for choice in options.iter() {
                    option { key: "{choice}", value: "{choice}", "{choice}" }
                }
            }
        },
        _ => rsx! {
            input {
                class: "{INPUT_CLASS} font-mono",
                placeholder: "{param.placeholder}",
                value: "{value}",
                oninput: move |evt| builder.set_param(id, name, &evt.value()),
            }
        },
    }
}
