use dioxus::prelude::*;

use crate::hooks::browser::offer_download;
use crate::hooks::rack_planner::{use_rack_planner, RackPlannerHandle};
use crate::services::browser::print_html;
use crate::services::rack::{
    to_csv, to_excel_html, to_png, to_printable_html, to_xml, ComponentDraft, ComponentKind, Rack,
    RackProject, DEFAULT_HEIGHT, MAX_HEIGHT, MIN_HEIGHT,
};
use crate::state::use_app_actions;
use crate::ui::layout::{Tool, ToolFrame};
use crate::ui::widgets::{
    read_upload_text, text_field, Panel, BUTTON_CLASS, INPUT_CLASS, SECONDARY_BUTTON_CLASS,
};

const UNIT_HEIGHT_PX: u32 = 22;

#[component]
pub fn RackPanel() -> Element {
    let actions = use_app_actions();
    let planner = use_rack_planner();

    let mut new_rack_name = use_signal(|| "Rack".to_string());
    let mut new_rack_height = use_signal(|| DEFAULT_HEIGHT);
    let mut target_rack = use_signal(String::new);
    let mut draft = use_signal(|| ComponentDraft::new(ComponentKind::Server, "Server"));
    let mut draft_position = use_signal(String::new);
    let mut selected = use_signal(|| None::<(String, String)>);

    let project = planner.project.read().clone();
    let usage = project.utilization();
    let target = if project.rack(&target_rack.read()).is_ok() {
        target_rack.read().clone()
    } else {
        project.racks.first().map(|rack| rack.id.clone()).unwrap_or_default()
    };
    let current_draft = draft.read().clone();

    let on_add_component = {
        let target = target.clone();
        move |_: MouseEvent| {
            let position = draft_position.read().trim().parse::<u32>().ok();
            planner.add_component(&target, draft.read().clone(), position);
        }
    };

    let export = move |kind: Export| {
        let project = planner.project.read().clone();
        let result: Result<(String, &'static str, Vec<u8>), String> = match kind {
            Export::Xml => to_xml(&project)
                .map(|xml| ("rack-plan.xml".to_string(), "application/xml", xml.into_bytes()))
                .map_err(|err| err.to_string()),
            Export::Csv => to_csv(&project)
                .map(|csv| ("rack-plan.csv".to_string(), "text/csv", csv.into_bytes()))
                .map_err(|err| err.to_string()),
            Export::Excel => Ok((
                "rack-plan.xls".to_string(),
                "application/vnd.ms-excel",
                to_excel_html(&project).into_bytes(),
            )),
            Export::Png => to_png(&project)
                .map(|png| ("rack-plan.png".to_string(), "image/png", png))
                .map_err(|err| err.to_string()),
        };
        match result {
            Ok((name, mime, bytes)) => offer_download(actions, &name, mime, &bytes),
            Err(err) => actions.record_failure("Rack export", err),
        }
    };

    let on_print = move |_: MouseEvent| {
        if let Err(err) = print_html(&to_printable_html(&planner.project.read())) {
            actions.record_failure("Printing", err);
        }
    };

    let on_import = move |evt: FormEvent| async move {
        if let Some((file_name, text)) = read_upload_text(&evt).await {
            planner.replace_from_xml(&file_name, &text);
        }
    };

    rsx! {
        ToolFrame { tool: Tool::Rack,
            Panel {
                title: "Project".to_string(),
                subtitle: Some(format!(
                    "{} rack(s), {} component(s), {} of {}U used ({:.0}%)",
                    project.racks.len(),
                    project.component_count(),
                    usage.used,
                    usage.total,
                    usage.percent(),
                )),
                div { class: "flex flex-wrap items-end gap-2",
                    {text_field("Rack name", &new_rack_name.read(), move |value| new_rack_name.set(value))}
                    label { class: "flex flex-col gap-1 text-xs text-slate-600",
                        "Height (U)"
                        input {
                            class: INPUT_CLASS,
                            r#type: "number",
                            min: "{MIN_HEIGHT}",
                            max: "{MAX_HEIGHT}",
                            value: "{new_rack_height}",
                            oninput: move |evt| {
                                if let Ok(height) = evt.value().parse::<u32>() {
                                    new_rack_height.set(height);
                                }
                            },
                        }
                    }
                    button {
                        class: BUTTON_CLASS,
                        onclick: move |_| planner.add_rack(new_rack_name.read().clone(), new_rack_height()),
                        "Add rack"
                    }
                }
                div { class: "flex flex-wrap gap-2",
                    button { class: SECONDARY_BUTTON_CLASS, onclick: move |_| export(Export::Xml), "Export XML" }
                    button { class: SECONDARY_BUTTON_CLASS, onclick: move |_| export(Export::Csv), "Export CSV" }
                    button { class: SECONDARY_BUTTON_CLASS, onclick: move |_| export(Export::Excel), "Export Excel" }
                    button { class: SECONDARY_BUTTON_CLASS, onclick: move |_| export(Export::Png), "Export PNG" }
                    button { class: SECONDARY_BUTTON_CLASS, onclick: on_print, "Print" }
                    label { class: "text-xs text-slate-600",
                        "Import XML "
                        input { r#type: "file", accept: ".xml,application/xml,text/xml", onchange: on_import }
                    }
                }
            }

            Panel { title: "Add component".to_string(),
                div { class: "grid gap-2 md:grid-cols-3",
                    label { class: "flex flex-col gap-1 text-xs text-slate-600",
                        "Rack"
                        select {
                            class: INPUT_CLASS,
                            value: "{target}",
                            onchange: move |evt| target_rack.set(evt.value()),
                            for rack in project.racks.iter() {
                                option { key: "{rack.id}", value: "{rack.id}", "{rack.name}" }
                            }
                        }
                    }
                    label { class: "flex flex-col gap-1 text-xs text-slate-600",
                        "Type"
                        select {
                            class: INPUT_CLASS,
                            value: "{current_draft.kind.value()}",
                            onchange: move |evt| {
                                if let Some(kind) = ComponentKind::from_value(&evt.value()) {
                                    let mut draft = draft.write();
                                    draft.kind = kind;
                                    draft.size = kind.default_size();
                                    draft.name = kind.label().to_string();
                                }
                            },
                            for kind in ComponentKind::ALL {
                                option { key: "{kind.value()}", value: "{kind.value()}", "{kind.label()}" }
                            }
                        }
                    }
                    {text_field("Name", &current_draft.name, move |value| draft.write().name = value)}
                    {text_field("Model", &current_draft.model, move |value| draft.write().model = value)}
                    label { class: "flex flex-col gap-1 text-xs text-slate-600",
                        "Size (U)"
                        input {
                            class: INPUT_CLASS,
                            r#type: "number",
                            min: "1",
                            max: "{MAX_HEIGHT}",
                            value: "{current_draft.size}",
                            oninput: move |evt| {
                                if let Ok(size) = evt.value().parse::<u32>() {
                                    draft.write().size = size.max(1);
                                }
                            },
                        }
                    }
                    {text_field("Position (U, blank for first free from top)", &draft_position.read(), move |value| draft_position.set(value))}
                    {text_field("Notes", &current_draft.notes, move |value| draft.write().notes = value)}
                }
                button { class: BUTTON_CLASS, disabled: target.is_empty(), onclick: on_add_component, "Place component" }
            }

            if let Some((rack_id, component_id)) = selected() {
                {component_editor(planner, &project, rack_id, component_id, selected)}
            }

            div { class: "flex flex-wrap items-start gap-4",
                for rack in project.racks.iter().cloned() {
                    {rack_view(rack, planner, selected)}
                }
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Export {
    Xml,
    Csv,
    Excel,
    Png,
}

fn rack_view(rack: Rack, planner: RackPlannerHandle, mut selected: Signal<Option<(String, String)>>) -> Element {
    let usage = rack.utilization();
    let rack_id = rack.id.clone();
    let units: Vec<u32> = (1..=rack.height).rev().collect();
    let column_height = rack.height * UNIT_HEIGHT_PX;
    let usage_label = format!(
        "{}/{}U used, {}U free ({:.0}%)",
        usage.used,
        usage.total,
        usage.free(),
        usage.percent()
    );
    let blocks: Vec<(String, String, String, String)> = rack
        .components
        .iter()
        .map(|component| {
            let top = (rack.height - component.top()) * UNIT_HEIGHT_PX;
            let height = component.size * UNIT_HEIGHT_PX - 2;
            let style = format!(
                "top: {top}px; height: {height}px; background: {}",
                component.kind.css_color()
            );
            let title = format!("{} {}", component.kind.label(), component.model);
            (component.id.clone(), component.name.clone(), style, title)
        })
        .collect();

    rsx! {
        section { key: "{rack.id}", class: "w-72 space-y-2 rounded-lg border border-slate-200 bg-white p-3 shadow-sm text-slate-900",
            div { class: "flex items-center gap-2",
                input {
                    class: "{INPUT_CLASS} font-semibold",
                    value: "{rack.name}",
                    onchange: {
                        let rack_id = rack_id.clone();
                        move |evt: FormEvent| planner.rename_rack(&rack_id, evt.value())
                    },
                }
                input {
                    class: "w-16 rounded border border-slate-300 px-1 py-1 text-xs",
                    r#type: "number",
                    min: "{MIN_HEIGHT}",
                    max: "{MAX_HEIGHT}",
                    value: "{rack.height}",
                    onchange: {
                        let rack_id = rack_id.clone();
                        move |evt: FormEvent| {
                            if let Ok(height) = evt.value().parse::<u32>() {
                                planner.set_height(&rack_id, height);
                            }
                        }
                    },
                }
                button {
                    class: SECONDARY_BUTTON_CLASS,
                    onclick: {
                        let rack_id = rack_id.clone();
                        move |_| planner.remove_rack(&rack_id)
                    },
                    "✕"
                }
            }
            p { class: "text-[11px] text-slate-500",
                "{usage_label}"
            }
            div { class: "relative border-x-8 border-slate-700 bg-slate-100", style: "height: {column_height}px",
                for unit in units {
                    div {
                        key: "slot-{unit}",
                        class: "flex items-center border-b border-slate-200 text-[10px] text-slate-400",
                        style: "height: {UNIT_HEIGHT_PX}px",
                        ondragover: move |evt| evt.prevent_default(),
                        ondrop: {
                            let rack_id = rack_id.clone();
                            move |evt: DragEvent| {
                                evt.prevent_default();
                                planner.drop_at(&rack_id, unit);
                            }
                        },
                        span { class: "w-6 pl-1", "{unit}" }
                    }
                }
                for (component_id, label, style, title) in blocks {
                    div {
                        key: "{component_id}",
                        class: "absolute left-7 right-1 cursor-move overflow-hidden rounded px-2 text-[11px] text-white shadow",
                        style: "{style}",
                        draggable: "true",
                        title: "{title}",
                        ondragstart: {
                            let id = component_id.clone();
                            move |_| {
                                let mut dragging = planner.dragging;
                                dragging.set(Some(id.clone()));
                            }
                        },
                        ondragend: move |_| {
                            let mut dragging = planner.dragging;
                            dragging.set(None);
                        },
                        ondragover: move |evt| evt.prevent_default(),
                        onclick: {
                            let ids = (rack_id.clone(), component_id.clone());
                            move |_| selected.set(Some(ids.clone()))
                        },
                        "{label}"
                    }
                }
            }
        }
    }
}

fn component_editor(
    planner: RackPlannerHandle,
    project: &RackProject,
    rack_id: String,
    component_id: String,
    mut selected: Signal<Option<(String, String)>>,
) -> Element {
    let Some(component) = project
        .rack(&rack_id)
        .ok()
        .and_then(|rack| rack.component(&component_id))
        .cloned()
    else {
        return rsx! { Fragment {} };
    };
    let ids = (rack_id, component_id);
    let title = format!("{} ({})", component.name, component.kind.label());
    let subtitle = format!("U{} to U{}, {}U", component.position, component.top(), component.size);

    rsx! {
        Panel {
            title,
            subtitle: Some(subtitle),
            ComponentForm {
                key: "{component.id}",
                name: component.name.clone(),
                model: component.model.clone(),
                notes: component.notes.clone(),
                on_save: {
                    let ids = ids.clone();
                    move |(name, model, notes): (String, String, String)| {
                        planner.update_component(&ids.0, &ids.1, name, model, notes);
                    }
                },
                on_remove: {
                    let ids = ids.clone();
                    move |_| {
                        planner.remove_component(&ids.0, &ids.1);
                        selected.set(None);
                    }
                },
                on_close: move |_| selected.set(None),
            }
        }
    }
}

#[component]
fn ComponentForm(
    name: String,
    model: String,
    notes: String,
    on_save: EventHandler<(String, String, String)>,
    on_remove: EventHandler<()>,
    on_close: EventHandler<()>,
) -> Element {
    let mut name = use_signal(move || name);
    let mut model = use_signal(move || model);
    let mut notes = use_signal(move || notes);

    rsx! {
        div { class: "grid gap-2 md:grid-cols-3",
            {text_field("Name", &name.read(), move |value| name.set(value))}
            {text_field("Model", &model.read(), move |value| model.set(value))}
            {text_field("Notes", &notes.read(), move |value| notes.set(value))}
        }
        div { class: "flex gap-2",
            button {
                class: BUTTON_CLASS,
                onclick: move |_| on_save.call((name(), model(), notes())),
                "Save"
            }
            button { class: SECONDARY_BUTTON_CLASS, onclick: move |_| on_remove.call(()), "Remove" }
            button { class: SECONDARY_BUTTON_CLASS, onclick: move |_| on_close.call(()), "Close" }
        }
    }
}
