use dioxus::prelude::*;

use crate::hooks::browser::offer_download;
use crate::services::compose::{
    ComposeError, ComposeProject, Preset, RestartPolicy, Service, FILE_NAME,
};
use crate::state::{use_app_actions, AppActions};
use crate::ui::layout::{Tool, ToolFrame};
use crate::ui::widgets::{
    text_field, CopyButton, Panel, BUTTON_CLASS, INPUT_CLASS, SECONDARY_BUTTON_CLASS,
};

#[component]
pub fn ComposePanel() -> Element {
    let actions = use_app_actions();
    let mut project = use_signal(|| {
        let mut project = ComposeProject::default();
        project.add_preset(Preset::Nginx);
        project
    });

    let snapshot = project.read().clone();
    let issues = snapshot.validate();
    let yaml = if issues.is_empty() {
        snapshot.to_yaml().map_err(|err| err.to_string())
    } else {
        Err(ComposeError::Invalid(issues.clone()).to_string())
    };
    let yaml_text = yaml.clone().unwrap_or_default();
    let preview = match yaml {
        Ok(text) => rsx! {
            pre { class: "max-h-96 overflow-auto rounded bg-slate-900 p-3 font-mono text-xs text-slate-100", "{text}" }
        },
        Err(message) => rsx! {
            p { class: "text-xs text-red-600", "{message}" }
        },
    };

    rsx! {
        ToolFrame { tool: Tool::Compose,
            Panel { title: "Services".to_string(),
                div { class: "flex flex-wrap gap-2",
                    button {
                        class: BUTTON_CLASS,
                        onclick: move |_| {
                            let mut project = project.write();
                            let name = format!("service{}", project.services.len() + 1);
                            project.add(Service { name, ..Service::default() });
                        },
                        "Add service"
                    }
                    for preset in Preset::ALL {
                        button {
                            key: "{preset.label()}",
                            class: SECONDARY_BUTTON_CLASS,
                            onclick: move |_| {
                                project.write().add_preset(preset);
                            },
                            "+ {preset.label()}"
                        }
                    }
                }
                for (index, service) in snapshot.services.iter().cloned().enumerate() {
                    {service_editor(index, service, project, issues.iter().filter(|issue| issue.service == index).map(|issue| issue.message.clone()).collect(), actions)}
                }
            }

            Panel { title: FILE_NAME.to_string(),
                {preview}
                div { class: "flex gap-2",
                    button {
                        class: BUTTON_CLASS,
                        disabled: yaml_text.is_empty(),
                        onclick: {
                            let yaml_text = yaml_text.clone();
                            move |_| offer_download(actions, FILE_NAME, "application/x-yaml", yaml_text.as_bytes())
                        },
                        "Download"
                    }
                    CopyButton { label: "Compose file".to_string(), text: yaml_text.clone() }
                }
            }
        }
    }
}

fn lines(values: &[String]) -> String {
    values.join("\n")
}

fn from_lines(value: &str) -> Vec<String> {
    value.lines().map(str::to_string).collect()
}

fn service_editor(
    index: usize,
    service: Service,
    mut project: Signal<ComposeProject>,
    issues: Vec<String>,
    actions: AppActions,
) -> Element {
    let mut edit = move |apply: &dyn Fn(&mut Service)| {
        if let Some(service) = project.write().services.get_mut(index) {
            apply(service);
        }
    };

    let list_field = move |label: &'static str, hint: &'static str, value: String, set: fn(&mut Service, Vec<String>)| {
        rsx! {
            label { class: "flex flex-col gap-1 text-xs text-slate-600",
                "{label}"
                textarea {
                    class: "{INPUT_CLASS} h-16 font-mono",
                    placeholder: "{hint}",
                    value: "{value}",
                    oninput: move |evt| {
                        let values = from_lines(&evt.value());
                        edit(&|service| set(service, values.clone()));
                    },
                }
            }
        }
    };

    rsx! {
        div { key: "{index}", class: "space-y-2 rounded border border-slate-200 p-3",
            div { class: "flex items-center justify-between",
                h3 { class: "text-sm font-semibold", "{service.name}" }
                button {
                    class: SECONDARY_BUTTON_CLASS,
                    onclick: move |_| {
                        let removed = project.write().remove(index);
                        if let Err(err) = removed {
                            actions.record_failure("Remove service", err);
                        }
                    },
                    "Remove"
                }
            }
            div { class: "grid gap-2 md:grid-cols-2",
                {text_field("Name", &service.name, move |value| edit(&|service| service.name = value.clone()))}
                {text_field("Image", &service.image, move |value| edit(&|service| service.image = value.clone()))}
                {text_field("Container name", &service.container_name, move |value| edit(&|service| service.container_name = value.clone()))}
                {text_field("Command", &service.command, move |value| edit(&|service| service.command = value.clone()))}
                {list_field("Ports", "8080:80", lines(&service.ports), |service, values| service.ports = values)}
                {list_field("Environment", "KEY=value", lines(&service.environment), |service, values| service.environment = values)}
                {list_field("Volumes", "data:/var/lib/data", lines(&service.volumes), |service, values| service.volumes = values)}
                {list_field("Depends on", "db", lines(&service.depends_on), |service, values| service.depends_on = values)}
                {list_field("Networks", "backend", lines(&service.networks), |service, values| service.networks = values)}
                label { class: "flex flex-col gap-1 text-xs text-slate-600",
                    "Restart"
                    select {
                        class: INPUT_CLASS,
                        value: "{service.restart.value()}",
                        onchange: move |evt| {
                            if let Some(policy) = RestartPolicy::from_value(&evt.value()) {
                                edit(&|service| service.restart = policy);
                            }
                        },
                        for policy in RestartPolicy::ALL {
                            option { key: "{policy.value()}", value: "{policy.value()}", "{policy.value()}" }
                        }
                    }
                }
            }
            for (number, issue) in issues.into_iter().enumerate() {
                p { key: "{number}", class: "text-xs text-red-600", "{issue}" }
            }
        }
    }
}
