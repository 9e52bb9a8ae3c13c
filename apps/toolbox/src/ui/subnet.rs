use dioxus::prelude::*;

use crate::services::subnet::{parse, SubnetInfo};
use crate::ui::layout::{Tool, ToolFrame};
use crate::ui::widgets::{InlineError, Panel, INPUT_CLASS};

#[component]
pub fn SubnetPanel() -> Element {
    let mut input = use_signal(|| "192.168.1.10/24".to_string());
    let mut split_prefix = use_signal(|| None::<u8>);

    let parsed = parse(&input.read());
    let (info, error) = match parsed {
        Ok(info) => (Some(info), None),
        Err(err) => (None, Some(err.to_string())),
    };

    rsx! {
        ToolFrame { tool: Tool::Subnet,
            Panel {
                title: "Address".to_string(),
                subtitle: Some("CIDR (10.0.0.1/8) or address and mask (10.0.0.1 255.0.0.0).".to_string()),
                input {
                    class: "{INPUT_CLASS} font-mono",
                    value: "{input}",
                    oninput: move |evt| {
                        input.set(evt.value());
                        split_prefix.set(None);
                    },
                }
                InlineError { message: error }
            }
            if let Some(info) = info {
                Panel { title: "Network".to_string(), {details(&info)} }
                Panel { title: "Split".to_string(),
                    label { class: "flex items-center gap-2 text-xs text-slate-600",
                        "New prefix"
                        select {
                            class: "rounded border border-slate-300 px-2 py-1",
                            value: split_prefix().map(|prefix| prefix.to_string()).unwrap_or_default(),
                            onchange: move |evt| split_prefix.set(evt.value().parse().ok()),
                            option { value: "", "Choose…" }
                            for prefix in info.prefix..=32 {
                                option { key: "{prefix}", value: "{prefix}", "/{prefix}" }
                            }
                        }
                    }
                    if let Some(prefix) = split_prefix() {
                        {split_table(&info, prefix)}
                    }
                }
            }
        }
    }
}

fn details(info: &SubnetInfo) -> Element {
    let scope = if info.private { "Private" } else { "Public" };
    let rows = [
        ("CIDR", info.cidr()),
        ("Network", info.network.to_string()),
        ("Broadcast", info.broadcast.to_string()),
        ("Subnet mask", info.mask.to_string()),
        ("Wildcard mask", info.wildcard.to_string()),
        ("Binary mask", info.binary_mask()),
        ("First host", info.first_host.to_string()),
        ("Last host", info.last_host.to_string()),
        ("Total addresses", info.total_addresses.to_string()),
        ("Usable hosts", info.usable_hosts.to_string()),
        ("Class", info.class.label().to_string()),
        ("Scope", scope.to_string()),
    ];
    rsx! {
        dl { class: "grid grid-cols-[max-content_1fr] gap-x-4 gap-y-1 text-xs",
            for (label, value) in rows {
                div { key: "{label}", class: "contents",
                    dt { class: "text-slate-500", "{label}" }
                    dd { class: "font-mono break-all", "{value}" }
                }
            }
        }
    }
}

fn split_table(info: &SubnetInfo, prefix: u8) -> Element {
    match info.split(prefix) {
        Err(err) => rsx! { InlineError { message: Some(err.to_string()) } },
        Ok((count, subnets)) => {
            let listed = subnets.len();
            rsx! {
                p { class: "text-xs text-slate-600",
                    if count as usize > listed {
                        "{count} subnets, showing the first {listed}"
                    } else {
                        "{count} subnet(s)"
                    }
                }
                table { class: "w-full text-left text-xs",
                    thead {
                        tr {
                            th { "Network" }
                            th { "Hosts" }
                            th { "Broadcast" }
                            th { "Usable" }
                        }
                    }
                    tbody {
                        for subnet in subnets {
                            tr { key: "{subnet.network}", class: "font-mono",
                                td { "{subnet.cidr()}" }
                                td { "{subnet.first_host} – {subnet.last_host}" }
                                td { "{subnet.broadcast}" }
                                td { "{subnet.usable_hosts}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
