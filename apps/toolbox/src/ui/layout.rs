use dioxus::prelude::*;
use dioxus_router::prelude::*;

use crate::hooks::preferences::{dismiss_install_hint, toggle_theme, use_tool_theme};
use crate::state::{use_app_actions, use_app_state};
use crate::storage::Theme;
use crate::ui::notifications::NotificationCenter;
use crate::Route;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    Password,
    Qr,
    Pdf,
    Images,
    Text,
    Regex,
    Subnet,
    Compose,
    Kace,
    Rack,
}

impl Tool {
    pub const ALL: [Tool; 10] = [
        Self::Password,
        Self::Qr,
        Self::Pdf,
        Self::Images,
        Self::Text,
        Self::Regex,
        Self::Subnet,
        Self::Compose,
        Self::Kace,
        Self::Rack,
    ];

    /// Storage suffix for the per-tool theme override.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Qr => "qr",
            Self::Pdf => "pdf",
            Self::Images => "images",
            Self::Text => "text",
            Self::Regex => "regex",
            Self::Subnet => "subnet",
            Self::Compose => "compose",
            Self::Kace => "kace",
            Self::Rack => "rack",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Password => "Password Generator",
            Self::Qr => "QR Code Generator",
            Self::Pdf => "PDF Tools",
            Self::Images => "Image Converter",
            Self::Text => "Text Tools",
            Self::Regex => "Regex Tester",
            Self::Subnet => "Subnet Calculator",
            Self::Compose => "Docker Compose Generator",
            Self::Kace => "KACE CIR Builder",
            Self::Rack => "Rack Planner",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Self::Password => "Random passwords and word-based passphrases with a strength meter.",
            Self::Qr => "URL, text, WiFi, vCard and more as QR codes in SVG, PNG, JPEG or WebP.",
            Self::Pdf => "Merge, split and compress PDF files without uploading them.",
            Self::Images => "Batch-convert images between PNG, JPEG, WebP, BMP and GIF.",
            Self::Text => "Case conversions, line tools, Base64, URL encoding and statistics.",
            Self::Regex => "Test patterns with flags, capture groups and replacement preview.",
            Self::Subnet => "IPv4 network, broadcast and host ranges, plus subnet splitting.",
            Self::Compose => "Assemble services into a docker-compose.yml.",
            Self::Kace => "Build Quest KACE custom inventory rules from a condition tree.",
            Self::Rack => "Lay out rack elevations and export them as XML, CSV or images.",
        }
    }

    pub fn route(self) -> Route {
        match self {
            Self::Password => Route::PasswordTool {},
            Self::Qr => Route::QrTool {},
            Self::Pdf => Route::PdfTool {},
            Self::Images => Route::ImageTool {},
            Self::Text => Route::TextTool {},
            Self::Regex => Route::RegexTool {},
            Self::Subnet => Route::SubnetTool {},
            Self::Compose => Route::ComposeTool {},
            Self::Kace => Route::KaceTool {},
            Self::Rack => Route::RackTool {},
        }
    }
}

#[component]
pub fn Shell() -> Element {
    let actions = use_app_actions();
    let theme = use_app_state().read().theme;
    let theme_label = match theme {
        Theme::Light => "Dark mode",
        Theme::Dark => "Light mode",
    };
    let shell_class = match theme {
        Theme::Light => "min-h-screen bg-slate-50 text-slate-900",
        Theme::Dark => "dark min-h-screen bg-slate-900 text-slate-100",
    };

    rsx! {
        div { class: "{shell_class}",
            header { class: "border-b border-slate-200 bg-white/80 px-4 py-3 dark:border-slate-700 dark:bg-slate-800",
                div { class: "mx-auto flex max-w-6xl flex-wrap items-center justify-between gap-3",
                    Link { class: "text-lg font-semibold", to: Route::Home {}, "Toolbox" }
                    nav { class: "flex flex-wrap gap-2 text-xs",
                        for tool in Tool::ALL {
                            Link {
                                key: "{tool.slug()}",
                                class: "rounded-full border border-slate-300 px-3 py-1 hover:border-slate-500",
                                active_class: "bg-slate-900 text-white",
                                to: tool.route(),
                                "{tool.title()}"
                            }
                        }
                    }
                    button {
                        class: "rounded border border-slate-300 px-3 py-1 text-xs",
                        onclick: move |_| toggle_theme(actions, theme),
                        "{theme_label}"
                    }
                }
            }
            main { class: "mx-auto max-w-6xl p-4",
                Outlet::<Route> {}
            }
            NotificationCenter {}
        }
    }
}

#[component]
pub fn Home() -> Element {
    let actions = use_app_actions();
    let hint_dismissed = use_app_state().read().install_hint_dismissed;

    rsx! {
        div { class: "space-y-4",
            if !hint_dismissed {
                section { class: "flex items-center justify-between rounded-lg border border-sky-200 bg-sky-50 p-3 text-xs text-sky-800",
                    span { "Install this toolbox from your browser menu to use it offline. Nothing you enter leaves this device." }
                    button {
                        class: "rounded bg-sky-200 px-2 py-1",
                        onclick: move |_| dismiss_install_hint(actions),
                        "Dismiss"
                    }
                }
            }
            div { class: "grid gap-3 md:grid-cols-2 lg:grid-cols-3",
                for tool in Tool::ALL {
                    Link {
                        key: "{tool.slug()}",
                        class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm transition hover:border-slate-400 dark:border-slate-700 dark:bg-slate-800",
                        to: tool.route(),
                        h2 { class: "text-sm font-semibold", "{tool.title()}" }
                        p { class: "mt-1 text-xs text-slate-500", "{tool.summary()}" }
                    }
                }
            }
        }
    }
}

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        section { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm",
            h2 { class: "text-lg font-semibold", "Page not found" }
            p { class: "text-xs text-slate-500", "/{path} is not a tool." }
            Link { class: "text-xs underline", to: Route::Home {}, "Back to all tools" }
        }
    }
}

/// Heading, per-tool theme switch and content area shared by every tool.
#[component]
pub fn ToolFrame(tool: Tool, children: Element) -> Element {
    let theme = use_tool_theme(tool.slug());
    let current = theme.current();
    let frame_class = match current.theme {
        Theme::Light => "space-y-4 rounded-xl bg-white p-4 text-slate-900",
        Theme::Dark => "dark space-y-4 rounded-xl bg-slate-800 p-4 text-slate-100",
    };
    let selected = if current.overridden {
        current.theme.as_str()
    } else {
        "inherit"
    };

    rsx! {
        div { class: "{frame_class}",
            header { class: "flex flex-wrap items-start justify-between gap-2",
                div { class: "flex flex-col gap-1",
                    h1 { class: "text-xl font-semibold", "{tool.title()}" }
                    p { class: "text-xs text-slate-500", "{tool.summary()}" }
                }
                label { class: "flex items-center gap-2 text-xs text-slate-500",
                    "Theme"
                    select {
                        class: "rounded border border-slate-300 px-2 py-1 text-slate-800",
                        value: "{selected}",
                        onchange: move |evt| {
                            let choice = match evt.value().as_str() {
                                "light" => Some(Theme::Light),
                                "dark" => Some(Theme::Dark),
                                _ => None,
                            };
                            theme.set(choice);
                        },
                        option { value: "inherit", "Follow app" }
                        option { value: "light", "Light" }
                        option { value: "dark", "Dark" }
                    }
                }
            }
            {children}
        }
    }
}
