#![allow(non_snake_case)]

mod config;
mod hooks;
mod models;
mod services;
mod state;
mod storage;
mod ui;

use config::AppConfig;
use dioxus::prelude::*;
use dioxus_router::prelude::*;
use hooks::preferences::use_preferences;
use once_cell::sync::OnceCell;
use state::AppState;
use tracing::info;
use ui::compose::ComposePanel;
use ui::image_converter::ImageConverterPanel;
use ui::kace::KacePanel;
use ui::layout::{Home, NotFound, Shell};
use ui::password::PasswordPanel;
use ui::pdf::PdfPanel;
use ui::qr::QrPanel;
use ui::rack::RackPanel;
use ui::regex_tester::RegexTesterPanel;
use ui::subnet::SubnetPanel;
use ui::text_tools::TextToolsPanel;

pub(crate) static APP_CONFIG: OnceCell<AppConfig> = OnceCell::new();

fn main() {
    console_error_panic_hook::set_once();
    let config = AppConfig::from_env();
    init_logging(config.profile.log_level());
    info!(profile = ?config.profile, max_upload = %config.max_upload_label(), "toolbox starting");
    let _ = APP_CONFIG.set(config);
    launch(App);
}

fn init_logging(level: tracing::Level) {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = dioxus_logger::init(level);
    });
}

#[component]
fn App() -> Element {
    let app_state = use_signal(AppState::default);

    use_context_provider(|| app_state);
    use_preferences();

    rsx! {
        div { class: "relative",
            Router::<Route> {}
        }
    }
}

#[derive(Clone, Routable, Debug, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Shell)]
        #[route("/")]
        Home {},
        #[route("/tools/password")]
        PasswordTool {},
        #[route("/tools/qr")]
        QrTool {},
        #[route("/tools/pdf")]
        PdfTool {},
        #[route("/tools/images")]
        ImageTool {},
        #[route("/tools/text")]
        TextTool {},
        #[route("/tools/regex")]
        RegexTool {},
        #[route("/tools/subnet")]
        SubnetTool {},
        #[route("/tools/compose")]
        ComposeTool {},
        #[route("/tools/kace")]
        KaceTool {},
        #[route("/tools/rack")]
        RackTool {},
        #[route("/:..segments")]
        NotFound { segments: Vec<String> },
}

#[component]
fn PasswordTool() -> Element {
    rsx! { PasswordPanel {} }
}

#[component]
fn QrTool() -> Element {
    rsx! { QrPanel {} }
}

#[component]
fn PdfTool() -> Element {
    rsx! { PdfPanel {} }
}

#[component]
fn ImageTool() -> Element {
    rsx! { ImageConverterPanel {} }
}

#[component]
fn TextTool() -> Element {
    rsx! { TextToolsPanel {} }
}

#[component]
fn RegexTool() -> Element {
    rsx! { RegexTesterPanel {} }
}

#[component]
fn SubnetTool() -> Element {
    rsx! { SubnetPanel {} }
}

#[component]
fn ComposeTool() -> Element {
    rsx! { ComposePanel {} }
}

#[component]
fn KaceTool() -> Element {
    rsx! { KacePanel {} }
}

#[component]
fn RackTool() -> Element {
    rsx! { RackPanel {} }
}
