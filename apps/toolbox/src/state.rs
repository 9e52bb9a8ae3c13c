use dioxus::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::Theme;

pub type AppSignal = Signal<AppState>;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OperationState {
    pub last_message: Option<String>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppState {
    pub theme: Theme,
    pub install_hint_dismissed: bool,
    pub operation: OperationState,
}

#[derive(Clone, Copy)]
pub struct AppActions {
    state: AppSignal,
}

impl AppActions {
    pub fn set_theme(&self, theme: Theme) {
        let mut state = self.state;
        state.write().theme = theme;
    }

    pub fn dismiss_install_hint(&self) {
        let mut state = self.state;
        state.write().install_hint_dismissed = true;
    }

    pub fn set_operation_success(&self, message: String) {
        let mut signal = self.state;
        let mut state = signal.write();
        state.operation.last_message = Some(message);
        state.operation.error = None;
        state.operation.context = None;
    }

    pub fn set_operation_error(&self, message: String) {
        let mut signal = self.state;
        let mut state = signal.write();
        state.operation.error = Some(message);
        state.operation.last_message = None;
        state.operation.context = None;
    }

    /// Logs the failure and raises an error toast titled with `context`.
    pub fn record_failure(&self, context: impl Into<String>, err: impl std::fmt::Display) {
        let context = context.into();
        let message = err.to_string();
        warn!(%context, error = %message, "operation failed");

        let mut signal = self.state;
        let mut state = signal.write();
        state.operation.error = Some(message);
        state.operation.last_message = None;
        state.operation.context = Some(context);
    }

    pub fn clear_operation_status(&self) {
        let mut state = self.state;
        state.write().operation = OperationState::default();
    }
}

pub fn use_app_state() -> AppSignal {
    use_context::<AppSignal>()
}

pub fn use_app_actions() -> AppActions {
    AppActions {
        state: use_app_state(),
    }
}
