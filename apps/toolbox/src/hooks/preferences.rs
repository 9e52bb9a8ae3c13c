use dioxus::prelude::*;
use tracing::warn;

use crate::state::{use_app_actions, use_app_state, AppActions};
use crate::storage::{LocalStore, Theme, ThemeRepository};

fn repository() -> ThemeRepository<LocalStore> {
    ThemeRepository::new(LocalStore)
}

/// Loads the stored theme and install-hint flag into app state once.
pub fn use_preferences() {
    let actions = use_app_actions();
    use_hook(move || {
        let preferences = repository();
        match preferences.theme() {
            Ok(theme) => actions.set_theme(theme),
            Err(err) => warn!(error = %err, "theme preference unreadable"),
        }
        if preferences.install_hint_dismissed().unwrap_or(false) {
            actions.dismiss_install_hint();
        }
    });
}

pub fn toggle_theme(actions: AppActions, current: Theme) {
    let next = current.toggled();
    actions.set_theme(next);
    if let Err(err) = repository().set_theme(next) {
        actions.record_failure("Saving theme", err);
    }
}

pub fn dismiss_install_hint(actions: AppActions) {
    actions.dismiss_install_hint();
    if let Err(err) = repository().dismiss_install_hint() {
        warn!(error = %err, "install hint flag not persisted");
    }
}

/// Effective theme for one tool plus whether it overrides the global one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToolTheme {
    pub theme: Theme,
    pub overridden: bool,
}

#[derive(Clone, Copy)]
pub struct ToolThemeHandle {
    tool: &'static str,
    actions: AppActions,
    overrides: Signal<Option<Theme>>,
    global: Theme,
}

impl ToolThemeHandle {
    pub fn current(&self) -> ToolTheme {
        match *self.overrides.read() {
            Some(theme) => ToolTheme {
                theme,
                overridden: true,
            },
            None => ToolTheme {
                theme: self.global,
                overridden: false,
            },
        }
    }

    pub fn set(&self, theme: Option<Theme>) {
        let mut overrides = self.overrides;
        overrides.set(theme);
        if let Err(err) = repository().set_component_theme(self.tool, theme) {
            self.actions
                .record_failure(format!("Saving theme for {}", self.tool), err);
        }
    }
}

pub fn use_tool_theme(tool: &'static str) -> ToolThemeHandle {
    let actions = use_app_actions();
    let global = use_app_state().read().theme;
    let overrides = use_signal(move || {
        let preferences = repository();
        let stored = preferences.component_overrides().unwrap_or_default();
        if stored.iter().any(|name| name == tool) {
            preferences.component_theme(tool).ok()
        } else {
            None
        }
    });
    ToolThemeHandle {
        tool,
        actions,
        overrides,
        global,
    }
}
