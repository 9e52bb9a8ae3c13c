use dioxus::prelude::*;

use crate::services::browser;
use crate::state::AppActions;

pub fn copy_to_clipboard(actions: AppActions, label: impl Into<String>, text: String) {
    let label = label.into();
    spawn(async move {
        match browser::copy_text(&text).await {
            Ok(()) => actions.set_operation_success(format!("{label} copied")),
            Err(err) => actions.record_failure(format!("Copying {label}"), err),
        }
    });
}

pub fn offer_download(actions: AppActions, file_name: &str, mime: &str, bytes: &[u8]) {
    match browser::download(file_name, mime, bytes) {
        Ok(()) => actions.set_operation_success(format!("{file_name} ready")),
        Err(err) => actions.record_failure(format!("Downloading {file_name}"), err),
    }
}
