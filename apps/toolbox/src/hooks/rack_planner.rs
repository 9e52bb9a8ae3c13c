use dioxus::prelude::*;
use tracing::{info, warn};

use crate::services::rack::{from_xml, ComponentDraft, RackError, RackProject, DEFAULT_HEIGHT};
use crate::state::{use_app_actions, AppActions};

/// Rack project state. Failed edits leave the project untouched and raise
/// an error toast.
#[derive(Clone, Copy)]
pub struct RackPlannerHandle {
    actions: AppActions,
    pub project: Signal<RackProject>,
    /// Component currently being dragged.
    pub dragging: Signal<Option<String>>,
}

impl RackPlannerHandle {
    fn apply<T>(
        &self,
        context: &str,
        edit: impl FnOnce(&mut RackProject) -> Result<T, RackError>,
    ) -> Option<T> {
        let mut project = self.project;
        let result = edit(&mut project.write());
        result
            .map_err(|err| self.actions.record_failure(context, err))
            .ok()
    }

    pub fn add_rack(&self, name: String, height: u32) {
        self.apply("Adding rack", |project| project.add_rack(name, height));
    }

    pub fn rename_rack(&self, rack_id: &str, name: String) {
        self.apply("Renaming rack", |project| project.rename_rack(rack_id, name));
    }

    pub fn set_height(&self, rack_id: &str, height: u32) {
        self.apply("Resizing rack", |project| project.set_height(rack_id, height));
    }

    pub fn remove_rack(&self, rack_id: &str) {
        self.apply("Removing rack", |project| project.remove_rack(rack_id));
    }

    pub fn add_component(&self, rack_id: &str, draft: ComponentDraft, position: Option<u32>) {
        self.apply("Adding component", |project| {
            project.add_component(rack_id, draft, position)
        });
    }

    pub fn update_component(&self, rack_id: &str, component_id: &str, name: String, model: String, notes: String) {
        self.apply("Editing component", |project| {
            project.update_component(rack_id, component_id, name, model, notes)
        });
    }

    pub fn remove_component(&self, rack_id: &str, component_id: &str) {
        self.apply("Removing component", |project| {
            project.remove_component(rack_id, component_id)
        });
    }

    /// Drops the dragged component so that its top edge lands on `unit`.
    pub fn drop_at(&self, rack_id: &str, unit: u32) {
        let mut dragging = self.dragging;
        let Some(component_id) = dragging.write().take() else {
            return;
        };
        let size = self
            .project
            .read()
            .racks
            .iter()
            .flat_map(|rack| rack.components.iter())
            .find(|component| component.id == component_id)
            .map(|component| component.size)
            .unwrap_or(1);
        let position = (unit + 1).saturating_sub(size);
        self.apply("Moving component", |project| {
            project.move_component(&component_id, rack_id, position)
        });
    }

    pub fn replace_from_xml(&self, file_name: &str, xml: &str) {
        match from_xml(xml) {
            Ok(imported) => {
                info!(file_name, racks = imported.racks.len(), "rack project imported");
                let mut project = self.project;
                project.set(imported);
                self.actions
                    .set_operation_success(format!("Imported {file_name}"));
            }
            Err(err) => self
                .actions
                .record_failure(format!("Importing {file_name}"), err),
        }
    }
}

pub fn use_rack_planner() -> RackPlannerHandle {
    RackPlannerHandle {
        actions: use_app_actions(),
        project: use_signal(|| {
            let mut project = RackProject::default();
            if let Err(err) = project.add_rack("Rack 1", DEFAULT_HEIGHT) {
                warn!(error = %err, "starting with an empty rack project");
            }
            project
        }),
        dragging: use_signal(|| None),
    }
}
