use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RackError;

pub const MIN_HEIGHT: u32 = 1;
pub const MAX_HEIGHT: u32 = 60;
pub const DEFAULT_HEIGHT: u32 = 42;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    #[default]
    Server,
    Switch,
    Router,
    Firewall,
    Storage,
    PatchPanel,
    Ups,
    Pdu,
    Shelf,
    CableManager,
    Blank,
    Other,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 12] = [
        Self::Server,
        Self::Switch,
        Self::Router,
        Self::Firewall,
        Self::Storage,
        Self::PatchPanel,
        Self::Ups,
        Self::Pdu,
        Self::Shelf,
        Self::CableManager,
        Self::Blank,
        Self::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Server => "Server",
            Self::Switch => "Switch",
            Self::Router => "Router",
            Self::Firewall => "Firewall",
            Self::Storage => "Storage",
            Self::PatchPanel => "Patch panel",
            Self::Ups => "UPS",
            Self::Pdu => "PDU",
            Self::Shelf => "Shelf",
            Self::CableManager => "Cable manager",
            Self::Blank => "Blank panel",
            Self::Other => "Other",
        }
    }

    /// Identifier used in exports.
    pub fn value(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Switch => "switch",
            Self::Router => "router",
            Self::Firewall => "firewall",
            Self::Storage => "storage",
            Self::PatchPanel => "patch-panel",
            Self::Ups => "ups",
            Self::Pdu => "pdu",
            Self::Shelf => "shelf",
            Self::CableManager => "cable-manager",
            Self::Blank => "blank",
            Self::Other => "other",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.value() == value)
    }

    pub fn default_size(self) -> u32 {
        match self {
            Self::Storage | Self::Ups => 2,
            _ => 1,
        }
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            Self::Server => [59, 130, 246],
            Self::Switch => [16, 185, 129],
            Self::Router => [139, 92, 246],
            Self::Firewall => [239, 68, 68],
            Self::Storage => [245, 158, 11],
            Self::PatchPanel => [100, 116, 139],
            Self::Ups => [234, 179, 8],
            Self::Pdu => [249, 115, 22],
            Self::Shelf => [148, 163, 184],
            Self::CableManager => [71, 85, 105],
            Self::Blank => [203, 213, 225],
            Self::Other => [20, 184, 166],
        }
    }

    pub fn css_color(self) -> String {
        let [r, g, b] = self.rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// `position` is the lowest rack unit the component occupies, counted
/// from 1 at the bottom of the rack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub kind: ComponentKind,
    pub name: String,
    pub model: String,
    pub position: u32,
    pub size: u32,
    pub notes: String,
}

impl Component {
    pub fn top(&self) -> u32 {
        self.position.saturating_add(self.size.saturating_sub(1))
    }

    pub fn occupies(&self, unit: u32) -> bool {
        (self.position..=self.top()).contains(&unit)
    }

    fn overlaps(&self, position: u32, size: u32) -> bool {
        position <= self.top()
            && u64::from(self.position) < u64::from(position) + u64::from(size)
    }
}

/// Fields the user fills in before a component is placed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentDraft {
    pub kind: ComponentKind,
    pub name: String,
    pub model: String,
    pub size: u32,
    pub notes: String,
}

impl ComponentDraft {
    pub fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            model: String::new(),
            size: kind.default_size(),
            notes: String::new(),
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rack {
    pub id: String,
    pub name: String,
    pub height: u32,
    pub components: Vec<Component>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Utilization {
    pub used: u32,
    pub total: u32,
}

impl Utilization {
    pub fn free(&self) -> u32 {
        self.total.saturating_sub(self.used)
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.used) / f64::from(self.total) * 100.0
    }
}

impl Rack {
    pub fn new(name: impl Into<String>, height: u32) -> Result<Self, RackError> {
        check_height(height)?;
        Ok(Self {
            id: new_id(),
            name: name.into(),
            height,
            components: Vec::new(),
        })
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|component| component.id == id)
    }

    pub fn component_at(&self, unit: u32) -> Option<&Component> {
        self.components
            .iter()
            .find(|component| component.occupies(unit))
    }

    /// Bounds and collision check for placing `size` units at `position`,
    /// ignoring the component with id `ignore`.
    pub fn check_placement(
        &self,
        position: u32,
        size: u32,
        ignore: Option<&str>,
    ) -> Result<(), RackError> {
        let top = position.checked_add(size.saturating_sub(1));
        if size == 0 || position == 0 || top.map_or(true, |top| top > self.height) {
            return Err(RackError::OutOfBounds {
                position,
                size,
                height: self.height,
            });
        }
        let collision = self
            .components
            .iter()
            .filter(|component| Some(component.id.as_str()) != ignore)
            .find(|component| component.overlaps(position, size));
        match collision {
            Some(existing) => Err(RackError::Collision {
                name: existing.name.clone(),
                position: existing.position,
            }),
            None => Ok(()),
        }
    }

    /// Highest position where `size` units fit.
    pub fn first_free_from_top(&self, size: u32) -> Option<u32> {
        if size == 0 || size > self.height {
            return None;
        }
        (1..=self.height - size + 1)
            .rev()
            .find(|position| self.check_placement(*position, size, None).is_ok())
    }

    pub fn utilization(&self) -> Utilization {
        Utilization {
            used: self.components.iter().map(|component| component.size).sum(),
            total: self.height,
        }
    }

    /// Components ordered top to bottom.
    pub fn components_top_down(&self) -> Vec<&Component> {
        let mut sorted: Vec<&Component> = self.components.iter().collect();
        sorted.sort_by(|a, b| b.position.cmp(&a.position));
        sorted
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackProject {
    pub racks: Vec<Rack>,
}

impl RackProject {
    pub fn rack(&self, id: &str) -> Result<&Rack, RackError> {
        self.racks
            .iter()
            .find(|rack| rack.id == id)
            .ok_or_else(|| RackError::UnknownRack(id.to_string()))
    }

    fn rack_mut(&mut self, id: &str) -> Result<&mut Rack, RackError> {
        self.racks
            .iter_mut()
            .find(|rack| rack.id == id)
            .ok_or_else(|| RackError::UnknownRack(id.to_string()))
    }

    pub fn add_rack(&mut self, name: impl Into<String>, height: u32) -> Result<String, RackError> {
        let rack = Rack::new(name, height)?;
        let id = rack.id.clone();
        self.racks.push(rack);
        Ok(id)
    }

    pub fn rename_rack(&mut self, id: &str, name: impl Into<String>) -> Result<(), RackError> {
        self.rack_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn remove_rack(&mut self, id: &str) -> Result<Rack, RackError> {
        let index = self
            .racks
            .iter()
            .position(|rack| rack.id == id)
            .ok_or_else(|| RackError::UnknownRack(id.to_string()))?;
        Ok(self.racks.remove(index))
    }

    /// Refused when a component would end up above the new top unit.
    pub fn set_height(&mut self, id: &str, height: u32) -> Result<(), RackError> {
        check_height(height)?;
        let rack = self.rack_mut(id)?;
        if let Some(component) = rack.components.iter().find(|c| c.top() > height) {
            return Err(RackError::HeightTooSmall {
                height,
                component: component.name.clone(),
            });
        }
        rack.height = height;
        Ok(())
    }

    /// Places at `position` when given, otherwise in the highest free slot.
    pub fn add_component(
        &mut self,
        rack_id: &str,
        draft: ComponentDraft,
        position: Option<u32>,
    ) -> Result<String, RackError> {
        let rack = self.rack_mut(rack_id)?;
        let position = match position {
            Some(position) => {
                rack.check_placement(position, draft.size, None)?;
                position
            }
            None => rack
                .first_free_from_top(draft.size)
                .ok_or(RackError::NoSpace { size: draft.size })?,
        };
        let component = Component {
            id: new_id(),
            kind: draft.kind,
            name: draft.name,
            model: draft.model,
            position,
            size: draft.size,
            notes: draft.notes,
        };
        let id = component.id.clone();
        rack.components.push(component);
        Ok(id)
    }

    pub fn update_component(
        &mut self,
        rack_id: &str,
        component_id: &str,
        name: impl Into<String>,
        model: impl Into<String>,
        notes: impl Into<String>,
    ) -> Result<(), RackError> {
        let component = self
            .rack_mut(rack_id)?
            .components
            .iter_mut()
            .find(|component| component.id == component_id)
            .ok_or_else(|| RackError::UnknownComponent(component_id.to_string()))?;
        component.name = name.into();
        component.model = model.into();
        component.notes = notes.into();
        Ok(())
    }

    /// Moves a component to `position` in `to_rack`, which may be the rack
    /// it already lives in.
    pub fn move_component(
        &mut self,
        component_id: &str,
        to_rack: &str,
        position: u32,
    ) -> Result<(), RackError> {
        let (from_index, component_index) = self
            .racks
            .iter()
            .enumerate()
            .find_map(|(rack_index, rack)| {
                rack.components
                    .iter()
                    .position(|component| component.id == component_id)
                    .map(|component_index| (rack_index, component_index))
            })
            .ok_or_else(|| RackError::UnknownComponent(component_id.to_string()))?;
        let size = self.racks[from_index].components[component_index].size;

        self.rack(to_rack)?
            .check_placement(position, size, Some(component_id))?;

        let mut component = self.racks[from_index].components.remove(component_index);
        component.position = position;
        self.rack_mut(to_rack)?.components.push(component);
        Ok(())
    }

    pub fn remove_component(
        &mut self,
        rack_id: &str,
        component_id: &str,
    ) -> Result<Component, RackError> {
        let rack = self.rack_mut(rack_id)?;
        let index = rack
            .components
            .iter()
            .position(|component| component.id == component_id)
            .ok_or_else(|| RackError::UnknownComponent(component_id.to_string()))?;
        Ok(rack.components.remove(index))
    }

    pub fn utilization(&self) -> Utilization {
        self.racks
            .iter()
            .map(Rack::utilization)
            .fold(Utilization { used: 0, total: 0 }, |sum, rack| Utilization {
                used: sum.used + rack.used,
                total: sum.total + rack.total,
            })
    }

    pub fn component_count(&self) -> usize {
        self.racks.iter().map(|rack| rack.components.len()).sum()
    }
}

pub(super) fn check_height(height: u32) -> Result<(), RackError> {
    if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&height) {
        return Err(RackError::InvalidHeight(height));
    }
    Ok(())
}

pub(super) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> (RackProject, String) {
        let mut project = RackProject::default();
        let rack = project.add_rack("Rack A", 10).unwrap();
        (project, rack)
    }

    #[test]
    fn components_fill_from_the_top() {
        let (mut project, rack) = project();
        let first = project
            .add_component(&rack, ComponentDraft::new(ComponentKind::Switch, "sw1"), None)
            .unwrap();
        let second = project
            .add_component(
                &rack,
                ComponentDraft::new(ComponentKind::Server, "db").with_size(2),
                None,
            )
            .unwrap();

        let rack = project.rack(&rack).unwrap();
        assert_eq!(rack.component(&first).unwrap().position, 10);
        assert_eq!(rack.component(&second).unwrap().position, 8);
        assert_eq!(rack.utilization().used, 3);
        assert_eq!(rack.component_at(9).unwrap().name, "db");
    }

    #[test]
    fn overlapping_and_out_of_bounds_placements_are_refused() {
        let (mut project, rack) = project();
        let draft = ComponentDraft::new(ComponentKind::Server, "a").with_size(2);
        project.add_component(&rack, draft.clone(), Some(1)).unwrap();

        assert!(matches!(
            project.add_component(&rack, draft.clone(), Some(2)),
            Err(RackError::Collision { position: 1, .. })
        ));
        assert!(matches!(
            project.add_component(&rack, draft.clone(), Some(10)),
            Err(RackError::OutOfBounds { .. })
        ));
        assert!(matches!(
            project.add_component(&rack, draft.clone(), Some(u32::MAX)),
            Err(RackError::OutOfBounds { position: u32::MAX, .. })
        ));
        assert!(matches!(
            project.add_component(&rack, draft.with_size(0), Some(5)),
            Err(RackError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn full_rack_reports_no_space() {
        let mut project = RackProject::default();
        let rack = project.add_rack("Tiny", 2).unwrap();
        let draft = ComponentDraft::new(ComponentKind::Ups, "ups");
        project.add_component(&rack, draft.clone(), None).unwrap();
        assert!(matches!(
            project.add_component(&rack, draft, None),
            Err(RackError::NoSpace { size: 2 })
        ));
    }

    #[test]
    fn move_checks_target_and_allows_self_overlap() {
        let (mut project, rack) = project();
        let big = project
            .add_component(
                &rack,
                ComponentDraft::new(ComponentKind::Storage, "san"),
                Some(5),
            )
            .unwrap();
        let small = project
            .add_component(&rack, ComponentDraft::new(ComponentKind::Pdu, "pdu"), Some(1))
            .unwrap();

        project.move_component(&big, &rack, 6).unwrap();
        assert_eq!(project.rack(&rack).unwrap().component(&big).unwrap().position, 6);

        assert!(project.move_component(&small, &rack, 7).is_err());
        assert!(project.move_component(&small, &rack, 11).is_err());
        assert_eq!(project.rack(&rack).unwrap().component(&small).unwrap().position, 1);

        let other = project.add_rack("Rack B", 42).unwrap();
        project.move_component(&small, &other, 20).unwrap();
        assert!(project.rack(&rack).unwrap().component(&small).is_none());
        assert_eq!(project.rack(&other).unwrap().component(&small).unwrap().position, 20);
    }

    #[test]
    fn height_change_respects_components() {
        let (mut project, rack) = project();
        project
            .add_component(&rack, ComponentDraft::new(ComponentKind::Server, "top"), None)
            .unwrap();
        assert!(matches!(
            project.set_height(&rack, 8),
            Err(RackError::HeightTooSmall { .. })
        ));
        project.set_height(&rack, 20).unwrap();
        assert!(matches!(
            project.set_height(&rack, 0),
            Err(RackError::InvalidHeight(0))
        ));
        assert_eq!(project.rack(&rack).unwrap().height, 20);
    }

    #[test]
    fn rack_management() {
        let (mut project, rack) = project();
        project.rename_rack(&rack, "Core").unwrap();
        assert_eq!(project.rack(&rack).unwrap().name, "Core");
        let id = project
            .add_component(&rack, ComponentDraft::new(ComponentKind::Router, "r1"), None)
            .unwrap();
        project
            .update_component(&rack, &id, "edge", "MX204", "uplink")
            .unwrap();
        assert_eq!(project.rack(&rack).unwrap().component(&id).unwrap().model, "MX204");
        project.remove_component(&rack, &id).unwrap();
        assert_eq!(project.component_count(), 0);
        project.remove_rack(&rack).unwrap();
        assert!(matches!(project.rack(&rack), Err(RackError::UnknownRack(_))));
    }
}
