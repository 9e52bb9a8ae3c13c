use dioxus::prelude::*;
use tracing::debug;

use crate::models::SavedRule;
use crate::services::kace::{catalog, JoinOperator, NodeId, RuleError, RuleTree};
use crate::state::{use_app_actions, AppActions};

/// Editable rule tree plus the saved rule it was loaded from, if any.
#[derive(Clone, Copy)]
pub struct RuleBuilderHandle {
    actions: AppActions,
    pub tree: Signal<RuleTree>,
    pub loaded: Signal<Option<SavedRule>>,
}

impl RuleBuilderHandle {
    fn apply<T>(&self, context: &str, edit: impl FnOnce(&mut RuleTree) -> Result<T, RuleError>) -> Option<T> {
        let mut tree = self.tree;
        let result = edit(&mut tree.write());
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.actions.record_failure(context, err);
                None
            }
        }
    }

    pub fn add_condition(&self, parent: Option<NodeId>) {
        let key = catalog::default_function().key;
        if let Some(id) = self.apply("Adding condition", |tree| tree.add_condition(parent, key)) {
            debug!(%id, ?parent, "condition added");
        }
    }

    pub fn add_group(&self, parent: Option<NodeId>) {
        self.apply("Adding group", |tree| tree.add_group(parent, JoinOperator::And));
    }

    pub fn remove(&self, id: NodeId) {
        self.apply("Removing node", |tree| tree.remove(id));
    }

    pub fn move_by(&self, id: NodeId, delta: isize) {
        self.apply("Moving node", |tree| tree.move_by(id, delta));
    }

    pub fn set_function(&self, id: NodeId, key: &str) {
        self.apply("Changing function", |tree| tree.set_function(id, key));
    }

    pub fn set_param(&self, id: NodeId, name: &str, value: &str) {
        self.apply("Editing parameter", |tree| tree.set_param(id, name, value));
    }

    pub fn set_group_operator(&self, id: NodeId, operator: JoinOperator) {
        self.apply("Changing operator", |tree| tree.set_group_operator(id, operator));
    }

    pub fn set_top_operator(&self, index: usize, operator: JoinOperator) {
        self.apply("Changing operator", |tree| tree.set_top_operator(index, operator));
    }

    pub fn reset(&self) {
        let mut tree = self.tree;
        let mut loaded = self.loaded;
        tree.write().clear();
        loaded.set(None);
    }

    pub fn load(&self, rule: SavedRule) {
        match RuleTree::from_snapshot(&rule.snapshot) {
            Ok(restored) => {
                let mut tree = self.tree;
                let mut loaded = self.loaded;
                tree.set(restored);
                self.actions
                    .set_operation_success(format!("Loaded \"{}\"", rule.name));
                loaded.set(Some(rule));
            }
            Err(err) => self
                .actions
                .record_failure(format!("Loading \"{}\"", rule.name), err),
        }
    }
}

pub fn use_rule_builder() -> RuleBuilderHandle {
    RuleBuilderHandle {
        actions: use_app_actions(),
        tree: use_signal(RuleTree::new),
        loaded: use_signal(|| None),
    }
}
