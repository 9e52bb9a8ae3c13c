use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::{self, FunctionDef};
use super::RuleError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn into_inner(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinOperator {
    #[default]
    And,
    Or,
}

impl JoinOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            _ => None,
        }
    }
}

impl fmt::Display for JoinOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub function: &'static FunctionDef,
    pub params: BTreeMap<String, String>,
}

impl Condition {
    fn new(function: &'static FunctionDef) -> Self {
        let params = function
            .params
            .iter()
            .map(|param| (param.name.to_string(), param.default_value().to_string()))
            .collect();
        Self { function, params }
    }

    pub fn value(&self, name: &str) -> &str {
        self.params.get(name).map(String::as_str).unwrap_or("")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub operator: JoinOperator,
    pub children: Vec<NodeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Condition(Condition),
    Group(Group),
}

#[derive(Clone, Debug, PartialEq)]
struct Slot {
    parent: Option<NodeId>,
    node: Node,
}

/// Rule tree stored as an arena. Removed nodes leave a tombstone so ids
/// stay stable for the lifetime of the tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleTree {
    slots: Vec<Option<Slot>>,
    roots: Vec<NodeId>,
    /// `operators[i]` joins `roots[i]` and `roots[i + 1]`.
    operators: Vec<JoinOperator>,
}

impl RuleTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of live nodes at any depth.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn top_operators(&self) -> &[JoinOperator] {
        &self.operators
    }

    pub fn top_operator(&self, index: usize) -> JoinOperator {
        self.operators.get(index).copied().unwrap_or_default()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slot(id).map(|slot| &slot.node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|slot| slot.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(Node::Group(group)) => &group.children,
            _ => &[],
        }
    }

    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.parent(parent);
        }
        depth
    }

    pub fn add_condition(
        &mut self,
        parent: Option<NodeId>,
        function_key: &str,
    ) -> Result<NodeId, RuleError> {
        let function = catalog::lookup(function_key)
            .ok_or_else(|| RuleError::UnknownFunction(function_key.to_string()))?;
        self.insert(parent, Node::Condition(Condition::new(function)))
    }

    pub fn add_group(
        &mut self,
        parent: Option<NodeId>,
        operator: JoinOperator,
    ) -> Result<NodeId, RuleError> {
        self.insert(
            parent,
            Node::Group(Group {
                operator,
                children: Vec::new(),
            }),
        )
    }

    /// Removes a node together with its subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), RuleError> {
        let parent = self.slot(id).ok_or(RuleError::UnknownNode(id))?.parent;

        match parent {
            Some(parent_id) => {
                let group = self.group_mut(parent_id)?;
                group.children.retain(|child| *child != id);
            }
            None => {
                if let Some(index) = self.roots.iter().position(|root| *root == id) {
                    self.roots.remove(index);
                    if index < self.operators.len() {
                        self.operators.remove(index);
                    } else if index > 0 {
                        self.operators.remove(index - 1);
                    }
                }
            }
        }

        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(slot) = self
                .slots
                .get_mut(next.0 as usize)
                .and_then(Option::take)
            {
                if let Node::Group(group) = slot.node {
                    pending.extend(group.children);
                }
            }
        }
        Ok(())
    }

    /// Switches a condition to another function, keeping parameters the new
    /// function also declares.
    pub fn set_function(&mut self, id: NodeId, function_key: &str) -> Result<(), RuleError> {
        let function = catalog::lookup(function_key)
            .ok_or_else(|| RuleError::UnknownFunction(function_key.to_string()))?;
        let condition = self.condition_mut(id)?;
        let mut next = Condition::new(function);
        for (name, value) in next.params.iter_mut() {
            if let Some(previous) = condition.params.get(name) {
                if !previous.is_empty() {
                    *value = previous.clone();
                }
            }
        }
        *condition = next;
        Ok(())
    }

    pub fn set_param(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), RuleError> {
        let condition = self.condition_mut(id)?;
        if condition.function.param(name).is_none() {
            return Err(RuleError::UnknownParameter {
                function: condition.function.key.to_string(),
                param: name.to_string(),
            });
        }
        condition.params.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn set_group_operator(
        &mut self,
        id: NodeId,
        operator: JoinOperator,
    ) -> Result<(), RuleError> {
        self.group_mut(id)?.operator = operator;
        Ok(())
    }

    pub fn set_top_operator(
        &mut self,
        index: usize,
        operator: JoinOperator,
    ) -> Result<(), RuleError> {
        let slot = self
            .operators
            .get_mut(index)
            .ok_or(RuleError::OperatorIndex(index))?;
        *slot = operator;
        Ok(())
    }

    /// Moves a node one position up (`-1`) or down (`1`) among its siblings.
    /// Top-level operators stay attached to their positions.
    pub fn move_by(&mut self, id: NodeId, delta: isize) -> Result<bool, RuleError> {
        let parent = self.slot(id).ok_or(RuleError::UnknownNode(id))?.parent;
        let siblings = match parent {
            Some(parent_id) => &mut self.group_mut(parent_id)?.children,
            None => &mut self.roots,
        };
        let Some(index) = siblings.iter().position(|sibling| *sibling == id) else {
            return Err(RuleError::UnknownNode(id));
        };
        let target = index as isize + delta;
        if target < 0 || target as usize >= siblings.len() {
            return Ok(false);
        }
        siblings.swap(index, target as usize);
        Ok(true)
    }

    pub fn snapshot(&self) -> RuleSnapshot {
        RuleSnapshot {
            elements: self
                .roots
                .iter()
                .filter_map(|id| self.snapshot_node(*id))
                .collect(),
            operators: self.operators.clone(),
        }
    }

    pub fn from_snapshot(snapshot: &RuleSnapshot) -> Result<Self, RuleError> {
        let expected = snapshot.elements.len().saturating_sub(1);
        if snapshot.operators.len() != expected {
            return Err(RuleError::Snapshot(format!(
                "expected {expected} top-level operators, found {}",
                snapshot.operators.len()
            )));
        }

        let mut tree = Self::new();
        for element in &snapshot.elements {
            tree.restore(None, element)?;
        }
        tree.operators = snapshot.operators.clone();
        Ok(tree)
    }

    fn restore(&mut self, parent: Option<NodeId>, node: &SnapshotNode) -> Result<(), RuleError> {
        match node {
            SnapshotNode::Condition { function, params } => {
                let id = self.add_condition(parent, function)?;
                for (name, value) in params {
                    self.set_param(id, name, value)?;
                }
            }
            SnapshotNode::Group { operator, children } => {
                let id = self.add_group(parent, *operator)?;
                for child in children {
                    self.restore(Some(id), child)?;
                }
            }
        }
        Ok(())
    }

    fn snapshot_node(&self, id: NodeId) -> Option<SnapshotNode> {
        match self.get(id)? {
            Node::Condition(condition) => Some(SnapshotNode::Condition {
                function: condition.function.key.to_string(),
                params: condition.params.clone(),
            }),
            Node::Group(group) => Some(SnapshotNode::Group {
                operator: group.operator,
                children: group
                    .children
                    .iter()
                    .filter_map(|child| self.snapshot_node(*child))
                    .collect(),
            }),
        }
    }

    fn insert(&mut self, parent: Option<NodeId>, node: Node) -> Result<NodeId, RuleError> {
        if let Some(parent_id) = parent {
            self.group_mut(parent_id)?;
        }

        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Some(Slot { parent, node }));

        match parent {
            Some(parent_id) => self.group_mut(parent_id)?.children.push(id),
            None => {
                if !self.roots.is_empty() {
                    self.operators.push(JoinOperator::default());
                }
                self.roots.push(id);
            }
        }
        Ok(id)
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, RuleError> {
        self.slots
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .map(|slot| &mut slot.node)
            .ok_or(RuleError::UnknownNode(id))
    }

    fn group_mut(&mut self, id: NodeId) -> Result<&mut Group, RuleError> {
        match self.node_mut(id)? {
            Node::Group(group) => Ok(group),
            Node::Condition(_) => Err(RuleError::NotAGroup(id)),
        }
    }

    fn condition_mut(&mut self, id: NodeId) -> Result<&mut Condition, RuleError> {
        match self.node_mut(id)? {
            Node::Condition(condition) => Ok(condition),
            Node::Group(_) => Err(RuleError::NotACondition(id)),
        }
    }
}

/// Nested, serializable form of a rule tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSnapshot {
    #[serde(default)]
    pub elements: Vec<SnapshotNode>,
    #[serde(default)]
    pub operators: Vec<JoinOperator>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SnapshotNode {
    Condition {
        function: String,
        #[serde(default)]
        params: BTreeMap<String, String>,
    },
    Group {
        operator: JoinOperator,
        #[serde(default)]
        children: Vec<SnapshotNode>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_inserts_track_operators() {
        let mut tree = RuleTree::new();
        tree.add_condition(None, "FileExists").unwrap();
        assert!(tree.top_operators().is_empty());
        tree.add_condition(None, "RegistryKeyExists").unwrap();
        tree.add_group(None, JoinOperator::Or).unwrap();
        assert_eq!(tree.top_operators().len(), 2);
    }

    #[test]
    fn removing_group_drops_subtree() {
        let mut tree = RuleTree::new();
        let group = tree.add_group(None, JoinOperator::And).unwrap();
        let inner = tree.add_group(Some(group), JoinOperator::Or).unwrap();
        let leaf = tree.add_condition(Some(inner), "FileExists").unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.depth(leaf), 2);

        tree.remove(group).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(tree.get(leaf).is_none());
    }

    #[test]
    fn removing_top_level_element_drops_adjacent_operator() {
        let mut tree = RuleTree::new();
        let a = tree.add_condition(None, "FileExists").unwrap();
        let b = tree.add_condition(None, "FileExists").unwrap();
        let c = tree.add_condition(None, "FileExists").unwrap();
        tree.set_top_operator(0, JoinOperator::Or).unwrap();
        tree.set_top_operator(1, JoinOperator::And).unwrap();

        tree.remove(c).unwrap();
        assert_eq!(tree.top_operators(), &[JoinOperator::Or]);

        tree.remove(a).unwrap();
        assert!(tree.top_operators().is_empty());
        assert_eq!(tree.roots(), &[b]);
    }

    #[test]
    fn conditions_cannot_hold_children() {
        let mut tree = RuleTree::new();
        let leaf = tree.add_condition(None, "FileExists").unwrap();
        let err = tree.add_condition(Some(leaf), "FileExists").unwrap_err();
        assert!(matches!(err, RuleError::NotAGroup(id) if id == leaf));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn set_function_keeps_shared_parameters() {
        let mut tree = RuleTree::new();
        let leaf = tree.add_condition(None, "FileExists").unwrap();
        tree.set_param(leaf, "path", r"C:\app.exe").unwrap();
        tree.set_function(leaf, "FileVersionEquals").unwrap();

        let Some(Node::Condition(condition)) = tree.get(leaf) else {
            panic!("expected condition");
        };
        assert_eq!(condition.function.key, "FileVersionEquals");
        assert_eq!(condition.value("path"), r"C:\app.exe");
        assert_eq!(condition.value("version"), "");
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let mut tree = RuleTree::new();
        let leaf = tree.add_condition(None, "FileExists").unwrap();
        assert!(matches!(
            tree.set_param(leaf, "version", "1"),
            Err(RuleError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn move_by_swaps_siblings_within_bounds() {
        let mut tree = RuleTree::new();
        let group = tree.add_group(None, JoinOperator::And).unwrap();
        let a = tree.add_condition(Some(group), "FileExists").unwrap();
        let b = tree.add_condition(Some(group), "RegistryKeyExists").unwrap();

        assert!(!tree.move_by(a, -1).unwrap());
        assert!(tree.move_by(a, 1).unwrap());
        assert_eq!(tree.children(group), &[b, a]);
    }

    #[test]
    fn snapshot_restores_equivalent_tree() {
        let mut tree = RuleTree::new();
        let leaf = tree.add_condition(None, "FileExists").unwrap();
        tree.set_param(leaf, "path", r"C:\a.exe").unwrap();
        let group = tree.add_group(None, JoinOperator::Or).unwrap();
        let inner = tree.add_condition(Some(group), "RegistryKeyExists").unwrap();
        tree.set_param(inner, "key", r"HKLM\Software\X").unwrap();
        tree.set_top_operator(0, JoinOperator::Or).unwrap();

        let snapshot = tree.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: RuleSnapshot = serde_json::from_str(&json).unwrap();
        let restored = RuleTree::from_snapshot(&decoded).unwrap();
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn snapshot_with_mismatched_operators_is_rejected() {
        let snapshot = RuleSnapshot {
            elements: vec![SnapshotNode::Condition {
                function: "FileExists".into(),
                params: BTreeMap::new(),
            }],
            operators: vec![JoinOperator::And],
        };
        assert!(matches!(
            RuleTree::from_snapshot(&snapshot),
            Err(RuleError::Snapshot(_))
        ));
    }
}
