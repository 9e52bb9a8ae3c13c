//! Rule tree → KACE rule string.

use std::collections::BTreeMap;

use super::tree::{Condition, JoinOperator, Node, NodeId, RuleTree};
use super::RuleError;

/// Stand-in emitted for a condition that failed validation.
pub const INVALID_PLACEHOLDER: &str = "[INVALID]";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderOutcome {
    pub rule: String,
    pub errors: BTreeMap<NodeId, String>,
}

impl RenderOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Renders the whole tree, collecting a validation message per invalid node.
pub fn render(tree: &RuleTree) -> RenderOutcome {
    let mut errors = BTreeMap::new();
    let parts = tree
        .roots()
        .iter()
        .enumerate()
        .map(|(index, id)| (render_node(tree, *id, &mut errors), tree.top_operator(index)))
        .collect::<Vec<_>>();

    RenderOutcome {
        rule: join_parts(parts),
        errors,
    }
}

/// Produces the final rule string, refusing when anything is invalid.
pub fn generate(tree: &RuleTree) -> Result<String, RuleError> {
    let outcome = render(tree);
    if outcome.has_errors() {
        return Err(RuleError::Invalid(outcome.errors));
    }
    if outcome.rule.is_empty() {
        return Err(RuleError::Empty);
    }
    Ok(outcome.rule)
}

/// Renders a single condition, or the reason it cannot be rendered.
pub fn render_condition(condition: &Condition) -> Result<String, String> {
    let missing = condition
        .function
        .params
        .iter()
        .filter(|param| param.required && condition.value(param.name).trim().is_empty())
        .map(|param| param.label)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(format!("{} requires: {}", condition.function.key, missing.join(", ")));
    }

    let mut args = condition
        .function
        .params
        .iter()
        .map(|param| condition.value(param.name).trim())
        .collect::<Vec<_>>();
    while args.last().is_some_and(|arg| arg.is_empty()) {
        args.pop();
    }

    Ok(format!("{}({})", condition.function.key, args.join(", ")))
}

fn render_node(tree: &RuleTree, id: NodeId, errors: &mut BTreeMap<NodeId, String>) -> String {
    match tree.get(id) {
        Some(Node::Condition(condition)) => match render_condition(condition) {
            Ok(rendered) => rendered,
            Err(message) => {
                errors.insert(id, message);
                INVALID_PLACEHOLDER.to_string()
            }
        },
        Some(Node::Group(group)) => {
            let parts = group
                .children
                .iter()
                .map(|child| (render_node(tree, *child, errors), group.operator))
                .collect::<Vec<_>>();
            let inner = join_parts(parts);
            if inner.is_empty() {
                String::new()
            } else {
                format!("({inner})")
            }
        }
        None => String::new(),
    }
}

/// Joins rendered parts; each part carries the operator that follows it.
/// Empty parts are skipped together with their trailing operator.
fn join_parts(parts: Vec<(String, JoinOperator)>) -> String {
    let mut rule = String::new();
    let mut pending: Option<JoinOperator> = None;
    for (part, following) in parts {
        if part.is_empty() {
            continue;
        }
        if let Some(operator) = pending {
            rule.push(' ');
            rule.push_str(operator.as_str());
            rule.push(' ');
        }
        rule.push_str(&part);
        pending = Some(following);
    }
    rule
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_exists(tree: &mut RuleTree, parent: Option<NodeId>, path: &str) -> NodeId {
        let id = tree.add_condition(parent, "FileExists").unwrap();
        tree.set_param(id, "path", path).unwrap();
        id
    }

    #[test]
    fn file_exists_renders_path_verbatim() {
        let mut tree = RuleTree::new();
        file_exists(&mut tree, None, r"C:\Path\To\File.exe");
        assert_eq!(generate(&tree).unwrap(), r"FileExists(C:\Path\To\File.exe)");
    }

    #[test]
    fn multi_parameter_functions_are_comma_separated() {
        let mut tree = RuleTree::new();
        let id = tree.add_condition(None, "RegistryValueEquals").unwrap();
        tree.set_param(id, "key", r"HKLM\Software\Vendor").unwrap();
        tree.set_param(id, "name", "Version").unwrap();
        tree.set_param(id, "value", "2.1").unwrap();
        assert_eq!(
            generate(&tree).unwrap(),
            r"RegistryValueEquals(HKLM\Software\Vendor, Version, 2.1)"
        );
    }

    #[test]
    fn blank_optional_parameter_keeps_position() {
        let mut tree = RuleTree::new();
        let id = tree.add_condition(None, "RegistryValueReturn").unwrap();
        tree.set_param(id, "key", r"HKLM\Software\Vendor").unwrap();
        assert_eq!(
            generate(&tree).unwrap(),
            r"RegistryValueReturn(HKLM\Software\Vendor, , TEXT)"
        );
    }

    #[test]
    fn complete_conditions_report_no_errors() {
        let mut tree = RuleTree::new();
        let a = file_exists(&mut tree, None, r"C:\a.exe");
        let group = tree.add_group(None, JoinOperator::Or).unwrap();
        let b = file_exists(&mut tree, Some(group), r"C:\b.exe");
        let outcome = render(&tree);
        assert!(!outcome.errors.contains_key(&a));
        assert!(!outcome.errors.contains_key(&b));
        assert!(!outcome.has_errors());
    }

    #[test]
    fn groups_use_their_operator_and_parentheses() {
        let mut tree = RuleTree::new();
        file_exists(&mut tree, None, r"C:\a.exe");
        let group = tree.add_group(None, JoinOperator::Or).unwrap();
        file_exists(&mut tree, Some(group), r"C:\b.exe");
        file_exists(&mut tree, Some(group), r"C:\c.exe");
        assert_eq!(
            generate(&tree).unwrap(),
            r"FileExists(C:\a.exe) AND (FileExists(C:\b.exe) OR FileExists(C:\c.exe))"
        );
    }

    #[test]
    fn mixed_top_level_operators() {
        let mut tree = RuleTree::new();
        file_exists(&mut tree, None, "a");
        file_exists(&mut tree, None, "b");
        file_exists(&mut tree, None, "c");
        tree.set_top_operator(1, JoinOperator::Or).unwrap();
        assert_eq!(
            generate(&tree).unwrap(),
            "FileExists(a) AND FileExists(b) OR FileExists(c)"
        );
    }

    #[test]
    fn empty_group_contributes_nothing() {
        let mut tree = RuleTree::new();
        file_exists(&mut tree, None, "a");
        tree.add_group(None, JoinOperator::Or).unwrap();
        let rule = generate(&tree).unwrap();
        assert_eq!(rule, "FileExists(a)");
        assert!(!rule.ends_with("AND") && !rule.ends_with("AND "));
    }

    #[test]
    fn empty_group_in_the_middle_absorbs_its_trailing_operator() {
        let mut tree = RuleTree::new();
        file_exists(&mut tree, None, "a");
        tree.add_group(None, JoinOperator::And).unwrap();
        file_exists(&mut tree, None, "b");
        tree.set_top_operator(0, JoinOperator::Or).unwrap();
        tree.set_top_operator(1, JoinOperator::And).unwrap();
        assert_eq!(generate(&tree).unwrap(), "FileExists(a) OR FileExists(b)");
    }

    #[test]
    fn leading_and_nested_empty_groups_are_dropped() {
        let mut tree = RuleTree::new();
        let outer = tree.add_group(None, JoinOperator::Or).unwrap();
        tree.add_group(Some(outer), JoinOperator::And).unwrap();
        file_exists(&mut tree, None, "a");
        assert_eq!(generate(&tree).unwrap(), "FileExists(a)");
    }

    #[test]
    fn missing_required_parameter_marks_node_and_refuses_generation() {
        let mut tree = RuleTree::new();
        let ok = file_exists(&mut tree, None, "a");
        let bad = tree.add_condition(None, "FileVersionEquals").unwrap();
        tree.set_param(bad, "path", "b").unwrap();

        let outcome = render(&tree);
        assert_eq!(outcome.rule, format!("FileExists(a) AND {INVALID_PLACEHOLDER}"));
        assert!(outcome.errors.contains_key(&bad));
        assert!(!outcome.errors.contains_key(&ok));

        match generate(&tree) {
            Err(RuleError::Invalid(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn whitespace_only_values_count_as_blank() {
        let mut tree = RuleTree::new();
        file_exists(&mut tree, None, "   ");
        assert!(render(&tree).has_errors());
    }

    #[test]
    fn empty_tree_cannot_be_generated() {
        let mut tree = RuleTree::new();
        assert!(matches!(generate(&tree), Err(RuleError::Empty)));
        tree.add_group(None, JoinOperator::And).unwrap();
        assert!(matches!(generate(&tree), Err(RuleError::Empty)));
    }
}
