use serde::Deserialize;
use thiserror::Error;

use super::tree::RuleTree;
use super::RuleError;
use crate::models::SavedRule;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("importing rule strings is not supported; load a saved rule export instead")]
    Unsupported,
    #[error("export is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rule `{name}` cannot be restored: {source}")]
    InvalidRule {
        name: String,
        #[source]
        source: RuleError,
    },
}

/// Parsing the KACE grammar back into a tree is not implemented; every
/// input is rejected.
pub fn import_rule_string(_rule: &str) -> Result<RuleTree, ImportError> {
    Err(ImportError::Unsupported)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExportShape {
    Many(Vec<SavedRule>),
    One(Box<SavedRule>),
}

/// Accepts either a list of saved rules or a single saved rule object.
pub fn parse_rule_export(json: &str) -> Result<Vec<SavedRule>, ImportError> {
    let rules = match serde_json::from_str::<ExportShape>(json)? {
        ExportShape::Many(rules) => rules,
        ExportShape::One(rule) => vec![*rule],
    };

    for rule in &rules {
        RuleTree::from_snapshot(&rule.snapshot).map_err(|source| ImportError::InvalidRule {
            name: rule.name.clone(),
            source,
        })?;
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::kace::{generate, RuleTree};

    #[test]
    fn rule_strings_are_never_imported() {
        assert!(matches!(
            import_rule_string(r"FileExists(C:\a.exe)"),
            Err(ImportError::Unsupported)
        ));
        assert!(matches!(import_rule_string(""), Err(ImportError::Unsupported)));
    }

    #[test]
    fn single_object_and_list_exports_are_accepted() {
        let mut tree = RuleTree::new();
        let id = tree.add_condition(None, "FileExists").unwrap();
        tree.set_param(id, "path", r"C:\a.exe").unwrap();
        let rule = SavedRule::new("App", "", &tree, generate(&tree).unwrap());

        let one = serde_json::to_string(&rule).unwrap();
        assert_eq!(parse_rule_export(&one).unwrap().len(), 1);

        let many = serde_json::to_string(&vec![rule.clone(), rule]).unwrap();
        assert_eq!(parse_rule_export(&many).unwrap().len(), 2);
    }

    #[test]
    fn unknown_function_in_export_is_reported() {
        let json = r#"[{
            "id": "x",
            "name": "Broken",
            "tree": {"elements": [{"type": "condition", "function": "Nope", "params": {}}], "operators": []},
            "ruleString": ""
        }]"#;
        match parse_rule_export(json) {
            Err(ImportError::InvalidRule { name, .. }) => assert_eq!(name, "Broken"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn garbage_is_a_json_error() {
        assert!(matches!(parse_rule_export("not json"), Err(ImportError::Json(_))));
    }
}
