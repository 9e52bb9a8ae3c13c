use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::services::kace::{RuleSnapshot, RuleTree};
use crate::services::qr::{QrContent, QrStyle};
use crate::storage::{KeyValueStore, Record, RecordList, SAVED_QR_CODES_KEY, SAVED_RULES_KEY};

pub type SavedRuleRepository<S> = RecordList<S, SavedRule>;
pub type SavedQrRepository<S> = RecordList<S, SavedQrCode>;

pub fn saved_rules<S: KeyValueStore>(store: S) -> SavedRuleRepository<S> {
    RecordList::new(store, SAVED_RULES_KEY)
}

pub fn saved_qr_codes<S: KeyValueStore>(store: S) -> SavedQrRepository<S> {
    RecordList::new(store, SAVED_QR_CODES_KEY)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "tree")]
    pub snapshot: RuleSnapshot,
    #[serde(default)]
    pub rule_string: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl SavedRule {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        tree: &RuleTree,
        rule_string: impl Into<String>,
    ) -> Self {
        let now = now_ms();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            snapshot: tree.snapshot(),
            rule_string: rule_string.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites contents in place, keeping id and creation time.
    pub fn update(&mut self, tree: &RuleTree, rule_string: impl Into<String>) {
        self.snapshot = tree.snapshot();
        self.rule_string = rule_string.into();
        self.updated_at = now_ms();
    }
}

impl Record for SavedRule {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQrCode {
    pub id: String,
    pub name: String,
    pub content: QrContent,
    #[serde(default)]
    pub style: QrStyle,
    #[serde(default)]
    pub created_at: i64,
}

impl SavedQrCode {
    pub fn new(name: impl Into<String>, content: QrContent, style: QrStyle) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            content,
            style,
            created_at: now_ms(),
        }
    }
}

impl Record for SavedQrCode {
    fn id(&self) -> &str {
        &self.id
    }
}

pub fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// `2024-03-09 14:05 UTC`; raw millis when out of range.
pub fn format_timestamp(ms: i64) -> String {
    match OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000) {
        Ok(at) => format!(
            "{}-{:02}-{:02} {:02}:{:02} UTC",
            at.year(),
            u8::from(at.month()),
            at.day(),
            at.hour(),
            at.minute()
        ),
        Err(_) => ms.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::qr::WifiEncryption;
    use crate::storage::{MemoryStore, StorageError};

    fn tree() -> RuleTree {
        let mut tree = RuleTree::new();
        let id = tree.add_condition(None, "FileExists").unwrap();
        tree.set_param(id, "path", r"C:\app.exe").unwrap();
        tree
    }

    #[test]
    fn saved_rules_use_exported_field_names() {
        let rule = SavedRule::new("App", "desc", &tree(), r"FileExists(C:\app.exe)");
        let json = serde_json::to_value(&rule).unwrap();
        assert!(json.get("tree").is_some());
        assert_eq!(json["ruleString"], r"FileExists(C:\app.exe)");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn rule_repository_round_trip() {
        let repo = saved_rules(MemoryStore::default());
        let mut rule = SavedRule::new("App", "", &tree(), "x");
        repo.upsert(rule.clone()).unwrap();

        rule.update(&RuleTree::new(), "y");
        let records = repo.upsert(rule.clone()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(repo.get(&rule.id).unwrap().rule_string, "y");

        repo.delete(&rule.id).unwrap();
        assert!(matches!(repo.get(&rule.id), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn qr_codes_are_stored_under_their_own_key() {
        let store = MemoryStore::default();
        let repo = saved_qr_codes(store.clone());
        let code = SavedQrCode::new(
            "Guest WiFi",
            QrContent::Wifi {
                ssid: "Guest".into(),
                password: "pw".into(),
                encryption: WifiEncryption::Wpa,
                hidden: false,
            },
            QrStyle::default(),
        );
        repo.upsert(code.clone()).unwrap();
        assert_eq!(repo.list().unwrap(), vec![code]);
        assert!(store.get(SAVED_QR_CODES_KEY).unwrap().is_some());
        assert!(store.get(SAVED_RULES_KEY).unwrap().is_none());
    }

    #[test]
    fn timestamps_format_in_utc() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00 UTC");
        assert_eq!(format_timestamp(1_710_000_000_000), "2024-03-09 16:00 UTC");
    }
}
