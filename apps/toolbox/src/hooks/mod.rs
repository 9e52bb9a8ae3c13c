pub mod browser;
pub mod conversion;
pub mod preferences;
pub mod rack_planner;
pub mod records;
pub mod rule_builder;

use crate::models::{saved_qr_codes, saved_rules, SavedQrCode, SavedRule};
use records::{use_records, RecordsHandle};

pub fn use_saved_rules() -> RecordsHandle<SavedRule> {
    use_records(saved_rules, "saved rules")
}

pub fn use_saved_qr_codes() -> RecordsHandle<SavedQrCode> {
    use_records(saved_qr_codes, "saved QR codes")
}
