use serde::{Deserialize, Serialize};

const DEFAULT_MAX_UPLOAD_MB: u64 = 50;
const DEFAULT_PASSWORD_LENGTH: usize = 16;
const DEFAULT_IMAGE_QUALITY: u8 = 90;
const DEFAULT_QR_SIZE: u32 = 256;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppProfile {
    Dev,
    Prod,
}

impl AppProfile {
    pub fn from_env(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("prod") | Some("production") => Self::Prod,
            _ => Self::Dev,
        }
    }

    pub fn log_level(self) -> tracing::Level {
        match self {
            Self::Dev => tracing::Level::DEBUG,
            Self::Prod => tracing::Level::INFO,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub profile: AppProfile,
    pub max_upload_bytes: u64,
    pub default_password_length: usize,
    pub default_image_quality: u8,
    pub default_qr_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: AppProfile::Dev,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            default_password_length: DEFAULT_PASSWORD_LENGTH,
            default_image_quality: DEFAULT_IMAGE_QUALITY,
            default_qr_size: DEFAULT_QR_SIZE,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        crate::config::load_dotenv();

        Self::from_lookup(read_env)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        config.profile = AppProfile::from_env(lookup("TOOLBOX_PROFILE"));

        if let Some(mb) =
            lookup("TOOLBOX_MAX_UPLOAD_MB").and_then(|value| value.parse::<u64>().ok())
        {
            config.max_upload_bytes = mb.max(1) * 1024 * 1024;
        }

        if let Some(length) = lookup("TOOLBOX_DEFAULT_PASSWORD_LENGTH")
            .and_then(|value| value.parse::<usize>().ok())
        {
            config.default_password_length = length.clamp(8, 128);
        }

        if let Some(quality) =
            lookup("TOOLBOX_IMAGE_QUALITY").and_then(|value| value.parse::<u8>().ok())
        {
            config.default_image_quality = quality.clamp(1, 100);
        }

        if let Some(size) = lookup("TOOLBOX_QR_SIZE").and_then(|value| value.parse::<u32>().ok())
        {
            config.default_qr_size = size.clamp(64, 2048);
        }

        config
    }

    pub fn max_upload_label(&self) -> String {
        format!("{} MB", self.max_upload_bytes / (1024 * 1024))
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .or_else(|| option_env_from_build(key).map(|s| s.to_string()))
}

fn option_env_from_build(key: &str) -> Option<&'static str> {
    match key {
        "TOOLBOX_PROFILE" => option_env!("TOOLBOX_PROFILE"),
        "TOOLBOX_MAX_UPLOAD_MB" => option_env!("TOOLBOX_MAX_UPLOAD_MB"),
        "TOOLBOX_DEFAULT_PASSWORD_LENGTH" => option_env!("TOOLBOX_DEFAULT_PASSWORD_LENGTH"),
        "TOOLBOX_IMAGE_QUALITY" => option_env!("TOOLBOX_IMAGE_QUALITY"),
        "TOOLBOX_QR_SIZE" => option_env!("TOOLBOX_QR_SIZE"),
        _ => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_dotenv() {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            tracing::warn!("failed to load .env: {err}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[inline]
pub fn load_dotenv() {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.profile, AppProfile::Dev);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.default_password_length, 16);
        assert_eq!(config.default_qr_size, 256);
    }

    #[test]
    fn values_are_clamped() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TOOLBOX_PROFILE", "production"),
            ("TOOLBOX_MAX_UPLOAD_MB", "0"),
            ("TOOLBOX_DEFAULT_PASSWORD_LENGTH", "500"),
            ("TOOLBOX_IMAGE_QUALITY", "0"),
            ("TOOLBOX_QR_SIZE", "10"),
        ]));
        assert_eq!(config.profile, AppProfile::Prod);
        assert_eq!(config.max_upload_bytes, 1024 * 1024);
        assert_eq!(config.default_password_length, 128);
        assert_eq!(config.default_image_quality, 1);
        assert_eq!(config.default_qr_size, 64);
    }

    #[test]
    fn unparsable_values_are_ignored() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("TOOLBOX_DEFAULT_PASSWORD_LENGTH", "many")]));
        assert_eq!(config.default_password_length, 16);
    }
}
