//! QR payload builders and rendering.

use image::{DynamicImage, Luma, Rgba, RgbaImage};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::image_convert::{self, ConvertError, OutputFormat};
use super::text::percent_encode;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("`{0}` is not a #rrggbb colour")]
    Color(String),
    #[error("payload does not fit in a QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("{0} export is not available for QR codes")]
    UnsupportedFormat(&'static str),
    #[error(transparent)]
    Raster(#[from] ConvertError),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WifiEncryption {
    #[default]
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "nopass")]
    None,
}

impl WifiEncryption {
    pub const ALL: [WifiEncryption; 3] = [Self::Wpa, Self::Wep, Self::None];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wpa => "WPA",
            Self::Wep => "WEP",
            Self::None => "nopass",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|enc| enc.as_str() == value)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VCard {
    pub first_name: String,
    pub last_name: String,
    pub organization: String,
    pub title: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QrContent {
    Url { url: String },
    Text { text: String },
    Email { to: String, subject: String, body: String },
    Phone { number: String },
    Sms { number: String, message: String },
    Wifi {
        ssid: String,
        password: String,
        encryption: WifiEncryption,
        hidden: bool,
    },
    Vcard(VCard),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QrKind {
    Url,
    Text,
    Email,
    Phone,
    Sms,
    Wifi,
    Vcard,
}

impl QrKind {
    pub const ALL: [QrKind; 7] = [
        Self::Url,
        Self::Text,
        Self::Email,
        Self::Phone,
        Self::Sms,
        Self::Wifi,
        Self::Vcard,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Url => "URL",
            Self::Text => "Text",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Sms => "SMS",
            Self::Wifi => "WiFi",
            Self::Vcard => "Contact",
        }
    }

    pub fn value(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Text => "text",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Sms => "sms",
            Self::Wifi => "wifi",
            Self::Vcard => "vcard",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.value() == value)
    }

    pub fn empty_content(self) -> QrContent {
        match self {
            Self::Url => QrContent::Url { url: String::new() },
            Self::Text => QrContent::Text { text: String::new() },
            Self::Email => QrContent::Email {
                to: String::new(),
                subject: String::new(),
                body: String::new(),
            },
            Self::Phone => QrContent::Phone { number: String::new() },
            Self::Sms => QrContent::Sms {
                number: String::new(),
                message: String::new(),
            },
            Self::Wifi => QrContent::Wifi {
                ssid: String::new(),
                password: String::new(),
                encryption: WifiEncryption::default(),
                hidden: false,
            },
            Self::Vcard => QrContent::Vcard(VCard::default()),
        }
    }
}

impl QrContent {
    pub fn kind(&self) -> QrKind {
        match self {
            Self::Url { .. } => QrKind::Url,
            Self::Text { .. } => QrKind::Text,
            Self::Email { .. } => QrKind::Email,
            Self::Phone { .. } => QrKind::Phone,
            Self::Sms { .. } => QrKind::Sms,
            Self::Wifi { .. } => QrKind::Wifi,
            Self::Vcard(_) => QrKind::Vcard,
        }
    }

    /// The literal string encoded into the symbol.
    pub fn payload(&self) -> Result<String, QrError> {
        match self {
            Self::Url { url } => {
                let url = required(url, "URL")?;
                if url.contains("://") || url.starts_with("mailto:") {
                    Ok(url.to_string())
                } else {
                    Ok(format!("https://{url}"))
                }
            }
            Self::Text { text } => {
                if text.is_empty() {
                    return Err(QrError::MissingField("Text"));
                }
                Ok(text.clone())
            }
            Self::Email { to, subject, body } => {
                let to = required(to, "Recipient")?;
                let mut query = Vec::new();
                if !subject.trim().is_empty() {
                    query.push(format!("subject={}", percent_encode(subject.trim())));
                }
                if !body.is_empty() {
                    query.push(format!("body={}", percent_encode(body)));
                }
                if query.is_empty() {
                    Ok(format!("mailto:{to}"))
                } else {
                    Ok(format!("mailto:{to}?{}", query.join("&")))
                }
            }
            Self::Phone { number } => Ok(format!("tel:{}", required(number, "Phone number")?)),
            Self::Sms { number, message } => Ok(format!(
                "SMSTO:{}:{}",
                required(number, "Phone number")?,
                message
            )),
            Self::Wifi {
                ssid,
                password,
                encryption,
                hidden,
            } => {
                if ssid.is_empty() {
                    return Err(QrError::MissingField("Network name (SSID)"));
                }
                let mut payload = format!("WIFI:T:{};S:{};", encryption.as_str(), wifi_escape(ssid));
                if *encryption != WifiEncryption::None {
                    if password.is_empty() {
                        return Err(QrError::MissingField("Password"));
                    }
                    payload.push_str(&format!("P:{};", wifi_escape(password)));
                }
                if *hidden {
                    payload.push_str("H:true;");
                }
                payload.push(';');
                Ok(payload)
            }
            Self::Vcard(card) => vcard_payload(card),
        }
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, QrError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(QrError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

fn wifi_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | ';' | ',' | ':' | '"') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// vCard 3.0 text escaping: backslash, `;`, `,` and line breaks.
fn vcard_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' | ';' | ',' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                escaped.push_str("\\n");
            }
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn vcard_payload(card: &VCard) -> Result<String, QrError> {
    let first = vcard_escape(card.first_name.trim());
    let last = vcard_escape(card.last_name.trim());
    if first.is_empty() && last.is_empty() {
        return Err(QrError::MissingField("Name"));
    }

    let full_name = [first.as_str(), last.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("N:{last};{first};;;"),
        format!("FN:{full_name}"),
    ];
    let optional = [
        ("ORG", &card.organization),
        ("TITLE", &card.title),
        ("TEL", &card.phone),
        ("EMAIL", &card.email),
        ("URL", &card.website),
        ("ADR", &card.address),
    ];
    for (field, value) in optional {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        // URL values are URIs, not text, and keep their commas.
        let value = match field {
            "URL" => value.replace(['\r', '\n'], ""),
            _ => vcard_escape(value),
        };
        if field == "ADR" {
            lines.push(format!("ADR:;;{value};;;;"));
        } else {
            lines.push(format!("{field}:{value}"));
        }
    }
    lines.push("END:VCARD".to_string());
    Ok(lines.join("\n"))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrection {
    #[serde(rename = "L")]
    Low,
    #[default]
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "Q")]
    Quartile,
    #[serde(rename = "H")]
    High,
}

impl ErrorCorrection {
    pub const ALL: [ErrorCorrection; 4] = [Self::Low, Self::Medium, Self::Quartile, Self::High];

    pub fn value(self) -> &'static str {
        match self {
            Self::Low => "L",
            Self::Medium => "M",
            Self::Quartile => "Q",
            Self::High => "H",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.value() == value)
    }

    fn level(self) -> EcLevel {
        match self {
            Self::Low => EcLevel::L,
            Self::Medium => EcLevel::M,
            Self::Quartile => EcLevel::Q,
            Self::High => EcLevel::H,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrStyle {
    pub size: u32,
    pub foreground: String,
    pub background: String,
    pub error_correction: ErrorCorrection,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            size: 256,
            foreground: "#000000".into(),
            background: "#ffffff".into(),
            error_correction: ErrorCorrection::default(),
        }
    }
}

pub fn parse_hex_color(value: &str) -> Result<[u8; 3], QrError> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(QrError::Color(value.to_string()));
    }
    let expanded = match hex.len() {
        3 => hex.chars().flat_map(|ch| [ch, ch]).collect::<String>(),
        6 => hex.to_string(),
        _ => return Err(QrError::Color(value.to_string())),
    };
    let mut rgb = [0u8; 3];
    for (index, channel) in rgb.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&expanded[index * 2..index * 2 + 2], 16)
            .map_err(|_| QrError::Color(value.to_string()))?;
    }
    Ok(rgb)
}

fn encode_matrix(payload: &str, style: &QrStyle) -> Result<QrCode, QrError> {
    Ok(QrCode::with_error_correction_level(
        payload.as_bytes(),
        style.error_correction.level(),
    )?)
}

/// SVG markup used for the live preview and the vector download.
pub fn render_svg(payload: &str, style: &QrStyle) -> Result<String, QrError> {
    parse_hex_color(&style.foreground)?;
    parse_hex_color(&style.background)?;
    let code = encode_matrix(payload, style)?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(style.size, style.size)
        .dark_color(svg::Color(style.foreground.as_str()))
        .light_color(svg::Color(style.background.as_str()))
        .build())
}

pub fn render_image(payload: &str, style: &QrStyle) -> Result<RgbaImage, QrError> {
    let [fr, fg, fb] = parse_hex_color(&style.foreground)?;
    let [br, bg, bb] = parse_hex_color(&style.background)?;
    let code = encode_matrix(payload, style)?;
    let mask = code
        .render::<Luma<u8>>()
        .min_dimensions(style.size, style.size)
        .build();
    Ok(RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.get_pixel(x, y)[0] < 128 {
            Rgba([fr, fg, fb, 255])
        } else {
            Rgba([br, bg, bb, 255])
        }
    }))
}

pub fn render_raster(
    payload: &str,
    style: &QrStyle,
    format: OutputFormat,
) -> Result<Vec<u8>, QrError> {
    if !matches!(
        format,
        OutputFormat::Png | OutputFormat::Jpeg | OutputFormat::Webp
    ) {
        return Err(QrError::UnsupportedFormat(format.label()));
    }
    let image = render_image(payload, style)?;
    Ok(image_convert::encode(
        &DynamicImage::ImageRgba8(image),
        format,
        95,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wifi(ssid: &str, password: &str, encryption: WifiEncryption, hidden: bool) -> QrContent {
        QrContent::Wifi {
            ssid: ssid.into(),
            password: password.into(),
            encryption,
            hidden,
        }
    }

    #[test]
    fn wifi_payload_matches_convention() {
        let payload = wifi("Home", "secret", WifiEncryption::Wpa, false)
            .payload()
            .unwrap();
        assert_eq!(payload, "WIFI:T:WPA;S:Home;P:secret;;");
    }

    #[test]
    fn wifi_escapes_reserved_characters_and_flags_hidden() {
        let payload = wifi("My;Net", r#"a:b"c"#, WifiEncryption::Wep, true)
            .payload()
            .unwrap();
        assert_eq!(payload, r#"WIFI:T:WEP;S:My\;Net;P:a\:b\"c;H:true;;"#);
    }

    #[test]
    fn open_network_omits_password() {
        let payload = wifi("Cafe", "ignored", WifiEncryption::None, false)
            .payload()
            .unwrap();
        assert_eq!(payload, "WIFI:T:nopass;S:Cafe;;");
    }

    #[test]
    fn secured_network_requires_password() {
        assert!(matches!(
            wifi("Home", "", WifiEncryption::Wpa, false).payload(),
            Err(QrError::MissingField("Password"))
        ));
    }

    #[test]
    fn url_gets_scheme_when_missing() {
        let content = QrContent::Url {
            url: " example.com/path ".into(),
        };
        assert_eq!(content.payload().unwrap(), "https://example.com/path");
        let content = QrContent::Url {
            url: "http://a.b".into(),
        };
        assert_eq!(content.payload().unwrap(), "http://a.b");
    }

    #[test]
    fn email_encodes_query() {
        let content = QrContent::Email {
            to: "a@b.com".into(),
            subject: "Hi there".into(),
            body: "x&y".into(),
        };
        assert_eq!(
            content.payload().unwrap(),
            "mailto:a@b.com?subject=Hi%20there&body=x%26y"
        );
    }

    #[test]
    fn phone_and_sms_payloads() {
        let phone = QrContent::Phone {
            number: "+15551234".into(),
        };
        assert_eq!(phone.payload().unwrap(), "tel:+15551234");
        let sms = QrContent::Sms {
            number: "+15551234".into(),
            message: "hello".into(),
        };
        assert_eq!(sms.payload().unwrap(), "SMSTO:+15551234:hello");
    }

    #[test]
    fn vcard_skips_empty_fields() {
        let card = VCard {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            ..VCard::default()
        };
        let payload = QrContent::Vcard(card).payload().unwrap();
        assert_eq!(
            payload,
            "BEGIN:VCARD\nVERSION:3.0\nN:Lovelace;Ada;;;\nFN:Ada Lovelace\nEMAIL:ada@example.com\nEND:VCARD"
        );
    }

    #[test]
    fn vcard_escapes_structured_separators() {
        let card = VCard {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            organization: "Analytical Engines; Ltd, UK".into(),
            address: "12 St James's Square\r\nLondon".into(),
            website: "https://example.com/a,b".into(),
            ..VCard::default()
        };
        let payload = QrContent::Vcard(card).payload().unwrap();
        assert!(payload.contains("\nORG:Analytical Engines\\; Ltd\\, UK\n"));
        assert!(payload.contains("\nADR:;;12 St James's Square\\nLondon;;;;\n"));
        assert!(payload.contains("\nURL:https://example.com/a,b\n"));
        assert_eq!(payload.lines().count(), 8);
    }

    #[test]
    fn content_serializes_with_kind_tag() {
        let content = wifi("Home", "secret", WifiEncryption::Wpa, false);
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["kind"], "wifi");
        assert_eq!(json["encryption"], "WPA");
        let back: QrContent = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), QrKind::Wifi);
    }

    #[test]
    fn hex_colors_parse_short_and_long_forms() {
        assert_eq!(parse_hex_color("#ff8000").unwrap(), [255, 128, 0]);
        assert_eq!(parse_hex_color("#fff").unwrap(), [255, 255, 255]);
        assert!(parse_hex_color("red").is_err());
        assert!(parse_hex_color("#aébcd").is_err());
        assert!(parse_hex_color("+f0000").is_err());
    }

    #[test]
    fn renders_svg_and_raster() {
        let style = QrStyle::default();
        let svg = render_svg("https://example.com", &style).unwrap();
        assert!(svg.contains("<svg"));

        let image = render_image("https://example.com", &style).unwrap();
        assert!(image.width() >= 256);
        assert_eq!(image.width(), image.height());

        let png = render_raster("https://example.com", &style, OutputFormat::Png).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        assert!(matches!(
            render_raster("x", &style, OutputFormat::Gif),
            Err(QrError::UnsupportedFormat(_))
        ));
    }
}
