//! Bulk image re-encoding.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::archive::{self, ArchiveError};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("`{name}` could not be decoded: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("encoding to {format} failed: {source}")]
    Encode {
        format: &'static str,
        #[source]
        source: image::ImageError,
    },
    #[error("`{name}` exceeds the {limit} byte upload limit")]
    TooLarge { name: String, limit: u64 },
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
    Bmp,
    Gif,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Png,
        OutputFormat::Jpeg,
        OutputFormat::Webp,
        OutputFormat::Bmp,
        OutputFormat::Gif,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Webp => "WebP",
            Self::Bmp => "BMP",
            Self::Gif => "GIF",
        }
    }

    pub fn value(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.value() == value)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            other => other.value(),
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Bmp => "image/bmp",
            Self::Gif => "image/gif",
        }
    }

    /// Only JPEG honours the quality slider; WebP output is lossless.
    pub fn supports_quality(self) -> bool {
        matches!(self, Self::Jpeg)
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Webp => ImageFormat::WebP,
            Self::Bmp => ImageFormat::Bmp,
            Self::Gif => ImageFormat::Gif,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    pub format: OutputFormat,
    /// 1..=100
    pub quality: u8,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            quality: 90,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConvertedFile {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConversionStatus {
    Pending,
    Converting,
    Done { output_size: usize },
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConversionJob {
    pub name: String,
    pub input_size: usize,
    pub status: ConversionStatus,
}

impl ConversionJob {
    pub fn pending(name: impl Into<String>, input_size: usize) -> Self {
        Self {
            name: name.into(),
            input_size,
            status: ConversionStatus::Pending,
        }
    }
}

pub fn convert(
    name: &str,
    bytes: &[u8],
    options: ConvertOptions,
) -> Result<ConvertedFile, ConvertError> {
    let image = image::load_from_memory(bytes).map_err(|source| ConvertError::Decode {
        name: name.to_string(),
        source,
    })?;
    let encoded = encode(&image, options.format, options.quality)?;
    Ok(ConvertedFile {
        name: output_name(name, options.format),
        mime: options.format.mime(),
        bytes: encoded,
        width: image.width(),
        height: image.height(),
    })
}

pub fn encode(
    image: &DynamicImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, ConvertError> {
    let mut buffer = Cursor::new(Vec::new());
    let result = match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
            rgb.write_with_encoder(encoder)
        }
        OutputFormat::Webp | OutputFormat::Gif => {
            DynamicImage::ImageRgba8(image.to_rgba8()).write_to(&mut buffer, format.image_format())
        }
        OutputFormat::Bmp => {
            DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut buffer, format.image_format())
        }
        OutputFormat::Png => image.write_to(&mut buffer, format.image_format()),
    };
    result.map_err(|source| ConvertError::Encode {
        format: format.label(),
        source,
    })?;
    Ok(buffer.into_inner())
}

/// `photo.jpeg` → `photo.png`
pub fn output_name(original: &str, format: OutputFormat) -> String {
    let stem = match original.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => original,
    };
    format!("{stem}.{}", format.extension())
}

pub fn check_size(name: &str, size: usize, limit: u64) -> Result<(), ConvertError> {
    if size as u64 > limit {
        return Err(ConvertError::TooLarge {
            name: name.to_string(),
            limit,
        });
    }
    Ok(())
}

pub fn bundle(files: &[ConvertedFile]) -> Result<Vec<u8>, ConvertError> {
    Ok(archive::zip_files(
        files
            .iter()
            .map(|file| (file.name.as_str(), file.bytes.as_slice())),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample_png() -> Vec<u8> {
        let image = RgbaImage::from_fn(4, 3, |x, y| Rgba([x as u8 * 60, y as u8 * 80, 128, 200]));
        encode(&DynamicImage::ImageRgba8(image), OutputFormat::Png, 100).unwrap()
    }

    #[test]
    fn converts_between_every_format() {
        let png = sample_png();
        for format in OutputFormat::ALL {
            let converted = convert("sample.png", &png, ConvertOptions { format, quality: 80 })
                .unwrap_or_else(|err| panic!("{format:?}: {err}"));
            assert_eq!(converted.name, format!("sample.{}", format.extension()));
            assert_eq!((converted.width, converted.height), (4, 3));

            let decoded = image::load_from_memory(&converted.bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (4, 3));
        }
    }

    #[test]
    fn undecodable_input_names_the_file() {
        let err = convert("broken.png", b"nope", ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { ref name, .. } if name == "broken.png"));
    }

    #[test]
    fn output_name_replaces_extension() {
        assert_eq!(output_name("photo.jpeg", OutputFormat::Webp), "photo.webp");
        assert_eq!(output_name("archive.tar.gz", OutputFormat::Png), "archive.tar.png");
        assert_eq!(output_name("noext", OutputFormat::Jpeg), "noext.jpg");
        assert_eq!(output_name(".hidden", OutputFormat::Png), ".hidden.png");
    }

    #[test]
    fn size_limit_is_enforced() {
        assert!(check_size("a.png", 10, 10).is_ok());
        assert!(matches!(
            check_size("a.png", 11, 10),
            Err(ConvertError::TooLarge { .. })
        ));
    }

    #[test]
    fn bundle_packs_outputs() {
        let png = sample_png();
        let file = convert("a.png", &png, ConvertOptions::default()).unwrap();
        let zip = bundle(&[file.clone(), file]).unwrap();
        assert!(zip.starts_with(b"PK"));
    }
}
