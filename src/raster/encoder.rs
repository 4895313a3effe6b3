use crate::{Error, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat};
use std::{fmt, io::Cursor, str::FromStr};

/// Raster formats the gateway can persist and return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Tiff,
    WebP,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::WebP => "webp",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Bmp => ImageFormat::Bmp,
            Self::Tiff => ImageFormat::Tiff,
            Self::WebP => ImageFormat::WebP,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            "tiff" | "tif" => Ok(Self::Tiff),
            "webp" => Ok(Self::WebP),
            other => Err(Error::encoding(format!("unsupported image format '{}'", other))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serializes `image` into `format` in memory.
pub fn encode_bytes(image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), format.image_format())
        .map_err(|e| Error::encoding(format!("failed to encode {}: {}", format, e)))?;
    Ok(buf)
}

/// Serializes `image` into `format` and base64-encodes the bytes.
pub fn encode(image: &DynamicImage, format: OutputFormat) -> Result<String> {
    Ok(STANDARD.encode(encode_bytes(image, format)?))
}

/// Like [`encode`], with the format given by name (`"PNG"`, `"jpg"`, ...).
pub fn encode_as(image: &DynamicImage, format: &str) -> Result<String> {
    encode(image, format.parse()?)
}
