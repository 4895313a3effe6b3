use crate::{Error, Result, inference::InferenceEnvelope};
use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Nested `height × width × channels` array as returned by the endpoint.
pub type PixelArray = Value;

/// Image data carried by an inference response.
#[derive(Debug, Clone)]
pub enum PixelPayload {
    Array(PixelArray),
    Encoded(DynamicImage),
}

#[derive(Debug, Clone)]
pub struct DecodedResponse {
    pub pixels: PixelPayload,
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
struct GenerationBody {
    #[serde(default)]
    generated_image: Option<Value>,
    #[serde(default)]
    generated_images: Option<Vec<Value>>,
    prompt: String,
}

/// Extracts the pixel payload and the echoed prompt from an envelope.
///
/// Bodies with an `image/*` content type are decoded directly and echo
/// `requested_prompt`. Anything else is parsed as JSON.
pub fn decode(envelope: &InferenceEnvelope, requested_prompt: &str) -> Result<DecodedResponse> {
    if envelope.is_image() {
        let image = image::load_from_memory(&envelope.body)
            .map_err(|e| Error::response_parse(format!("binary image body: {}", e)))?;
        return Ok(DecodedResponse {
            pixels: PixelPayload::Encoded(image),
            prompt: requested_prompt.to_string(),
        });
    }

    let body: GenerationBody = serde_json::from_slice(&envelope.body)
        .map_err(|e| Error::response_parse(e.to_string()))?;

    let pixels = match (body.generated_image, body.generated_images) {
        (Some(pixels), _) => pixels,
        (None, Some(images)) => images
            .into_iter()
            .next()
            .ok_or_else(|| Error::response_parse("`generated_images` is empty"))?,
        (None, None) => return Err(Error::response_parse("missing field `generated_image`")),
    };

    Ok(DecodedResponse {
        pixels: PixelPayload::Array(pixels),
        prompt: body.prompt,
    })
}

impl PixelPayload {
    pub fn into_image(self) -> Result<DynamicImage> {
        match self {
            Self::Array(pixels) => to_image(&pixels),
            Self::Encoded(image) => Ok(image),
        }
    }
}

/// Builds a raster from a `height × width × channels` array.
///
/// Shape is validated before anything is allocated for the image: rows must
/// share one width, pixels one channel count, and that count must be 1 to 4.
/// Scalars narrow like an unsigned 8-bit cast.
pub fn to_image(pixels: &PixelArray) -> Result<DynamicImage> {
    let rows = pixels
        .as_array()
        .ok_or_else(|| Error::invalid_pixels("pixel payload is not an array"))?;
    if rows.is_empty() {
        return Err(Error::invalid_pixels("pixel payload has no rows"));
    }

    let mut width = None;
    let mut channels = None;
    let mut raw = Vec::new();

    for (y, row) in rows.iter().enumerate() {
        let row = row
            .as_array()
            .ok_or_else(|| Error::invalid_pixels(format!("row {} is not an array", y)))?;

        match width {
            None => width = Some(row.len()),
            Some(expected) if expected != row.len() => {
                return Err(Error::invalid_pixels(format!(
                    "row {} has {} pixels, expected {}",
                    y,
                    row.len(),
                    expected
                )));
            }
            Some(_) => {}
        }

        for (x, pixel) in row.iter().enumerate() {
            let pixel = pixel.as_array().ok_or_else(|| {
                Error::invalid_pixels(format!("pixel ({}, {}) is not an array", x, y))
            })?;

            match channels {
                None => channels = Some(pixel.len()),
                Some(expected) if expected != pixel.len() => {
                    return Err(Error::invalid_pixels(format!(
                        "pixel ({}, {}) has {} channels, expected {}",
                        x,
                        y,
                        pixel.len(),
                        expected
                    )));
                }
                Some(_) => {}
            }

            for value in pixel {
                raw.push(narrow(value)?);
            }
        }
    }

    let width = width.unwrap_or_default();
    let channels = channels.unwrap_or_default();
    if width == 0 {
        return Err(Error::invalid_pixels("pixel payload has empty rows"));
    }

    let w = u32::try_from(width).map_err(|_| Error::invalid_pixels("image too wide"))?;
    let h = u32::try_from(rows.len()).map_err(|_| Error::invalid_pixels("image too tall"))?;

    debug!("Reconstructing {}x{} image with {} channels", w, h, channels);

    let image = match channels {
        1 => GrayImage::from_raw(w, h, raw).map(DynamicImage::ImageLuma8),
        2 => GrayAlphaImage::from_raw(w, h, raw).map(DynamicImage::ImageLumaA8),
        3 => RgbImage::from_raw(w, h, raw).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(w, h, raw).map(DynamicImage::ImageRgba8),
        other => {
            return Err(Error::invalid_pixels(format!(
                "unsupported channel count {}",
                other
            )));
        }
    };

    image.ok_or_else(|| Error::invalid_pixels("pixel buffer does not match dimensions"))
}

/// Truncates toward zero, then wraps modulo 256.
fn narrow(value: &Value) -> Result<u8> {
    // Integers wrap exactly; going through f64 would lose the low bits above 2^53.
    if let Some(n) = value.as_u64() {
        return Ok(n as u8);
    }
    if let Some(n) = value.as_i64() {
        return Ok(n as u8);
    }
    let v = value
        .as_f64()
        .ok_or_else(|| Error::invalid_pixels(format!("non-numeric channel value {}", value)))?;
    if !v.is_finite() {
        return Err(Error::invalid_pixels("non-finite channel value"));
    }
    Ok(v.trunc().rem_euclid(256.0) as u8)
}
