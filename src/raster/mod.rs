//! Decoding inference payloads into rasters, and moving rasters to disk and
//! onto the wire.

mod decoder;
mod encoder;
mod storage;

pub use decoder::{DecodedResponse, PixelArray, PixelPayload, decode, to_image};
pub use encoder::{OutputFormat, encode, encode_as, encode_bytes};
pub use storage::ImageStore;
