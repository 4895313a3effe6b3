use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use imagegen_gateway::{
    Error,
    inference::InferenceEnvelope,
    raster::{OutputFormat, encode_bytes},
};
use pretty_assertions::assert_eq;
use serde_json::json;

mod common;

use common::{mocks::MockInferenceClient, test_utils::*};

#[tokio::test]
async fn test_red_square_scenario() {
    let temp_dir = create_temp_dir();
    let client = MockInferenceClient::new().with_json(red_square_response());
    let pipeline = create_pipeline(client, temp_dir.path());

    let generated = pipeline.generate("a red square").await.unwrap();

    assert_eq!(generated.prompt, "a red square");
    let bytes = STANDARD.decode(&generated.img_base64).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);

    let image = image::load_from_memory(&bytes).unwrap();
    assert_eq!(image.dimensions(), (1, 1));
    assert_eq!(image.get_pixel(0, 0), Rgba([255, 0, 0, 255]));

    assert!(generated.path.starts_with(temp_dir.path()));
    assert_eq!(std::fs::read(&generated.path).unwrap(), bytes);
}

#[tokio::test]
async fn test_returned_payload_reencodes_identically() {
    let temp_dir = create_temp_dir();
    let client = MockInferenceClient::new().with_json(json!({
        "generated_image": [
            [[12, 34, 56], [78, 90, 123]],
            [[200, 201, 202], [0, 255, 0]]
        ],
        "prompt": "tiny"
    }));
    let pipeline = create_pipeline(client, temp_dir.path());

    let generated = pipeline.generate("tiny").await.unwrap();
    let bytes = STANDARD.decode(&generated.img_base64).unwrap();
    let reloaded = image::load_from_memory(&bytes).unwrap();

    assert_eq!(encode_bytes(&reloaded, OutputFormat::Png).unwrap(), bytes);
}

#[tokio::test]
async fn test_rgba_payload_keeps_alpha() {
    let temp_dir = create_temp_dir();
    let client = MockInferenceClient::new().with_json(json!({
        "generated_image": [[[10, 20, 30, 40]]],
        "prompt": "translucent"
    }));
    let pipeline = create_pipeline(client, temp_dir.path());

    let generated = pipeline.generate("translucent").await.unwrap();
    let image = image::load_from_memory(&STANDARD.decode(generated.img_base64).unwrap()).unwrap();

    assert!(matches!(image, DynamicImage::ImageRgba8(_)));
    assert_eq!(image.get_pixel(0, 0), Rgba([10, 20, 30, 40]));
}

#[tokio::test]
async fn test_binary_image_response() {
    let temp_dir = create_temp_dir();
    let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 3, Rgba([9, 8, 7, 255])));
    let client = MockInferenceClient::new().with_response(InferenceEnvelope::new(
        encode_bytes(&source, OutputFormat::Png).unwrap(),
        Some("image/png".to_string()),
    ));
    let pipeline = create_pipeline(client, temp_dir.path());

    let generated = pipeline.generate("from bytes").await.unwrap();

    assert_eq!(generated.prompt, "from bytes");
    let image = image::load_from_memory(&STANDARD.decode(generated.img_base64).unwrap()).unwrap();
    assert_eq!(image.dimensions(), (2, 3));
}

#[tokio::test]
async fn test_parse_error_aborts_before_write() {
    let temp_dir = create_temp_dir();
    let client = MockInferenceClient::new().with_response(InferenceEnvelope::json("{\"prompt\": 1"));
    let pipeline = create_pipeline(client, temp_dir.path());

    let err = pipeline.generate("x").await.unwrap_err();

    assert!(matches!(err, Error::ResponseParse(_)));
    assert!(list_files(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_unsupported_channel_count_aborts_before_write() {
    let temp_dir = create_temp_dir();
    let client = MockInferenceClient::new().with_json(json!({
        "generated_image": [[[1, 2, 3, 4, 5]]],
        "prompt": "five channels"
    }));
    let pipeline = create_pipeline(client, temp_dir.path());

    let err = pipeline.generate("five channels").await.unwrap_err();

    assert!(matches!(err, Error::InvalidPixels(_)));
    assert!(list_files(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_invocation_failure_is_reported() {
    let temp_dir = create_temp_dir();
    let client = MockInferenceClient::new().with_error("connection reset");
    let prompts = client.prompts.clone();
    let pipeline = create_pipeline(client, temp_dir.path());

    let err = pipeline.generate("x").await.unwrap_err();

    assert!(matches!(err, Error::Invocation { .. }));
    assert_eq!(prompts.lock().unwrap().len(), 1);
    assert!(list_files(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_persistence_failure_returns_no_image() {
    let temp_dir = create_temp_dir();
    let blocker = temp_dir.path().join("blocked");
    std::fs::write(&blocker, b"").unwrap();

    let client = MockInferenceClient::new().with_json(red_square_response());
    let pipeline = create_pipeline(client, &blocker);

    let err = pipeline.generate("a red square").await.unwrap_err();

    assert!(matches!(err, Error::Persistence(_)));
}

#[tokio::test]
async fn test_encoding_failure_aborts_before_write() {
    let temp_dir = create_temp_dir();
    // JPEG cannot hold more than 65535 pixels per side
    let client = MockInferenceClient::new().with_json(json!({
        "generated_image": [vec![[0u8, 0, 0]; 65_536]],
        "prompt": "a very wide strip"
    }));
    let pipeline = create_pipeline_with_format(client, temp_dir.path(), OutputFormat::Jpeg);

    let err = pipeline.generate("a very wide strip").await.unwrap_err();

    assert!(matches!(err, Error::Encoding(_)));
    assert_eq!(err.kind(), "encoding_error");
    assert!(list_files(temp_dir.path()).is_empty());
}
