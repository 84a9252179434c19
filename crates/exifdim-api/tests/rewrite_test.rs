//! Rewrite endpoint integration tests.
//!
//! Run with: `cargo test -p exifdim-api --test rewrite_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::fixtures::{create_test_jpeg, create_test_png, read_pixel_dimensions};
use helpers::{setup_test_server, test_config, test_config_with_api_key, TEST_API_KEY};

const REWRITE: &str = "/api/rewrite";

fn form(width: &str, height: &str, picture: Part) -> MultipartForm {
    MultipartForm::new()
        .add_text("width", width.to_string())
        .add_text("height", height.to_string())
        .add_part("picture", picture)
}

fn png_part(width: u32, height: u32) -> Part {
    Part::bytes(create_test_png(width, height))
        .file_name("scan.png")
        .mime_type("image/png")
}

fn jpeg_part(width: u32, height: u32) -> Part {
    Part::bytes(create_test_jpeg(width, height))
        .file_name("photo.jpg")
        .mime_type("image/jpeg")
}

#[tokio::test]
async fn test_png_upload_returns_jpeg_with_dimensions() {
    let server = setup_test_server(test_config());

    let response = server
        .post(REWRITE)
        .multipart(form("3000", "2000", png_part(12, 8)).add_text("outName", "scan.png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header("content-type"), "image/jpeg");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"scan.jpg\""
    );

    let body = response.as_bytes();
    assert_eq!(&body[..2], &[0xFF, 0xD8]);
    assert_eq!(read_pixel_dimensions(body), (Some(3000), Some(2000)));

    // pixels are untouched
    let decoded = image::load_from_memory(body).expect("decode response");
    assert_eq!((decoded.width(), decoded.height()), (12, 8));
}

#[tokio::test]
async fn test_jpeg_upload_uses_default_name() {
    let server = setup_test_server(test_config());

    let response = server
        .post(REWRITE)
        .multipart(form("640", "480", jpeg_part(16, 16)))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"out.jpg\""
    );
    assert_eq!(
        read_pixel_dimensions(response.as_bytes()),
        (Some(640), Some(480))
    );
}

#[tokio::test]
async fn test_output_can_be_rewritten_again() {
    let server = setup_test_server(test_config());

    let first = server
        .post(REWRITE)
        .multipart(form("100", "50", png_part(4, 4)))
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);

    let second = server
        .post(REWRITE)
        .multipart(form(
            "100",
            "50",
            Part::bytes(first.as_bytes().to_vec()).file_name("out.jpg"),
        ))
        .await;
    assert_eq!(second.status_code(), StatusCode::OK);
    assert_eq!(
        read_pixel_dimensions(second.as_bytes()),
        (Some(100), Some(50))
    );
}

#[tokio::test]
async fn test_missing_picture_is_bad_request() {
    let server = setup_test_server(test_config());

    let response = server
        .post(REWRITE)
        .multipart(
            MultipartForm::new()
                .add_text("width", "10")
                .add_text("height", "10"),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "missing file \"picture\"");
}

#[tokio::test]
async fn test_missing_picture_is_reported_before_dimensions() {
    let server = setup_test_server(test_config());

    let response = server
        .post(REWRITE)
        .multipart(MultipartForm::new().add_text("width", "abc"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("missing file"));
}

#[tokio::test]
async fn test_non_numeric_width_is_bad_request() {
    let server = setup_test_server(test_config());

    let response = server
        .post(REWRITE)
        .multipart(form("abc", "480", png_part(4, 4)))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "width/height must be numbers");
}

#[tokio::test]
async fn test_hex_and_binary_dimensions_are_accepted() {
    let server = setup_test_server(test_config());

    let response = server
        .post(REWRITE)
        .multipart(form("0x10", "0b1010", png_part(4, 4)))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        read_pixel_dimensions(response.as_bytes()),
        (Some(16), Some(10))
    );
}

#[tokio::test]
async fn test_missing_height_is_bad_request() {
    let server = setup_test_server(test_config());

    let response = server
        .post(REWRITE)
        .multipart(
            MultipartForm::new()
                .add_text("width", "10")
                .add_part("picture", png_part(4, 4)),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("must be numbers"));
}

#[tokio::test]
async fn test_non_positive_dimensions_are_bad_request() {
    let server = setup_test_server(test_config());

    for (width, height) in [("-1", "10"), ("0", "10"), ("10.5", "10")] {
        let response = server
            .post(REWRITE)
            .multipart(form(width, height, png_part(4, 4)))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.text(), "width/height must be positive integers");
    }
}

#[tokio::test]
async fn test_empty_picture_is_bad_request() {
    let server = setup_test_server(test_config());

    let response = server
        .post(REWRITE)
        .multipart(form("10", "10", Part::bytes(Vec::new()).file_name("empty.jpg")))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "file \"picture\" is empty");
}

#[tokio::test]
async fn test_non_image_picture_is_bad_request() {
    let server = setup_test_server(test_config());

    let response = server
        .post(REWRITE)
        .multipart(form(
            "10",
            "10",
            Part::bytes(b"just some text".to_vec()).file_name("notes.txt"),
        ))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "picture is not a recognized image format");
}

#[tokio::test]
async fn test_non_multipart_body_is_bad_request() {
    let server = setup_test_server(test_config());

    let response = server.post(REWRITE).text("width=10&height=10").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().starts_with("invalid multipart body"));
}

#[tokio::test]
async fn test_get_is_method_not_allowed() {
    let server = setup_test_server(test_config());

    let response = server.get(REWRITE).await;

    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.text(), "Use POST");
    assert_eq!(response.header("allow"), "POST");
}

#[tokio::test]
async fn test_put_is_method_not_allowed() {
    let server = setup_test_server(test_config());

    let response = server.put(REWRITE).await;

    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.text(), "Use POST");
}

#[tokio::test]
async fn test_api_key_is_required_when_configured() {
    let server = setup_test_server(test_config_with_api_key());

    let missing = server
        .post(REWRITE)
        .multipart(form("10", "10", png_part(4, 4)))
        .await;
    assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(missing.text(), "unauthorized");

    let wrong = server
        .post(REWRITE)
        .add_header("x-api-key", "not-the-right-key-000000")
        .multipart(form("10", "10", png_part(4, 4)))
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);

    let ok = server
        .post(REWRITE)
        .add_header("x-api-key", TEST_API_KEY)
        .multipart(form("10", "10", png_part(4, 4)))
        .await;
    assert_eq!(ok.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_method_is_rejected_before_api_key() {
    let server = setup_test_server(test_config_with_api_key());

    let response = server.get(REWRITE).await;

    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_configured_download_content_type() {
    let mut config = test_config();
    config.rewrite.download_content_type = "application/octet-stream".to_string();
    let server = setup_test_server(config);

    let response = server
        .post(REWRITE)
        .multipart(form("10", "10", jpeg_part(8, 8)))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header("content-type"), "application/octet-stream");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let mut config = test_config();
    config.rewrite.max_upload_size_bytes = 1024;
    let server = setup_test_server(config);

    let response = server
        .post(REWRITE)
        .multipart(form(
            "10",
            "10",
            Part::bytes(vec![0u8; 256 * 1024]).file_name("huge.png"),
        ))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!response.text().starts_with("invalid multipart body"));
}

#[tokio::test]
async fn test_upload_over_megabyte_limit_is_payload_too_large() {
    let mut config = test_config();
    config.rewrite.max_upload_size_bytes = 1024 * 1024;
    let server = setup_test_server(config);

    let response = server
        .post(REWRITE)
        .multipart(form(
            "10",
            "10",
            Part::bytes(vec![0xABu8; 3 * 1024 * 1024]).file_name("huge.jpg"),
        ))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_responses_carry_request_id_and_nosniff() {
    let server = setup_test_server(test_config());

    let response = server
        .post(REWRITE)
        .add_header("x-request-id", "req-123")
        .multipart(form("10", "10", png_part(4, 4)))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header("x-request-id"), "req-123");
    assert_eq!(response.header("x-content-type-options"), "nosniff");

    let generated = server.get(REWRITE).await;
    assert!(!generated
        .header("x-request-id")
        .to_str()
        .unwrap()
        .is_empty());
}
