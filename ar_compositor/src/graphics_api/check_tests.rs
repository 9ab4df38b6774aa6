//! Unit tests for check.rs

use crate::error::Error;
use crate::graphics_api::mock_graphics_api::MockGraphicsApi;
use crate::graphics_api::{check, log_errors, ApiErrorCode, GraphicsApi};

#[test]
fn test_check_ok_when_queue_empty() {
    let mut mock = MockGraphicsApi::new();
    assert!(check(&mut mock, "Nothing", "gen_buffer").is_ok());
}

#[test]
fn test_check_reports_every_queued_code() {
    let mut mock = MockGraphicsApi::new();
    mock.push_error(ApiErrorCode::InvalidValue);
    mock.push_error(ApiErrorCode::OutOfMemory);

    let err = check(&mut mock, "Failed to upload", "buffer_data").unwrap_err();
    match err {
        Error::GraphicsApiError { reason, call, codes } => {
            assert_eq!(reason, "Failed to upload");
            assert_eq!(call, "buffer_data");
            assert_eq!(codes, vec![ApiErrorCode::InvalidValue, ApiErrorCode::OutOfMemory]);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // Queue fully drained
    assert!(mock.get_error().is_none());
}

#[test]
fn test_check_identifies_first_failing_call() {
    let mut mock = MockGraphicsApi::new();
    mock.fail_next("bind_buffer", ApiErrorCode::InvalidEnum);

    mock.gen_buffer();
    assert!(check(&mut mock, "gen", "gen_buffer").is_ok());

    mock.bind_buffer(crate::graphics_api::BufferTarget::Array, 1);
    let err = check(&mut mock, "bind", "bind_buffer").unwrap_err();
    assert!(format!("{}", err).contains("bind_buffer"));
}

#[test]
fn test_log_errors_drains_without_failing() {
    let mut mock = MockGraphicsApi::new();
    mock.push_error(ApiErrorCode::InvalidOperation);

    log_errors(&mut mock, "test", "Failed to delete", "delete_buffer");

    assert!(mock.get_error().is_none());
}
