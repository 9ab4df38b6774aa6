//! Unit tests for gpu_buffer.rs
//!
//! Covers the grow-or-update capacity rule, argument validation before any
//! GPU call, error propagation and idempotent release.

use crate::error::Error;
use crate::graphics_api::mock_graphics_api::{MockGraphicsApi, ObjectKind};
use crate::graphics_api::{ApiErrorCode, BufferTarget};
use crate::resource::GpuBuffer;

#[test]
fn test_new_without_entries_has_zero_size() {
    let (mock, api) = MockGraphicsApi::new_shared();

    let buffer = GpuBuffer::new::<f32>(&api, BufferTarget::Array, 4, None).unwrap();

    assert_eq!(buffer.size(), 0);
    assert_eq!(buffer.capacity(), 0);
    assert_ne!(buffer.buffer_id(), 0);
    let mock = mock.lock().unwrap();
    assert_eq!(mock.call_count("buffer_data"), 0);
    assert_eq!(mock.live_count(ObjectKind::Buffer), 1);
    // Vertex array unbound before the buffer is generated
    assert_eq!(mock.calls[0], "bind_vertex_array");
    assert_eq!(mock.bound_vertex_array, 0);
}

#[test]
fn test_new_with_entries_allocates() {
    let (mock, api) = MockGraphicsApi::new_shared();

    let buffer =
        GpuBuffer::new(&api, BufferTarget::Array, 4, Some(&[1.0f32, 2.0, 3.0][..])).unwrap();

    assert_eq!(buffer.size(), 3);
    assert_eq!(buffer.capacity(), 3);
    let mock = mock.lock().unwrap();
    assert_eq!(mock.buffer_sizes.get(&buffer.buffer_id()), Some(&12));
}

#[test]
fn test_set_within_capacity_updates_in_place() {
    let (mock, api) = MockGraphicsApi::new_shared();
    let mut buffer =
        GpuBuffer::new(&api, BufferTarget::Array, 4, Some(&[0.0f32; 8][..])).unwrap();
    mock.lock().unwrap().clear_calls();

    // Same size, then smaller: capacity never changes
    for len in [8usize, 5, 1] {
        let entries = vec![1.0f32; len];
        buffer.set(Some(&entries[..])).unwrap();
        assert_eq!(buffer.size(), len);
        assert_eq!(buffer.capacity(), 8);
    }

    let mock = mock.lock().unwrap();
    assert_eq!(mock.call_count("buffer_sub_data"), 3);
    assert_eq!(mock.call_count("buffer_data"), 0);
}

#[test]
fn test_set_beyond_capacity_reallocates_to_exact_size() {
    let (mock, api) = MockGraphicsApi::new_shared();
    let mut buffer =
        GpuBuffer::new(&api, BufferTarget::Array, 4, Some(&[0.0f32; 4][..])).unwrap();
    mock.lock().unwrap().clear_calls();

    buffer.set(Some(&[0.0f32; 10][..])).unwrap();

    assert_eq!(buffer.size(), 10);
    assert_eq!(buffer.capacity(), 10);
    let mock = mock.lock().unwrap();
    assert_eq!(mock.call_count("buffer_data"), 1);
    assert_eq!(mock.buffer_sizes.get(&buffer.buffer_id()), Some(&40));
}

#[test]
fn test_set_empty_or_none_clears_size_without_gpu_calls() {
    let (mock, api) = MockGraphicsApi::new_shared();
    let mut buffer =
        GpuBuffer::new(&api, BufferTarget::Array, 4, Some(&[0.0f32; 6][..])).unwrap();
    mock.lock().unwrap().clear_calls();

    buffer.set::<f32>(None).unwrap();
    assert_eq!(buffer.size(), 0);
    buffer.set::<f32>(Some(&[][..])).unwrap();
    assert_eq!(buffer.size(), 0);

    assert_eq!(buffer.capacity(), 6);
    assert!(mock.lock().unwrap().calls.is_empty());
}

#[test]
fn test_wrong_entry_width_fails_before_gpu_call() {
    let (mock, api) = MockGraphicsApi::new_shared();

    let result = GpuBuffer::new(&api, BufferTarget::Array, 4, Some(&[1u16, 2][..]));

    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert!(mock.lock().unwrap().calls.is_empty());
}

#[test]
fn test_gpu_error_names_failing_call_and_frees_handle() {
    let (mock, api) = MockGraphicsApi::new_shared();
    mock.lock().unwrap().fail_next("buffer_data", ApiErrorCode::OutOfMemory);

    let result = GpuBuffer::new(&api, BufferTarget::Array, 4, Some(&[1.0f32][..]));

    match result {
        Err(Error::GraphicsApiError { call, codes, .. }) => {
            assert_eq!(call, "buffer_data");
            assert_eq!(codes, vec![ApiErrorCode::OutOfMemory]);
        }
        _ => panic!("expected GraphicsApiError"),
    }
    // No leaked handle on the failure path
    assert_eq!(mock.lock().unwrap().live_count(ObjectKind::Buffer), 0);
}

#[test]
fn test_free_is_idempotent() {
    let (mock, api) = MockGraphicsApi::new_shared();
    let mut buffer = GpuBuffer::new::<u32>(&api, BufferTarget::ElementArray, 4, None).unwrap();

    buffer.free();
    buffer.free();
    drop(buffer);

    let mock = mock.lock().unwrap();
    assert_eq!(mock.call_count("delete_buffer"), 1);
    assert_eq!(mock.live_count(ObjectKind::Buffer), 0);
}

#[test]
fn test_set_after_free_is_use_after_free() {
    let (_mock, api) = MockGraphicsApi::new_shared();
    let mut buffer = GpuBuffer::new::<f32>(&api, BufferTarget::Array, 4, None).unwrap();
    buffer.free();

    assert!(buffer.is_freed());
    assert!(matches!(buffer.set(Some(&[1.0f32][..])), Err(Error::UseAfterFree(_))));
}

#[test]
fn test_free_logs_and_continues_on_driver_error() {
    let (mock, api) = MockGraphicsApi::new_shared();
    let mut buffer = GpuBuffer::new::<f32>(&api, BufferTarget::Array, 4, None).unwrap();
    mock.lock().unwrap().fail_next("delete_buffer", ApiErrorCode::InvalidValue);

    buffer.free();

    assert!(buffer.is_freed());
}
