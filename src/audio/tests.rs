use super::dispatch::{append_downmixed_samples, CallbackStaging, CaptureBuffer};

#[test]
fn downmixes_multi_channel_audio() {
    let mut buf = Vec::new();
    let samples = [1.0f32, -1.0, 0.5, 0.5];
    append_downmixed_samples(&mut buf, &samples, 2, |sample| sample);
    assert_eq!(buf, vec![0.0, 0.5]);
}

#[test]
fn preserves_single_channel_audio() {
    let mut buf = Vec::new();
    let samples = [0.1f32, 0.2, 0.3];
    append_downmixed_samples(&mut buf, &samples, 1, |sample| sample);
    assert_eq!(buf, samples);
}

#[test]
fn averages_trailing_partial_frame() {
    let mut buf = Vec::new();
    let samples = [0.2f32, 0.4, 0.6];
    append_downmixed_samples(&mut buf, &samples, 2, |sample| sample);
    assert_eq!(buf.len(), 2);
    assert!((buf[0] - 0.3).abs() < 1e-6);
    assert!((buf[1] - 0.6).abs() < 1e-6);
}

#[test]
fn converts_integer_samples() {
    let mut buf = Vec::new();
    let samples = [16_384i16, -16_384];
    append_downmixed_samples(&mut buf, &samples, 1, |s| s as f32 / 32_768.0);
    assert_eq!(buf, vec![0.5, -0.5]);
}

#[test]
fn capture_buffer_drains_in_arrival_order() {
    let mut buffer = CaptureBuffer::new(16);
    buffer.append(&[0.1, 0.2]);
    buffer.append(&[0.3]);
    assert_eq!(buffer.take(), Ok(vec![0.1, 0.2, 0.3]));
    assert_eq!(buffer.take(), Ok(Vec::new()));
}

#[test]
fn capture_buffer_drops_oldest_when_full() {
    let mut buffer = CaptureBuffer::new(3);
    buffer.append(&[0.1, 0.2, 0.3, 0.4, 0.5]);
    assert_eq!(buffer.take(), Ok(vec![0.3, 0.4, 0.5]));
    assert_eq!(buffer.dropped_samples(), 2);
}

#[test]
fn lost_device_hands_out_buffered_samples_first() {
    let mut buffer = CaptureBuffer::new(16);
    buffer.append(&[0.4, 0.5]);
    buffer.mark_lost("stream invalidated".to_string());
    assert_eq!(buffer.take(), Ok(vec![0.4, 0.5]));
    assert_eq!(buffer.take(), Err("stream invalidated".to_string()));
    assert_eq!(buffer.take(), Err("stream invalidated".to_string()));
}

#[test]
fn first_loss_reason_is_kept() {
    let mut buffer = CaptureBuffer::new(16);
    buffer.mark_lost("unplugged".to_string());
    buffer.mark_lost("backend error".to_string());
    assert_eq!(buffer.take(), Err("unplugged".to_string()));
}

#[test]
fn staged_samples_survive_a_busy_buffer() {
    let mut buffer = CaptureBuffer::new(16);
    let mut staging = CallbackStaging::new(16);

    // First callback could not take the lock.
    staging.stage(&[0.1f32, 0.2], 1, |s| s);
    assert_eq!(staging.staged_len(), 2);

    // Second callback flushes both blocks in order.
    staging.stage(&[0.3f32, 0.3, 0.5, 0.5], 2, |s| s);
    staging.flush_into(&mut buffer);
    assert_eq!(staging.staged_len(), 0);
    assert_eq!(buffer.take(), Ok(vec![0.1, 0.2, 0.3, 0.5]));
}

#[test]
fn staging_is_bounded_and_counts_drops() {
    let mut buffer = CaptureBuffer::new(16);
    let mut staging = CallbackStaging::new(2);
    staging.stage(&[0.1f32, 0.2, 0.3], 1, |s| s);
    staging.flush_into(&mut buffer);
    assert_eq!(buffer.take(), Ok(vec![0.2, 0.3]));
    assert_eq!(buffer.dropped_samples(), 1);
}
