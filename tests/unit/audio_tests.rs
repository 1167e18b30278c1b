/*!
 * Tests for PCM audio buffers and WAV I/O
 */

use bookvox::audio::AudioBuffer;
use bookvox::errors::AudioError;

use crate::common;

/// Test silence construction and duration accounting
#[test]
fn test_silence_withKnownDuration_shouldReportIt() {
    let audio = AudioBuffer::silence(5000, 22050, 1);
    assert_eq!(audio.duration_ms(), 5000);
    assert_eq!(audio.frames(), 110250);
    assert_eq!(audio.sample_rate(), 22050);
    assert_eq!(audio.channels(), 1);
}

/// Test that an empty buffer adopts the format of the first append
#[test]
fn test_append_withEmptyBuffer_shouldAdoptFormat() {
    let mut waveform = AudioBuffer::empty();
    assert_eq!(waveform.duration_ms(), 0);

    waveform.append(&AudioBuffer::silence(1000, 22050, 1)).unwrap();
    assert_eq!(waveform.sample_rate(), 22050);
    assert_eq!(waveform.channels(), 1);
    assert_eq!(waveform.duration_ms(), 1000);

    waveform.append(&AudioBuffer::silence(500, 22050, 1)).unwrap();
    assert_eq!(waveform.duration_ms(), 1500);
}

/// Test that appending mismatched formats is rejected
#[test]
fn test_append_withFormatMismatch_shouldFail() {
    let mut waveform = AudioBuffer::silence(1000, 22050, 1);
    let other = AudioBuffer::silence(1000, 44100, 1);

    let result = waveform.append(&other);
    assert!(matches!(result, Err(AudioError::FormatMismatch { .. })));
    // The buffer is unchanged after the failed append
    assert_eq!(waveform.duration_ms(), 1000);
}

/// Test that appending an empty buffer is a no-op
#[test]
fn test_append_withEmptySource_shouldChangeNothing() {
    let mut waveform = AudioBuffer::silence(1000, 22050, 1);
    waveform.append(&AudioBuffer::empty()).unwrap();
    assert_eq!(waveform.duration_ms(), 1000);
}

/// Test WAV encode and decode through a temporary file
#[test]
fn test_wav_io_withSilence_shouldPreserveAudio() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("tone.wav");

    let original = AudioBuffer::silence(1234, 16000, 1);
    original.write_wav(&path).unwrap();

    let decoded = AudioBuffer::read_wav(&path).unwrap();
    assert_eq!(decoded.sample_rate(), 16000);
    assert_eq!(decoded.channels(), 1);
    assert_eq!(decoded.frames(), original.frames());
    assert_eq!(decoded.duration_ms(), 1234);
}

/// Test that a formatless buffer refuses to be written
#[test]
fn test_write_wav_withFormatlessBuffer_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("empty.wav");

    let result = AudioBuffer::empty().write_wav(&path);
    assert!(matches!(result, Err(AudioError::Encode(_))));
    assert!(!path.exists());
}

/// Test that decoding a non-WAV file reports a decode error
#[test]
fn test_read_wav_withGarbageFile_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir_path = temp_dir.path().to_path_buf();
    let path = common::create_test_file(&dir_path, "not-audio.wav", "plain text").unwrap();

    let result = AudioBuffer::read_wav(&path);
    assert!(matches!(result, Err(AudioError::Decode(_))));
}
