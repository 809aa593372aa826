//! Decoding checks for the audio clips.
//!
//! Bevy decodes a clip only when a voice starts and unwraps the result, so
//! every clip goes through [`open_clip`] once before it may be played.

use std::io::Cursor;

use bevy::audio::AudioSource;
use rodio::decoder::DecoderError;
use rodio::{Decoder, Sample, Source};

/// Opens a decoder over the clip bytes, the same call playback makes.
pub fn open_clip(source: &AudioSource) -> Result<Decoder<Cursor<AudioSource>>, DecoderError> {
    Decoder::new(Cursor::new(source.clone()))
}

/// Length of the clip in seconds. `Ok(None)` for a clip with no samples.
pub fn clip_length(source: &AudioSource) -> Result<Option<f32>, DecoderError> {
    open_clip(source).map(source_length)
}

/// Uses the container's duration when it has one, otherwise counts the
/// decoded samples. Vorbis streams never report a duration.
pub fn source_length<S>(source: S) -> Option<f32>
where
    S: Source,
    S::Item: Sample,
{
    if let Some(duration) = source.total_duration() {
        return Some(duration.as_secs_f32());
    }
    let channels = u32::from(source.channels());
    let rate = source.sample_rate();
    let per_second = channels * rate;
    if per_second == 0 {
        return None;
    }
    let samples = source.count() as u64;
    (samples > 0).then(|| (samples as f64 / f64::from(per_second)) as f32)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    /// Mono 16-bit PCM WAV of `samples` silent samples.
    pub(crate) fn wav_clip(rate: u32, samples: u32) -> AudioSource {
        let data_len = samples * 2;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&rate.to_le_bytes());
        bytes.extend_from_slice(&(rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(44 + data_len as usize, 0);
        AudioSource {
            bytes: Arc::from(bytes),
        }
    }

    pub(crate) fn garbage_clip() -> AudioSource {
        AudioSource {
            bytes: Arc::from(&b"this is not an audio file, just some text"[..]),
        }
    }

    /// A stream that, like a Vorbis decoder, cannot tell its length upfront.
    struct Unbounded {
        remaining: usize,
        channels: u16,
        rate: u32,
    }

    impl Iterator for Unbounded {
        type Item = i16;

        fn next(&mut self) -> Option<i16> {
            if self.remaining == 0 {
                return None;
            }
            self.remaining -= 1;
            Some(0)
        }
    }

    impl Source for Unbounded {
        fn current_frame_len(&self) -> Option<usize> {
            None
        }

        fn channels(&self) -> u16 {
            self.channels
        }

        fn sample_rate(&self) -> u32 {
            self.rate
        }

        fn total_duration(&self) -> Option<Duration> {
            None
        }
    }

    #[test]
    fn unknown_duration_is_counted_from_samples() {
        let stream = Unbounded {
            remaining: 2 * 8_000 * 3 / 2,
            channels: 2,
            rate: 8_000,
        };
        let secs = source_length(stream).unwrap();
        assert!((secs - 1.5).abs() < 1e-4, "measured {secs}");
    }

    #[test]
    fn empty_stream_has_no_length() {
        let stream = Unbounded {
            remaining: 0,
            channels: 1,
            rate: 44_100,
        };
        assert_eq!(source_length(stream), None);
    }

    #[test]
    fn wav_clip_length_is_measured() {
        let secs = clip_length(&wav_clip(8_000, 4_000)).unwrap().unwrap();
        assert!((secs - 0.5).abs() < 1e-3, "measured {secs}");
    }

    #[test]
    fn unreadable_bytes_are_an_error_not_a_panic() {
        assert!(open_clip(&garbage_clip()).is_err());
    }
}
