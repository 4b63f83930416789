//! Audio decoding using symphonia.

use crate::audio::AudioFormat;
use crate::error::{Error, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::conv::IntoSample;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use tracing::debug;

/// Decoded audio at its native sample rate.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples in range [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Native sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count of the source before downmixing.
    pub channels: usize,
}

/// Decode an audio file to mono f32 samples at its native rate.
///
/// `format` is the claimed container format and is only used as a format
/// hint; the stored file name carries no trustworthy extension.
pub fn decode_audio_file(path: &Path, format: AudioFormat) -> Result<DecodedAudio> {
    // The path is our own persisted copy, so failing to open it is a storage fault.
    let file = File::open(path).map_err(|e| Error::Storage {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    hint.with_extension(format.extension());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::AudioOpen {
            source: Box::new(e),
        })?;

    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Decode {
            reason: "no audio track found".to_string(),
        })?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::Decode {
            reason: "missing sample rate".to_string(),
        })?;
    let channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| Error::Decode {
            reason: e.to_string(),
        })?;

    let mut samples = Vec::new();

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(symphonia::core::errors::Error::ResetRequired) => {
                debug!("Stream reset requested, stopping at first logical stream");
                break;
            }
            Err(e) => {
                return Err(Error::Decode {
                    reason: e.to_string(),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => append_mono(&decoded, &mut samples),
            Err(symphonia::core::errors::Error::DecodeError(reason)) => {
                debug!("Skipping corrupt packet: {reason}");
            }
            Err(e) => {
                return Err(Error::Decode {
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(
        "Decoded {} samples at {} Hz from {} channel(s)",
        samples.len(),
        sample_rate,
        channels
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Append a decoded buffer to `output`, averaging channels to mono.
fn append_mono(buffer: &AudioBufferRef, output: &mut Vec<f32>) {
    match buffer {
        AudioBufferRef::U8(buf) => downmix(&**buf, output),
        AudioBufferRef::U16(buf) => downmix(&**buf, output),
        AudioBufferRef::U24(buf) => downmix(&**buf, output),
        AudioBufferRef::U32(buf) => downmix(&**buf, output),
        AudioBufferRef::S8(buf) => downmix(&**buf, output),
        AudioBufferRef::S16(buf) => downmix(&**buf, output),
        AudioBufferRef::S24(buf) => downmix(&**buf, output),
        AudioBufferRef::S32(buf) => downmix(&**buf, output),
        AudioBufferRef::F32(buf) => downmix(&**buf, output),
        AudioBufferRef::F64(buf) => downmix(&**buf, output),
    }
}

fn downmix<S>(buf: &AudioBuffer<S>, output: &mut Vec<f32>)
where
    S: Sample + IntoSample<f32>,
{
    let channels = buf.spec().channels.count();
    if channels <= 1 {
        output.extend(buf.chan(0).iter().map(|&s| s.into_sample()));
        return;
    }

    #[allow(clippy::cast_precision_loss)]
    let scale = 1.0 / channels as f32;
    output.reserve(buf.frames());
    for i in 0..buf.frames() {
        let sum: f32 = (0..channels)
            .map(|ch| -> f32 { buf.chan(ch)[i].into_sample() })
            .sum();
        output.push(sum * scale);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_a_storage_fault() {
        let err = decode_audio_file(Path::new("/nonexistent/upload.wav"), AudioFormat::Wav)
            .unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(!err.kind().is_user_error());
    }

    #[test]
    fn test_unparseable_file_reports_open_reason() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("junk.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();

        let err = decode_audio_file(&path, AudioFormat::Wav).unwrap_err();
        assert!(matches!(err, Error::AudioOpen { .. }));
        assert_eq!(err.kind(), ErrorKind::Decode);

        let message = err.to_string();
        let reason = message.strip_prefix("failed to open audio stream: ").unwrap();
        assert!(!reason.is_empty());
    }
}
