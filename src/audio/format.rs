//! Accepted upload formats.

use crate::constants::upload::ALLOWED_EXTENSIONS;

/// Audio container formats accepted for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    /// RIFF WAVE.
    Wav,
    /// MPEG-1/2 Layer III.
    Mp3,
    /// Free Lossless Audio Codec.
    Flac,
    /// Ogg container (Vorbis).
    Ogg,
}

impl AudioFormat {
    /// Resolve a format from a filename's extension, case-insensitively.
    ///
    /// Mirrors a `rsplit('.', 1)` check: the part after the last dot must be
    /// one of the allowed extensions.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Resolve a format from a bare extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "wav" => Some(Self::Wav),
            "mp3" => Some(Self::Mp3),
            "flac" => Some(Self::Flac),
            "ogg" => Some(Self::Ogg),
            _ => None,
        }
    }

    /// Canonical lower-case extension, used as a container hint.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
        }
    }

    /// Comma-separated list of accepted extensions for user-facing messages.
    pub fn allowed_list() -> String {
        ALLOWED_EXTENSIONS.join(", ")
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filename_accepts_allowed_extensions() {
        assert_eq!(AudioFormat::from_filename("call.wav"), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::from_filename("call.MP3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_filename("a.b.flac"), Some(AudioFormat::Flac));
        assert_eq!(AudioFormat::from_filename("call.Ogg"), Some(AudioFormat::Ogg));
    }

    #[test]
    fn test_from_filename_rejects_others() {
        assert_eq!(AudioFormat::from_filename("virus.exe"), None);
        assert_eq!(AudioFormat::from_filename("wav"), None);
        assert_eq!(AudioFormat::from_filename("call.wav.txt"), None);
        assert_eq!(AudioFormat::from_filename(""), None);
    }

    #[test]
    fn test_every_allowed_extension_round_trips() {
        for ext in ALLOWED_EXTENSIONS {
            let format = AudioFormat::from_extension(ext);
            assert_eq!(format.map(AudioFormat::extension), Some(*ext));
        }
    }

    #[test]
    fn test_allowed_list_message() {
        assert_eq!(AudioFormat::allowed_list(), "wav, mp3, flac, ogg");
    }
}
