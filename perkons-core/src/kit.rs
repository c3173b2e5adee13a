//! Kit entity and whole-file codec

use crate::constants::{DEFAULT_HEADER_LEN, MAX_HEADER_LEN, MIN_HEADER_LEN, VOICE_COUNT};
use crate::error::KitError;
use crate::format::{detect_layout, KitFormat};
use crate::header::build_header;
use crate::voice::{decode_voice, encode_voice, Voice};
use bytes::{BufMut, Bytes, BytesMut};
use std::fs;
use std::path::Path;

#[cfg(feature = "logging")]
use tracing::{debug, info};

/// A complete kit: opaque header plus four voices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kit {
    header: Bytes,
    voices: [Voice; VOICE_COUNT],
    format: KitFormat,
}

impl Kit {
    /// Assemble a kit from parts
    ///
    /// Voices of the wrong length for their slot are reshaped when the kit
    /// is saved.
    pub fn new(
        header: Bytes,
        format: KitFormat,
        voices: [Voice; VOICE_COUNT],
    ) -> Result<Self, KitError> {
        if !(MIN_HEADER_LEN..=MAX_HEADER_LEN).contains(&header.len()) {
            return Err(KitError::InvalidHeader { len: header.len() });
        }

        Ok(Self {
            header,
            voices,
            format,
        })
    }

    /// A kit with a synthesized 57-byte header and four blank voices
    pub fn blank(format: KitFormat) -> Result<Self, KitError> {
        let header = build_header(DEFAULT_HEADER_LEN, format)?;
        Self::new(header, format, Default::default())
    }

    /// Decode a complete kit buffer
    pub fn from_buffer(data: &[u8]) -> Result<Self, KitError> {
        let layout = detect_layout(data)?;

        let header = Bytes::copy_from_slice(&data[..layout.header_len]);
        let mut voices: [Voice; VOICE_COUNT] = Default::default();
        for (index, window) in layout.voice_windows() {
            voices[index] = decode_voice(&data[window], index, layout.format)?;
        }

        #[cfg(feature = "logging")]
        debug!(
            "Loaded {} kit: {}-byte header, {} bytes total",
            layout.format,
            layout.header_len,
            data.len()
        );

        Ok(Self {
            header,
            voices,
            format: layout.format,
        })
    }

    /// Encode the kit into a complete buffer
    ///
    /// Fails with `OutOfRange` if any voice holds an out-of-range control.
    pub fn to_buffer(&self) -> Result<Bytes, KitError> {
        let mut buf = BytesMut::with_capacity(self.format.total_len(self.header.len()));
        buf.put_slice(&self.header);

        for (index, voice) in self.voices.iter().enumerate() {
            buf.put_slice(&encode_voice(voice, index, self.format)?);
        }

        Ok(buf.freeze())
    }

    /// Read and decode a kit file
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, KitError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| KitError::source_unavailable(path, e))?;
        Self::from_buffer(&data)
    }

    /// Encode and write the kit to `path`
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<(), KitError> {
        let path = path.as_ref();
        let data = self.to_buffer()?;
        fs::write(path, &data).map_err(|e| KitError::source_unavailable(path, e))?;

        #[cfg(feature = "logging")]
        info!("Wrote {} ({} bytes)", path.display(), data.len());

        Ok(())
    }

    /// Format fixed at load time
    pub fn format(&self) -> KitFormat {
        self.format
    }

    /// Opaque header bytes
    pub fn header(&self) -> &Bytes {
        &self.header
    }

    /// Total length of the encoded kit
    pub fn encoded_len(&self) -> usize {
        self.format.total_len(self.header.len())
    }

    /// All four voices
    pub fn voices(&self) -> &[Voice; VOICE_COUNT] {
        &self.voices
    }

    /// Voice at `index` (0-3)
    pub fn get_voice(&self, index: usize) -> Result<&Voice, KitError> {
        self.voices
            .get(index)
            .ok_or(KitError::InvalidVoiceIndex(index))
    }

    /// Mutable voice at `index` (0-3)
    pub fn get_voice_mut(&mut self, index: usize) -> Result<&mut Voice, KitError> {
        self.voices
            .get_mut(index)
            .ok_or(KitError::InvalidVoiceIndex(index))
    }

    /// Replace the voice at `index` (0-3)
    pub fn set_voice(&mut self, index: usize, voice: Voice) -> Result<(), KitError> {
        *self.get_voice_mut(index)? = voice;
        Ok(())
    }

    /// Rebuild this kit under another format
    ///
    /// Voice 3 gains or loses its sampler parameters on the next save.
    pub fn into_format(self, format: KitFormat) -> Self {
        Self {
            header: self.header,
            voices: self.voices,
            format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MARKER_OFFSET, VOICE_MARKER};

    #[test]
    fn test_blank_kit_round_trip() {
        for format in KitFormat::ALL {
            let kit = Kit::blank(format).unwrap();
            let encoded = kit.to_buffer().unwrap();
            assert_eq!(encoded.len(), format.total_len(57));
            assert_eq!(encoded.len(), kit.encoded_len());

            let decoded = Kit::from_buffer(&encoded).unwrap();
            assert_eq!(decoded.format(), format);
            assert_eq!(decoded.to_buffer().unwrap(), encoded);
        }
    }

    #[test]
    fn test_header_len_enforced() {
        let header = Bytes::from(vec![0u8; 40]);
        assert_eq!(
            Kit::new(header, KitFormat::Format1, Default::default()),
            Err(KitError::InvalidHeader { len: 40 })
        );
    }

    #[test]
    fn test_voice_index_checked() {
        let mut kit = Kit::blank(KitFormat::Format1).unwrap();
        assert!(kit.get_voice(3).is_ok());
        assert_eq!(kit.get_voice(4), Err(KitError::InvalidVoiceIndex(4)));
        assert!(kit.set_voice(7, Voice::blank()).is_err());
    }

    #[test]
    fn test_into_format_changes_last_voice() {
        let kit = Kit::blank(KitFormat::Format1).unwrap();
        let encoded = kit.into_format(KitFormat::Format2).to_buffer().unwrap();
        assert_eq!(encoded.len(), 57 + 110);

        let start = 57 + 3 * 26;
        assert_eq!(&encoded[start + MARKER_OFFSET..start + 8], VOICE_MARKER);
        assert_eq!(Kit::from_buffer(&encoded).unwrap().format(), KitFormat::Format2);
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let err = Kit::load_file("/nonexistent/dir/00.KIT").unwrap_err();
        assert!(matches!(err, KitError::SourceUnavailable { .. }));
    }
}
