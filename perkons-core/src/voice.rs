//! Voice entity and voice region codec
//!
//! A voice keeps the raw bytes of its region so that everything the codec
//! does not interpret (quantized companions, unknown bytes, extra and
//! sampler parameters) survives a load/save cycle untouched. Controls are
//! read from and written to fixed offsets inside that buffer.

use crate::constants::{
    DEFAULT_EXTRA_PARAMS, DEFAULT_SAMPLER_PARAMS, EXTRA_PARAMS_LEN, EXTRA_PARAMS_OFFSET,
    MARKER_OFFSET, PARAMS_LEN, PARAMS_OFFSET, SAMPLER_PARAMS_LEN, SAMPLER_PARAMS_OFFSET,
    VOICE_LEN, VOICE_MARKER,
};
use crate::control::{Control, CONTROLS};
use crate::error::KitError;
use crate::format::KitFormat;
use bytes::{BufMut, Bytes, BytesMut};

#[cfg(feature = "logging")]
use tracing::debug;

/// One of the four per-channel control sets of a kit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    data: BytesMut,
}

macro_rules! control_accessors {
    ($($get:ident, $set:ident => $control:expr;)*) => {
        $(
            #[doc = concat!("Current `", stringify!($get), "` value")]
            pub fn $get(&self) -> u8 {
                self.get($control)
            }

            #[doc = concat!("Set `", stringify!($get), "`, rejecting values outside its range")]
            pub fn $set(&mut self, value: i32) -> Result<(), KitError> {
                self.set($control, value)
            }
        )*
    };
}

impl Voice {
    /// A 26-byte voice with every control at zero and the marker in place
    pub fn blank() -> Self {
        let mut data = BytesMut::zeroed(VOICE_LEN);
        data[MARKER_OFFSET..PARAMS_OFFSET].copy_from_slice(VOICE_MARKER);
        Self { data }
    }

    /// Region length this voice was decoded from (26, 30 or 32)
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; a voice region is never empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw region bytes as currently held
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Read a control
    ///
    /// Values are returned as stored, even when a hardware-written toggle
    /// byte lies outside 0-2.
    pub fn get(&self, control: Control) -> u8 {
        self.data[control.offset()]
    }

    /// Write a control after checking its range
    pub fn set(&mut self, control: Control, value: i32) -> Result<(), KitError> {
        let byte = control.validate(value)?;
        self.data[control.offset()] = byte;
        Ok(())
    }

    /// All controls with their current values, in table order
    pub fn controls(&self) -> impl Iterator<Item = (Control, u8)> + '_ {
        Control::all().map(move |c| (c, self.get(c)))
    }

    /// Check every control against its range
    pub fn validate(&self) -> Result<(), KitError> {
        for spec in CONTROLS.iter() {
            spec.control.validate(self.data[spec.offset] as i32)?;
        }
        Ok(())
    }

    control_accessors! {
        algo, set_algo => Control::Algo;
        mode, set_mode => Control::Mode;
        vcf, set_vcf => Control::Vcf;
        tune, set_tune => Control::Tune;
        param1, set_param1 => Control::Param1;
        param2, set_param2 => Control::Param2;
        fx_send, set_fx_send => Control::FxSend;
        decay, set_decay => Control::Decay;
        cutoff, set_cutoff => Control::Cutoff;
        drive, set_drive => Control::Drive;
        level, set_level => Control::Level;
    }

    /// The four bytes before the marker
    pub fn pre_marker_params(&self) -> &[u8] {
        &self.data[..MARKER_OFFSET]
    }

    /// Marker bytes as held by this voice
    pub fn marker(&self) -> [u8; 4] {
        let mut marker = [0u8; 4];
        marker.copy_from_slice(&self.data[MARKER_OFFSET..PARAMS_OFFSET]);
        marker
    }

    /// The 18-byte main parameter block
    pub fn parameters(&self) -> &[u8] {
        &self.data[PARAMS_OFFSET..PARAMS_OFFSET + PARAMS_LEN]
    }

    /// Extra parameters (voice 3 only)
    pub fn extra_params(&self) -> Option<&[u8]> {
        self.data
            .get(EXTRA_PARAMS_OFFSET..EXTRA_PARAMS_OFFSET + EXTRA_PARAMS_LEN)
    }

    /// Replace the extra parameters; fails on a voice without them
    pub fn set_extra_params(&mut self, params: [u8; EXTRA_PARAMS_LEN]) -> Result<(), KitError> {
        let len = self.data.len();
        let slot = self
            .data
            .get_mut(EXTRA_PARAMS_OFFSET..EXTRA_PARAMS_OFFSET + EXTRA_PARAMS_LEN)
            .ok_or_else(|| KitError::MalformedRecord {
                len,
                reason: "voice has no extra parameters".to_string(),
            })?;
        slot.copy_from_slice(&params);
        Ok(())
    }

    /// Sampler parameters (voice 3 of a Format 2 kit only)
    pub fn sampler_params(&self) -> Option<&[u8]> {
        self.data
            .get(SAMPLER_PARAMS_OFFSET..SAMPLER_PARAMS_OFFSET + SAMPLER_PARAMS_LEN)
    }

    /// Replace the sampler parameters; fails on a voice without them
    pub fn set_sampler_params(
        &mut self,
        params: [u8; SAMPLER_PARAMS_LEN],
    ) -> Result<(), KitError> {
        let len = self.data.len();
        let slot = self
            .data
            .get_mut(SAMPLER_PARAMS_OFFSET..SAMPLER_PARAMS_OFFSET + SAMPLER_PARAMS_LEN)
            .ok_or_else(|| KitError::MalformedRecord {
                len,
                reason: "voice has no sampler parameters".to_string(),
            })?;
        slot.copy_from_slice(&params);
        Ok(())
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::blank()
    }
}

/// Decode the region of voice `index` under `format`
///
/// The marker is validated; control values are taken as found.
pub fn decode_voice(region: &[u8], index: usize, format: KitFormat) -> Result<Voice, KitError> {
    let expected_len = format
        .voice_len(index)
        .ok_or(KitError::InvalidVoiceIndex(index))?;

    if region.len() != expected_len {
        return Err(KitError::MalformedRecord {
            len: region.len(),
            reason: format!(
                "voice {} under {} must be {} bytes",
                index, format, expected_len
            ),
        });
    }

    let marker = &region[MARKER_OFFSET..PARAMS_OFFSET];
    if marker != VOICE_MARKER {
        return Err(KitError::marker_mismatch(index, marker));
    }

    Ok(Voice {
        data: BytesMut::from(region),
    })
}

/// Encode `voice` as the region of voice `index` under `format`
///
/// Every control is range-checked first. The output is always the region
/// length for the slot: a longer voice is truncated, a shorter one is
/// padded with default extra and sampler parameters. The marker is always
/// written by the codec.
pub fn encode_voice(voice: &Voice, index: usize, format: KitFormat) -> Result<Bytes, KitError> {
    let target_len = format
        .voice_len(index)
        .ok_or(KitError::InvalidVoiceIndex(index))?;

    voice.validate()?;

    let mut buf = BytesMut::with_capacity(target_len);
    let keep = voice.data.len().min(target_len);
    buf.put_slice(&voice.data[..keep]);

    if buf.len() < SAMPLER_PARAMS_OFFSET && target_len > buf.len() {
        buf.put_slice(&DEFAULT_EXTRA_PARAMS[buf.len() - EXTRA_PARAMS_OFFSET..]);
    }
    if buf.len() < target_len {
        buf.put_slice(&DEFAULT_SAMPLER_PARAMS[buf.len() - SAMPLER_PARAMS_OFFSET..]);
    }

    #[cfg(feature = "logging")]
    if voice.data.len() != target_len {
        debug!(
            "Reshaped voice from {} to {} bytes for slot {}",
            voice.data.len(),
            target_len,
            index
        );
    }

    buf[MARKER_OFFSET..PARAMS_OFFSET].copy_from_slice(VOICE_MARKER);

    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(len: usize) -> Vec<u8> {
        let mut data: Vec<u8> = (0..len as u8).map(|b| b.wrapping_mul(7)).collect();
        data[MARKER_OFFSET..PARAMS_OFFSET].copy_from_slice(VOICE_MARKER);
        for control in [Control::Algo, Control::Mode, Control::Vcf] {
            data[control.offset()] = 1;
        }
        data
    }

    #[test]
    fn test_decode_reads_controls() {
        let mut data = region(26);
        data[9] = 200;
        data[23] = 17;
        data[24] = 2;

        let voice = decode_voice(&data, 0, KitFormat::Format1).unwrap();
        assert_eq!(voice.tune(), 200);
        assert_eq!(voice.level(), 17);
        assert_eq!(voice.vcf(), 2);
        assert_eq!(voice.algo(), 1);
        assert_eq!(voice.marker(), *VOICE_MARKER);
    }

    #[test]
    fn test_decode_keeps_out_of_spec_toggle() {
        let mut data = region(26);
        data[Control::Mode.offset()] = 5;

        let voice = decode_voice(&data, 1, KitFormat::Format2).unwrap();
        assert_eq!(voice.mode(), 5);
        assert!(matches!(
            encode_voice(&voice, 1, KitFormat::Format2),
            Err(KitError::OutOfRange {
                control: Control::Mode,
                value: 5
            })
        ));
    }

    #[test]
    fn test_decode_bad_marker() {
        let mut data = region(30);
        data[6] = 99;

        match decode_voice(&data, 3, KitFormat::Format1) {
            Err(KitError::MarkerMismatch {
                voice,
                found,
                expected,
            }) => {
                assert_eq!(voice, 3);
                assert_eq!(found, [26, 24, 99, 22]);
                assert_eq!(expected, *VOICE_MARKER);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_decode_wrong_length() {
        let data = region(30);
        assert!(matches!(
            decode_voice(&data, 3, KitFormat::Format2),
            Err(KitError::MalformedRecord { len: 30, .. })
        ));
        assert!(matches!(
            decode_voice(&data, 4, KitFormat::Format2),
            Err(KitError::InvalidVoiceIndex(4))
        ));
    }

    #[test]
    fn test_encode_lengths() {
        let voice = Voice::blank();
        assert_eq!(encode_voice(&voice, 3, KitFormat::Format1).unwrap().len(), 30);
        assert_eq!(encode_voice(&voice, 3, KitFormat::Format2).unwrap().len(), 32);
        assert_eq!(encode_voice(&voice, 0, KitFormat::Format2).unwrap().len(), 26);
    }

    #[test]
    fn test_encode_pads_short_voice_with_defaults() {
        let encoded = encode_voice(&Voice::blank(), 3, KitFormat::Format2).unwrap();
        assert_eq!(&encoded[26..30], &DEFAULT_EXTRA_PARAMS);
        assert_eq!(&encoded[30..32], &DEFAULT_SAMPLER_PARAMS);

        // Format 1 voice 3 moved into a Format 2 slot keeps its extra params
        let mut data = region(30);
        data[26..30].copy_from_slice(&[9, 8, 7, 6]);
        let voice = decode_voice(&data, 3, KitFormat::Format1).unwrap();
        let encoded = encode_voice(&voice, 3, KitFormat::Format2).unwrap();
        assert_eq!(&encoded[26..30], &[9, 8, 7, 6]);
        assert_eq!(&encoded[30..32], &DEFAULT_SAMPLER_PARAMS);
    }

    #[test]
    fn test_encode_truncates_long_voice() {
        let data = region(32);
        let voice = decode_voice(&data, 3, KitFormat::Format2).unwrap();
        let encoded = encode_voice(&voice, 0, KitFormat::Format2).unwrap();
        assert_eq!(&encoded[..], &data[..26]);
    }

    #[test]
    fn test_setters_validate_eagerly() {
        let mut voice = Voice::blank();
        voice.set_tune(128).unwrap();
        voice.set_algo(2).unwrap();
        assert_eq!(voice.tune(), 128);
        assert_eq!(voice.algo(), 2);

        assert!(matches!(
            voice.set_decay(256),
            Err(KitError::OutOfRange {
                control: Control::Decay,
                value: 256
            })
        ));
        assert!(voice.set_vcf(3).is_err());
        assert!(voice.set_cutoff(-1).is_err());
        // Failed writes leave the voice untouched
        assert_eq!(voice.decay(), 0);
        assert_eq!(voice.vcf(), 0);
    }

    #[test]
    fn test_extra_and_sampler_params() {
        let mut short = Voice::blank();
        assert_eq!(short.extra_params(), None);
        assert!(short.set_extra_params([1, 2, 3, 4]).is_err());

        let mut long = decode_voice(&region(32), 3, KitFormat::Format2).unwrap();
        long.set_extra_params([1, 2, 3, 4]).unwrap();
        long.set_sampler_params([5, 6]).unwrap();
        assert_eq!(long.extra_params(), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(long.sampler_params(), Some(&[5u8, 6][..]));
        assert_eq!(long.parameters().len(), 18);
        assert_eq!(long.pre_marker_params().len(), 4);
    }
}
