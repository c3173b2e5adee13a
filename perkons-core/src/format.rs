//! Format variants and format detection
//!
//! The HD-01 writes two layouts that differ only in the length of voice 3.
//! The header length varies between kits (47-59 bytes), so detection tries
//! both layouts against the buffer length and confirms the candidate by
//! checking that a marker sits at the expected offset of every voice window.

use crate::constants::{
    EXTRA_PARAMS_LEN, MARKER_OFFSET, MAX_HEADER_LEN, MIN_HEADER_LEN, SAMPLER_PARAMS_LEN,
    VOICE_COUNT, VOICE_LEN, VOICE_MARKER,
};
use crate::error::KitError;
use core::fmt;
use core::ops::Range;
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Known binary layouts of a kit file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KitFormat {
    /// Factory kits 00-31: voice 3 is 30 bytes
    Format1,
    /// Factory kits 32-63: voice 3 is 32 bytes (adds sampler parameters)
    Format2,
}

impl KitFormat {
    /// All known formats, in detection order
    pub const ALL: [KitFormat; 2] = [KitFormat::Format1, KitFormat::Format2];

    /// Length of voice 3 under this format
    pub const fn last_voice_len(&self) -> usize {
        match self {
            KitFormat::Format1 => VOICE_LEN + EXTRA_PARAMS_LEN,
            KitFormat::Format2 => VOICE_LEN + EXTRA_PARAMS_LEN + SAMPLER_PARAMS_LEN,
        }
    }

    /// Whether voice 3 carries sampler parameters
    pub const fn has_sampler(&self) -> bool {
        matches!(self, KitFormat::Format2)
    }

    /// Length of the voice at `index`, or `None` for an index outside 0-3
    pub const fn voice_len(&self, index: usize) -> Option<usize> {
        match index {
            0..=2 => Some(VOICE_LEN),
            3 => Some(self.last_voice_len()),
            _ => None,
        }
    }

    /// Combined length of the four voices (108 or 110)
    pub const fn voice_data_len(&self) -> usize {
        (VOICE_COUNT - 1) * VOICE_LEN + self.last_voice_len()
    }

    /// Total file length for a header of `header_len` bytes
    pub const fn total_len(&self, header_len: usize) -> usize {
        header_len + self.voice_data_len()
    }

    /// Range of admissible total file lengths
    pub const fn total_len_range(&self) -> Range<usize> {
        self.total_len(MIN_HEADER_LEN)..self.total_len(MAX_HEADER_LEN) + 1
    }

    /// Header length implied by a buffer of `total` bytes, if admissible
    pub fn header_len_for(&self, total: usize) -> Option<usize> {
        let header_len = total.checked_sub(self.voice_data_len())?;
        (MIN_HEADER_LEN..=MAX_HEADER_LEN)
            .contains(&header_len)
            .then_some(header_len)
    }

    /// Short human-readable number (1 or 2)
    pub const fn number(&self) -> u8 {
        match self {
            KitFormat::Format1 => 1,
            KitFormat::Format2 => 2,
        }
    }
}

impl fmt::Display for KitFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FORMAT {}", self.number())
    }
}

/// Header length and format of a kit buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KitLayout {
    /// Detected format
    pub format: KitFormat,
    /// Length of the opaque header
    pub header_len: usize,
}

impl KitLayout {
    /// Byte window of the voice at `index` (0-3)
    ///
    /// Voices are contiguous: voice 0 starts right after the header.
    pub fn voice_window(&self, index: usize) -> Option<Range<usize>> {
        let len = self.format.voice_len(index)?;
        let start = self.header_len + index * VOICE_LEN;
        Some(start..start + len)
    }

    /// Windows of all four voices
    pub fn voice_windows(&self) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        (0..VOICE_COUNT).filter_map(move |i| self.voice_window(i).map(|w| (i, w)))
    }

    /// Total buffer length described by this layout
    pub fn total_len(&self) -> usize {
        self.format.total_len(self.header_len)
    }

    /// Check the marker of every voice window against `data`
    ///
    /// Returns the number of aligned markers on failure alongside the error
    /// for the first misaligned voice.
    fn check_markers(&self, data: &[u8]) -> Result<(), (usize, KitError)> {
        let mut aligned = 0;
        let mut first_error = None;

        for (index, window) in self.voice_windows() {
            let at = window.start + MARKER_OFFSET;
            let found = &data[at..at + VOICE_MARKER.len()];
            if found == VOICE_MARKER {
                aligned += 1;
            } else if first_error.is_none() {
                first_error = Some(KitError::marker_mismatch(index, found));
            }
        }

        match first_error {
            None => Ok(()),
            Some(err) => Err((aligned, err)),
        }
    }
}

/// Detect the format of a complete kit buffer
pub fn detect(data: &[u8]) -> Result<KitFormat, KitError> {
    detect_layout(data).map(|layout| layout.format)
}

/// Detect the format and header length of a complete kit buffer
///
/// - A buffer whose length fits neither format fails with `MalformedRecord`.
/// - A length that fits exactly one format must have all four markers in
///   place under that format, otherwise `MarkerMismatch` is returned; the
///   other format is not tried.
/// - Lengths between 157 and 167 bytes fit both formats (with different
///   header lengths); the markers decide. If neither aligns, the error of
///   the layout with the most aligned markers is returned.
pub fn detect_layout(data: &[u8]) -> Result<KitLayout, KitError> {
    let candidates: Vec<KitLayout> = KitFormat::ALL
        .iter()
        .filter_map(|&format| {
            format
                .header_len_for(data.len())
                .map(|header_len| KitLayout { format, header_len })
        })
        .collect();

    if candidates.is_empty() {
        return Err(KitError::MalformedRecord {
            len: data.len(),
            reason: format!(
                "length matches neither {} ({:?} bytes) nor {} ({:?} bytes)",
                KitFormat::Format1,
                KitFormat::Format1.total_len_range(),
                KitFormat::Format2,
                KitFormat::Format2.total_len_range(),
            ),
        });
    }

    let mut aligned = Vec::new();
    let mut best_failure: Option<(usize, KitError)> = None;

    for layout in candidates {
        match layout.check_markers(data) {
            Ok(()) => aligned.push(layout),
            Err((count, err)) => {
                #[cfg(feature = "logging")]
                debug!(
                    "{} with {}-byte header rejected: {} of 4 markers aligned",
                    layout.format, layout.header_len, count
                );

                if best_failure.as_ref().map_or(true, |(best, _)| count > *best) {
                    best_failure = Some((count, err));
                }
            }
        }
    }

    match aligned.as_slice() {
        [layout] => {
            #[cfg(feature = "logging")]
            debug!(
                "Detected {} ({}-byte header, {} bytes total)",
                layout.format,
                layout.header_len,
                data.len()
            );
            Ok(*layout)
        }
        [] => {
            let (_, err) = best_failure.ok_or_else(|| KitError::MalformedRecord {
                len: data.len(),
                reason: "no candidate layout".to_string(),
            })?;

            #[cfg(feature = "logging")]
            warn!("Marker check failed: {}", err);

            Err(err)
        }
        several => resolve_by_declared_header(data, several),
    }
}

/// Pick among layouts whose markers all align, using header byte 5
///
/// The header stores its own length minus two at byte 5. Real kits never
/// get here: the two formats' layouts for one length sit two bytes apart
/// and the marker does not overlap itself at that shift.
fn resolve_by_declared_header(data: &[u8], aligned: &[KitLayout]) -> Result<KitLayout, KitError> {
    let declared = data.get(5).map(|b| *b as usize + 2);
    aligned
        .iter()
        .find(|layout| Some(layout.header_len) == declared)
        .copied()
        .ok_or_else(|| KitError::MalformedRecord {
            len: data.len(),
            reason: "markers align under both formats".to_string(),
        })
}
