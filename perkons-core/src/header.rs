//! Kit header helpers
//!
//! The codec treats the header as opaque bytes. The fields below were
//! observed across the 64 factory kits and are only used to synthesize
//! headers for new kits and to describe existing ones; they never decide
//! whether a buffer is accepted.
//!
//! | Byte | Meaning |
//! |------|---------|
//! | 0    | file size - 2 |
//! | 1-4  | `01 08 01 12` |
//! | 5    | header size - 2 |
//! | 6    | `0D` |
//! | 7..  | unknown |

use crate::constants::{MAX_HEADER_LEN, MIN_HEADER_LEN};
use crate::error::KitError;
use crate::format::KitFormat;
use bytes::{Bytes, BytesMut};

/// Constant bytes at offsets 1-4
pub const HEADER_MAGIC: [u8; 4] = [0x01, 0x08, 0x01, 0x12];

/// Constant byte at offset 6
pub const HEADER_TAG: u8 = 0x0D;

/// Build a zero-filled header of `header_len` bytes for `format`
pub fn build_header(header_len: usize, format: KitFormat) -> Result<Bytes, KitError> {
    if !(MIN_HEADER_LEN..=MAX_HEADER_LEN).contains(&header_len) {
        return Err(KitError::InvalidHeader { len: header_len });
    }

    let mut header = BytesMut::zeroed(header_len);
    header[0] = (format.total_len(header_len) - 2) as u8;
    header[1..5].copy_from_slice(&HEADER_MAGIC);
    header[5] = (header_len - 2) as u8;
    header[6] = HEADER_TAG;

    Ok(header.freeze())
}

/// Fields read from an existing header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderInfo {
    /// Actual header length
    pub len: usize,
    /// File size recorded at byte 0
    pub declared_file_len: usize,
    /// Header size recorded at byte 5
    pub declared_header_len: usize,
    /// Whether bytes 1-4 and 6 hold the expected constants
    pub constants_match: bool,
}

impl HeaderInfo {
    /// Read the known fields of `header`; `None` if it is shorter than 7 bytes
    pub fn parse(header: &[u8]) -> Option<Self> {
        if header.len() < 7 {
            return None;
        }

        Some(Self {
            len: header.len(),
            declared_file_len: header[0] as usize + 2,
            declared_header_len: header[5] as usize + 2,
            constants_match: header[1..5] == HEADER_MAGIC && header[6] == HEADER_TAG,
        })
    }

    /// Whether the recorded sizes agree with a file of `format`
    pub fn is_consistent(&self, format: KitFormat) -> bool {
        self.declared_header_len == self.len
            && self.declared_file_len == format.total_len(self.len)
    }
}
