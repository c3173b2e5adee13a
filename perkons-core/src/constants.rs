//! Constants and limits for the HD-01 kit format

/// Voice marker - 4 bytes present in every voice region
pub const VOICE_MARKER: &[u8; 4] = &[26, 24, 10, 22];

/// Offset of the marker relative to the start of a voice region
pub const MARKER_OFFSET: usize = 4;

/// Number of voices in a kit
pub const VOICE_COUNT: usize = 4;

/// Length of voices 0-2 (and the common prefix of voice 3)
/// 4 (pre-marker) + 4 (marker) + 18 (parameters) = 26 bytes
pub const VOICE_LEN: usize = 26;

/// Length of the voice 3 extra parameter block
pub const EXTRA_PARAMS_LEN: usize = 4;

/// Length of the voice 3 sampler parameter block (Format 2 only)
pub const SAMPLER_PARAMS_LEN: usize = 2;

/// Offset of the main parameter block inside a voice region
pub const PARAMS_OFFSET: usize = MARKER_OFFSET + VOICE_MARKER.len();

/// Length of the main parameter block
pub const PARAMS_LEN: usize = VOICE_LEN - PARAMS_OFFSET;

/// Offset of the extra parameter block inside voice 3
pub const EXTRA_PARAMS_OFFSET: usize = VOICE_LEN;

/// Offset of the sampler parameter block inside voice 3
pub const SAMPLER_PARAMS_OFFSET: usize = EXTRA_PARAMS_OFFSET + EXTRA_PARAMS_LEN;

/// Extra parameters written when a short voice is placed in slot 3
pub const DEFAULT_EXTRA_PARAMS: [u8; EXTRA_PARAMS_LEN] = [1, 0, 1, 0];

/// Sampler parameters written when a voice without them is placed in a Format 2 slot 3
pub const DEFAULT_SAMPLER_PARAMS: [u8; SAMPLER_PARAMS_LEN] = [0, 0];

/// Smallest header observed across factory kits
pub const MIN_HEADER_LEN: usize = 47;

/// Largest header observed across factory kits
pub const MAX_HEADER_LEN: usize = 59;

/// Header length used when synthesizing new kits (most common in factory kits)
pub const DEFAULT_HEADER_LEN: usize = 57;
