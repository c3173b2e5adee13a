//! # Perkons Core
//!
//! Codec for the `.KIT` files written by the Erica Synths Perkons HD-01.
//!
//! A kit is an opaque header followed by four voice regions. Two layouts
//! exist, differing in the length of the last voice; the header length
//! varies between 47 and 59 bytes.
//!
//! ## Modules
//!
//! - `constants`: Layout constants and limits
//! - `control`: The 11 hardware controls and their range table
//! - `format`: Format variants and format detection
//! - `voice`: Voice entity and voice region codec
//! - `kit`: Kit entity and whole-file codec
//! - `header`: Header synthesis and inspection helpers
//! - `error`: Error type

#![warn(missing_docs)]

pub mod constants;
pub mod control;
pub mod error;
pub mod format;
pub mod header;
pub mod kit;
pub mod voice;

// Re-export commonly used types
pub use control::{Control, ControlKind};
pub use error::KitError;
pub use format::{detect, KitFormat};
pub use kit::Kit;
pub use voice::Voice;

/// Result type alias for kit codec operations
pub type Result<T> = core::result::Result<T, KitError>;
