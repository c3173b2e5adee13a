//! Library entry for perkons-cli used by integration tests and embedding.

pub mod card;
pub mod commands;
pub mod mixer;
pub mod prompt;

// Re-export commands for convenience
pub use commands::*;

/// Output format for voice 3 of generated kits
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Voice 3 is 30 bytes (factory kits 00-31)
    #[value(name = "1")]
    Format1,
    /// Voice 3 is 32 bytes with sampler parameters (factory kits 32-63)
    #[value(name = "2")]
    Format2,
}

impl From<OutputFormat> for perkons_core::KitFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Format1 => perkons_core::KitFormat::Format1,
            OutputFormat::Format2 => perkons_core::KitFormat::Format2,
        }
    }
}
