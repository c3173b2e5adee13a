use crate::mixer;
use anyhow::{Context, Result};
use perkons_core::Kit;
use tracing::info;

pub fn execute(kits: &[String], select: &str, output: &str) -> Result<()> {
    let selection = mixer::parse_selection(select)?;

    let loaded = kits
        .iter()
        .map(|path| Kit::load_file(path).with_context(|| format!("Failed to load kit: {}", path)))
        .collect::<Result<Vec<_>>>()?;

    info!("Mixing {} kits with selection {:?}", loaded.len(), selection);

    let mixed = mixer::mix(&loaded, &selection)?;
    mixed
        .save_file(output)
        .with_context(|| format!("Failed to write output file: {}", output))?;

    info!(
        "Wrote mixed {} kit to {} ({} bytes)",
        mixed.format(),
        output,
        mixed.encoded_len()
    );

    Ok(())
}
