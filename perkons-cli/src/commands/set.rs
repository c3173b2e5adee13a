use anyhow::{Context, Result};
use perkons_core::{Control, Kit};
use tracing::info;

pub fn execute(input: &str, output: Option<&str>, voice: usize, control: &str, value: i32) -> Result<()> {
    let control: Control = control.parse()?;
    let output = output.unwrap_or(input);

    let mut kit = Kit::load_file(input).with_context(|| format!("Failed to load kit: {}", input))?;

    // Voices are numbered 1-4 on the panel
    let index = voice
        .checked_sub(1)
        .with_context(|| format!("Voice must be 1-4, got {}", voice))?;
    let target = kit
        .get_voice_mut(index)
        .with_context(|| format!("Voice must be 1-4, got {}", voice))?;
    let previous = target.get(control);
    target.set(control, value)?;

    kit.save_file(output)
        .with_context(|| format!("Failed to write output file: {}", output))?;

    info!(
        "Voice {} {}: {} -> {} (written to {})",
        voice, control, previous, value, output
    );

    Ok(())
}
