//! Basic kit editing example

use perkons_core::{Control, Kit, KitFormat};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Perkons Basic Usage Example\n");

    // Start from a blank kit; a real one would come from Kit::load_file
    let mut kit = Kit::blank(KitFormat::Format1)?;
    println!("Kit: {} ({} bytes)", kit.format(), kit.encoded_len());

    {
        let voice = kit.get_voice_mut(0)?;
        voice.set_algo(1)?;
        voice.set_tune(128)?;
        voice.set_decay(255)?;
        voice.set(Control::FxSend, 77)?;
    }

    // Writes are range-checked on assignment
    if let Err(e) = kit.get_voice_mut(1)?.set_vcf(3) {
        println!("Rejected: {}", e);
    }

    for (i, voice) in kit.voices().iter().enumerate() {
        let controls: Vec<String> = voice
            .controls()
            .map(|(control, value)| format!("{}={}", control, value))
            .collect();
        println!("Voice {} ({} bytes): {}", i + 1, voice.len(), controls.join(" "));
    }

    kit.save_file("example_output.KIT")?;

    println!("\nWrote example_output.KIT");
    println!("Use 'perkons inspect --input example_output.KIT' to read it back");

    Ok(())
}
