use crate::{card, mixer, prompt};
use anyhow::{bail, Context, Result};
use colored::*;
use perkons_core::Kit;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use tracing::info;

/// Options for `perkons vary`
#[derive(Debug, Clone)]
pub struct VaryOptions {
    pub sd_path: String,
    pub source: String,
    pub output_bank: String,
    pub variants: usize,
    pub mutations: usize,
    pub seed: Option<u64>,
    pub force: bool,
}

pub fn execute(opts: &VaryOptions) -> Result<()> {
    run(opts, &mut io::stdin().lock())
}

/// Generate the variations, asking on `input` before writing unless `force` is set
///
/// Kit 00 of the output bank is the source kit itself; kits 01 onwards are
/// the variations.
pub fn run<R: BufRead>(opts: &VaryOptions, input: &mut R) -> Result<()> {
    if !(1..=64).contains(&opts.variants) {
        bail!("Number of variants must be between 1 and 64, got {}", opts.variants);
    }
    if !(1..=4).contains(&opts.mutations) {
        bail!("Number of mutations must be between 1 and 4, got {}", opts.mutations);
    }

    let sd = Path::new(&opts.sd_path);
    let (source_bank, source_kit) = card::parse_kit_spec(&opts.source)?;
    let bank = card::normalize_bank_id(&opts.output_bank)?;

    card::check_mounted(sd)?;

    let source_path = card::kit_path(sd, &source_bank, source_kit);
    if !source_path.exists() {
        bail!("Source kit not found: {}", source_path.display());
    }
    let source = Kit::load_file(&source_path)
        .with_context(|| format!("Failed to load source kit: {}", source_path.display()))?;
    info!(
        "Source kit {}:{:02} ({}, {}-byte header)",
        source_bank,
        source_kit,
        source.format(),
        source.header().len()
    );

    card::validate_source_banks(sd)?;
    card::check_output_bank(sd, &bank, opts.force)?;

    let pool = card::load_source_kits(sd)?;
    let seed = opts.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);

    if !opts.force
        && !prompt::confirm(
            input,
            &format!("Generate {} kit(s) in bank {}?", opts.variants, bank),
        )?
    {
        println!("Aborted.");
        return Ok(());
    }

    let out_dir = card::kits_dir(sd, &bank);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let first = card::kit_path(sd, &bank, 0);
    source
        .save_file(&first)
        .with_context(|| format!("Failed to write {}", first.display()))?;
    info!("{}: original, unvaried", card::kit_filename(0));

    for n in 1..opts.variants {
        let (variant, slots) = mixer::vary(&mut rng, &source, &pool, opts.mutations)?;
        let path = card::kit_path(sd, &bank, n as u8);
        variant
            .save_file(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        let voices: Vec<String> = slots.iter().map(|s| (s + 1).to_string()).collect();
        info!("{}: mutated voice(s) {}", card::kit_filename(n as u8), voices.join(", "));
    }

    let mut info = card::BankInfo::new("Kit Variations")
        .detail("Command", "perkons vary")
        .detail("Source Kit", format!("{}:{:02}", source_bank, source_kit))
        .detail("Number of Kits", opts.variants)
        .detail("Mutations per Variant", format!("{} voice(s)", opts.mutations))
        .detail("Random Seed", seed)
        .kit_note("Kit 00: original source kit (unvaried)");
    if opts.variants > 1 {
        info = info.kit_note(format!(
            "Kits 01-{:02}: variations with {} voice(s) mutated",
            opts.variants - 1,
            opts.mutations
        ));
    }
    let info_path = card::write_bank_info(sd, &bank, &info)?;

    println!(
        "{} Generated {} kit(s) from {}:{:02} in bank {}",
        "✓".green(),
        opts.variants,
        source_bank,
        source_kit,
        bank
    );
    println!("  Seed:      {}", seed);
    println!("  Info file: {}", info_path.display());

    Ok(())
}
