use crate::{card, mixer, prompt, OutputFormat};
use anyhow::{bail, Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use perkons_core::KitFormat;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use tracing::info;

/// Options for `perkons randomise`
#[derive(Debug, Clone)]
pub struct RandomiseOptions {
    pub sd_path: String,
    pub output_bank: String,
    pub count: usize,
    pub seed: Option<u64>,
    pub format: OutputFormat,
    pub force: bool,
    pub progress: bool,
}

pub fn execute(opts: &RandomiseOptions) -> Result<()> {
    run(opts, &mut io::stdin().lock())
}

/// Generate the bank, asking on `input` before writing unless `force` is set
pub fn run<R: BufRead>(opts: &RandomiseOptions, input: &mut R) -> Result<()> {
    if !(1..=64).contains(&opts.count) {
        bail!("Number of kits must be between 1 and 64, got {}", opts.count);
    }

    let sd = Path::new(&opts.sd_path);
    let bank = card::normalize_bank_id(&opts.output_bank)?;
    let format = KitFormat::from(opts.format);

    card::check_mounted(sd)?;
    card::validate_source_banks(sd)?;
    card::check_output_bank(sd, &bank, opts.force)?;

    let sources = card::load_source_kits(sd)?;
    info!("Loaded {} source kits", sources.len());

    let header = mixer::select_template_header(&sources, format)?;
    let seed = opts.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);

    if !opts.force
        && !prompt::confirm(input, &format!("Generate {} kit(s) in bank {}?", opts.count, bank))?
    {
        println!("Aborted.");
        return Ok(());
    }

    let out_dir = card::kits_dir(sd, &bank);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let pb = if opts.progress {
        let pb = ProgressBar::new(opts.count as u64);
        pb.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    } else {
        None
    };

    for n in 0..opts.count {
        let kit = mixer::random_kit(&mut rng, &sources, format, header.clone())?;
        let path = card::kit_path(sd, &bank, n as u8);
        kit.save_file(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        if let Some(pb) = &pb {
            pb.set_message(card::kit_filename(n as u8));
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let info = card::BankInfo::new("Random Kits")
        .detail("Command", "perkons randomise")
        .detail("Number of Kits", opts.count)
        .detail("Format", format)
        .detail("Random Seed", seed);
    let info_path = card::write_bank_info(sd, &bank, &info)?;

    println!(
        "{} Generated {} {} kit(s) in bank {}",
        "✓".green(),
        opts.count,
        format,
        bank
    );
    println!("  Seed:      {}", seed);
    println!("  Info file: {}", info_path.display());

    Ok(())
}
