use crate::{card, prompt};
use anyhow::{bail, Result};
use colored::*;
use std::io::{self, BufRead};
use std::path::Path;
use tracing::info;

/// Options for `perkons delete`
#[derive(Debug, Clone)]
pub struct DeleteOptions {
    pub sd_path: String,
    pub bank: String,
    /// Skip the typed confirmation
    pub yes: bool,
}

pub fn execute(opts: &DeleteOptions) -> Result<()> {
    run(opts, &mut io::stdin().lock())
}

/// Delete a bank, or clean a source bank, reading the confirmation from `input`
pub fn run<R: BufRead>(opts: &DeleteOptions, input: &mut R) -> Result<()> {
    let sd = Path::new(&opts.sd_path);
    let bank = card::normalize_bank_id(&opts.bank)?;

    card::check_mounted(sd)?;
    let bank_dir = card::banks_dir(sd).join(&bank);
    if !bank_dir.is_dir() {
        bail!("Bank {} does not exist on the card", bank);
    }

    let kits = card::kit_numbers_in_bank(sd, &bank)?;
    println!("\n=== Bank {} ===", bank);
    println!("Kits:        {}", kits.len());

    match card::clean_range(&bank) {
        Some(range) => {
            let doomed: Vec<u8> = kits.iter().copied().filter(|k| range.contains(k)).collect();
            println!(
                "{} Source bank: only kits {:02}-{:02} are removed ({} present)",
                "!".yellow(),
                range.start(),
                range.end(),
                doomed.len()
            );
        }
        None => {
            println!(
                "{} The whole bank and its {} kit(s) will be deleted permanently",
                "!".yellow(),
                kits.len()
            );
        }
    }

    let expected = card::removal_confirmation(&bank);
    if !opts.yes && !prompt::confirm_exact(input, &expected)? {
        bail!("Confirmation did not match '{}'; nothing was deleted", expected);
    }

    if card::is_source_bank(&bank) {
        let removed = card::clean_source_bank(sd, &bank)?;
        info!("Cleaned bank {}: {} kit(s) removed", bank, removed);
        println!("{} Cleaned bank {} ({} kit(s) removed)", "✓".green(), bank, removed);
    } else {
        card::delete_bank(sd, &bank)?;
        info!("Deleted bank {}", bank);
        println!("{} Deleted bank {}", "✓".green(), bank);
    }

    Ok(())
}
