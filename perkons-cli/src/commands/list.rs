use crate::card;
use anyhow::{Context, Result};
use colored::*;
use std::path::Path;
use tracing::info;

/// Print the banks on the card
///
/// The compact listing shows one line per bank; `detailed` adds sizes.
pub fn execute(sd_path: &str, json: bool, detailed: bool) -> Result<()> {
    let sd = Path::new(sd_path);
    card::check_mounted(sd)?;
    info!("Listing banks on {}", sd_path);

    let banks = card::scan_banks(sd)?;

    if json {
        let out = serde_json::to_string_pretty(&banks)
            .with_context(|| "Failed to serialize bank listing")?;
        println!("{}", out);
        return Ok(());
    }

    println!("\n=== Banks on {} ===", sd_path);
    if banks.is_empty() {
        println!("{} No banks found", "✗".red());
        return Ok(());
    }

    let mut total_kits = 0;
    let mut total_size = 0;
    for bank in &banks {
        let marker = if card::is_source_bank(&bank.id) { "*" } else { " " };
        let kits = if bank.kits.is_empty() {
            "(empty)".dimmed().to_string()
        } else {
            card::format_kit_ranges(&bank.kits)
        };

        if detailed {
            println!("\n{}Bank {}", marker, bank.id);
            println!("  Kits:        {}", bank.kits.len());
            println!("  Size:        {}", card::format_size(bank.size_bytes));
            println!("  Kit numbers: {}", kits);
        } else {
            println!("{}{}  {:>2} kits  ({})", marker, bank.id, bank.kits.len(), kits);
        }
        total_kits += bank.kits.len();
        total_size += bank.size_bytes;
    }

    println!("\n=== Summary ===");
    println!("Banks:       {}", banks.len());
    println!("Kits:        {}", total_kits);
    if detailed {
        println!("Total size:  {}", card::format_size(total_size));
    }
    println!("(* = source bank)");

    Ok(())
}
