//! SD card layout helpers
//!
//! Kits live at `<sd>/BANKS/<NN>/KITS/<KK>.KIT`. Banks and kits are both
//! numbered 00-63. Banks 01 and 02 hold the factory source kits.

use anyhow::{bail, Context, Result};
use perkons_core::Kit;
use serde::Serialize;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Mount point used when `--sd-path` is not given
pub const DEFAULT_SD_PATH: &str = "/Volumes/Untitled";

/// Highest bank and kit number
pub const MAX_SLOT: u8 = 63;

/// Factory source banks and the kit numbers each one holds
pub const SOURCE_BANKS: [(&str, RangeInclusive<u8>); 2] = [("01", 0..=31), ("02", 32..=63)];

/// Fail unless `sd_path` is an existing directory
pub fn check_mounted(sd_path: &Path) -> Result<()> {
    if !sd_path.is_dir() {
        bail!(
            "SD card not found at {}; make sure the Perkons card is mounted",
            sd_path.display()
        );
    }
    Ok(())
}

/// `<sd>/BANKS`
pub fn banks_dir(sd_path: &Path) -> PathBuf {
    sd_path.join("BANKS")
}

/// `<sd>/BANKS/<bank>/KITS`
pub fn kits_dir(sd_path: &Path, bank_id: &str) -> PathBuf {
    banks_dir(sd_path).join(bank_id).join("KITS")
}

/// File name of kit `kit`, e.g. `05.KIT`
pub fn kit_filename(kit: u8) -> String {
    format!("{:02}.KIT", kit)
}

/// Full path of a kit file
pub fn kit_path(sd_path: &Path, bank_id: &str, kit: u8) -> PathBuf {
    kits_dir(sd_path, bank_id).join(kit_filename(kit))
}

fn parse_slot(input: &str, what: &str) -> Result<u8> {
    let trimmed = input.trim();
    let number: u32 = trimmed
        .parse()
        .with_context(|| format!("{} must be numeric 00-63, got '{}'", what, trimmed))?;
    if number > MAX_SLOT as u32 {
        bail!("{} number must be 00-63, got {}", what, number);
    }
    Ok(number as u8)
}

/// Normalize a bank id to two digits (`5` → `05`)
pub fn normalize_bank_id(input: &str) -> Result<String> {
    parse_slot(input, "Bank").map(|n| format!("{:02}", n))
}

/// Parse a `BB:KK` kit reference into a bank id and kit number
pub fn parse_kit_spec(spec: &str) -> Result<(String, u8)> {
    let Some((bank, kit)) = spec.split_once(':') else {
        bail!("Kit spec must be in format BB:KK, got '{}'", spec);
    };
    Ok((normalize_bank_id(bank)?, parse_slot(kit, "Kit")?))
}

/// Whether `bank_id` is one of the factory source banks
pub fn is_source_bank(bank_id: &str) -> bool {
    SOURCE_BANKS.iter().any(|(id, _)| *id == bank_id)
}

/// Sorted kit numbers present in a bank (`.KIT` or `.kit`, 00-63)
pub fn kit_numbers_in_bank(sd_path: &Path, bank_id: &str) -> Result<Vec<u8>> {
    let dir = kits_dir(sd_path, bank_id);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut numbers = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        let is_kit = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("kit"));
        if !is_kit {
            continue;
        }

        match path.file_stem().and_then(|s| s.to_str()).map(str::parse::<u8>) {
            Some(Ok(n)) if n <= MAX_SLOT => numbers.push(n),
            _ => debug!("Skipping non-kit file {}", path.display()),
        }
    }

    numbers.sort_unstable();
    numbers.dedup();
    Ok(numbers)
}

/// Whether a bank has no kit files (a missing bank counts as empty)
pub fn is_bank_empty(sd_path: &Path, bank_id: &str) -> Result<bool> {
    Ok(kit_numbers_in_bank(sd_path, bank_id)?.is_empty())
}

/// Compact ranges: `[0, 1, 2, 5, 6, 10]` → `"0..2, 5..6, 10"`
pub fn format_kit_ranges(numbers: &[u8]) -> String {
    let mut ranges: Vec<String> = Vec::new();
    let mut iter = numbers.iter().copied();

    let Some(first) = iter.next() else {
        return String::new();
    };

    let (mut start, mut end) = (first, first);
    let mut push = |start: u8, end: u8| {
        if start == end {
            ranges.push(start.to_string());
        } else {
            ranges.push(format!("{}..{}", start, end));
        }
    };

    for n in iter {
        if end.checked_add(1) == Some(n) {
            end = n;
        } else {
            push(start, end);
            start = n;
            end = n;
        }
    }
    push(start, end);

    ranges.join(", ")
}

/// Human-readable byte size
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// One bank found on the card
#[derive(Debug, Clone, Serialize)]
pub struct BankSummary {
    /// Two-digit bank id
    pub id: String,
    /// Kit numbers present
    pub kits: Vec<u8>,
    /// Combined size of all files under the bank
    pub size_bytes: u64,
}

fn dir_size(path: &Path) -> Result<u64> {
    let mut total = 0;
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        total += if meta.is_dir() {
            dir_size(&entry.path())?
        } else {
            meta.len()
        };
    }
    Ok(total)
}

/// Every bank directory (00-63) present on the card
pub fn scan_banks(sd_path: &Path) -> Result<Vec<BankSummary>> {
    let dir = banks_dir(sd_path);
    if !dir.is_dir() {
        bail!("BANKS directory not found at {}", dir.display());
    }

    let mut banks = Vec::new();
    for n in 0..=MAX_SLOT {
        let id = format!("{:02}", n);
        let bank_dir = dir.join(&id);
        if !bank_dir.is_dir() {
            continue;
        }
        banks.push(BankSummary {
            kits: kit_numbers_in_bank(sd_path, &id)?,
            size_bytes: dir_size(&bank_dir)?,
            id,
        });
    }

    Ok(banks)
}

/// Fail unless both source banks exist and hold kits
pub fn validate_source_banks(sd_path: &Path) -> Result<()> {
    let mut missing = Vec::new();
    for (id, _) in SOURCE_BANKS.iter() {
        if is_bank_empty(sd_path, id)? {
            missing.push(*id);
        }
    }

    if !missing.is_empty() {
        bail!("Source banks missing or empty: {}", missing.join(", "));
    }
    Ok(())
}

/// Load every factory kit from the source banks
///
/// Kits that fail to load are skipped with a warning.
pub fn load_source_kits(sd_path: &Path) -> Result<Vec<Kit>> {
    let mut kits = Vec::new();

    for (bank_id, range) in SOURCE_BANKS.iter() {
        for kit in range.clone() {
            let path = kit_path(sd_path, bank_id, kit);
            if !path.exists() {
                continue;
            }
            match Kit::load_file(&path) {
                Ok(loaded) => {
                    debug!("Loaded {}/KITS/{}", bank_id, kit_filename(kit));
                    kits.push(loaded);
                }
                Err(e) => warn!("Failed to load {}: {}", path.display(), e),
            }
        }
    }

    if kits.is_empty() {
        bail!("No kits could be loaded from source banks");
    }
    Ok(kits)
}

/// Fail if `bank_id` is a source bank, or holds kits and `force` is not set
pub fn check_output_bank(sd_path: &Path, bank_id: &str, force: bool) -> Result<()> {
    if is_source_bank(bank_id) {
        bail!("Bank {} holds source kits and cannot be used for output", bank_id);
    }

    let existing = kit_numbers_in_bank(sd_path, bank_id)?;
    if !existing.is_empty() {
        if !force {
            bail!(
                "Output bank {} already holds {} kit(s); use --force to overwrite",
                bank_id,
                existing.len()
            );
        }
        warn!("Overwriting {} kit(s) in bank {}", existing.len(), bank_id);
    }
    Ok(())
}

/// `<sd>/BANKS/<bank>/info.md`
pub fn bank_info_path(sd_path: &Path, bank_id: &str) -> PathBuf {
    banks_dir(sd_path).join(bank_id).join("info.md")
}

/// Provenance record of a generated bank
#[derive(Debug, Clone, Default)]
pub struct BankInfo {
    /// Heading after `Bank NN - `
    pub title: String,
    /// `- **key**: value` lines under "Generation Details"
    pub details: Vec<(String, String)>,
    /// Lines under "Kit Details"; the section is omitted when empty
    pub kit_notes: Vec<String>,
}

impl BankInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn detail(mut self, key: &str, value: impl std::fmt::Display) -> Self {
        self.details.push((key.to_string(), value.to_string()));
        self
    }

    pub fn kit_note(mut self, note: impl Into<String>) -> Self {
        self.kit_notes.push(note.into());
        self
    }

    /// Markdown body, stamped with `generated`
    pub fn render(&self, bank_id: &str, generated: &str) -> String {
        let mut out = format!("# Bank {} - {}\n\n## Generation Details\n\n", bank_id, self.title);
        for (key, value) in &self.details {
            out.push_str(&format!("- **{}**: {}\n", key, value));
        }
        out.push_str(&format!("- **Generated**: {}\n\n", generated));

        if !self.kit_notes.is_empty() {
            out.push_str("## Kit Details\n\n");
            for note in &self.kit_notes {
                out.push_str(&format!("- {}\n", note));
            }
            out.push('\n');
        }

        out.push_str("## Voice Sources\n\nVoices sourced from:\n");
        for (id, range) in SOURCE_BANKS.iter() {
            out.push_str(&format!(
                "- Bank {} (kits {:02}-{:02})\n",
                id,
                range.start(),
                range.end()
            ));
        }
        out
    }
}

/// Write `info` next to the bank's `KITS` directory, stamped with local time
pub fn write_bank_info(sd_path: &Path, bank_id: &str, info: &BankInfo) -> Result<PathBuf> {
    let path = bank_info_path(sd_path, bank_id);
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    fs::write(&path, info.render(bank_id, &generated))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

/// Kit numbers removed when cleaning a source bank
///
/// Each source bank keeps only its own factory range: cleaning 01 removes
/// kits 32-63 and cleaning 02 removes kits 00-31.
pub fn clean_range(bank_id: &str) -> Option<RangeInclusive<u8>> {
    match bank_id {
        "01" => Some(32..=MAX_SLOT),
        "02" => Some(0..=31),
        _ => None,
    }
}

/// Text that must be typed back before deleting or cleaning a bank
pub fn removal_confirmation(bank_id: &str) -> String {
    if is_source_bank(bank_id) {
        format!("clean bank {}", bank_id)
    } else {
        format!("delete bank {}", bank_id)
    }
}

/// Remove a whole bank directory; source banks are refused
pub fn delete_bank(sd_path: &Path, bank_id: &str) -> Result<()> {
    if is_source_bank(bank_id) {
        bail!("Bank {} holds source kits and can only be cleaned", bank_id);
    }

    let dir = banks_dir(sd_path).join(bank_id);
    if !dir.exists() {
        debug!("Bank {} does not exist, nothing to delete", bank_id);
        return Ok(());
    }
    fs::remove_dir_all(&dir).with_context(|| format!("Failed to delete {}", dir.display()))
}

/// Remove the kits of a source bank that fall outside its factory range
///
/// Returns the number of kits removed.
pub fn clean_source_bank(sd_path: &Path, bank_id: &str) -> Result<usize> {
    let Some(range) = clean_range(bank_id) else {
        bail!("Bank {} is not a source bank and cannot be cleaned", bank_id);
    };

    let dir = kits_dir(sd_path, bank_id);
    let mut removed = 0;
    for kit in kit_numbers_in_bank(sd_path, bank_id)? {
        if !range.contains(&kit) {
            continue;
        }
        let mut hit = false;
        for ext in ["KIT", "kit"] {
            let path = dir.join(format!("{:02}.{}", kit, ext));
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to delete {}", path.display()))?;
                hit = true;
            }
        }
        if hit {
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bank_id() {
        assert_eq!(normalize_bank_id("5").unwrap(), "05");
        assert_eq!(normalize_bank_id("05").unwrap(), "05");
        assert_eq!(normalize_bank_id(" 63 ").unwrap(), "63");
        assert!(normalize_bank_id("64").is_err());
        assert!(normalize_bank_id("ab").is_err());
        assert!(normalize_bank_id("-1").is_err());
    }

    #[test]
    fn test_parse_kit_spec() {
        assert_eq!(parse_kit_spec("1:5").unwrap(), ("01".to_string(), 5));
        assert_eq!(parse_kit_spec("02:45").unwrap(), ("02".to_string(), 45));
        assert!(parse_kit_spec("0205").is_err());
        assert!(parse_kit_spec("02:64").is_err());
    }

    #[test]
    fn test_format_kit_ranges() {
        assert_eq!(format_kit_ranges(&[]), "");
        assert_eq!(format_kit_ranges(&[5]), "5");
        assert_eq!(format_kit_ranges(&[0, 1, 2, 3]), "0..3");
        assert_eq!(format_kit_ranges(&[0, 1, 2, 5, 6, 10]), "0..2, 5..6, 10");
        assert_eq!(format_kit_ranges(&[0, 2, 4, 6]), "0, 2, 4, 6");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(165), "165 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_kit_paths() {
        let sd = Path::new("/sd");
        assert_eq!(kit_filename(7), "07.KIT");
        assert_eq!(
            kit_path(sd, "10", 3),
            PathBuf::from("/sd/BANKS/10/KITS/03.KIT")
        );
        assert!(is_source_bank("01"));
        assert!(!is_source_bank("10"));
        assert_eq!(
            bank_info_path(sd, "10"),
            PathBuf::from("/sd/BANKS/10/info.md")
        );
    }

    #[test]
    fn test_clean_ranges_and_confirmation() {
        assert_eq!(clean_range("01"), Some(32..=63));
        assert_eq!(clean_range("02"), Some(0..=31));
        assert_eq!(clean_range("10"), None);
        assert_eq!(removal_confirmation("02"), "clean bank 02");
        assert_eq!(removal_confirmation("10"), "delete bank 10");
    }

    #[test]
    fn test_bank_info_render() {
        let info = BankInfo::new("Kit Variations")
            .detail("Source Kit", "01:05")
            .detail("Random Seed", 42)
            .kit_note("Kit 00: original source kit (unvaried)");
        let text = info.render("20", "2024-01-02 03:04:05");

        assert!(text.starts_with("# Bank 20 - Kit Variations\n"));
        assert!(text.contains("- **Source Kit**: 01:05\n"));
        assert!(text.contains("- **Random Seed**: 42\n"));
        assert!(text.contains("- **Generated**: 2024-01-02 03:04:05\n"));
        assert!(text.contains("## Kit Details\n\n- Kit 00: original source kit (unvaried)\n"));
        assert!(text.contains("- Bank 01 (kits 00-31)\n- Bank 02 (kits 32-63)\n"));

        let bare = BankInfo::new("Random Kits").render("10", "now");
        assert!(!bare.contains("Kit Details"));
    }
}
