use anyhow::{Context, Result};
use colored::*;
use perkons_core::{header::HeaderInfo, Control, Kit, KitFormat};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Serialize)]
pub struct VoiceReport {
    pub index: usize,
    pub len: usize,
    pub raw_hex: String,
    pub controls: BTreeMap<Control, u8>,
    pub out_of_range: Vec<Control>,
    pub extra_params: Option<String>,
    pub sampler_params: Option<String>,
}

#[derive(Serialize)]
pub struct KitReport {
    pub path: String,
    pub format: KitFormat,
    pub has_sampler: bool,
    pub total_len: usize,
    pub header_len: usize,
    pub header_hex: String,
    pub header_consistent: bool,
    pub voices: Vec<VoiceReport>,
}

impl KitReport {
    pub fn new(path: &str, kit: &Kit) -> Self {
        let voices = kit
            .voices()
            .iter()
            .enumerate()
            .map(|(index, voice)| VoiceReport {
                index,
                len: voice.len(),
                raw_hex: hex::encode(voice.as_bytes()),
                controls: voice.controls().collect(),
                out_of_range: voice
                    .controls()
                    .filter(|(c, v)| c.validate(*v as i32).is_err())
                    .map(|(c, _)| c)
                    .collect(),
                extra_params: voice.extra_params().map(hex::encode),
                sampler_params: voice.sampler_params().map(hex::encode),
            })
            .collect();

        Self {
            path: path.to_string(),
            format: kit.format(),
            has_sampler: kit.format().has_sampler(),
            total_len: kit.encoded_len(),
            header_len: kit.header().len(),
            header_hex: hex::encode(kit.header()),
            header_consistent: HeaderInfo::parse(kit.header())
                .is_some_and(|info| info.is_consistent(kit.format())),
            voices,
        }
    }
}

pub fn execute(input: &str, json: bool) -> Result<()> {
    info!("Inspecting kit: {}", input);

    let kit = Kit::load_file(input).with_context(|| format!("Failed to load kit: {}", input))?;
    let report = KitReport::new(input, &kit);

    if json {
        let out = serde_json::to_string_pretty(&report)
            .with_context(|| "Failed to serialize kit report")?;
        println!("{}", out);
        return Ok(());
    }

    println!("\n=== Kit {} ===", input);
    println!("Format:        {}", report.format);
    println!(
        "Sampler:       {}",
        if report.has_sampler { "yes" } else { "no" }
    );
    println!("Total size:    {} bytes", report.total_len);
    println!("Header:        {} bytes", report.header_len);
    println!("Header bytes:  {}", report.header_hex);
    if !report.header_consistent {
        println!("{} Header size fields disagree with the file layout", "!".yellow());
    }

    for voice in &report.voices {
        println!("\n--- Voice {} ({} bytes) ---", voice.index + 1, voice.len);
        println!("  raw      {}", voice.raw_hex);
        for control in Control::all() {
            let value = voice.controls[&control];
            if voice.out_of_range.contains(&control) {
                println!("  {:<8} {}", control.name(), value.to_string().red());
            } else {
                println!("  {:<8} {}", control.name(), value);
            }
        }
        if let Some(extra) = &voice.extra_params {
            println!("  extra    {}", extra);
        }
        if let Some(sampler) = &voice.sampler_params {
            println!("  sampler  {}", sampler);
        }
    }

    Ok(())
}
