//! Building new kits out of voices from existing ones
//!
//! Voices always keep their slot: voice 2 of a source kit can only become
//! voice 2 of the new kit, except in `mix` where the caller picks freely.

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use perkons_core::{constants::VOICE_COUNT, header::build_header, Kit, KitFormat};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use tracing::debug;

/// `(kit, voice)` pairs, one per target slot
pub type VoiceSelection = [(usize, usize); VOICE_COUNT];

/// Parse `"0:0,1:2,0:1,2:3"` into a voice selection
pub fn parse_selection(spec: &str) -> Result<VoiceSelection> {
    let pairs: Vec<(usize, usize)> = spec
        .split(',')
        .map(|part| -> Result<(usize, usize)> {
            let (kit, voice) = part
                .trim()
                .split_once(':')
                .with_context(|| format!("Selection '{}' must be KIT:VOICE", part))?;
            Ok((
                kit.parse().with_context(|| format!("Bad kit index '{}'", kit))?,
                voice.parse().with_context(|| format!("Bad voice index '{}'", voice))?,
            ))
        })
        .collect::<Result<_>>()?;

    pairs
        .try_into()
        .map_err(|v: Vec<_>| anyhow::anyhow!("Must select exactly 4 voices, got {}", v.len()))
}

/// Build a kit from explicitly chosen voices
///
/// The header and format come from the first kit.
pub fn mix(kits: &[Kit], selection: &VoiceSelection) -> Result<Kit> {
    let Some(first) = kits.first() else {
        bail!("No kits to mix from");
    };

    let mut mixed = first.clone();
    for (target, &(kit_idx, voice_idx)) in selection.iter().enumerate() {
        let source = kits
            .get(kit_idx)
            .with_context(|| format!("Kit index {} out of range", kit_idx))?;
        mixed.set_voice(target, source.get_voice(voice_idx)?.clone())?;
        debug!("Slot {} <- kit {} voice {}", target, kit_idx, voice_idx);
    }

    Ok(mixed)
}

/// Header for newly generated kits of `format`
///
/// Reuses the header of the first source kit already in that format, and
/// synthesizes a default one otherwise.
pub fn select_template_header(sources: &[Kit], format: KitFormat) -> Result<Bytes> {
    if let Some(kit) = sources.iter().find(|k| k.format() == format) {
        debug!("Using {}-byte header from a {} source kit", kit.header().len(), format);
        return Ok(kit.header().clone());
    }

    debug!("No {} source kit, synthesizing header", format);
    Ok(build_header(perkons_core::constants::DEFAULT_HEADER_LEN, format)?)
}

/// A kit whose every slot comes from a randomly chosen source kit
pub fn random_kit<R: Rng + ?Sized>(
    rng: &mut R,
    sources: &[Kit],
    format: KitFormat,
    header: Bytes,
) -> Result<Kit> {
    let mut kit = Kit::new(header, format, Default::default())?;
    for slot in 0..VOICE_COUNT {
        let source = sources.choose(rng).context("No source kits")?;
        kit.set_voice(slot, source.get_voice(slot)?.clone())?;
    }
    Ok(kit)
}

/// A copy of `source` with `mutations` distinct slots replaced from `pool`
///
/// Returns the new kit and the replaced slots in ascending order.
pub fn vary<R: Rng + ?Sized>(
    rng: &mut R,
    source: &Kit,
    pool: &[Kit],
    mutations: usize,
) -> Result<(Kit, Vec<usize>)> {
    if !(1..=VOICE_COUNT).contains(&mutations) {
        bail!("Number of mutations must be between 1 and 4, got {}", mutations);
    }

    let mut variant = source.clone();
    let mut slots = index::sample(rng, VOICE_COUNT, mutations).into_vec();
    slots.sort_unstable();

    for &slot in &slots {
        let donor = pool.choose(rng).context("No kits to draw mutations from")?;
        variant.set_voice(slot, donor.get_voice(slot)?.clone())?;
    }

    Ok((variant, slots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn kit_with_tune(format: KitFormat, tune: i32) -> Kit {
        let mut kit = Kit::blank(format).unwrap();
        for slot in 0..VOICE_COUNT {
            kit.get_voice_mut(slot).unwrap().set_tune(tune + slot as i32).unwrap();
        }
        kit
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(
            parse_selection("0:0, 1:2,0:1,2:3").unwrap(),
            [(0, 0), (1, 2), (0, 1), (2, 3)]
        );
        assert!(parse_selection("0:0,1:1").is_err());
        assert!(parse_selection("0-0,1:1,2:2,3:3").is_err());
    }

    #[test]
    fn test_mix_picks_voices() {
        let kits = vec![
            kit_with_tune(KitFormat::Format1, 10),
            kit_with_tune(KitFormat::Format2, 100),
        ];
        let mixed = mix(&kits, &[(1, 3), (0, 0), (1, 0), (0, 3)]).unwrap();

        assert_eq!(mixed.format(), KitFormat::Format1);
        assert_eq!(mixed.get_voice(0).unwrap().tune(), 103);
        assert_eq!(mixed.get_voice(1).unwrap().tune(), 10);
        assert_eq!(mixed.get_voice(2).unwrap().tune(), 100);
        assert_eq!(mixed.get_voice(3).unwrap().tune(), 13);
        assert_eq!(mixed.to_buffer().unwrap().len(), 57 + 108);

        assert!(mix(&kits, &[(2, 0), (0, 0), (0, 0), (0, 0)]).is_err());
        assert!(mix(&kits, &[(0, 4), (0, 0), (0, 0), (0, 0)]).is_err());
    }

    #[test]
    fn test_template_header() {
        let sources = vec![kit_with_tune(KitFormat::Format1, 0)];
        let header = select_template_header(&sources, KitFormat::Format1).unwrap();
        assert_eq!(&header, sources[0].header());

        let synthesized = select_template_header(&sources, KitFormat::Format2).unwrap();
        assert_eq!(synthesized.len(), 57);
        assert_eq!(synthesized[0] as usize + 2, 57 + 110);
    }

    #[test]
    fn test_random_kit_keeps_slots() {
        let sources: Vec<Kit> = (0..5)
            .map(|i| kit_with_tune(KitFormat::Format1, i * 10))
            .collect();
        let header = select_template_header(&sources, KitFormat::Format2).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let kit = random_kit(&mut rng, &sources, KitFormat::Format2, header).unwrap();
        assert_eq!(kit.format(), KitFormat::Format2);
        for slot in 0..VOICE_COUNT {
            let tune = kit.get_voice(slot).unwrap().tune() as usize;
            assert_eq!(tune % 10, slot);
        }
        assert_eq!(kit.to_buffer().unwrap().len(), 57 + 110);
    }

    #[test]
    fn test_random_kit_is_reproducible() {
        let sources: Vec<Kit> = (0..8)
            .map(|i| kit_with_tune(KitFormat::Format2, i * 20))
            .collect();
        let header = select_template_header(&sources, KitFormat::Format2).unwrap();

        let a = random_kit(&mut StdRng::seed_from_u64(42), &sources, KitFormat::Format2, header.clone()).unwrap();
        let b = random_kit(&mut StdRng::seed_from_u64(42), &sources, KitFormat::Format2, header).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_vary_mutates_requested_slots() {
        let source = kit_with_tune(KitFormat::Format1, 0);
        let pool = vec![kit_with_tune(KitFormat::Format1, 200)];
        let mut rng = StdRng::seed_from_u64(1);

        for mutations in 1..=4 {
            let (variant, slots) = vary(&mut rng, &source, &pool, mutations).unwrap();
            assert_eq!(slots.len(), mutations);
            for slot in 0..VOICE_COUNT {
                let base: u8 = if slots.contains(&slot) { 200 } else { 0 };
                let expected = base + slot as u8;
                assert_eq!(variant.get_voice(slot).unwrap().tune(), expected);
            }
            assert_eq!(variant.header(), source.header());
        }

        assert!(vary(&mut rng, &source, &pool, 0).is_err());
        assert!(vary(&mut rng, &source, &pool, 5).is_err());
    }
}
