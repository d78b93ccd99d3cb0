//! Binary descriptor container parser.
//!
//! Descriptors use a proprietary container: a fixed 32-byte header with four
//! big-endian u32 fields (total size, payload-block size, relocation-entry
//! count, root-node count), followed by the payload block, the relocation
//! table, the root-node table, and a NUL-terminated string table. The parser
//! never interprets the payload; the root symbols alone identify the
//! character, color variant, and role.
//!
//! Every derived offset is bounds-checked against the buffer; a violation is
//! a [`CostumierError::MalformedDescriptor`] fatal for that one descriptor
//! only.

use memchr::memchr;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::conventions::Conventions;
use crate::core::descriptor::DescriptorRecord;
use crate::core::stage::StageRecord;
use crate::error::{CostumierError, Result};
use crate::text;

/// Fixed container header size in bytes.
pub const HEADER_SIZE: usize = 32;

/// Byte width of one relocation-table entry.
const RELOC_ENTRY: usize = 4;
/// Byte width of one root-node entry (u32 data offset, u32 string offset).
const ROOT_ENTRY: usize = 8;

fn be32(bytes: &[u8], off: usize) -> u32 {
    u32::from_be_bytes([bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3]])
}

/// Root symbols of a descriptor container, in root-node order.
pub fn symbols(bytes: &[u8]) -> Result<Vec<String>> {
    if bytes.len() < HEADER_SIZE {
        return Err(CostumierError::malformed(
            0,
            format!(
                "buffer of {} bytes is smaller than the {HEADER_SIZE}-byte header",
                bytes.len()
            ),
        ));
    }

    let payload_size = be32(bytes, 4) as usize;
    let reloc_count = be32(bytes, 8) as usize;
    let root_count = be32(bytes, 12) as usize;

    let payload_end = HEADER_SIZE
        .checked_add(payload_size)
        .ok_or_else(|| CostumierError::malformed(4, "payload size overflows"))?;
    let reloc_end = reloc_count
        .checked_mul(RELOC_ENTRY)
        .and_then(|n| payload_end.checked_add(n))
        .ok_or_else(|| CostumierError::malformed(8, "relocation count overflows"))?;
    let roots_end = root_count
        .checked_mul(ROOT_ENTRY)
        .and_then(|n| reloc_end.checked_add(n))
        .ok_or_else(|| CostumierError::malformed(12, "root-node count overflows"))?;
    if roots_end > bytes.len() {
        return Err(CostumierError::malformed(
            reloc_end,
            format!(
                "root-node table ends at {roots_end} but buffer holds {} bytes",
                bytes.len()
            ),
        ));
    }

    // String table starts immediately after the root-node table.
    let strings_start = roots_end;
    let mut out = Vec::with_capacity(root_count);
    for i in 0..root_count {
        let entry = reloc_end + i * ROOT_ENTRY;
        let str_off = be32(bytes, entry + 4) as usize;
        let sym_start = strings_start
            .checked_add(str_off)
            .filter(|&s| s < bytes.len())
            .ok_or_else(|| {
                CostumierError::malformed(
                    entry + 4,
                    format!("string offset {str_off} runs past the buffer"),
                )
            })?;
        let nul = memchr(0, &bytes[sym_start..]).ok_or_else(|| {
            CostumierError::malformed(sym_start, "unterminated symbol in string table")
        })?;
        out.push(String::from_utf8_lossy(&bytes[sym_start..sym_start + nul]).into_owned());
    }
    Ok(out)
}

/// Parse one costume descriptor blob into a [`DescriptorRecord`].
pub fn parse_descriptor(
    identity: &str,
    bytes: &[u8],
    conv: &Conventions,
) -> Result<DescriptorRecord> {
    let syms = symbols(bytes)?;
    trace!(identity, symbols = syms.len(), "descriptor container walked");

    // First symbol naming a character wins, in root-node order. The role is
    // independent of which character matched: any playable-family symbol
    // marks a playable costume.
    let character = syms
        .iter()
        .find_map(|s| conv.character_for_symbol(s))
        .map(|(name, _)| name.to_string());
    let is_playable_costume = syms.iter().any(|s| conv.is_playable_symbol(s));
    let is_secondary_unit = character
        .as_deref()
        .map(|c| conv.is_secondary_unit(c))
        .unwrap_or(false);

    let color = detect_color(identity, &syms, conv);

    let canonical_code = character.as_deref().and_then(|ch| {
        let char_code = conv.code_for_character(ch)?;
        let color_code = conv.code_for_color(color.as_str())?;
        Some(format!("{char_code}{color_code}"))
    });

    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let content_hash = hex::encode(hasher.finalize());

    let record = DescriptorRecord {
        identity: identity.to_string(),
        character,
        color: Some(color),
        canonical_code,
        content_hash,
        is_playable_costume,
        is_secondary_unit,
    };
    debug!(%record, playable = record.is_playable_costume, "descriptor parsed");
    Ok(record)
}

/// Color detection: a compound code inside any symbol, then a color code as
/// a separated filename token, then the explicit Unknown sentinel.
fn detect_color(identity: &str, syms: &[String], conv: &Conventions) -> String {
    for sym in syms {
        if let Some((_, color)) = conv.compound_code_in(sym) {
            return color.to_string();
        }
    }
    for token in text::tokens(&text::stem(identity)) {
        for (code, name) in &conv.color_codes {
            if code.eq_ignore_ascii_case(&token) {
                return name.clone();
            }
        }
    }
    conv.unknown_color.clone()
}

/// Parse one stage descriptor blob into a [`StageRecord`].
///
/// The code is taken from the first table code prefixing any symbol, else
/// from the filename stem.
pub fn parse_stage(identity: &str, bytes: &[u8], conv: &Conventions) -> Result<StageRecord> {
    let syms = symbols(bytes)?;

    let mut code = syms.iter().find_map(|s| {
        conv.stage_codes
            .iter()
            .find(|(c, _)| s.starts_with(c.as_str()))
            .map(|(c, _)| c.clone())
    });
    if code.is_none() {
        let stem = text::stem(identity);
        code = conv
            .stage_codes
            .iter()
            .find(|(c, _)| stem.starts_with(&c.to_ascii_lowercase()))
            .map(|(c, _)| c.clone());
    }
    let stage_name = code
        .as_deref()
        .and_then(|c| conv.stage_for_code(c))
        .map(str::to_string);

    Ok(StageRecord {
        identity: identity.to_string(),
        code,
        stage_name,
    })
}
