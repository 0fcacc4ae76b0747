// ============================================================================
// I/O Module
// Saving and loading numbers as text or binary snapshots
// ============================================================================
//
// This module provides:
// - text: pretty and utility renderings with a config header, sniffed on read
// - binary: versioned little-endian snapshots carrying name and config
//
// Both formats restore the config they were saved with. Headerless text
// keeps the target's config, or the default for a new number.

pub mod binary;
pub mod text;

pub use text::{TextFormat, TextOptions};

use crate::engine::{new_instance, Mdn2d};
use crate::interfaces::Framework;
use crate::numeric::{MdnError, MdnResult};
use std::io::{Read, Write};
use std::sync::Arc;

/// On-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Pretty,
    Utility,
    Binary,
}

impl From<TextFormat> for Format {
    fn from(format: TextFormat) -> Self {
        match format {
            TextFormat::Pretty => Format::Pretty,
            TextFormat::Utility => Format::Utility,
        }
    }
}

/// Write `source` to `writer`. `options` only affect text formats.
pub fn save<W: Write>(
    source: &Mdn2d,
    writer: &mut W,
    format: Format,
    options: &TextOptions,
) -> MdnResult<()> {
    let state = source.snapshot_state();
    match format {
        Format::Binary => binary::write_binary(writer, &state.name, &state.grid),
        Format::Pretty | Format::Utility => {
            options.validate()?;
            let text_format = if format == Format::Pretty {
                TextFormat::Pretty
            } else {
                TextFormat::Utility
            };
            writer.write_all(text::render(&state.grid, text_format, options).as_bytes())?;
            writer.flush()?;
            Ok(())
        },
    }
}

/// Guess the format of a buffered input.
pub fn detect_format(bytes: &[u8]) -> Option<Format> {
    if binary::is_binary(bytes) {
        return Some(Format::Binary);
    }
    let text = std::str::from_utf8(bytes).ok()?;
    text::detect_text_format(text).map(Format::from)
}

fn as_text(bytes: &[u8]) -> MdnResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| MdnError::ReadError(format!("input is not UTF-8: {e}")))
}

/// Create a number from `reader`.
///
/// Binary snapshots restore name and config; the framework may still
/// adjust the name. Text restores the config from its header, or gets the
/// default config when there is none.
pub fn load<R: Read>(reader: &mut R, framework: Arc<dyn Framework>) -> MdnResult<Mdn2d> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    if binary::is_binary(&bytes) {
        let (name, grid) = binary::read_binary(&mut bytes.as_slice())?;
        let name = framework.suggest_name(&name);
        return Ok(Mdn2d::from_parts(name, grid, framework));
    }
    let doc = text::parse_document(as_text(&bytes)?)?;
    let mdn = new_instance(doc.config.clone().unwrap_or_default(), None, framework)?;
    mdn.mutate(|grid| text::load_digits(grid, doc.digits))?;
    Ok(mdn)
}

/// Replace the content of an existing number with what `reader` holds.
///
/// A binary snapshot also replaces the config and requests its stored name.
/// Text replaces the config only when its header carries one.
pub fn load_into<R: Read>(target: &Mdn2d, reader: &mut R) -> MdnResult<()> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    if binary::is_binary(&bytes) {
        let (name, grid) = binary::read_binary(&mut bytes.as_slice())?;
        target.mutate(|current| {
            *current = grid;
            current.touch();
            Ok(())
        })?;
        if !name.is_empty() && name != target.name() {
            target.set_name(&name);
        }
        return Ok(());
    }
    text::read_text(target, as_text(&bytes)?)
}
