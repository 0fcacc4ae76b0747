// ============================================================================
// Binary Format
// Versioned little-endian snapshot of a named number
// ============================================================================
//
// # Layout
//
// | Field             | Encoding                                   |
// |-------------------|--------------------------------------------|
// | magic             | `b"MDN2"`                                  |
// | version           | u16                                        |
// | name              | u32 byte length, then UTF-8                |
// | config            | base u32, precision i32, sign u8,          |
// |                   | cascade depth u32, fraxis u8,              |
// |                   | carryover iters u32, division iters u32    |
// | bounds            | min x, min y, max x, max y as i32          |
// | digit count       | u64                                        |
// | digits            | x i32, y i32, digit i8 per record          |
//
// Records are written in ascending (x, y) order. Bounds are stored for
// validation only; they are always recomputed from the records.
// ============================================================================

use crate::domain::{Coord, Fraxis, Mdn2dConfig, Rect, SignConvention};
use crate::engine::DigitGrid;
use crate::numeric::{Digit, MdnError, MdnResult};
use std::io::{self, Read, Write};

/// Leading bytes of every binary snapshot
pub const MAGIC: &[u8; 4] = b"MDN2";

/// Current layout version
pub const VERSION: u16 = 1;

/// Names longer than this are rejected on read
pub const MAX_NAME_LEN: u32 = 1 << 16;

/// Whether `bytes` starts like a binary snapshot
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}

// ============================================================================
// Writing
// ============================================================================

fn narrow(value: usize, field: &str) -> MdnResult<u32> {
    u32::try_from(value)
        .map_err(|_| MdnError::InvalidArgument(format!("{field} {value} does not fit the format")))
}

/// Write `grid` under `name`.
pub fn write_binary<W: Write>(writer: &mut W, name: &str, grid: &DigitGrid) -> MdnResult<()> {
    let config = grid.config();
    let name_len = narrow(name.len(), "name length")?;

    writer.write_all(MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    writer.write_all(&name_len.to_le_bytes())?;
    writer.write_all(name.as_bytes())?;

    writer.write_all(&config.base.to_le_bytes())?;
    writer.write_all(&config.precision.to_le_bytes())?;
    writer.write_all(&[config.sign_convention as u8])?;
    writer.write_all(&narrow(config.max_cascade_depth, "cascade depth")?.to_le_bytes())?;
    writer.write_all(&[config.fraxis as u8])?;
    writer.write_all(&narrow(config.max_carryover_iters, "carryover iterations")?.to_le_bytes())?;
    writer.write_all(&narrow(config.max_division_iters, "division iterations")?.to_le_bytes())?;

    let bounds = grid.bounds();
    for v in [bounds.min().x, bounds.min().y, bounds.max().x, bounds.max().y] {
        writer.write_all(&v.to_le_bytes())?;
    }

    writer.write_all(&(grid.len() as u64).to_le_bytes())?;
    for (xy, d) in grid.iter() {
        let d = i8::try_from(d)
            .map_err(|_| MdnError::InvalidState(format!("digit {d} at {xy} exceeds a byte")))?;
        writer.write_all(&xy.x.to_le_bytes())?;
        writer.write_all(&xy.y.to_le_bytes())?;
        writer.write_all(&d.to_le_bytes())?;
    }
    writer.flush()?;
    tracing::debug!(%name, digits = grid.len(), "binary snapshot written");
    Ok(())
}

// ============================================================================
// Reading
// ============================================================================

struct Decoder<'a, R: Read> {
    reader: &'a mut R,
}

impl<R: Read> Decoder<'_, R> {
    fn bytes<const N: usize>(&mut self, what: &str) -> MdnResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.reader.read_exact(&mut buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => {
                MdnError::ReadError(format!("truncated input while reading {what}"))
            },
            _ => MdnError::Io(e),
        })?;
        Ok(buf)
    }

    fn u8(&mut self, what: &str) -> MdnResult<u8> {
        Ok(self.bytes::<1>(what)?[0])
    }

    fn i8(&mut self, what: &str) -> MdnResult<i8> {
        Ok(i8::from_le_bytes(self.bytes(what)?))
    }

    fn u16(&mut self, what: &str) -> MdnResult<u16> {
        Ok(u16::from_le_bytes(self.bytes(what)?))
    }

    fn u32(&mut self, what: &str) -> MdnResult<u32> {
        Ok(u32::from_le_bytes(self.bytes(what)?))
    }

    fn i32(&mut self, what: &str) -> MdnResult<i32> {
        Ok(i32::from_le_bytes(self.bytes(what)?))
    }

    fn u64(&mut self, what: &str) -> MdnResult<u64> {
        Ok(u64::from_le_bytes(self.bytes(what)?))
    }

    fn coord(&mut self, what: &str) -> MdnResult<Coord> {
        Ok(Coord::new(self.i32(what)?, self.i32(what)?))
    }
}

fn read_config<R: Read>(dec: &mut Decoder<'_, R>) -> MdnResult<Mdn2dConfig> {
    let base = dec.u32("base")?;
    let precision = dec.i32("precision")?;
    let sign = dec.u8("sign convention")?;
    let sign_convention = SignConvention::from_u8(sign)
        .ok_or_else(|| MdnError::ReadError(format!("unknown sign convention {sign}")))?;
    let max_cascade_depth = dec.u32("cascade depth")? as usize;
    let fraxis = dec.u8("fraxis")?;
    let fraxis = Fraxis::from_u8(fraxis)
        .ok_or_else(|| MdnError::ReadError(format!("unknown fraxis {fraxis}")))?;
    let max_carryover_iters = dec.u32("carryover iterations")? as usize;
    let max_division_iters = dec.u32("division iterations")? as usize;

    let config = Mdn2dConfig {
        base,
        precision,
        sign_convention,
        fraxis,
        max_carryover_iters,
        max_cascade_depth,
        max_division_iters,
    };
    config
        .validate()
        .map_err(|e| MdnError::ReadError(format!("stored config rejected: {e}")))?;
    Ok(config)
}

/// Read a snapshot, returning the stored name and grid.
pub fn read_binary<R: Read>(reader: &mut R) -> MdnResult<(String, DigitGrid)> {
    let mut dec = Decoder { reader };

    let magic: [u8; 4] = dec.bytes("magic")?;
    if &magic != MAGIC {
        return Err(MdnError::ReadError("not a binary mdn2d snapshot".to_string()));
    }
    let version = dec.u16("version")?;
    if version != VERSION {
        return Err(MdnError::ReadError(format!("unsupported version {version}")));
    }

    let name_len = dec.u32("name length")?;
    if name_len > MAX_NAME_LEN {
        return Err(MdnError::ReadError(format!("name length {name_len} too large")));
    }
    let mut name = vec![0u8; name_len as usize];
    dec.reader.read_exact(&mut name).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => MdnError::ReadError("truncated name".to_string()),
        _ => MdnError::Io(e),
    })?;
    let name = String::from_utf8(name)
        .map_err(|e| MdnError::ReadError(format!("name is not UTF-8: {e}")))?;

    let config = read_config(&mut dec)?;
    let base = config.base;
    let stored_bounds = Rect::from_extremes(dec.coord("bounds")?, dec.coord("bounds")?);

    let count = dec.u64("digit count")?;
    let mut grid = DigitGrid::new(config)?;
    for _ in 0..count {
        let xy = dec.coord("digit coordinate")?;
        let d = dec.i8("digit")? as Digit;
        if d == 0 || d.unsigned_abs() >= base {
            return Err(MdnError::ReadError(format!(
                "digit {d} at {xy} is invalid for base {base}"
            )));
        }
        if grid.digits().contains_key(&xy) {
            return Err(MdnError::ReadError(format!("duplicate digit at {xy}")));
        }
        grid.insert_raw(xy, d);
    }
    grid.rebuild_metadata()?;

    let bounds_agree = grid.bounds() == stored_bounds
        || (!grid.has_bounds() && !stored_bounds.is_valid());
    if !bounds_agree {
        return Err(MdnError::ReadError(format!(
            "stored bounds {stored_bounds} disagree with digits {}",
            grid.bounds()
        )));
    }
    let purged = grid.purge_outside_window();
    if purged > 0 {
        tracing::warn!(purged, "snapshot digits outside the precision window dropped");
    }
    tracing::debug!(%name, digits = grid.len(), "binary snapshot read");
    Ok((name, grid))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DigitGrid {
        let config = Mdn2dConfig::hexadecimal()
            .with_fraxis(Fraxis::Y)
            .with_max_cascade_depth(3);
        let mut g = DigitGrid::new(config).unwrap();
        g.set_value(Coord::new(-3, 2), 15).unwrap();
        g.set_value(Coord::new(0, 0), -7).unwrap();
        g.set_value(Coord::new(4, -1), 1).unwrap();
        g
    }

    fn encode(name: &str, grid: &DigitGrid) -> Vec<u8> {
        let mut out = Vec::new();
        write_binary(&mut out, name, grid).unwrap();
        out
    }

    #[test]
    fn test_round_trip() {
        let g = sample();
        let bytes = encode("hex", &g);
        assert!(is_binary(&bytes));
        // header 4 + 2, name 4 + 3, config 22, bounds 16, count 8, 3 records of 9
        assert_eq!(bytes.len(), 6 + 7 + 22 + 16 + 8 + 27);

        let (name, back) = read_binary(&mut bytes.as_slice()).unwrap();
        assert_eq!(name, "hex");
        assert_eq!(back.config(), g.config());
        assert_eq!(back.digits(), g.digits());
        assert_eq!(back.bounds(), g.bounds());
        back.validate_metadata().unwrap();
    }

    #[test]
    fn test_empty_round_trip() {
        let g = DigitGrid::default();
        let bytes = encode("", &g);
        let (name, back) = read_binary(&mut bytes.as_slice()).unwrap();
        assert!(name.is_empty());
        assert!(back.is_empty());
        assert!(!back.has_bounds());
    }

    #[test]
    fn test_bad_magic_and_version() {
        let mut bytes = encode("n", &sample());
        bytes[0] = b'X';
        assert!(matches!(
            read_binary(&mut bytes.as_slice()),
            Err(MdnError::ReadError(_))
        ));

        let mut bytes = encode("n", &sample());
        bytes[4] = 9;
        assert!(matches!(
            read_binary(&mut bytes.as_slice()),
            Err(MdnError::ReadError(_))
        ));
    }

    #[test]
    fn test_truncated_input() {
        let bytes = encode("n", &sample());
        for cut in [3, 10, 30, bytes.len() - 1] {
            assert!(
                matches!(read_binary(&mut &bytes[..cut]), Err(MdnError::ReadError(_))),
                "cut at {cut}"
            );
        }
    }

    #[test]
    fn test_invalid_records() {
        let g = sample();
        let bytes = encode("n", &g);
        let last = bytes.len() - 1;

        let mut zero = bytes.clone();
        zero[last] = 0;
        assert!(matches!(
            read_binary(&mut zero.as_slice()),
            Err(MdnError::ReadError(_))
        ));

        let mut too_big = bytes.clone();
        too_big[last] = 16;
        assert!(matches!(
            read_binary(&mut too_big.as_slice()),
            Err(MdnError::ReadError(_))
        ));

        // base field of the config follows magic, version and the name
        let mut bad_base = bytes;
        bad_base[6 + 4 + 1] = 1;
        assert!(matches!(
            read_binary(&mut bad_base.as_slice()),
            Err(MdnError::ReadError(_))
        ));
    }
}
