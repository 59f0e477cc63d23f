//! Binary table format.
//!
//! Layout:
//!
//! ```text
//! "QBT\0" | version: u32 | rows: u64 | zstd( row* )
//! row = bench dataset arch threads:u32 cmdline unit value:f64 retval:i32 runtime tag
//! ```
//!
//! Strings are a `u32` byte length followed by UTF-8. All integers are
//! little-endian. The header is left uncompressed so a table can be
//! identified without decoding it.

use std::io::{Read, Write};

use crate::error::{Result, TableError};
use crate::record::ResultRecord;

const MAGIC: &[u8; 4] = b"QBT\0";
const VERSION: u32 = 1;
const ZSTD_LEVEL: i32 = 3;

/// Write `rows` as a binary table.
pub fn write<W: Write>(mut writer: W, rows: &[ResultRecord]) -> Result<()> {
    writer.write_all(MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    writer.write_all(&(rows.len() as u64).to_le_bytes())?;

    let mut encoder = zstd::stream::Encoder::new(&mut writer, ZSTD_LEVEL)?;
    for row in rows {
        write_str(&mut encoder, &row.bench)?;
        write_str(&mut encoder, &row.dataset)?;
        write_str(&mut encoder, &row.arch)?;
        encoder.write_all(&row.threads.to_le_bytes())?;
        write_str(&mut encoder, &row.cmdline)?;
        write_str(&mut encoder, &row.unit)?;
        encoder.write_all(&row.value.to_bits().to_le_bytes())?;
        encoder.write_all(&row.retval.to_le_bytes())?;
        write_str(&mut encoder, &row.runtime)?;
        write_str(&mut encoder, &row.tag)?;
    }
    encoder.finish()?;
    writer.flush()?;
    Ok(())
}

/// Read a binary table.
pub fn read<R: Read>(mut reader: R) -> Result<Vec<ResultRecord>> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(TableError::InvalidMagic);
    }

    let version = u32::from_le_bytes(read_array(&mut reader)?);
    if version != VERSION {
        return Err(TableError::UnsupportedVersion(version));
    }

    let count = u64::from_le_bytes(read_array(&mut reader)?);
    let count = usize::try_from(count)
        .map_err(|_| TableError::Corrupt(format!("row count {count} out of range")))?;

    let mut decoder = zstd::stream::Decoder::new(reader)?;
    let mut rows = Vec::with_capacity(count.min(1 << 16));
    for index in 0..count {
        let row = read_row(&mut decoder)
            .map_err(|e| TableError::Corrupt(format!("row {index}: {e}")))?;
        rows.push(row);
    }
    Ok(rows)
}

fn read_row<R: Read>(r: &mut R) -> Result<ResultRecord> {
    Ok(ResultRecord {
        bench: read_str(r)?,
        dataset: read_str(r)?,
        arch: read_str(r)?,
        threads: u32::from_le_bytes(read_array(r)?),
        cmdline: read_str(r)?,
        unit: read_str(r)?,
        value: f64::from_bits(u64::from_le_bytes(read_array(r)?)),
        retval: i32::from_le_bytes(read_array(r)?),
        runtime: read_str(r)?,
        tag: read_str(r)?,
    })
}

fn write_str<W: Write>(w: &mut W, s: &str) -> Result<()> {
    let len = u32::try_from(s.len())
        .map_err(|_| TableError::Corrupt(format!("field of {} bytes too long", s.len())))?;
    w.write_all(&len.to_le_bytes())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn read_str<R: Read>(r: &mut R) -> Result<String> {
    let len = u64::from(u32::from_le_bytes(read_array(r)?));
    // The length is untrusted; only allocate for bytes actually present.
    let mut buf = Vec::new();
    let read = r.by_ref().take(len).read_to_end(&mut buf)?;
    if read as u64 != len {
        return Err(TableError::Corrupt(format!(
            "field declares {len} bytes, only {read} present"
        )));
    }
    String::from_utf8(buf).map_err(|e| TableError::Corrupt(e.to_string()))
}

fn read_array<R: Read, const N: usize>(r: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(bench: &str, value: f64) -> ResultRecord {
        let mut r = ResultRecord::new(bench, "native", "x86_64", 16)
            .with_cmdline("bin --flag")
            .with_measurement("seconds", value, 1);
        r.stamp("native", "none");
        r
    }

    #[test]
    fn test_round_trip() {
        let rows = vec![row("parsec.dedup", 0.1), row("phoenix.pca", f64::MAX)];
        let mut buf = Vec::new();
        write(&mut buf, &rows).unwrap();
        assert_eq!(&buf[..4], MAGIC);
        assert_eq!(read(buf.as_slice()).unwrap(), rows);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let err = read(&b"PK\x03\x04rest"[..]).unwrap_err();
        assert!(matches!(err, TableError::InvalidMagic));
    }

    #[test]
    fn test_rejects_future_version() {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&7u32.to_le_bytes());
        buf.extend_from_slice(&0u64.to_le_bytes());
        let err = read(buf.as_slice()).unwrap_err();
        assert!(matches!(err, TableError::UnsupportedVersion(7)));
    }

    #[test]
    fn test_oversized_field_length_is_corrupt() {
        let mut field = u32::MAX.to_le_bytes().to_vec();
        field.extend_from_slice(b"abc");
        let err = read_str(&mut field.as_slice()).unwrap_err();
        assert!(matches!(err, TableError::Corrupt(msg) if msg.contains("only 3 present")));
    }

    #[test]
    fn test_truncated_body_is_corrupt() {
        let mut buf = Vec::new();
        write(&mut buf, &[row("db.sqlite", 2.0)]).unwrap();
        // Claim two rows while only one is encoded.
        buf[8..16].copy_from_slice(&2u64.to_le_bytes());
        let err = read(buf.as_slice()).unwrap_err();
        assert!(matches!(err, TableError::Corrupt(_)));
    }
}
