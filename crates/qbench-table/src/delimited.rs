//! `;`-delimited text tables.

use std::io::{Read, Write};

use crate::error::Result;
use crate::record::{COLUMNS, ResultRecord};

const DELIMITER: u8 = b';';

/// Read every row from a delimited table. The first line is the header.
pub fn read<R: Read>(reader: R) -> Result<Vec<ResultRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Write a header line followed by every row.
pub fn write<W: Write>(writer: W, rows: &[ResultRecord]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ResultRecord> {
        vec![
            ResultRecord::new("openssl.md5-16", "none", "aarch64", 1)
                .with_cmdline("/usr/bin/openssl speed -mr md5")
                .with_measurement("B/s", 123_456_789.25, 0),
            ResultRecord::new("parsec.canneal", "simsmall", "x86_64", 8)
                .with_cmdline("canneal 8 10000 2000 /tmp/x;y/100000.nets 32")
                .with_measurement("seconds", 3.75, -11),
        ]
    }

    #[test]
    fn test_header_and_delimiter() {
        let mut buf = Vec::new();
        write(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "bench;dataset;arch;threads;cmdline;unit;value;retval;runtime;tag"
        );
        // Embedded delimiter must be quoted, not split.
        assert!(text.contains("\"canneal 8 10000 2000 /tmp/x;y/100000.nets 32\""));
    }

    #[test]
    fn test_round_trip_field_for_field() {
        let mut rows = sample();
        rows[0].stamp("qemu", "none");
        rows[1].stamp("native", "O3");

        let mut buf = Vec::new();
        write(&mut buf, &rows).unwrap();
        let back = read(buf.as_slice()).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let mut buf = Vec::new();
        write(&mut buf, &[]).unwrap();
        assert_eq!(read(buf.as_slice()).unwrap(), Vec::new());
    }
}
