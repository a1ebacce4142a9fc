//! Compressed binary table snapshots

use crate::error::Result;
use crate::table::LoanTable;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Serialize a table to gzip-compressed JSON
pub fn encode(table: &LoanTable) -> Result<Vec<u8>> {
    let data = serde_json::to_vec(table)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&data)?;
    Ok(encoder.finish()?)
}

pub fn decode(bytes: &[u8]) -> Result<LoanTable> {
    let mut decoder = GzDecoder::new(bytes);
    let mut data = Vec::new();
    decoder.read_to_end(&mut data)?;
    Ok(serde_json::from_slice(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::LoanRow;

    #[test]
    fn test_snapshot_is_compressed() {
        let rows = (0..200)
            .map(|id| {
                let mut row = LoanRow::new(id);
                row.set("sector", "Agriculture");
                row
            })
            .collect::<Vec<_>>();
        let table = LoanTable::from_rows(rows);

        let bytes = encode(&table).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
        assert!(bytes.len() < serde_json::to_vec(&table).unwrap().len());
        assert_eq!(decode(&bytes).unwrap(), table);
    }

    #[test]
    fn test_decode_rejects_plain_json() {
        assert!(decode(b"[]").is_err());
    }
}
