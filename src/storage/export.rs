//! CSV export of a loan table

use crate::error::Result;
use crate::table::columns;
use crate::table::LoanTable;
use serde_json::Value;
use std::io::Write;

/// Write the table as CSV: `id` first, then the union of all columns in
/// name order. Nulls and missing cells are empty; nested values are JSON.
pub fn write_csv<W: Write>(table: &LoanTable, writer: W) -> Result<()> {
    let names = table.column_names();
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(names.len() + 1);
    header.push(columns::ID.to_string());
    header.extend(names.iter().cloned());
    csv.write_record(&header)?;

    for row in table.iter() {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.id.to_string());
        for name in &names {
            record.push(cell(row.get(name)));
        }
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
