use std::{fs::File, path::Path};

use medix_probe::{SummaryRow, Value};
use tracing::{Level, debug, instrument};

use crate::{error::LibraryError, table::SummaryTable};

/// Writes `table` as CSV, truncating whatever is at `path`.
///
/// The header is the union of field names in first-seen order and missing cells are left
/// empty. An empty table produces a zero-byte file: with no rows there are no field names.
#[instrument(level = Level::DEBUG, skip(table), fields(rows = table.len()), err)]
pub fn write_csv(table: &SummaryTable, path: &Path) -> Result<(), LibraryError> {
    let headers = table.headers();
    let file = File::create(path)?;

    if headers.is_empty() {
        debug!("empty table, nothing to write");
        return Ok(());
    }

    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(&headers)?;

    for row in table {
        let record = headers
            .iter()
            .map(|h| row.get(h).map(Value::to_string).unwrap_or_default());
        wtr.write_record(record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Reads a report written by [`write_csv`] back into a table. Empty cells become absent
/// fields; numbers are parsed back to integers or floats.
pub fn read_csv(path: &Path) -> Result<SummaryTable, LibraryError> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(SummaryTable::new());
    }

    let mut rdr = csv::Reader::from_reader(file);
    let headers = rdr.headers()?.clone();

    let mut table = SummaryTable::new();
    for record in rdr.records() {
        let record = record?;
        let mut row = SummaryRow::new();
        for (name, raw) in headers.iter().zip(record.iter()) {
            if !raw.is_empty() {
                row.insert(name, Value::parse(raw));
            }
        }
        table.push(row);
    }

    Ok(table)
}
