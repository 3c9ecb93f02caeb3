use super::schema::PlateSchema;
use crate::core::models::table::RecordTable;
use crate::engine::reshape::WideTable;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const CONCENTRATION_HEADER: &str = "Concentration";

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Writes a wide table for curve-fitting software.
///
/// Two header rows precede the data: the sample name above each block, then
/// `Concentration` and the replicate numbers `1..R` under it. Every following row is one
/// dilution step.
pub fn write_wide_csv<W: Write>(table: &WideTable, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    let mut labels = Vec::with_capacity(table.width());
    let mut columns = Vec::with_capacity(table.width());
    for block in table.blocks() {
        labels.push(block.sample.clone());
        labels.extend(std::iter::repeat_n(String::new(), block.replicates()));
        columns.push(CONCENTRATION_HEADER.to_string());
        columns.extend((1..=block.replicates()).map(|r| r.to_string()));
    }
    csv_writer.write_record(&labels)?;
    csv_writer.write_record(&columns)?;

    for row in table.rows() {
        csv_writer.write_record(row.into_iter().map(cell))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_wide_csv_to_path<P: AsRef<Path>>(table: &WideTable, path: P) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    write_wide_csv(table, BufWriter::new(file))
}

/// Writes the long table, one row per well, with the derived columns left empty
/// where they are unset.
pub fn write_records_csv<W: Write>(
    table: &RecordTable,
    schema: &PlateSchema,
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "plate",
        schema.role_column.as_str(),
        schema.sample_column.as_str(),
        schema.wavelength_column.as_str(),
        schema.absorbance_column.as_str(),
        "concentration",
        "normalized",
    ])?;
    for record in table.iter() {
        csv_writer.write_record([
            record.plate.0.to_string(),
            record.role.to_string(),
            record.sample.clone(),
            record.wavelength.to_string(),
            record.absorbance.to_string(),
            cell(record.concentration),
            cell(record.normalized_absorbance),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_records_csv_to_path<P: AsRef<Path>>(
    table: &RecordTable,
    schema: &PlateSchema,
    path: P,
) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    write_records_csv(table, schema, BufWriter::new(file))
}
