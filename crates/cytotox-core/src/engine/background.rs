use super::error::AssayError;
use crate::core::models::record::WellRecord;
use crate::core::models::table::RecordTable;
use tracing::{debug, info};

/// Subtracts the absorbance read at `reference` from the one read at `signal`.
///
/// The result keeps only the `signal` rows. Background values are matched to signal
/// rows by position within their wavelength, so both reads must list the wells in the
/// same order; the sample label at every position is compared to enforce that.
///
/// # Errors
///
/// - [`AssayError::InvalidValue`] if either wavelength was not read, or both are equal.
/// - [`AssayError::ShapeMismatch`] if the two reads differ in length or well order.
pub fn subtract_wavelength(
    table: &RecordTable,
    signal: u32,
    reference: u32,
) -> Result<RecordTable, AssayError> {
    let observed = table.wavelengths();
    for (field, wavelength) in [("signal wavelength", signal), ("reference wavelength", reference)] {
        if !observed.contains(&wavelength) {
            return Err(AssayError::invalid_value(
                field,
                format!("{wavelength} nm was not read (observed: {observed:?})"),
            ));
        }
    }
    if signal == reference {
        return Err(AssayError::invalid_value(
            "reference wavelength",
            format!("must differ from the signal wavelength ({signal} nm)"),
        ));
    }

    let background: Vec<&WellRecord> = table.iter().filter(|r| r.wavelength == reference).collect();
    let signal_table = table.at_wavelength(signal);
    debug!(
        signal,
        reference,
        rows = signal_table.len(),
        "Subtracting reference wavelength."
    );
    subtract_aligned(&signal_table, &background, "reference wavelength rows")
}

/// Subtracts a separately read background plate set, row by row.
///
/// No wavelength filtering happens here: `reference` is expected to hold exactly one
/// background read per live row, in the same well order.
///
/// # Errors
///
/// Returns [`AssayError::ShapeMismatch`] if the two tables differ in length or order.
pub fn subtract_reference(
    table: &RecordTable,
    reference: &RecordTable,
) -> Result<RecordTable, AssayError> {
    let background: Vec<&WellRecord> = reference.iter().collect();
    info!(
        rows = table.len(),
        plates = reference.plates().len(),
        "Subtracting reference plate set."
    );
    subtract_aligned(table, &background, "reference plates")
}

fn subtract_aligned(
    signal: &RecordTable,
    background: &[&WellRecord],
    subject: &str,
) -> Result<RecordTable, AssayError> {
    if signal.len() != background.len() {
        return Err(AssayError::shape_mismatch(
            subject,
            format!(
                "{} background rows cannot be aligned with {} signal rows",
                background.len(),
                signal.len()
            ),
        ));
    }
    if let Some((index, (live, bg))) = signal
        .iter()
        .zip(background)
        .enumerate()
        .find(|(_, (live, bg))| live.sample != bg.sample)
    {
        return Err(AssayError::shape_mismatch(
            subject,
            format!(
                "row {index} holds '{}' but its background row holds '{}'",
                live.sample, bg.sample
            ),
        ));
    }

    let records = signal
        .iter()
        .zip(background)
        .map(|(live, bg)| WellRecord {
            absorbance: live.absorbance - bg.absorbance,
            ..live.clone()
        })
        .collect();
    Ok(signal.with_records(records))
}
