use crate::core::models::record::{PlateId, WellRecord};
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// A plate as read from one file: its wells in file order plus header information.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateReading {
    pub experiment_name: Option<String>,
    pub records: Vec<WellRecord>,
}

/// Defines the interface for reading plate-reader export formats.
///
/// Implementors parse one file into the wells of one plate. Plate numbering across
/// several files is left to the caller.
pub trait PlateFile {
    /// The error type for read operations.
    type Error: Error + From<io::Error>;

    /// Reads one plate from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    /// * `plate` - Identifier stamped on every record of this plate.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(&self, reader: &mut impl BufRead, plate: PlateId)
    -> Result<PlateReading, Self::Error>;

    /// Reads one plate from a file path.
    fn read_from_path<P: AsRef<Path>>(
        &self,
        path: P,
        plate: PlateId,
    ) -> Result<PlateReading, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        self.read_from(&mut reader, plate)
    }
}
