pub mod inspect;
pub mod process;

use crate::error::{CliError, Result};
use cytotox::core::io::plate_csv::PlateCsvFile;
use cytotox::core::io::schema::PlateSchema;
use cytotox::core::io::traits::PlateFile;
use cytotox::core::models::record::PlateId;
use cytotox::core::models::table::RecordTable;
use std::path::PathBuf;
use tracing::info;

/// Reads the plate files in order, numbering plates from 1.
fn load_plates(paths: &[PathBuf], schema: &PlateSchema) -> Result<RecordTable> {
    let reader = PlateCsvFile::new(schema.clone());
    let mut table = RecordTable::new();
    for (index, path) in paths.iter().enumerate() {
        let plate = PlateId(index + 1);
        let reading = reader
            .read_from_path(path, plate)
            .map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            })?;
        info!(
            "Read {} wells for {} from {:?}",
            reading.records.len(),
            plate,
            path
        );
        table.append_plate(reading.records, reading.experiment_name);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    pub(crate) const PLATE: &str = "\
HEK 18.12.20 MTS,,,
,,,
Тип,Образец,Длина волны,Погл.
Образец,Drug_1,490,1
Образец,Drug_1,490,1
Образец,Drug_1,490,3
Образец,Drug_1,490,3
Контр. образец,DMSO,490,2
Контр. образец,DMSO,490,2
Контр. образец,DMSO,490,2
Контр. образец,DMSO,490,2
blank,blank,490,0.05
";

    #[test]
    fn plates_are_numbered_in_file_order() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        fs::write(&first, PLATE).unwrap();
        fs::write(&second, PLATE.replacen("HEK 18.12.20 MTS", "Second", 1)).unwrap();

        let table = load_plates(&[first, second], &PlateSchema::default()).unwrap();
        assert_eq!(table.len(), 18);
        assert_eq!(table.plates(), vec![PlateId(1), PlateId(2)]);
        assert_eq!(
            table.experiment_names(),
            [Some("HEK 18.12.20 MTS".to_string()), Some("Second".to_string())]
        );
        assert_eq!(table.records()[9].plate.to_string(), "Plate 2");
    }

    #[test]
    fn parse_failures_name_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.csv");
        fs::write(&path, "title\n\nТип,Образец\n").unwrap();

        let err = load_plates(&[path.clone()], &PlateSchema::default()).unwrap_err();
        match err {
            CliError::FileParsing { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
