use super::load_plates;
use crate::cli::InspectArgs;
use crate::config::builder::build_inspect_schema;
use crate::error::Result;
use cytotox::core::models::record::SampleRole;
use cytotox::core::models::table::RecordTable;
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    let schema = build_inspect_schema(&args)?;
    let table = load_plates(&args.input, &schema)?;
    info!("Loaded {} well(s) for inspection.", table.len());
    print!("{}", summarize(&table));
    Ok(())
}

fn join_or_dash<T: ToString>(items: &[T]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn summarize(table: &RecordTable) -> String {
    let blanks = table.iter().filter(|r| r.role == SampleRole::Blank).count();
    let live = table.without_roles(&[SampleRole::Blank]);
    let experiments: Vec<&str> = table
        .experiment_names()
        .iter()
        .map(|name| name.as_deref().unwrap_or("(untitled)"))
        .collect();
    let mut out = String::new();
    out.push_str(&format!("Experiments: {}\n", join_or_dash(&experiments)));
    out.push_str(&format!(
        "Wells: {} ({} blank)\n",
        table.len(),
        blanks
    ));
    out.push_str(&format!("Plates: {}\n", join_or_dash(&table.plates())));
    out.push_str(&format!(
        "Wavelengths (nm): {}\n",
        join_or_dash(&table.wavelengths())
    ));
    out.push_str(&format!("Drugs: {}\n", join_or_dash(&live.drugs(false))));
    out.push_str(&format!("Controls: {}\n", join_or_dash(&live.controls())));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::PLATE;
    use cytotox::core::io::schema::PlateSchema;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn summary_lists_plates_samples_and_wavelengths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plate.csv");
        fs::write(&path, PLATE).unwrap();
        let table = load_plates(&[path], &PlateSchema::default()).unwrap();

        let summary = summarize(&table);
        assert_eq!(
            summary,
            "Experiments: HEK 18.12.20 MTS\n\
             Wells: 9 (1 blank)\n\
             Plates: Plate 1\n\
             Wavelengths (nm): 490\n\
             Drugs: Drug\n\
             Controls: DMSO\n"
        );
    }

    #[test]
    fn untitled_plates_are_listed_in_plate_order() {
        use cytotox::core::models::record::{PlateId, WellRecord};

        let mut table = RecordTable::new();
        table.append_plate(
            vec![WellRecord::new("DMSO", SampleRole::Control, 490, 1.0, PlateId(1))],
            None,
        );
        table.append_plate(
            vec![WellRecord::new("DMSO", SampleRole::Control, 490, 1.0, PlateId(2))],
            Some("Day 2".to_string()),
        );
        let summary = summarize(&table);
        assert!(summary.starts_with("Experiments: (untitled), Day 2\n"));
    }

    #[test]
    fn empty_lists_render_as_a_dash() {
        assert_eq!(join_or_dash::<u32>(&[]), "-");
        assert_eq!(join_or_dash(&[490u32, 700]), "490, 700");
    }
}
