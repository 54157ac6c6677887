use crate::aggregate::participant_summary;
use crate::dashboard::Dataset;
use crate::util::format_int;
use tabled::{settings::Style, Table, Tabled};

/// Render up to `max_rows` rows as a Markdown table.
pub fn table_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

/// Print the per-participant ATM table shown once at startup.
pub fn print_startup_summary(dataset: &Dataset, max_rows: usize) {
    let rows = participant_summary(&dataset.records);
    println!(
        "ATMs per participant ({} records from {} files, {} participants)\n",
        format_int(dataset.records.len()),
        format_int(dataset.source_files),
        format_int(rows.len())
    );
    println!("{}\n", table_rows(&rows, max_rows));
}
