//! Output: CSV export and operator-facing reports

mod csv_writer;
mod report;

pub use csv_writer::write_csv;
pub use report::{print_checkpoint_summary, print_report};
