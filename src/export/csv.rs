//! CSV export implementation.
//!
//! Exports the link list of a graph in CSV format for spreadsheet use.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// CSV exporter implementation.
pub struct CsvExporter;

impl CsvExporter {
    /// Escape a field value for CSV format.
    ///
    /// Wraps the value in quotes if it contains commas, quotes, or newlines.
    fn escape_field(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}

impl Exporter for CsvExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "source,target,dependency_type,statements,in_cycle")?;

        for link in &data.links {
            writeln!(
                writer,
                "{},{},{},{},{}",
                Self::escape_field(&link.source),
                Self::escape_field(&link.target),
                Self::escape_field(&link.dependency_type.to_string()),
                link.statements,
                link.in_cycle
            )?;
        }

        Ok(())
    }
}
