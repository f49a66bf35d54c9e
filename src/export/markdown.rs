//! Markdown export implementation.
//!
//! Exports graph analysis results in Markdown format for documentation and reporting.

use super::{ExportData, Exporter};
use crate::analysis::CycleEnumeration;
use std::io::{self, Write};

/// Number of rows in the "most depended upon" table.
const TOP_FILES: usize = 10;

/// Markdown exporter implementation.
pub struct MarkdownExporter;

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        let metrics = &data.metrics;

        // Title
        writeln!(writer, "# Dependency Graph Report")?;
        writeln!(writer)?;
        writeln!(writer, "**Graph:** {}", data.graph_name)?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Value |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Files | {} |", metrics.node_count)?;
        writeln!(writer, "| Links | {} |", metrics.edge_count)?;
        writeln!(writer, "| Density | {:.4} |", metrics.density)?;
        writeln!(
            writer,
            "| Acyclic | {} |",
            if metrics.is_dag { "yes" } else { "no" }
        )?;
        writeln!(writer, "| Circular Dependencies | {} |", metrics.cycle_count)?;
        writeln!(writer, "| Self-loops | {} |", metrics.self_loop_count)?;
        writeln!(
            writer,
            "| Weakly Connected Components | {} |",
            metrics.weakly_connected_components
        )?;
        writeln!(writer, "| Layers | {} |", data.layers.len())?;
        writeln!(writer)?;

        // Breakdowns
        if !metrics.edges_by_type.is_empty() {
            writeln!(writer, "## Links by Type")?;
            writeln!(writer)?;
            writeln!(writer, "| Type | Links |")?;
            writeln!(writer, "|------|-------|")?;
            for (dependency_type, count) in &metrics.edges_by_type {
                writeln!(writer, "| {} | {} |", dependency_type, count)?;
            }
            writeln!(writer)?;
        }

        if !metrics.nodes_by_language.is_empty() {
            writeln!(writer, "## Files by Language")?;
            writeln!(writer)?;
            writeln!(writer, "| Language | Files |")?;
            writeln!(writer, "|----------|-------|")?;
            for (language, count) in &metrics.nodes_by_language {
                writeln!(writer, "| {} | {} |", language, count)?;
            }
            writeln!(writer)?;
        }

        let hubs = metrics.most_depended_upon(TOP_FILES);
        if !hubs.is_empty() {
            writeln!(writer, "## Most Depended Upon")?;
            writeln!(writer)?;
            writeln!(writer, "| File | Dependents | Dependencies |")?;
            writeln!(writer, "|------|------------|--------------|")?;
            for (id, degree) in hubs {
                writeln!(
                    writer,
                    "| {} | {} | {} |",
                    id, degree.in_degree, degree.out_degree
                )?;
            }
            writeln!(writer)?;
        }

        // Issues section
        if !data.cycles.is_empty() {
            writeln!(writer, "## Issues")?;
            writeln!(writer)?;
        }

        if !data.cycles.components.is_empty() {
            writeln!(writer, "### Circular Dependencies")?;
            writeln!(writer)?;
            writeln!(
                writer,
                "The following circular dependencies were detected:"
            )?;
            writeln!(writer)?;
            for (i, cycle) in data.cycles.components.iter().enumerate() {
                let detail = match &cycle.enumeration {
                    CycleEnumeration::Complete { cycles } => {
                        format!("{} files, {} cycles", cycle.len(), cycles.len())
                    }
                    CycleEnumeration::CapExceeded { cap, .. } => {
                        format!("{} files, more than {} cycles", cycle.len(), cap)
                    }
                };
                writeln!(writer, "{}. `{}` ({})", i + 1, cycle.cycle_path(), detail)?;
            }
            writeln!(writer)?;
        }

        if !data.cycles.self_loops.is_empty() {
            writeln!(writer, "### Self-referencing Files")?;
            writeln!(writer)?;
            for id in &data.cycles.self_loops {
                writeln!(writer, "- `{}`", id)?;
            }
            writeln!(writer)?;
        }

        // Layers
        if !data.layers.is_empty() {
            writeln!(writer, "## Layers")?;
            writeln!(writer)?;
            for (level, layer) in data.layers.iter().enumerate() {
                writeln!(writer, "{}. {}", level, layer.join(", "))?;
            }
            writeln!(writer)?;
        }

        // Footer
        writeln!(writer, "---")?;
        writeln!(writer, "*Generated by codegraph*")?;

        Ok(())
    }
}
