//! Export functionality for graph analysis reports.
//!
//! This module provides exporters for outputting the metrics, cycles and
//! link list of a [`CodeDependencyGraph`] in various formats: JSON, CSV,
//! and Markdown.

pub mod csv;
pub mod json;
pub mod markdown;

use crate::analysis::{CycleLimits, CycleReport, GraphMetrics};
use crate::error::ParseValueError;
use crate::graph::CodeDependencyGraph;
use crate::model::DependencyType;
use std::collections::HashMap;
use std::io::{self, Write};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON format - machine-readable, full data
    Json,
    /// CSV format - spreadsheet-friendly edge list
    Csv,
    /// Markdown format - documentation/reporting
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(ParseValueError::new("export format", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// One link of the graph as it appears in reports.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRow {
    pub source: String,
    pub target: String,
    pub dependency_type: DependencyType,
    /// Number of statements evidencing the link.
    pub statements: usize,
    /// True when the link closes a cycle (both ends in one cyclic
    /// component, or a self-loop).
    pub in_cycle: bool,
}

/// Data container for export operations.
///
/// Holds all the analysis results that can be exported.
#[derive(Debug, Clone)]
pub struct ExportData {
    /// Graph name
    pub graph_name: String,
    /// Structural metrics
    pub metrics: GraphMetrics,
    /// Detected circular dependencies
    pub cycles: CycleReport,
    /// Dependency layers, bottom first
    pub layers: Vec<Vec<String>>,
    /// Every link, sorted by (source, target, type)
    pub links: Vec<LinkRow>,
}

impl ExportData {
    /// Create export data with the default cycle enumeration limits.
    pub fn new(graph: &CodeDependencyGraph) -> Self {
        Self::with_limits(graph, CycleLimits::default())
    }

    /// Create export data, enumerating cycles within `limits`.
    pub fn with_limits(graph: &CodeDependencyGraph, limits: CycleLimits) -> Self {
        let cycles = graph.detect_cycles_with(limits);

        let component_of: HashMap<&str, usize> = cycles
            .components
            .iter()
            .enumerate()
            .flat_map(|(i, c)| c.nodes.iter().map(move |id| (id.as_str(), i)))
            .collect();

        let links = graph
            .links()
            .into_iter()
            .map(|link| {
                let source = link.source_node_id();
                let target = link.target_node_id();
                let same_component = match (component_of.get(source), component_of.get(target)) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                };
                LinkRow {
                    source: source.to_string(),
                    target: target.to_string(),
                    dependency_type: link.dependency_type().clone(),
                    statements: link.weight(),
                    in_cycle: link.is_self_loop() || same_component,
                }
            })
            .collect();

        Self {
            graph_name: graph.name().to_string(),
            metrics: graph.calculate_metrics(),
            layers: graph.dependency_layers(),
            cycles,
            links,
        }
    }

    /// Get count of links that take part in a cycle
    pub fn cyclic_link_count(&self) -> usize {
        self.links.iter().filter(|l| l.in_cycle).count()
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()>;
}

/// Export data in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    data: &ExportData,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Json => json::JsonExporter.export(data, writer),
        ExportFormat::Csv => csv::CsvExporter.export(data, writer),
        ExportFormat::Markdown => markdown::MarkdownExporter.export(data, writer),
    }
}

/// Export data to a string.
pub fn export_to_string(format: ExportFormat, data: &ExportData) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, data, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
