//! JSON export implementation.
//!
//! Exports graph analysis results in JSON format for machine-readable output.

use super::{ExportData, Exporter};
use crate::analysis::{CycleEnumeration, GraphMetrics};
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Serializable cycle info for JSON output.
#[derive(Serialize)]
struct JsonCycle<'a> {
    nodes: &'a [String],
    path: String,
    enumeration: &'a CycleEnumeration,
}

/// Serializable link for JSON output.
#[derive(Serialize)]
struct JsonLink<'a> {
    source: &'a str,
    target: &'a str,
    dependency_type: String,
    statements: usize,
    in_cycle: bool,
}

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary {
    nodes: usize,
    links: usize,
    density: f64,
    is_dag: bool,
    circular_dependencies: usize,
    self_loops: usize,
    layers: usize,
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport<'a> {
    graph: &'a str,
    summary: JsonSummary,
    metrics: &'a GraphMetrics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    circular_dependencies: Vec<JsonCycle<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    self_loops: Vec<&'a str>,
    layers: &'a [Vec<String>],
    links: Vec<JsonLink<'a>>,
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        let circular_dependencies: Vec<JsonCycle> = data
            .cycles
            .components
            .iter()
            .map(|c| JsonCycle {
                nodes: &c.nodes,
                path: c.cycle_path(),
                enumeration: &c.enumeration,
            })
            .collect();

        let links: Vec<JsonLink> = data
            .links
            .iter()
            .map(|l| JsonLink {
                source: &l.source,
                target: &l.target,
                dependency_type: l.dependency_type.to_string(),
                statements: l.statements,
                in_cycle: l.in_cycle,
            })
            .collect();

        let export = JsonExport {
            graph: &data.graph_name,
            summary: JsonSummary {
                nodes: data.metrics.node_count,
                links: data.metrics.edge_count,
                density: data.metrics.density,
                is_dag: data.metrics.is_dag,
                circular_dependencies: data.cycles.components.len(),
                self_loops: data.cycles.self_loops.len(),
                layers: data.layers.len(),
            },
            metrics: &data.metrics,
            circular_dependencies,
            self_loops: data.cycles.self_loops.iter().map(String::as_str).collect(),
            layers: &data.layers,
            links,
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support::report_graph;
    use crate::graph::CodeDependencyGraph;
    use crate::model::FileNode;

    fn export_value(data: &ExportData) -> serde_json::Value {
        let mut output = Vec::new();
        JsonExporter.export(data, &mut output).unwrap();
        let json_str = String::from_utf8(output).unwrap();
        serde_json::from_str(&json_str).unwrap()
    }

    #[test]
    fn test_json_export_summary() {
        let parsed = export_value(&ExportData::new(&report_graph()));

        assert_eq!(parsed["graph"], "report");
        assert_eq!(parsed["summary"]["nodes"], 4);
        assert_eq!(parsed["summary"]["links"], 5);
        assert_eq!(parsed["summary"]["is_dag"], false);
        assert_eq!(parsed["summary"]["circular_dependencies"], 1);
        assert_eq!(parsed["summary"]["self_loops"], 1);
        assert_eq!(parsed["metrics"]["edges_by_type"]["other:reexport"], 1);
        assert_eq!(parsed["metrics"]["degrees"]["python:service.py"]["in_degree"], 2);
    }

    #[test]
    fn test_json_export_cycles() {
        let parsed = export_value(&ExportData::new(&report_graph()));

        let cycles = parsed["circular_dependencies"].as_array().unwrap();
        assert_eq!(cycles.len(), 1);
        assert_eq!(
            cycles[0]["path"],
            "python:repo.py -> python:service.py -> python:repo.py"
        );
        assert_eq!(cycles[0]["enumeration"]["status"], "complete");
        assert_eq!(parsed["self_loops"][0], "python:util.py");
    }

    #[test]
    fn test_json_export_links() {
        let parsed = export_value(&ExportData::new(&report_graph()));

        let links = parsed["links"].as_array().unwrap();
        assert_eq!(links.len(), 5);
        assert_eq!(links[0]["source"], "python:api.py");
        assert_eq!(links[0]["dependency_type"], "implicit_import");
        assert_eq!(links[0]["statements"], 2);
        assert_eq!(links[0]["in_cycle"], false);
    }

    #[test]
    fn test_json_export_acyclic_graph_omits_cycles() {
        let mut graph = CodeDependencyGraph::new("flat");
        graph.add_node(FileNode::python("a.py", "a.py", None)).unwrap();

        let parsed = export_value(&ExportData::new(&graph));
        assert!(parsed.get("circular_dependencies").is_none());
        assert!(parsed.get("self_loops").is_none());
        assert_eq!(parsed["summary"]["density"], 0.0);
        assert_eq!(parsed["layers"][0][0], "python:a.py");
    }
}
