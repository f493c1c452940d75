//! Export command

use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use entigraph_core::{Edge, EdgeKind, EntityGraph, FilterPolicy, Node};
use serde::Serialize;

use crate::commands::graph::FilterArgs;
use crate::context::AppContext;
use crate::output::write_private;
use crate::Cli;

/// Export format
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    /// Human-readable entity summary
    #[value(alias = "md")]
    Markdown,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Export format
    #[arg(value_enum, default_value = "json", value_name = "FORMAT")]
    pub kind: ExportFormat,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// JSON export document
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData<'a> {
    pub version: &'static str,
    pub exported_at: String,
    pub filter_mode: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes: &'a [Node],
    pub edges: &'a [Edge],
}

impl<'a> ExportData<'a> {
    pub fn new(policy: &FilterPolicy, graph: &'a EntityGraph) -> Self {
        Self {
            version: "1.0",
            exported_at: chrono::Utc::now().to_rfc3339(),
            filter_mode: policy.to_string(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            nodes: &graph.nodes,
            edges: &graph.edges,
        }
    }
}

pub async fn run(args: &ExportArgs, cli: &Cli) -> anyhow::Result<()> {
    args.filter.policy()?;

    let ctx = AppContext::new(cli)?;
    let (policy, graph) = args.filter.assemble(&ctx).await?;

    tracing::debug!(
        "Exporting graph ({}): {} entities, {} relationships",
        policy,
        graph.node_count(),
        graph.edge_count()
    );

    let content = match args.kind {
        ExportFormat::Json => serde_json::to_string_pretty(&ExportData::new(&policy, &graph))?,
        ExportFormat::Csv => export_to_csv(&graph),
        ExportFormat::Markdown => export_to_markdown(&policy, &graph),
    };

    if let Some(ref path) = args.output {
        write_private(path, &content)?;
        if !cli.quiet {
            println!("Exported to {:?}", path);
        }
    } else {
        println!("{}", content);
    }

    Ok(())
}

fn export_to_csv(graph: &EntityGraph) -> String {
    let mut output = String::new();

    output.push_str("# Nodes\n");
    output.push_str(
        "id,label,schemaName,entitySetName,isCustomEntity,isActivity,\
         primaryIdAttribute,primaryNameAttribute,hierarchyLevel,requiredFields,description\n",
    );

    for node in &graph.nodes {
        output.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{}\n",
            csv_escape(&node.id),
            csv_escape(&node.label),
            csv_escape(node.schema_name.as_deref().unwrap_or_default()),
            csv_escape(node.entity_set_name.as_deref().unwrap_or_default()),
            node.is_custom,
            node.is_activity,
            csv_escape(node.primary_id_attribute.as_deref().unwrap_or_default()),
            csv_escape(node.primary_name_attribute.as_deref().unwrap_or_default()),
            node.hierarchy_level,
            csv_escape(&node.required_fields.join("; ")),
            csv_escape(&node.description)
        ));
    }

    output.push_str("\n# Edges\n");
    output.push_str("id,type,sourceEntity,targetEntity,sourceAttribute,targetAttribute,intersectEntity\n");

    for edge in &graph.edges {
        let (source_attribute, target_attribute, intersect_entity) = match &edge.kind {
            EdgeKind::OneToMany {
                source_attribute,
                target_attribute,
                ..
            } => (source_attribute.as_deref(), target_attribute.as_deref(), None),
            EdgeKind::ManyToMany {
                intersect_entity, ..
            } => (None, None, intersect_entity.as_deref()),
        };
        output.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            csv_escape(&edge.id),
            edge.type_name(),
            csv_escape(&edge.source_entity),
            csv_escape(&edge.target_entity),
            csv_escape(source_attribute.unwrap_or_default()),
            csv_escape(target_attribute.unwrap_or_default()),
            csv_escape(intersect_entity.unwrap_or_default())
        ));
    }

    output
}

/// Rows shown in the most-connected table
const TOP_CONNECTED: usize = 20;
/// Rows shown in the custom entity table
const MAX_CUSTOM_ROWS: usize = 50;
/// Characters kept from a custom entity description
const MAX_DESCRIPTION_CHARS: usize = 100;

/// Render the graph as a Markdown entity summary
fn export_to_markdown(policy: &FilterPolicy, graph: &EntityGraph) -> String {
    let mut degree: HashMap<&str, usize> = HashMap::new();
    for edge in &graph.edges {
        *degree.entry(edge.source_entity.as_str()).or_default() += 1;
        *degree.entry(edge.target_entity.as_str()).or_default() += 1;
    }
    let degree_of = |node: &Node| degree.get(node.id.as_str()).copied().unwrap_or(0);

    let custom_count = graph.nodes.iter().filter(|n| n.is_custom).count();
    let activity_count = graph.nodes.iter().filter(|n| n.is_activity).count();

    let mut output = String::new();
    output.push_str("# Entity Structure Summary\n\n");

    output.push_str("## Overview\n\n");
    output.push_str(&format!("- **Filter Mode**: {}\n", policy));
    output.push_str(&format!("- **Total Entities**: {}\n", graph.node_count()));
    output.push_str(&format!("- **Custom Entities**: {}\n", custom_count));
    output.push_str(&format!(
        "- **Standard Entities**: {}\n",
        graph.node_count() - custom_count
    ));
    output.push_str(&format!("- **Activity Entities**: {}\n", activity_count));
    output.push_str(&format!(
        "- **Total Relationships**: {}\n\n",
        graph.edge_count()
    ));

    // Stable sort keeps catalog order among equal degrees
    let mut ranked: Vec<&Node> = graph.nodes.iter().collect();
    ranked.sort_by(|a, b| degree_of(b).cmp(&degree_of(a)));

    output.push_str(&format!("## Top {} Most Connected Entities\n\n", TOP_CONNECTED));
    output.push_str("| Entity | Label | Type | Relationship Count |\n");
    output.push_str("|--------|-------|------|--------------------|\n");
    for node in ranked.into_iter().take(TOP_CONNECTED) {
        output.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            md_cell(&node.id),
            md_cell(&node.label),
            if node.is_custom { "Custom" } else { "Standard" },
            degree_of(node)
        ));
    }

    let mut custom: Vec<&Node> = graph.nodes.iter().filter(|n| n.is_custom).collect();
    custom.sort_by(|a, b| a.label.cmp(&b.label));

    output.push_str("\n## Custom Entities\n\n");
    output.push_str("| Logical Name | Label | Description |\n");
    output.push_str("|--------------|-------|-------------|\n");
    for node in custom.iter().take(MAX_CUSTOM_ROWS) {
        let description: String = node.description.chars().take(MAX_DESCRIPTION_CHARS).collect();
        output.push_str(&format!(
            "| {} | {} | {} |\n",
            md_cell(&node.logical_name),
            md_cell(&node.label),
            md_cell(&description)
        ));
    }

    if custom.len() > MAX_CUSTOM_ROWS {
        output.push_str(&format!(
            "\n*... and {} more custom entities*\n",
            custom.len() - MAX_CUSTOM_ROWS
        ));
    }

    output
}

/// Keep a value inside one Markdown table cell
fn md_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Escape a string for CSV output with formula injection protection
fn csv_escape(s: &str) -> String {
    // Prefix spreadsheet formula triggers with '
    let needs_formula_protection = s
        .chars()
        .next()
        .map(|c| matches!(c, '=' | '+' | '-' | '@' | '\t' | '\r'))
        .unwrap_or(false);

    let escaped = if needs_formula_protection {
        format!("'{}", s)
    } else {
        s.to_string()
    };

    if escaped.contains(',') || escaped.contains('"') || escaped.contains('\n') {
        format!("\"{}\"", escaped.replace('"', "\"\""))
    } else {
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entigraph_core::{GraphAssembler, RawEntityRecord, RawRelationshipRecord, Snapshot};

    fn sample_graph() -> EntityGraph {
        let snapshot = Snapshot::new()
            .with_entities(vec![
                RawEntityRecord::new("account")
                    .with_label("Account")
                    .with_schema_name("Account")
                    .with_description("Business that represents a customer, \"or\" partner"),
                RawEntityRecord::new("qrt_portfolio").custom().with_label("=HYPERLINK()"),
            ])
            .with_relationships(vec![RawRelationshipRecord::one_to_many(
                "qrt_account_qrt_portfolio",
                "account",
                "qrt_portfolio",
            )])
            .with_required_fields("account", vec!["name".to_string(), "ownerid".to_string()]);
        GraphAssembler::default().assemble(snapshot, &FilterPolicy::All, None)
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(csv_escape("-1"), "'-1");
        assert_eq!(csv_escape("@cmd,x"), "\"'@cmd,x\"");
    }

    #[test]
    fn test_export_to_csv() {
        let csv = export_to_csv(&sample_graph());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "# Nodes");
        assert!(lines[1].starts_with("id,label,schemaName,entitySetName,"));
        assert!(lines[2].starts_with("account,Account,Account,,false,false,,,1,name; ownerid,"));
        assert!(lines[2].ends_with("\"Business that represents a customer, \"\"or\"\" partner\""));
        assert!(lines[3].starts_with("qrt_portfolio,'=HYPERLINK(),,,true"));
        assert!(csv.contains("# Edges"));
        assert!(csv.contains("qrt_account_qrt_portfolio,OneToMany,account,qrt_portfolio,,,"));
    }

    #[test]
    fn test_export_json_document() {
        let graph = sample_graph();
        let policy = FilterPolicy::All;
        let value = serde_json::to_value(ExportData::new(&policy, &graph)).unwrap();

        assert_eq!(value["filterMode"], "all");
        assert_eq!(value["nodeCount"], 2);
        assert_eq!(value["edgeCount"], 1);
        assert!(value["exportedAt"].is_string());
        assert_eq!(value["nodes"][0]["requiredFields"][1], "ownerid");
    }

    fn graph_of(nodes: Vec<Node>, edges: Vec<(&str, &str)>) -> EntityGraph {
        let edges = edges
            .into_iter()
            .map(|(source, target)| {
                entigraph_core::normalize(RawRelationshipRecord::one_to_many(
                    format!("{}_{}", source, target),
                    source,
                    target,
                ))
                .unwrap()
            })
            .collect();
        EntityGraph {
            nodes,
            edges,
            ..Default::default()
        }
    }

    fn section<'a>(markdown: &'a str, heading: &str) -> &'a str {
        let start = markdown.find(heading).unwrap();
        let rest = &markdown[start + heading.len()..];
        match rest.find("\n## ") {
            Some(end) => &rest[..end],
            None => rest,
        }
    }

    #[test]
    fn test_markdown_ranks_by_degree() {
        let nodes = ["w", "x", "hub", "y", "z"]
            .into_iter()
            .map(|name| Node::from_record(RawEntityRecord::new(name), 4))
            .collect();
        let graph = graph_of(nodes, vec![("hub", "x"), ("hub", "y"), ("z", "hub")]);

        let markdown = export_to_markdown(&FilterPolicy::All, &graph);
        assert!(markdown.contains("- **Total Entities**: 5\n"));
        assert!(markdown.contains("- **Standard Entities**: 5\n"));
        assert!(markdown.contains("- **Total Relationships**: 3\n"));

        let rows: Vec<&str> = section(&markdown, "## Top 20 Most Connected Entities")
            .lines()
            .filter(|l| l.starts_with("| ") && !l.starts_with("| Entity"))
            .collect();
        assert_eq!(
            rows,
            vec![
                "| hub | hub | Standard | 3 |",
                "| x | x | Standard | 1 |",
                "| y | y | Standard | 1 |",
                "| z | z | Standard | 1 |",
                "| w | w | Standard | 0 |",
            ]
        );
    }

    #[test]
    fn test_markdown_caps_custom_table() {
        let long = "d".repeat(150);
        let nodes: Vec<Node> = (0..55)
            .rev()
            .map(|i| {
                let record = RawEntityRecord::new(format!("qrt_e{:02}", i))
                    .custom()
                    .with_label(format!("Entity {:02}", i))
                    .with_description(long.clone());
                Node::from_record(record, 2)
            })
            .collect();
        let markdown = export_to_markdown(&FilterPolicy::CustomOnly, &graph_of(nodes, vec![]));

        assert!(markdown.contains("- **Custom Entities**: 55\n"));
        let custom = section(&markdown, "## Custom Entities");
        let rows: Vec<&str> = custom.lines().filter(|l| l.starts_with("| qrt_e")).collect();
        assert_eq!(rows.len(), 50);
        assert!(rows[0].starts_with("| qrt_e00 | Entity 00 | "));
        assert!(rows[49].starts_with("| qrt_e49 | Entity 49 | "));
        assert!(rows[0].ends_with(&format!("| {} |", "d".repeat(100))));
        assert!(custom.contains("*... and 5 more custom entities*"));

        let top = section(&markdown, "## Top 20 Most Connected Entities");
        assert_eq!(top.lines().filter(|l| l.starts_with("| qrt_e")).count(), 20);
    }

    #[test]
    fn test_md_cell() {
        assert_eq!(md_cell("a|b\nc"), "a\\|b c");
    }
}
