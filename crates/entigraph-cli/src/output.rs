//! Output formatting utilities

use std::io::Write;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use entigraph_core::{Edge, EdgeKind, Node};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

pub fn to_json<T: Serialize>(data: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Render rows as left-aligned columns under a header
fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(headers.iter().map(|h| h.to_string()).collect())];
    lines.extend(rows.into_iter().map(render));
    lines.join("\n")
}

pub fn nodes_table(nodes: &[Node]) -> String {
    let rows = nodes
        .iter()
        .map(|n| {
            vec![
                n.id.clone(),
                n.label.clone(),
                n.hierarchy_level.to_string(),
                if n.is_custom { "yes" } else { "no" }.to_string(),
                n.required_fields.join(", "),
            ]
        })
        .collect();
    table(&["ENTITY", "LABEL", "LEVEL", "CUSTOM", "REQUIRED"], rows)
}

pub fn edges_table(edges: &[Edge]) -> String {
    let rows = edges
        .iter()
        .map(|e| {
            let via = match &e.kind {
                EdgeKind::OneToMany {
                    target_attribute, ..
                } => target_attribute.clone().unwrap_or_default(),
                EdgeKind::ManyToMany {
                    intersect_entity, ..
                } => intersect_entity.clone().unwrap_or_default(),
            };
            vec![
                e.id.clone(),
                e.type_name().to_string(),
                e.source_entity.clone(),
                e.target_entity.clone(),
                via,
            ]
        })
        .collect();
    table(&["RELATIONSHIP", "TYPE", "SOURCE", "TARGET", "VIA"], rows)
}

/// Write a file readable by the owner only (0o600 on unix)
pub fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        file.write_all(content.as_bytes())
    }
    #[cfg(not(unix))]
    {
        let mut file = std::fs::File::create(path)?;
        file.write_all(content.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entigraph_core::{RawEntityRecord, RawRelationshipRecord};

    #[test]
    fn test_output_format() {
        assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("table"), OutputFormat::Table);
        assert_eq!(OutputFormat::from("whatever"), OutputFormat::Table);
    }

    #[test]
    fn test_nodes_table_alignment() {
        let nodes = vec![
            Node::from_record(RawEntityRecord::new("account").with_label("Account"), 1)
                .with_required_fields(vec!["name".to_string()]),
            Node::from_record(RawEntityRecord::new("qrt_portfolio").custom(), 2),
        ];

        let out = nodes_table(&nodes);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ENTITY         LABEL"));
        assert!(lines[1].contains("Account"));
        assert!(lines[1].ends_with("name"));
        assert!(lines[2].contains("yes"));
    }

    #[test]
    fn test_edges_table() {
        let edge = entigraph_core::normalize(RawRelationshipRecord::one_to_many(
            "account_contact",
            "account",
            "contact",
        ))
        .unwrap();
        let out = edges_table(&[edge]);
        assert!(out.contains("OneToMany"));
        assert!(out.contains("account_contact"));
    }

    #[test]
    fn test_write_private() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_private(&path, "hello").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
