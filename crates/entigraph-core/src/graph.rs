//! Graph assembly over a raw catalog snapshot

use crate::classify::Classifier;
use crate::entity::{Node, RawEntityRecord};
use crate::filter::FilterPolicy;
use crate::hierarchy;
use crate::relation::{normalize_all, Edge, RawRelationshipRecord};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Everything fetched from the catalog for one request
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub entities: Vec<RawEntityRecord>,
    pub relationships: Vec<RawRelationshipRecord>,
    /// Required attribute names keyed by logical name
    pub required_fields: HashMap<String, Vec<String>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entities(mut self, entities: Vec<RawEntityRecord>) -> Self {
        self.entities = entities;
        self
    }

    pub fn with_relationships(mut self, relationships: Vec<RawRelationshipRecord>) -> Self {
        self.relationships = relationships;
        self
    }

    pub fn with_required_fields(mut self, name: impl Into<String>, fields: Vec<String>) -> Self {
        self.required_fields.insert(name.into(), fields);
        self
    }
}

/// Accounting for what the assembler kept and dropped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyStats {
    pub entities_seen: usize,
    pub entities_accepted: usize,
    pub duplicate_entities: usize,
    pub relationships_seen: usize,
    pub unrecognized_relationships: usize,
    /// Edges pruned because an endpoint was filtered out or truncated away
    pub dangling_edges: usize,
    pub truncated_nodes: usize,
}

/// Assembled graph of entities and their relationships
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(skip)]
    pub stats: AssemblyStats,
}

impl EntityGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_ids(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }
}

/// Drop edges whose endpoints are not both in `nodes`, returning how many went
fn retain_connected(edges: &mut Vec<Edge>, nodes: &[Node]) -> usize {
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let before = edges.len();
    edges.retain(|e| e.connects(&ids));
    before - edges.len()
}

/// Orchestrates classification, ranking and normalization into a graph
#[derive(Debug, Clone, Default)]
pub struct GraphAssembler {
    classifier: Classifier,
}

impl GraphAssembler {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Restrict the snapshot to the curated entity set, returning how many
    /// entities were removed
    pub fn curate(&self, snapshot: &mut Snapshot) -> usize {
        let before = snapshot.entities.len();
        snapshot
            .entities
            .retain(|e| self.classifier.should_include_entity(&e.logical_name, e.is_custom));
        before - snapshot.entities.len()
    }

    /// Whether the entity would be kept under `policy` and should carry
    /// required-field detail
    pub fn wants_required_fields(&self, record: &RawEntityRecord, policy: &FilterPolicy) -> bool {
        hierarchy::needs_required_fields(hierarchy::level(&record.logical_name))
            && self
                .classifier
                .accepts(policy, &record.logical_name, record.is_custom)
    }

    /// Ranked nodes for every entity `accept` keeps, in snapshot order
    fn build_nodes(
        &self,
        entities: Vec<RawEntityRecord>,
        required_fields: &mut HashMap<String, Vec<String>>,
        stats: &mut AssemblyStats,
        accept: impl Fn(&RawEntityRecord) -> bool,
    ) -> Vec<Node> {
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();

        for record in entities {
            stats.entities_seen += 1;
            if !accept(&record) {
                continue;
            }
            if !seen.insert(record.logical_name.clone()) {
                stats.duplicate_entities += 1;
                continue;
            }

            let level = hierarchy::level(&record.logical_name);
            let fields = if hierarchy::needs_required_fields(level) {
                required_fields
                    .remove(&record.logical_name)
                    .unwrap_or_default()
            } else {
                Vec::new()
            };

            nodes.push(Node::from_record(record, level).with_required_fields(fields));
        }

        stats.entities_accepted = nodes.len();
        nodes
    }

    /// Nodes on the curated path, used for the entity listing
    pub fn curated_nodes(&self, snapshot: Snapshot) -> Vec<Node> {
        let Snapshot {
            entities,
            mut required_fields,
            ..
        } = snapshot;
        let mut stats = AssemblyStats::default();

        self.build_nodes(entities, &mut required_fields, &mut stats, |e| {
            self.classifier
                .should_include_entity(&e.logical_name, e.is_custom)
        })
    }

    /// Assemble a filtered graph
    ///
    /// Every returned edge has both endpoints in the returned node set, both
    /// after filtering and after truncation to `limit` nodes.
    pub fn assemble(
        &self,
        snapshot: Snapshot,
        policy: &FilterPolicy,
        limit: Option<usize>,
    ) -> EntityGraph {
        let Snapshot {
            entities,
            relationships,
            mut required_fields,
        } = snapshot;
        let mut stats = AssemblyStats::default();

        let mut nodes = self.build_nodes(entities, &mut required_fields, &mut stats, |e| {
            self.classifier
                .accepts(policy, &e.logical_name, e.is_custom)
        });

        stats.relationships_seen = relationships.len();
        let (mut edges, dropped) = normalize_all(relationships);
        stats.unrecognized_relationships = dropped;
        stats.dangling_edges = retain_connected(&mut edges, &nodes);

        if let Some(limit) = limit.filter(|l| *l > 0) {
            if nodes.len() > limit {
                stats.truncated_nodes = nodes.len() - limit;
                nodes.truncate(limit);
                stats.dangling_edges += retain_connected(&mut edges, &nodes);
            }
        }

        tracing::debug!(
            policy = %policy,
            nodes = nodes.len(),
            edges = edges.len(),
            dropped_relationships = stats.unrecognized_relationships,
            "Assembled graph"
        );

        EntityGraph {
            nodes,
            edges,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_snapshot() -> Snapshot {
        Snapshot::new()
            .with_entities(vec![
                RawEntityRecord::new("account"),
                RawEntityRecord::new("contact"),
                RawEntityRecord::new("systemuser"),
                RawEntityRecord::new("qrt_portfolio").custom(),
                RawEntityRecord::new("qrt_foo").custom(),
                RawEntityRecord::new("msdyn_project").custom(),
            ])
            .with_relationships(vec![RawRelationshipRecord::one_to_many(
                "qrt_account_qrt_portfolio",
                "account",
                "qrt_portfolio",
            )])
    }

    #[test]
    fn test_core_and_custom_example() {
        let graph = GraphAssembler::default().assemble(sample_snapshot(), &FilterPolicy::default(), None);

        assert_eq!(graph.node_count(), 6);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node("account").unwrap().hierarchy_level, 1);
        assert_eq!(graph.node("qrt_portfolio").unwrap().hierarchy_level, 2);
        assert_eq!(graph.node("contact").unwrap().hierarchy_level, 0);
        assert_eq!(graph.node("systemuser").unwrap().hierarchy_level, 0);
    }

    #[test]
    fn test_limit_prunes_edges() {
        let snapshot = Snapshot::new()
            .with_entities(vec![
                RawEntityRecord::new("contact"),
                RawEntityRecord::new("systemuser"),
                RawEntityRecord::new("account"),
                RawEntityRecord::new("qrt_portfolio").custom(),
                RawEntityRecord::new("qrt_foo").custom(),
                RawEntityRecord::new("msdyn_project").custom(),
            ])
            .with_relationships(vec![RawRelationshipRecord::one_to_many(
                "qrt_account_qrt_portfolio",
                "account",
                "qrt_portfolio",
            )]);

        let graph = GraphAssembler::default().assemble(snapshot, &FilterPolicy::default(), Some(2));

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.nodes[0].id, "contact");
        assert_eq!(graph.nodes[1].id, "systemuser");
        assert_eq!(graph.stats.truncated_nodes, 4);
        assert_eq!(graph.stats.dangling_edges, 1);
    }

    #[test]
    fn test_zero_limit_is_ignored() {
        let graph = GraphAssembler::default().assemble(sample_snapshot(), &FilterPolicy::All, Some(0));
        assert_eq!(graph.node_count(), 6);
    }

    #[test]
    fn test_custom_only() {
        let mut snapshot = sample_snapshot();
        snapshot.relationships.push(RawRelationshipRecord::many_to_many(
            "qrt_portfolio_qrt_foo",
            "qrt_portfolio",
            "qrt_foo",
        ));

        let graph = GraphAssembler::default().assemble(snapshot, &FilterPolicy::CustomOnly, None);

        assert!(graph.nodes.iter().all(|n| n.is_custom));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges[0].id, "qrt_portfolio_qrt_foo");
    }

    #[test]
    fn test_business_excludes_system() {
        let mut snapshot = sample_snapshot();
        snapshot.entities.push(RawEntityRecord::new("asyncoperation"));

        let graph = GraphAssembler::default().assemble(snapshot, &FilterPolicy::Business, None);

        assert!(graph.node("asyncoperation").is_none());
        assert!(graph.node("systemuser").is_none());
        assert!(graph.node("account").is_some());
    }

    #[test]
    fn test_duplicates_keep_first() {
        let snapshot = Snapshot::new().with_entities(vec![
            RawEntityRecord::new("account").with_label("First"),
            RawEntityRecord::new("account").with_label("Second"),
        ]);

        let graph = GraphAssembler::default().assemble(snapshot, &FilterPolicy::All, None);

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.nodes[0].label, "First");
        assert_eq!(graph.stats.duplicate_entities, 1);
    }

    #[test]
    fn test_required_fields_only_for_middle_tiers() {
        let snapshot = sample_snapshot()
            .with_required_fields("account", vec!["name".to_string()])
            .with_required_fields("contact", vec!["lastname".to_string()])
            .with_required_fields("qrt_foo", vec!["qrt_name".to_string()]);

        let graph = GraphAssembler::default().assemble(snapshot, &FilterPolicy::All, None);

        assert_eq!(graph.node("account").unwrap().required_fields, vec!["name"]);
        assert!(graph.node("contact").unwrap().required_fields.is_empty());
        assert!(graph.node("qrt_foo").unwrap().required_fields.is_empty());
    }

    #[test]
    fn test_unrecognized_relationships_are_counted() {
        let mut snapshot = sample_snapshot();
        snapshot.relationships.push(RawRelationshipRecord::Unrecognized {
            schema_name: "weird".to_string(),
            odata_type: "#Microsoft.Dynamics.CRM.Other".to_string(),
        });

        let graph = GraphAssembler::default().assemble(snapshot, &FilterPolicy::All, None);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.stats.relationships_seen, 2);
        assert_eq!(graph.stats.unrecognized_relationships, 1);
    }

    #[test]
    fn test_curated_nodes() {
        let mut snapshot = sample_snapshot();
        snapshot.entities.push(RawEntityRecord::new("qrt_taskrules").custom());
        snapshot.entities.push(RawEntityRecord::new("lead"));

        let nodes = GraphAssembler::default().curated_nodes(snapshot);
        let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();

        assert_eq!(
            ids,
            vec!["account", "contact", "systemuser", "qrt_portfolio", "qrt_foo", "msdyn_project"]
        );
    }

    #[test]
    fn test_curate_and_wants_required_fields() {
        let assembler = GraphAssembler::default();
        let mut snapshot = sample_snapshot();
        snapshot.entities.push(RawEntityRecord::new("lead"));

        assert_eq!(assembler.curate(&mut snapshot), 1);

        let account = RawEntityRecord::new("account");
        let qrt_foo = RawEntityRecord::new("qrt_foo").custom();
        assert!(assembler.wants_required_fields(&account, &FilterPolicy::All));
        assert!(!assembler.wants_required_fields(&account, &FilterPolicy::CustomOnly));
        assert!(!assembler.wants_required_fields(&qrt_foo, &FilterPolicy::All));
    }

    fn arb_policy() -> impl Strategy<Value = FilterPolicy> {
        prop_oneof![
            Just(FilterPolicy::All),
            Just(FilterPolicy::Business),
            Just(FilterPolicy::CustomOnly),
            Just(FilterPolicy::default()),
            Just(FilterPolicy::default().with_prefixes(vec!["qrt_".to_string()])),
        ]
    }

    fn arb_name() -> impl Strategy<Value = String> {
        proptest::sample::select(vec![
            "account",
            "contact",
            "systemuser",
            "asyncoperation",
            "lead",
            "qrt_portfolio",
            "qrt_permits",
            "qrt_foo",
            "msdyn_project",
            "new_widget",
        ])
        .prop_map(String::from)
    }

    fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
        let entities = proptest::collection::vec((arb_name(), any::<bool>()), 0..12);
        let relationships =
            proptest::collection::vec((arb_name(), arb_name(), any::<bool>()), 0..16);

        (entities, relationships).prop_map(|(entities, relationships)| {
            Snapshot::new()
                .with_entities(
                    entities
                        .into_iter()
                        .map(|(name, custom)| RawEntityRecord {
                            is_custom: custom,
                            ..RawEntityRecord::new(name)
                        })
                        .collect(),
                )
                .with_relationships(
                    relationships
                        .into_iter()
                        .enumerate()
                        .map(|(i, (from, to, one_to_many))| {
                            let schema = format!("rel_{}", i);
                            if one_to_many {
                                RawRelationshipRecord::one_to_many(schema, from, to)
                            } else {
                                RawRelationshipRecord::many_to_many(schema, from, to)
                            }
                        })
                        .collect(),
                )
        })
    }

    proptest! {
        #[test]
        fn prop_edges_connect_returned_nodes(
            snapshot in arb_snapshot(),
            policy in arb_policy(),
            limit in proptest::option::of(0usize..8),
        ) {
            let graph = GraphAssembler::default().assemble(snapshot, &policy, limit);
            let ids = graph.node_ids();

            prop_assert_eq!(ids.len(), graph.node_count());
            for edge in &graph.edges {
                prop_assert!(ids.contains(edge.source_entity.as_str()));
                prop_assert!(ids.contains(edge.target_entity.as_str()));
            }
            if let Some(limit) = limit.filter(|l| *l > 0) {
                prop_assert!(graph.node_count() <= limit);
            }
        }

        #[test]
        fn prop_levels_ignore_policy(snapshot in arb_snapshot(), policy in arb_policy()) {
            let graph = GraphAssembler::default().assemble(snapshot, &policy, None);
            for node in &graph.nodes {
                prop_assert_eq!(node.hierarchy_level, hierarchy::level(&node.logical_name));
            }
        }
    }
}
