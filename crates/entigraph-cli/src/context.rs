//! Entity source selection and the application context

use std::sync::Arc;

use async_trait::async_trait;
use entigraph_core::{Classifier, GraphAssembler, RawEntityRecord, RawRelationshipRecord};
use entigraph_server::GraphService;
use entigraph_source::{
    DataverseConfig, DataverseSource, EntitySource, SnapshotFileSource, SourceResult,
};

use crate::config::Config;
use crate::Cli;

/// Source picked from the command line and config file
pub enum CatalogSource {
    Snapshot(SnapshotFileSource),
    Dataverse(DataverseSource),
}

impl CatalogSource {
    fn inner(&self) -> &dyn EntitySource {
        match self {
            Self::Snapshot(source) => source,
            Self::Dataverse(source) => source,
        }
    }
}

#[async_trait]
impl EntitySource for CatalogSource {
    async fn fetch_entity_definitions(&self) -> SourceResult<Vec<RawEntityRecord>> {
        self.inner().fetch_entity_definitions().await
    }

    async fn fetch_relationship_definitions(&self) -> SourceResult<Vec<RawRelationshipRecord>> {
        self.inner().fetch_relationship_definitions().await
    }

    async fn fetch_required_attributes(&self, logical_name: &str) -> SourceResult<Vec<String>> {
        self.inner().fetch_required_attributes(logical_name).await
    }

    async fn health_check(&self) -> SourceResult<bool> {
        self.inner().health_check().await
    }
}

/// Pick the source: a snapshot file wins over Dataverse credentials
pub fn open_source(cli: &Cli, config: &Config) -> anyhow::Result<CatalogSource> {
    if let Some(path) = cli.snapshot.as_ref().or(config.source.snapshot.as_ref()) {
        tracing::debug!("Using snapshot source at {:?}", path);
        return Ok(CatalogSource::Snapshot(SnapshotFileSource::open(path)?));
    }

    let pick = |flag: &Option<String>, stored: &Option<String>| {
        flag.clone().or_else(|| stored.clone()).unwrap_or_default()
    };
    let dataverse = DataverseConfig {
        resource_url: pick(&cli.resource_url, &config.source.resource_url),
        authority: pick(&cli.authority, &config.source.authority),
        client_id: pick(&cli.client_id, &config.source.client_id),
        client_secret: pick(&cli.client_secret, &config.source.client_secret),
        scope: cli.scope.clone().or_else(|| config.source.scope.clone()),
    };

    if dataverse.resource_url.is_empty() {
        anyhow::bail!(
            "No entity source configured. Pass --snapshot <FILE>, set source.snapshot, \
             or provide the DATAVERSE_* settings."
        );
    }

    tracing::debug!("Using Dataverse source at {}", dataverse.resource_url);
    Ok(CatalogSource::Dataverse(DataverseSource::new(dataverse)?))
}

/// Application context with the graph service
pub struct AppContext {
    pub config: Config,
    pub service: Arc<GraphService<CatalogSource>>,
}

impl AppContext {
    pub fn new(cli: &Cli) -> anyhow::Result<Self> {
        let config = Config::load_from(&cli.config_path())?;
        let source = open_source(cli, &config)?;

        let classifier = config
            .catalog
            .clone()
            .map(Classifier::new)
            .unwrap_or_default();
        let service = GraphService::new(Arc::new(source))
            .with_assembler(GraphAssembler::new(classifier))
            .with_curated(config.graph.curated);

        Ok(Self {
            config,
            service: Arc::new(service),
        })
    }
}
