//! Dataverse Web API source
//!
//! Authenticates with the OAuth client-credentials grant and reads the
//! metadata endpoints of the v9.2 Web API, following `@odata.nextLink`
//! until every page has been read.

use crate::error::{SourceError, SourceResult};
use crate::traits::EntitySource;
use crate::wire;
use async_trait::async_trait;
use entigraph_core::{RawEntityRecord, RawRelationshipRecord};
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const API_PATH: &str = "api/data/v9.2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// Connection settings for a Dataverse environment
#[derive(Debug, Clone, Default)]
pub struct DataverseConfig {
    /// Environment URL, e.g. `https://org.crm.dynamics.com`
    pub resource_url: String,
    /// Authority URL, e.g. `https://login.microsoftonline.com/<tenant>`
    pub authority: String,
    pub client_id: String,
    pub client_secret: String,
    /// Defaults to `<resource_url>/.default`
    pub scope: Option<String>,
}

impl DataverseConfig {
    pub fn validate(&self) -> SourceResult<()> {
        let missing: Vec<&str> = [
            ("resource_url", &self.resource_url),
            ("authority", &self.authority),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ]
        .iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| *k)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SourceError::Config(format!(
                "Missing Dataverse settings: {}",
                missing.join(", ")
            )))
        }
    }

    fn scope(&self) -> String {
        self.scope
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("{}/.default", self.resource_url.trim_end_matches('/')))
    }

    fn token_url(&self) -> String {
        format!("{}/oauth2/v2.0/token", self.authority.trim_end_matches('/'))
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.resource_url.trim_end_matches('/'),
            API_PATH,
            path
        )
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        Instant::now() + REFRESH_MARGIN > self.expires_at
    }
}

/// Entity source reading a live Dataverse environment
pub struct DataverseSource {
    config: DataverseConfig,
    http: reqwest::Client,
    cached_token: RwLock<Option<CachedToken>>,
}

impl DataverseSource {
    pub fn new(config: DataverseConfig) -> SourceResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            config,
            http,
            cached_token: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &DataverseConfig {
        &self.config
    }

    async fn request_token(&self) -> SourceResult<CachedToken> {
        let scope = self.config.scope();
        tracing::debug!("Requesting access token for scope {}", scope);

        let response = self
            .http
            .post(self.config.token_url())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(SourceError::Auth(format!(
                "Token request failed: {} - {}",
                status, text
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(CachedToken {
            token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }

    async fn ensure_token(&self) -> SourceResult<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(ref cached) = *cache {
                if !cached.is_expired() {
                    return Ok(cached.token.clone());
                }
            }
        }

        let mut cache = self.cached_token.write().await;
        if let Some(ref cached) = *cache {
            if !cached.is_expired() {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.request_token().await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }

    async fn get_json(&self, url: &str) -> SourceResult<Value> {
        let token = self.ensure_token().await?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header("OData-MaxVersion", "4.0")
            .header("OData-Version", "4.0")
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            tracing::error!("GET {} failed with HTTP {}", url, status);
            return Err(SourceError::Api { status, message });
        }

        Ok(response.json().await?)
    }

    /// Read every page of a collection
    async fn get_collection(&self, path: &str) -> SourceResult<Vec<Value>> {
        let mut url = self.config.api_url(path);
        let mut items = Vec::new();

        loop {
            let mut page = self.get_json(&url).await?;
            let next = page
                .get("@odata.nextLink")
                .and_then(Value::as_str)
                .map(str::to_string);
            if let Some(map) = page.as_object_mut() {
                map.remove("@odata.nextLink");
            }
            items.extend(wire::collection(page)?);

            match next {
                Some(link) => url = link,
                None => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl EntitySource for DataverseSource {
    async fn fetch_entity_definitions(&self) -> SourceResult<Vec<RawEntityRecord>> {
        tracing::info!("Fetching entity definitions");
        let values = self
            .get_collection(&format!("EntityDefinitions?$select={}", wire::ENTITY_SELECT))
            .await?;
        Ok(wire::decode_entities(&values))
    }

    async fn fetch_relationship_definitions(&self) -> SourceResult<Vec<RawRelationshipRecord>> {
        tracing::info!("Fetching relationship definitions");
        let values = self.get_collection("RelationshipDefinitions").await?;
        Ok(wire::decode_relationships(&values))
    }

    async fn fetch_required_attributes(&self, logical_name: &str) -> SourceResult<Vec<String>> {
        let path = format!(
            "EntityDefinitions(LogicalName='{}')/Attributes?$select={}",
            logical_name.replace('\'', "''"),
            wire::ATTRIBUTE_SELECT
        );
        let values = self.get_collection(&path).await?;
        Ok(wire::decode_required_attributes(&values))
    }

    async fn health_check(&self) -> SourceResult<bool> {
        self.ensure_token().await.map(|_| true)
    }
}
