use std::collections::HashMap;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::PubMedConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceArticle {
    pub uid: String,
    pub title: String,
    /// Journal name.
    pub source: String,
    pub pubdate: String,
    pub authors: Vec<String>,
    pub volume: String,
    pub url: String,
}

/// Bibliographic search. Failures surface as an empty list.
#[async_trait]
pub trait EvidenceSearch: Send + Sync {
    async fn search(&self, query: &str) -> Vec<EvidenceArticle>;
}

#[derive(Deserialize)]
struct SearchEnvelope {
    esearchresult: Option<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

#[derive(Deserialize)]
struct SummaryEnvelope {
    #[serde(default)]
    result: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct SummaryItem {
    uid: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    pubdate: String,
    #[serde(default)]
    authors: Vec<SummaryAuthor>,
    #[serde(default)]
    volume: String,
}

#[derive(Deserialize)]
struct SummaryAuthor {
    name: String,
}

pub struct PubMedClient {
    config: PubMedConfig,
    client: Client,
}

impl PubMedClient {
    pub fn new(config: PubMedConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), name)
    }

    async fn search_ids(&self, query: &str) -> Result<Vec<String>> {
        let max = self.config.max_results.to_string();
        let res = self
            .client
            .get(self.endpoint("esearch.fcgi"))
            .query(&[
                ("db", "pubmed"),
                ("term", query),
                ("retmode", "json"),
                ("retmax", max.as_str()),
                ("sort", "date"),
            ])
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(anyhow!("PubMed search failed: HTTP {}", res.status()));
        }
        let envelope: SearchEnvelope = res.json().await?;
        Ok(envelope.esearchresult.map(|r| r.idlist).unwrap_or_default())
    }

    async fn summaries(&self, ids: &[String]) -> Result<Vec<EvidenceArticle>> {
        let joined = ids.join(",");
        let res = self
            .client
            .get(self.endpoint("esummary.fcgi"))
            .query(&[("db", "pubmed"), ("id", joined.as_str()), ("retmode", "json")])
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(anyhow!("PubMed summary failed: HTTP {}", res.status()));
        }
        let mut envelope: SummaryEnvelope = res.json().await?;
        let mut articles = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(raw) = envelope.result.remove(id) else {
                debug!("PubMed summary missing id {}", id);
                continue;
            };
            let item: SummaryItem = serde_json::from_value(raw)?;
            articles.push(EvidenceArticle {
                url: format!("https://pubmed.ncbi.nlm.nih.gov/{}/", item.uid),
                uid: item.uid,
                title: item.title,
                source: item.source,
                pubdate: item.pubdate,
                authors: item.authors.into_iter().map(|a| a.name).collect(),
                volume: item.volume,
            });
        }
        Ok(articles)
    }

    async fn try_search(&self, query: &str) -> Result<Vec<EvidenceArticle>> {
        let ids = self.search_ids(query).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.summaries(&ids).await
    }
}

#[async_trait]
impl EvidenceSearch for PubMedClient {
    async fn search(&self, query: &str) -> Vec<EvidenceArticle> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        match self.try_search(query).await {
            Ok(articles) => {
                info!("PubMed returned {} articles for '{}'", articles.len(), query);
                articles
            }
            Err(e) => {
                warn!("PubMed search for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }
}
