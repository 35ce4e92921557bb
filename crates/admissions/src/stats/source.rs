use super::domain::AdmissionRecord;
use super::ingest::StatsDocument;
use super::report::Datasets;
use crate::config::SourceConfig;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const USER_AGENT: &str = concat!("admissions/", env!("CARGO_PKG_VERSION"));

/// Failure to obtain one of the statistics documents.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
    #[error("{origin} is not a valid statistics document: {source}")]
    Decode {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Current,
    Prior,
}

impl Period {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "current period",
            Self::Prior => "prior period",
        }
    }
}

/// Where a period's statistics come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Remote(String),
    File(PathBuf),
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Parses a `{ "data": [...] }` document.
pub fn parse_document(bytes: &[u8], origin: &str) -> Result<Vec<AdmissionRecord>, FetchError> {
    serde_json::from_slice::<StatsDocument>(bytes)
        .map(StatsDocument::into_records)
        .map_err(|source| FetchError::Decode {
            origin: origin.to_string(),
            source,
        })
}

pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<AdmissionRecord>, FetchError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&bytes, &path.display().to_string())
}

/// Non-blocking variant of [`from_path`] for use on the runtime.
pub async fn read_path<P: AsRef<Path>>(path: P) -> Result<Vec<AdmissionRecord>, FetchError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_document(&bytes, &path.display().to_string())
}

/// Loads statistics documents over HTTP or from disk.
#[derive(Debug, Clone)]
pub struct StatsClient {
    http: reqwest::Client,
    sources: SourceConfig,
}

impl StatsClient {
    pub fn new(sources: SourceConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(sources.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { http, sources })
    }

    /// The configured location for `period`.
    pub fn source_for(&self, period: Period) -> DatasetSource {
        match period {
            Period::Current => DatasetSource::Remote(self.sources.current_url.clone()),
            Period::Prior => DatasetSource::Remote(self.sources.prior_url.clone()),
        }
    }

    pub async fn fetch_url(&self, url: &str) -> Result<Vec<AdmissionRecord>, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.http.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        parse_document(&body, url)
    }

    pub async fn load(
        &self,
        period: Period,
        source: &DatasetSource,
    ) -> Result<Vec<AdmissionRecord>, FetchError> {
        let result = match source {
            DatasetSource::Remote(url) => self.fetch_url(url).await,
            DatasetSource::File(path) => read_path(path).await,
        };

        match &result {
            Ok(records) => {
                info!(period = period.label(), %source, records = records.len(), "loaded admission statistics")
            }
            Err(err) => warn!(period = period.label(), %source, error = %err, "failed to load admission statistics"),
        }

        result
    }

    /// Loads the configured current-period document.
    pub async fn load_current(&self) -> Result<Datasets, FetchError> {
        let current = self
            .load(Period::Current, &self.source_for(Period::Current))
            .await?;
        Ok(Datasets::current_only(current))
    }

    /// Loads both periods concurrently. Either failure fails the whole load.
    pub async fn load_pair(
        &self,
        current: &DatasetSource,
        prior: &DatasetSource,
    ) -> Result<Datasets, FetchError> {
        let (current, prior) = tokio::try_join!(
            self.load(Period::Current, current),
            self.load(Period::Prior, prior)
        )?;
        Ok(Datasets::with_prior(current, prior))
    }

    pub async fn load_configured(&self) -> Result<Datasets, FetchError> {
        let current = self.source_for(Period::Current);
        let prior = self.source_for(Period::Prior);
        self.load_pair(&current, &prior).await
    }
}
