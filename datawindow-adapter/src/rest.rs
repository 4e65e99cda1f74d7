//! HTTP/JSON data source.
//!
//! Wire contract: `GET {url}?{default params}&offset={start}&limit={length}` answers with a JSON
//! array of rows. The collection's total count, when the server knows it, is embedded in every
//! row under a configurable field (`total_count` by default) and read from the first one.

use std::collections::BTreeMap;

use async_trait::async_trait;
use datawindow::{FetchMeta, Normalize, Normalized, Normalizer, Range};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{DataSource, FetchError, FetchResult};

pub const DEFAULT_TOTAL_COUNT_FIELD: &str = "total_count";

/// A decoded response body.
#[derive(Clone, Debug, PartialEq)]
pub struct RestPage<TIn> {
    pub items: Vec<TIn>,
    pub total_count: Option<usize>,
}

pub struct RestDataSource<TIn, TOut = TIn> {
    http: Client,
    url: String,
    default_params: BTreeMap<String, String>,
    total_count_field: String,
    normalizer: Normalizer<TIn, TOut>,
}

impl<TIn, TOut> Clone for RestDataSource<TIn, TOut> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            url: self.url.clone(),
            default_params: self.default_params.clone(),
            total_count_field: self.total_count_field.clone(),
            normalizer: self.normalizer.clone(),
        }
    }
}

impl<TIn, TOut> std::fmt::Debug for RestDataSource<TIn, TOut> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestDataSource")
            .field("url", &self.url)
            .field("default_params", &self.default_params)
            .field("total_count_field", &self.total_count_field)
            .finish_non_exhaustive()
    }
}

impl<TIn, TOut> RestDataSource<TIn, TOut> {
    pub fn new(url: impl Into<String>, normalizer: Normalizer<TIn, TOut>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            default_params: BTreeMap::new(),
            total_count_field: DEFAULT_TOTAL_COUNT_FIELD.to_string(),
            normalizer,
        }
    }

    /// Shares an existing client (connection pool, default headers, timeouts).
    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_total_count_field(mut self, field: impl Into<String>) -> Self {
        self.total_count_field = field.into();
        self
    }

    /// A new source whose default query params are these merged over the current ones.
    pub fn with_params<K, V>(&self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut next = self.clone();
        next.default_params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        next
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn default_params(&self) -> &BTreeMap<String, String> {
        &self.default_params
    }

    /// Query pairs for `range`. `offset`/`limit` always win over default params.
    pub fn query_for(&self, range: Range) -> Vec<(String, String)> {
        let mut query: Vec<(String, String)> = self
            .default_params
            .iter()
            .filter(|(k, _)| k.as_str() != "offset" && k.as_str() != "limit")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        query.push(("offset".into(), range.start.to_string()));
        query.push(("limit".into(), range.length.to_string()));
        query
    }
}

impl<TIn: DeserializeOwned, TOut> RestDataSource<TIn, TOut> {
    async fn fetch_page(&self, range: Range) -> Result<RestPage<TIn>, FetchError> {
        let res = self
            .http
            .get(&self.url)
            .query(&self.query_for(range))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }
        let body = res.bytes().await?;
        parse_page(&body, &self.total_count_field)
    }
}

/// Decodes a JSON array of rows, reading the total count from the first row's
/// `total_count_field`.
pub fn parse_page<TIn: DeserializeOwned>(
    body: &[u8],
    total_count_field: &str,
) -> Result<RestPage<TIn>, FetchError> {
    let rows: Vec<serde_json::Value> = serde_json::from_slice(body)?;
    let total_count = rows
        .first()
        .and_then(|row| row.get(total_count_field))
        .and_then(serde_json::Value::as_u64)
        .and_then(|n| usize::try_from(n).ok());
    let items = rows
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<TIn>, _>>()?;
    Ok(RestPage { items, total_count })
}

impl<TIn, TOut> Normalize for RestDataSource<TIn, TOut> {
    type Raw = TIn;
    type Item = TOut;

    fn normalize(&self, raw: TIn) -> Normalized<TOut> {
        self.normalizer.normalize(raw)
    }
}

#[async_trait]
impl<TIn, TOut> DataSource for RestDataSource<TIn, TOut>
where
    TIn: DeserializeOwned + Send + Sync + 'static,
    TOut: Send + Sync + 'static,
{
    async fn fetch(&self, range: Range) -> FetchResult<TIn> {
        match self.fetch_page(range).await {
            Ok(page) => {
                atrace!(
                    url = %self.url,
                    offset = range.start,
                    returned = page.items.len(),
                    total = ?page.total_count,
                    "RestDataSource::fetch"
                );
                let meta = FetchMeta {
                    total_count: page.total_count,
                    ..FetchMeta::default()
                };
                FetchResult::ok(page.items).with_meta(meta)
            }
            Err(error) => {
                awarn!(url = %self.url, offset = range.start, %error, "data fetch error");
                FetchResult::failed(error)
            }
        }
    }
}
