use async_trait::async_trait;
use datawindow::{FetchMeta, Normalize, Range};

use crate::FetchError;

/// One fetched page.
///
/// `items` may be shorter than the requested range (end of data) or empty. When `error` is set
/// the page is discarded.
#[derive(Debug)]
pub struct FetchResult<R> {
    pub items: Vec<R>,
    pub meta: Option<FetchMeta>,
    pub error: Option<FetchError>,
}

impl<R> FetchResult<R> {
    pub fn ok(items: Vec<R>) -> Self {
        Self {
            items,
            meta: None,
            error: None,
        }
    }

    pub fn failed(error: FetchError) -> Self {
        Self {
            items: Vec::new(),
            meta: None,
            error: Some(error),
        }
    }

    pub fn with_meta(mut self, meta: FetchMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn total_count(&self) -> Option<usize> {
        self.meta.as_ref().and_then(|m| m.total_count)
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

/// An asynchronous provider of pages over a remote or local collection.
///
/// `range` is advisory-maximal: a source may return fewer items, for example at the end of the
/// collection. Failures are reported inside the result, never by panicking.
#[async_trait]
pub trait DataSource: Normalize + Send + Sync {
    async fn fetch(&self, range: Range) -> FetchResult<Self::Raw>;
}
