use anyhow::{Context, Result};
use futures::future::{try_join3, LocalBoxFuture};
use serde_json::Value;
use vignette_config::SourceUrls;

use crate::illustration::Illustration;

/// Future returned by [`Fetcher::fetch`].
pub type FetchFuture<'a> = LocalBoxFuture<'a, Result<Value>>;

/// Retrieves one animation document by URL and parses it as JSON.
pub trait Fetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a>;
}

/// Where the documents of an illustration come from.
#[derive(Debug, Clone, PartialEq)]
pub enum IllustrationSource {
    /// A complete triple supplied directly by the host.
    Inline(Illustration),
    /// Three URLs fetched concurrently.
    Urls(SourceUrls),
}

impl IllustrationSource {
    /// Resolve the source into a complete illustration.
    ///
    /// Fails when any fetch fails or a fetched document is empty.
    pub async fn resolve(&self, fetcher: &dyn Fetcher) -> Result<Illustration> {
        match self {
            Self::Inline(illustration) => Ok(illustration.clone()),
            Self::Urls(urls) => {
                let (entrance, idle, action) = try_join3(
                    fetch_document(fetcher, &urls.entrance),
                    fetch_document(fetcher, &urls.idle),
                    fetch_document(fetcher, &urls.action),
                )
                .await?;
                Illustration::new(entrance, idle, action)
            }
        }
    }
}

async fn fetch_document(fetcher: &dyn Fetcher, url: &str) -> Result<Value> {
    fetcher
        .fetch(url)
        .await
        .with_context(|| format!("failed to load animation data from {url}"))
}
