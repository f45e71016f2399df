use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use futures::FutureExt;
use serde_json::Value;
use vignette_coordinator::{FetchFuture, Fetcher};

/// Loads animation documents from disk.
///
/// Relative URLs resolve against `base`, normally the directory holding
/// the widget config. A `file://` prefix is accepted and stripped.
pub struct FileFetcher {
    base: PathBuf,
}

impl FileFetcher {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn resolve_path(&self, url: &str) -> PathBuf {
        let raw = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            self.base.join(raw)
        }
    }

    fn read(&self, url: &str) -> anyhow::Result<Value> {
        let path = self.resolve_path(url);
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let document = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        tracing::debug!(path = %path.display(), "animation document loaded");
        Ok(document)
    }
}

impl Fetcher for FileFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        futures::future::ready(self.read(url)).boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vignette-fetch-{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn relative_urls_resolve_against_base() {
        let fetcher = FileFetcher::new("/srv/widgets");
        assert_eq!(
            fetcher.resolve_path("wave/in.json"),
            PathBuf::from("/srv/widgets/wave/in.json")
        );
        assert_eq!(
            fetcher.resolve_path("file:///tmp/loop.json"),
            PathBuf::from("/tmp/loop.json")
        );
        assert_eq!(
            fetcher.resolve_path("file://action.json"),
            PathBuf::from("/srv/widgets/action.json")
        );
    }

    #[test]
    fn reads_and_parses_documents() {
        let dir = scratch("ok");
        fs::write(dir.join("in.json"), r#"{"nm":"in","ip":0,"op":60,"fr":30}"#).unwrap();

        let fetcher = FileFetcher::new(&dir);
        let doc = pollster::block_on(fetcher.fetch("in.json")).unwrap();
        assert_eq!(doc["nm"], "in");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = scratch("missing");
        let fetcher = FileFetcher::new(&dir);
        let err = pollster::block_on(fetcher.fetch("nope.json")).unwrap_err();
        assert!(err.to_string().contains("nope.json"), "got: {err}");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = scratch("invalid");
        fs::write(dir.join("bad.json"), "{ not json").unwrap();
        let fetcher = FileFetcher::new(&dir);
        let err = pollster::block_on(fetcher.fetch("bad.json")).unwrap_err();
        assert!(format!("{err:#}").contains("not valid JSON"), "got: {err:#}");
        let _ = fs::remove_dir_all(&dir);
    }
}
