//! Sources of county boundary feature collections.

use async_trait::async_trait;
use geojson::{FeatureCollection, GeoJson};
use std::path::PathBuf;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::{HttpClient, fetch_bytes};
use crate::error::Result;

/// Supplies a GeoJSON feature collection whose feature ids are region codes.
#[async_trait]
pub trait BoundarySource: Send + Sync {
    async fn fetch(&self) -> Result<FeatureCollection>;
}

/// Parses a GeoJSON document that must be a `FeatureCollection`.
pub fn parse_boundaries(bytes: &[u8]) -> Result<FeatureCollection> {
    let geojson: GeoJson = serde_json::from_slice(bytes)?;
    Ok(FeatureCollection::try_from(geojson)?)
}

/// Fetches boundaries over HTTP.
pub struct HttpBoundarySource<C> {
    pub client: C,
    pub url: String,
}

#[async_trait]
impl<C: HttpClient> BoundarySource for HttpBoundarySource<C> {
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<FeatureCollection> {
        let bytes = fetch_bytes(&self.client, &self.url).await?;
        let collection = parse_boundaries(&bytes)?;
        info!(features = collection.features.len(), "Boundaries fetched");
        Ok(collection)
    }
}

/// Reads boundaries from a local GeoJSON file.
pub struct FileBoundarySource {
    pub path: PathBuf,
}

#[async_trait]
impl BoundarySource for FileBoundarySource {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> Result<FeatureCollection> {
        let bytes = tokio::fs::read(&self.path).await?;
        let collection = parse_boundaries(&bytes)?;
        info!(features = collection.features.len(), "Boundaries read");
        Ok(collection)
    }
}

/// Keeps the first successful fetch for the rest of the process.
///
/// A failed fetch is not cached; the next call tries again.
pub struct CachedBoundaries<S> {
    inner: S,
    cell: OnceCell<FeatureCollection>,
}

impl<S: BoundarySource> CachedBoundaries<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cell: OnceCell::new(),
        }
    }

    fn is_cached(&self) -> bool {
        self.cell.initialized()
    }
}

#[async_trait]
impl<S: BoundarySource> BoundarySource for CachedBoundaries<S> {
    async fn fetch(&self) -> Result<FeatureCollection> {
        if self.is_cached() {
            debug!("Serving cached boundaries");
        }
        let collection = self.cell.get_or_try_init(|| self.inner.fetch()).await?;
        Ok(collection.clone())
    }
}

/// Fetches boundaries, or returns `None` after logging when the fetch fails
/// and `allow_missing_geometry` is set.
pub async fn fetch_or_degrade<S: BoundarySource + ?Sized>(
    source: &S,
    allow_missing_geometry: bool,
) -> Result<Option<FeatureCollection>> {
    match source.fetch().await {
        Ok(collection) => Ok(Some(collection)),
        Err(e) if allow_missing_geometry => {
            warn!(error = %e, "Boundary fetch failed, continuing without geometry");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FoodAccessError;
    use std::env;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": "25025", "properties": {"NAME": "Suffolk"},
             "geometry": {"type": "Polygon", "coordinates":
                [[[-71.1, 42.3], [-71.0, 42.3], [-71.0, 42.4], [-71.1, 42.3]]]}}
        ]
    }"#;

    struct CountingSource {
        calls: AtomicUsize,
        fail_first: bool,
    }

    #[async_trait]
    impl BoundarySource for CountingSource {
        async fn fetch(&self) -> Result<FeatureCollection> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && call == 0 {
                return Err(FoodAccessError::InvalidParameter("unreachable".into()));
            }
            parse_boundaries(SAMPLE.as_bytes())
        }
    }

    #[test]
    fn test_parse_feature_collection() {
        let collection = parse_boundaries(SAMPLE.as_bytes()).unwrap();
        assert_eq!(collection.features.len(), 1);
    }

    #[test]
    fn test_parse_rejects_bare_geometry() {
        let geometry = r#"{"type": "Point", "coordinates": [-71.0, 42.0]}"#;
        assert!(parse_boundaries(geometry.as_bytes()).is_err());
        assert!(parse_boundaries(b"not json").is_err());
    }

    #[tokio::test]
    async fn test_file_source() {
        let path = env::temp_dir().join("ma_food_access_test_boundaries.geojson");
        fs::write(&path, SAMPLE).unwrap();

        let source = FileBoundarySource { path: path.clone() };
        let collection = source.fetch().await.unwrap();
        assert_eq!(collection.features.len(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_cache_fetches_once() {
        let cached = CachedBoundaries::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail_first: false,
        });

        assert!(!cached.is_cached());
        cached.fetch().await.unwrap();
        cached.fetch().await.unwrap();

        assert!(cached.is_cached());
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_retries_after_failure() {
        let cached = CachedBoundaries::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail_first: true,
        });

        assert!(cached.fetch().await.is_err());
        assert!(cached.fetch().await.is_ok());
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_degrade_on_failure() {
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            fail_first: true,
        };
        assert!(fetch_or_degrade(&source, true).await.unwrap().is_none());

        let source = CountingSource {
            calls: AtomicUsize::new(0),
            fail_first: true,
        };
        assert!(fetch_or_degrade(&source, false).await.is_err());
    }
}
