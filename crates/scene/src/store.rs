//! Field storage and the one-shot load lifecycle.
//!
//! The store starts empty, receives exactly one load outcome per session and
//! is immutable afterwards. Lookups before that simply find nothing.

use std::collections::HashMap;
use std::future::Future;

use foundation::bounds::Aabb2;
use foundation::slug::Slug;
use formats::{FieldCollection, FieldCollectionError};
use tracing::{debug, info, warn};

use crate::field::{Field, FieldId};

/// Transport failure while fetching the feature payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug)]
pub enum LoadError {
    AlreadyStarted,
    Fetch { url: String, source: FetchError },
    Parse { url: String, source: FieldCollectionError },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::AlreadyStarted => write!(f, "feature data is fetched once per session"),
            LoadError::Fetch { url, source } => write!(f, "failed to fetch {url}: {source}"),
            LoadError::Parse { url, source } => write!(f, "failed to parse {url}: {source}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::AlreadyStarted => None,
            LoadError::Fetch { source, .. } => Some(source),
            LoadError::Parse { source, .. } => Some(source),
        }
    }
}

/// Fetches the raw feature payload. Implemented by the host (HTTP in the
/// browser, fixtures in tests).
pub trait FeatureSource {
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String, FetchError>>;
}

/// Joins the configured base URL and the data path.
pub fn feature_data_url(base_url: &str, data_path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        data_path.trim_start_matches('/')
    )
}

/// Performs the single GET and parses the payload.
pub async fn fetch_fields<S: FeatureSource>(
    source: &S,
    url: &str,
    name_property: &str,
) -> Result<FieldCollection, LoadError> {
    let payload = source.fetch_text(url).await.map_err(|e| LoadError::Fetch {
        url: url.to_string(),
        source: e,
    })?;
    FieldCollection::from_geojson_str(&payload, name_property).map_err(|e| LoadError::Parse {
        url: url.to_string(),
        source: e,
    })
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Payload of the load-complete event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub fields: usize,
    pub skipped: usize,
    pub failed: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SlugEntry {
    Unique(FieldId),
    Ambiguous,
}

#[derive(Debug, Default)]
pub struct FeatureStore {
    state: LoadState,
    fields: Vec<Field>,
    by_slug: HashMap<Slug, SlugEntry>,
    extent: Option<Aabb2>,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an already-loaded store.
    pub fn from_collection(collection: FieldCollection) -> Self {
        let mut store = Self::new();
        store.finish_load(Ok(collection));
        store
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, LoadState::Loaded | LoadState::Failed)
    }

    /// Marks the fetch as started. Only the first call succeeds.
    pub fn begin_load(&mut self) -> Result<(), LoadError> {
        if self.state != LoadState::Idle {
            return Err(LoadError::AlreadyStarted);
        }
        self.state = LoadState::Loading;
        Ok(())
    }

    /// Accepts the load outcome and returns the load-complete event.
    ///
    /// Returns `Some` exactly once per store; later outcomes are ignored. A
    /// failed load completes with zero fields.
    pub fn finish_load(
        &mut self,
        outcome: Result<FieldCollection, LoadError>,
    ) -> Option<LoadSummary> {
        if self.is_loaded() {
            debug!("ignoring repeated load outcome");
            return None;
        }

        let collection = match outcome {
            Ok(collection) => collection,
            Err(err) => {
                warn!("feature data unavailable: {err}");
                self.state = LoadState::Failed;
                return Some(LoadSummary {
                    fields: 0,
                    skipped: 0,
                    failed: true,
                });
            }
        };

        for skipped in &collection.skipped {
            warn!(index = skipped.index, "skipping feature: {}", skipped.reason);
        }
        let skipped = collection.skipped.len();

        for feature in collection.fields {
            let id = FieldId(self.fields.len() as u32);
            let Some(field) = Field::from_feature(id, feature) else {
                continue;
            };
            if field.slug.is_empty() {
                warn!(name = %field.name, "field name has no slug; it will not resolve");
            } else {
                self.by_slug
                    .entry(field.slug.clone())
                    .and_modify(|entry| *entry = SlugEntry::Ambiguous)
                    .or_insert(SlugEntry::Unique(id));
            }
            self.extent = Some(match self.extent {
                Some(e) => e.union(&field.extent),
                None => field.extent,
            });
            self.fields.push(field);
        }

        for (slug, entry) in &self.by_slug {
            if *entry == SlugEntry::Ambiguous {
                warn!(%slug, "several fields share a slug; it will not resolve");
            }
        }

        self.state = LoadState::Loaded;
        info!(fields = self.fields.len(), skipped, "feature data loaded");
        Some(LoadSummary {
            fields: self.fields.len(),
            skipped,
            failed: false,
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(id.index())
    }

    /// Finds the single field whose encoded name equals `slug`.
    ///
    /// No match and several matches both yield `None`.
    pub fn find_by_slug(&self, slug: &Slug) -> Option<&Field> {
        match self.by_slug.get(slug)? {
            SlugEntry::Unique(id) => self.get(*id),
            SlugEntry::Ambiguous => None,
        }
    }

    /// Extent of every loaded field; `None` while nothing is loaded.
    pub fn extent_of_all(&self) -> Option<Aabb2> {
        self.extent
    }
}
