//! The collection loader.

use std::sync::Arc;
use std::time::Duration;

use geojson::Feature;
use wilayah_boundary_models::{AdminLevel, FeatureCollection, LoadResult, properties_of};
use wilayah_properties::enrich::{enrich_district_feature, enrich_subdistrict_feature, humanize_file_id};
use wilayah_properties::{PROVINCE_CODE_LEN, district_id, district_name, first_digit_run, province_code};
use wilayah_registry::HierarchyRegistry;
use wilayah_registry_models::{DistrictConfig, SubdistrictFile};

use crate::parse::parse_features;
use crate::progress::{ProgressCallback, null_progress};
use crate::source::DataSource;
use crate::{LoaderConfig, LoaderError};

/// Loads province, district and subdistrict collections.
///
/// Cheap to clone; clones share the registry, source and progress sink.
#[derive(Clone)]
pub struct CollectionLoader {
    registry: Arc<HierarchyRegistry>,
    source: Arc<dyn DataSource>,
    config: LoaderConfig,
    progress: Arc<dyn ProgressCallback>,
}

impl CollectionLoader {
    /// A loader reading through `source`.
    #[must_use]
    pub fn new(
        registry: Arc<HierarchyRegistry>,
        source: Arc<dyn DataSource>,
        config: LoaderConfig,
    ) -> Self {
        Self {
            registry,
            source,
            config,
            progress: null_progress(),
        }
    }

    /// A loader reading from `config.location`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data source cannot be built.
    pub fn from_config(registry: Arc<HierarchyRegistry>, config: LoaderConfig) -> Result<Self, LoaderError> {
        let source = config.source()?;
        Ok(Self::new(registry, source, config))
    }

    /// Reports per-file progress to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// The registry lookups go through.
    #[must_use]
    pub const fn registry(&self) -> &Arc<HierarchyRegistry> {
        &self.registry
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Fetches and parses one file, bounded by the fetch deadline.
    ///
    /// # Errors
    ///
    /// Returns the per-file failure: fetch error, timeout, HTML body,
    /// malformed JSON or zero features.
    pub async fn fetch_features(&self, path: &str) -> Result<Vec<Feature>, LoaderError> {
        let deadline = self.config.fetch_deadline();
        let body = tokio::time::timeout(deadline, self.source.fetch_text(path))
            .await
            .map_err(|_| LoaderError::Timeout {
                path: path.to_string(),
                after: deadline,
            })??;
        parse_features(path, &body)
    }

    /// Assembles the subdistrict collection of one district.
    ///
    /// Subdistrict files are fetched sequentially in catalog order; each
    /// failing file is logged and skipped. When none loads, the district's
    /// fallback file is served with `loaded_count == 0`. Never fails: every
    /// outcome is encoded in the returned [`LoadResult`].
    pub async fn load_subdistricts(&self, district_identifier: &str) -> LoadResult {
        let identifier = district_identifier.trim();
        if identifier.is_empty() {
            return LoadResult::failed("No district ID provided");
        }

        let Some(district) = self.registry.lookup_district(identifier) else {
            let error = format!("No configuration found for district ID: {identifier}");
            log::error!("{error}");
            return LoadResult::failed(error);
        };

        log::info!(
            "Loading {} subdistrict files for {} ({})",
            district.subdistricts.len(),
            district.name,
            district.id
        );

        let total = district.subdistricts.len();
        self.progress.set_total(total as u64);

        let mut features = Vec::new();
        let mut loaded = 0;
        for file in &district.subdistricts {
            let path = district.subdistrict_path(file);
            self.progress.set_message(file.id.clone());

            match self.fetch_features(&path).await {
                Ok(mut batch) => {
                    let name = subdistrict_display_name(file);
                    for feature in &mut batch {
                        enrich_subdistrict_feature(feature, &name, &district.id);
                    }
                    log::debug!("Loaded {} features from {}", batch.len(), self.source.describe(&path));
                    features.append(&mut batch);
                    loaded += 1;
                }
                Err(e) => log::warn!("Failed to load {}: {e}", self.source.describe(&path)),
            }
            self.progress.inc(1);
        }

        if loaded > 0 {
            log::info!(
                "Loaded {loaded}/{total} subdistrict files with {} features for {}",
                features.len(),
                district.name
            );
            self.progress.finish(format!("{}: {loaded}/{total} files", district.name));
            let collection = FeatureCollection::new(AdminLevel::Subdistrict, Some(district.id.clone()), features);
            return LoadResult::loaded(collection, loaded, total);
        }

        if let Some(fallback) = self.load_fallback(district).await {
            self.progress.finish(format!("{}: fallback", district.name));
            return LoadResult::loaded(fallback, 0, total);
        }

        let error = exhausted_message(district);
        log::error!("{error}");
        self.progress.finish(format!("{}: failed", district.name));
        LoadResult::exhausted(error, total)
    }

    async fn load_fallback(&self, district: &DistrictConfig) -> Option<FeatureCollection> {
        let path = district.fallback_path()?;
        log::info!(
            "No subdistrict files loaded for {}, trying fallback {}",
            district.name,
            self.source.describe(&path)
        );

        match self.fetch_features(&path).await {
            Ok(features) => {
                log::info!("Loaded fallback with {} features for {}", features.len(), district.name);
                Some(FeatureCollection::new(
                    AdminLevel::District,
                    Some(district.id.clone()),
                    features,
                ))
            }
            Err(e) => {
                log::warn!("Failed to load fallback {}: {e}", self.source.describe(&path));
                None
            }
        }
    }

    /// Loads the province boundary collection.
    ///
    /// # Errors
    ///
    /// Returns the failure of the provinces file.
    pub async fn load_provinces(&self) -> Result<FeatureCollection, LoaderError> {
        let path = &self.config.provinces_file;
        let features = self.fetch_features(path).await?;
        log::info!("Loaded {} province features", features.len());
        Ok(FeatureCollection::new(AdminLevel::Province, None, features))
    }

    /// Loads the districts of one province.
    ///
    /// Reads the province's own districts file, or the national one, and
    /// keeps the features that belong to the province. Kept features gain
    /// `regency_code` and `province_code` when they have none.
    ///
    /// # Errors
    ///
    /// Returns the failure of the districts file.
    pub async fn load_districts(&self, province_identifier: &str) -> Result<FeatureCollection, LoaderError> {
        let province = self.registry.lookup_province(province_identifier);
        let province_id = match province {
            Some(p) => p.id.clone(),
            None => first_digit_run(province_identifier)
                .map(String::from)
                .ok_or_else(|| LoaderError::UnknownProvince(province_identifier.trim().to_string()))?,
        };

        let path = province
            .and_then(|p| p.districts_file.clone())
            .unwrap_or_else(|| self.config.default_districts_file.clone());

        let features = self.fetch_features(&path).await?;
        let total = features.len();

        let kept: Vec<Feature> = features
            .into_iter()
            .filter(|f| self.belongs_to_province(f, &province_id))
            .map(|mut f| {
                if let Some(code) = self.regency_code(&f) {
                    enrich_district_feature(&mut f, &code);
                }
                f
            })
            .collect();

        log::info!(
            "Kept {}/{total} district features for province {province_id}",
            kept.len()
        );
        Ok(FeatureCollection::new(AdminLevel::District, Some(province_id), kept))
    }

    /// Whether a district feature belongs to `province_id`, by the first
    /// rule that matches: its resolved code, its name in the registry, or
    /// an explicit province key.
    fn belongs_to_province(&self, feature: &Feature, province_id: &str) -> bool {
        let props = properties_of(feature);

        if district_id(props).is_some_and(|code| code.get(..PROVINCE_CODE_LEN) == Some(province_id)) {
            return true;
        }

        if district_name(props)
            .and_then(|name| self.registry.lookup_district(&name))
            .is_some_and(|d| d.id.starts_with(province_id))
        {
            return true;
        }

        province_code(props).is_some_and(|code| code == province_id)
    }

    /// Canonical code of a district feature: the registry id found by name,
    /// else the resolved code.
    fn regency_code(&self, feature: &Feature) -> Option<String> {
        let props = properties_of(feature);
        district_name(props)
            .and_then(|name| self.registry.lookup_district(&name))
            .map(|d| d.id.clone())
            .or_else(|| district_id(props))
    }

    /// The fetch deadline currently in effect.
    #[must_use]
    pub fn fetch_deadline(&self) -> Duration {
        self.config.fetch_deadline()
    }
}

fn subdistrict_display_name(file: &SubdistrictFile) -> String {
    file.name.clone().unwrap_or_else(|| {
        let name = humanize_file_id(&file.id);
        if name.is_empty() { file.id.clone() } else { name }
    })
}

fn exhausted_message(district: &DistrictConfig) -> String {
    let fallback = district
        .fallback_file
        .as_ref()
        .map(|f| format!(" and fallback file {f}"))
        .unwrap_or_default();
    format!(
        "Failed to load any data for district {} ({}). Tried {} subdistrict files{fallback}.",
        district.name,
        district.id,
        district.subdistricts.len()
    )
}
