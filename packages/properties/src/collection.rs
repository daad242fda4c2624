//! Property-driven operations over whole collections.

use wilayah_boundary_models::{AdminLevel, FeatureCollection, properties_of};

use crate::{district_id, label_for};

/// Extension operations on [`FeatureCollection`] that need the property
/// resolver.
pub trait CollectionExt {
    /// Narrows the collection to features whose resolved district id equals
    /// `district_id`.
    ///
    /// When nothing matches the collection is left unchanged. Returns the
    /// number of features retained.
    fn retain_district(&mut self, district_id: &str) -> usize;

    /// Tooltip labels of every feature, in order. Features without a
    /// resolvable name are skipped.
    fn labels(&self) -> Vec<String>;
}

impl CollectionExt for FeatureCollection {
    fn retain_district(&mut self, wanted: &str) -> usize {
        let matching = self
            .features
            .iter()
            .filter(|f| district_id(properties_of(f)).as_deref() == Some(wanted))
            .count();

        if matching == 0 {
            log::warn!(
                "No features matched district {wanted}; keeping all {} features",
                self.features.len()
            );
            return self.features.len();
        }

        self.features
            .retain(|f| district_id(properties_of(f)).as_deref() == Some(wanted));
        log::debug!("Narrowed collection to {matching} features of district {wanted}");
        matching
    }

    fn labels(&self) -> Vec<String> {
        let level = self.level;
        self.features
            .iter()
            .filter_map(|f| label_for(level, properties_of(f)))
            .collect()
    }
}

/// The label a tooltip should show for a feature at `level`.
#[must_use]
pub fn tooltip_label(level: AdminLevel, feature: &wilayah_boundary_models::Feature) -> Option<String> {
    label_for(level, properties_of(feature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wilayah_boundary_models::Feature;

    fn feature(props: serde_json::Value) -> Feature {
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: props.as_object().cloned(),
            foreign_members: None,
        }
    }

    fn districts() -> FeatureCollection {
        FeatureCollection::new(
            AdminLevel::District,
            Some("51".to_string()),
            vec![
                feature(json!({"kab_name": "Badung", "regency_code": "5103"})),
                feature(json!({"kab_name": "Gianyar", "regency_code": "5104"})),
                feature(json!({"kab_name": "Badung", "district_code": "5103020"})),
            ],
        )
    }

    #[test]
    fn retains_only_selected_district() {
        let mut collection = districts();
        assert_eq!(collection.retain_district("5103"), 2);
        assert_eq!(collection.labels(), vec!["Badung", "Badung"]);
    }

    #[test]
    fn unmatched_district_keeps_everything() {
        let mut collection = districts();
        assert_eq!(collection.retain_district("3510"), 3);
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn tooltip_uses_collection_level() {
        let f = feature(json!({"kab_name": "Badung", "kec_name": "Kuta"}));
        assert_eq!(tooltip_label(AdminLevel::District, &f).as_deref(), Some("Badung"));
        assert_eq!(tooltip_label(AdminLevel::Subdistrict, &f).as_deref(), Some("Kuta"));
    }
}
