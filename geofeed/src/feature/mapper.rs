//! Raw document to feature conversion.

use std::collections::BTreeMap;

use geojson::{Feature, Geometry, JsonObject};
use serde_json::Value;

use crate::document::{get_nested, get_nested_mut, split_path};
use crate::source::SourceError;

use super::new_feature;

/// Converts raw backend documents into features.
///
/// The geometry is read from a (possibly nested) configured field and removed
/// from the document, so it never shows up again as a property. Configured
/// properties are then resolved against what remains; properties whose path
/// does not resolve are left out. Every feature also carries an `id`
/// property equal to its identifier.
#[derive(Debug, Clone)]
pub struct FeatureMapper {
    geometry_field: String,
    geometry_path: Vec<String>,
    properties: BTreeMap<String, Vec<String>>,
}

impl FeatureMapper {
    /// Creates a mapper for a geometry field and a property → path mapping.
    pub fn new(geometry_field: &str, source_fields: &BTreeMap<String, String>) -> Self {
        let properties = source_fields
            .iter()
            .map(|(property, path)| (property.clone(), split_path(path)))
            .collect();

        Self {
            geometry_field: geometry_field.to_string(),
            geometry_path: split_path(geometry_field),
            properties,
        }
    }

    /// Dotted geometry field this mapper extracts.
    pub fn geometry_field(&self) -> &str {
        &self.geometry_field
    }

    /// Maps one document to a feature.
    ///
    /// # Errors
    ///
    /// - `SourceError::FieldNotFound` if the geometry path does not resolve
    /// - `SourceError::Decode` if the geometry is not valid GeoJSON
    pub fn map(&self, id: &str, mut document: Value) -> Result<Feature, SourceError> {
        let geometry = self.take_geometry(&mut document)?;

        let mut properties = JsonObject::new();
        for (property, path) in &self.properties {
            if let Some(value) = get_nested(&document, path) {
                properties.insert(property.clone(), value.clone());
            }
        }
        properties.insert("id".to_string(), Value::String(id.to_string()));

        Ok(new_feature(id, geometry, properties))
    }

    /// Removes the geometry value from `document` and decodes it.
    fn take_geometry(&self, document: &mut Value) -> Result<Geometry, SourceError> {
        let not_found = || SourceError::FieldNotFound {
            field: self.geometry_field.clone(),
        };

        let (last, parents) = self.geometry_path.split_last().ok_or_else(not_found)?;
        let parent = get_nested_mut(document, parents)
            .and_then(Value::as_object_mut)
            .ok_or_else(not_found)?;
        let raw = parent.remove(last).ok_or_else(not_found)?;

        serde_json::from_value::<Geometry>(raw).map_err(|e| {
            SourceError::Decode(format!(
                "invalid geometry at field {}: {}",
                self.geometry_field, e
            ))
        })
    }
}
