//! Decoded scene payload.
//!
//! A payload is a CBOR map with a plot id and a list of geometry entries.
//! Keys follow the exporter's naming (`Plot`, `Geometry`, `Type`, ...).
//! Every key except `Plot`, `Type` and `Id` is optional and defaults to an
//! empty array, `false` or `0.0`.

use fieldplot_core::mesh::{GeometryKind, MeshId, PlotId};
use fieldplot_core::Label;
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};

/// One decoded scene document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(rename = "Plot")]
    pub plot: PlotId,
    #[serde(rename = "Geometry", default)]
    pub geometry: Vec<GeometryEntry>,
}

impl SceneDocument {
    pub fn new(plot: PlotId) -> Self {
        Self {
            plot,
            geometry: Vec::new(),
        }
    }

    pub fn with_entry(mut self, entry: GeometryEntry) -> Self {
        self.geometry.push(entry);
        self
    }

    /// Decode a CBOR payload.
    ///
    /// A field with the wrong type fails the whole document.
    pub fn decode(payload: &[u8]) -> ImportResult<Self> {
        ciborium::from_reader(payload).map_err(|e| ImportError::Decode(e.to_string()))
    }

    /// Encode into a CBOR payload.
    pub fn encode(&self) -> ImportResult<Vec<u8>> {
        let mut payload = Vec::new();
        ciborium::into_writer(self, &mut payload).map_err(|e| ImportError::Encode(e.to_string()))?;
        Ok(payload)
    }
}

/// One curve, mesh or volume of a scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryEntry {
    /// Kind name, e.g. `"Mesh3D"`. Parsed with [`GeometryEntry::kind`].
    #[serde(rename = "Type")]
    pub kind_name: String,
    #[serde(rename = "Id")]
    pub id: MeshId,
    /// Flattened `xyz` positions.
    #[serde(rename = "Vertices", default)]
    pub vertices: Vec<f32>,
    #[serde(rename = "MeshIndices", default)]
    pub mesh_indices: Vec<u32>,
    #[serde(rename = "MeshLabels", default)]
    pub mesh_labels: Vec<Label>,
    #[serde(rename = "IsoValues", default)]
    pub iso_values: bool,
    #[serde(rename = "IsoVector", default)]
    pub iso_vector: bool,
    /// Field samples: one per vertex for scalars, two per vertex for vectors.
    #[serde(rename = "IsoV1", default)]
    pub iso_samples: Vec<f32>,
    /// Reference triangle exported alongside the samples. Not used for coloring.
    #[serde(rename = "IsoPSub", default, skip_serializing_if = "Vec::is_empty")]
    pub iso_reference: Vec<f32>,
    #[serde(rename = "IsoMin", default)]
    pub iso_min: f32,
    #[serde(rename = "IsoMax", default)]
    pub iso_max: f32,
    #[serde(rename = "Borders", default)]
    pub borders: bool,
    #[serde(rename = "BorderIndices", default)]
    pub border_indices: Vec<u32>,
    #[serde(rename = "BorderLabels", default)]
    pub border_labels: Vec<Label>,
    #[serde(rename = "LineWidth", default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f32>,
}

impl GeometryEntry {
    pub fn new(kind: GeometryKind, id: MeshId) -> Self {
        Self {
            kind_name: kind.name().to_string(),
            id,
            ..Default::default()
        }
    }

    /// Parsed kind, or `None` for an unknown kind name.
    pub fn kind(&self) -> Option<GeometryKind> {
        GeometryKind::from_name(&self.kind_name)
    }

    pub fn with_mesh(mut self, vertices: Vec<f32>, indices: Vec<u32>, labels: Vec<Label>) -> Self {
        self.vertices = vertices;
        self.mesh_indices = indices;
        self.mesh_labels = labels;
        self
    }

    pub fn with_scalar_field(mut self, samples: Vec<f32>, min: f32, max: f32) -> Self {
        self.iso_values = true;
        self.iso_vector = false;
        self.iso_samples = samples;
        self.iso_min = min;
        self.iso_max = max;
        self
    }

    pub fn with_vector_field(mut self, samples: Vec<f32>, min: f32, max: f32) -> Self {
        self.iso_values = true;
        self.iso_vector = true;
        self.iso_samples = samples;
        self.iso_min = min;
        self.iso_max = max;
        self
    }

    pub fn with_border(mut self, indices: Vec<u32>, labels: Vec<Label>) -> Self {
        self.borders = true;
        self.border_indices = indices;
        self.border_labels = labels;
        self
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = Some(width);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciborium::Value;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn encode_value(value: &Value) -> Vec<u8> {
        let mut payload = Vec::new();
        ciborium::into_writer(value, &mut payload).unwrap();
        payload
    }

    #[test]
    fn optional_keys_default() {
        let value = Value::Map(vec![
            (text("Plot"), Value::Integer(7.into())),
            (
                text("Geometry"),
                Value::Array(vec![Value::Map(vec![
                    (text("Type"), text("Curve2D")),
                    (text("Id"), Value::Integer(3.into())),
                ])]),
            ),
        ]);

        let document = SceneDocument::decode(&encode_value(&value)).unwrap();

        assert_eq!(document.plot, 7);
        let entry = &document.geometry[0];
        assert_eq!(entry.kind(), Some(GeometryKind::Curve2D));
        assert_eq!(entry.id, 3);
        assert!(entry.vertices.is_empty());
        assert!(!entry.iso_values);
        assert!(!entry.borders);
        assert_eq!(entry.line_width, None);
    }

    #[test]
    fn wrong_field_type_fails_decode() {
        let value = Value::Map(vec![
            (text("Plot"), Value::Integer(1.into())),
            (
                text("Geometry"),
                Value::Array(vec![Value::Map(vec![
                    (text("Type"), text("Mesh3D")),
                    (text("Id"), Value::Integer(0.into())),
                    (text("Vertices"), text("not an array")),
                ])]),
            ),
        ]);

        let err = SceneDocument::decode(&encode_value(&value)).unwrap_err();
        assert!(matches!(err, ImportError::Decode(_)));
    }

    #[test]
    fn garbage_payload_fails_decode() {
        assert!(matches!(
            SceneDocument::decode(&[0xff, 0x00, 0x13]),
            Err(ImportError::Decode(_))
        ));
    }

    #[test]
    fn encoded_document_decodes_to_same_entries() {
        let document = SceneDocument::new(2).with_entry(
            GeometryEntry::new(GeometryKind::Mesh2D, 9)
                .with_mesh(vec![0.0; 9], vec![0, 1, 2], vec![4, 4, 4])
                .with_scalar_field(vec![0.0, 0.5, 1.0], 0.0, 1.0)
                .with_line_width(2.0),
        );

        let decoded = SceneDocument::decode(&document.encode().unwrap()).unwrap();
        assert_eq!(decoded, document);
    }

    #[test]
    fn unknown_kind_name_is_kept() {
        let entry = GeometryEntry {
            kind_name: "Surface".to_string(),
            ..Default::default()
        };
        assert_eq!(entry.kind(), None);
    }
}
