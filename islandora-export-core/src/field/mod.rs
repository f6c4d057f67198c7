//! Typed field model.
//!
//! Every repository field is multi-valued, so each kind is a sequence of
//! records. [`FieldValues`] is the closed sum over all kinds; conversions
//! dispatch on the variant.
//!
//! Interchange text (the CSV transport form) joins per-value encodings
//! with `|`:
//! - scalar kinds write a plain token (`1`/`0` for booleans, decimal
//!   integers, the target id for references, the raw text otherwise);
//! - geolocations write `lat, lng`;
//! - the remaining compound kinds write each value as JSON.
//!
//! Decoding is structural only: a DOI-looking identifier is never
//! validated as a DOI.

mod values;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::FieldDecodeError;

pub use values::{
    ConfigReference, EntityReference, GenericValue, GeoLocation, HierarchicalGeographic,
    PartDetail, RelatedItem, TypedRelation, TypedText,
};
use values::{is_truthy, BoolWire, IntWire, TextWire};

/// Separator between values of a multi-valued field in interchange text.
pub const VALUE_SEPARATOR: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Integer,
    Boolean,
    Generic,
    Edtf,
    Email,
    EntityReference,
    ConfigReference,
    GeoLocation,
    HierarchicalGeographic,
    PartDetail,
    RelatedItem,
    TypedRelation,
    TypedText,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::Generic => "generic",
            FieldKind::Edtf => "edtf",
            FieldKind::Email => "email",
            FieldKind::EntityReference => "entity_reference",
            FieldKind::ConfigReference => "config_reference",
            FieldKind::GeoLocation => "geolocation",
            FieldKind::HierarchicalGeographic => "hierarchical_geographic",
            FieldKind::PartDetail => "part_detail",
            FieldKind::RelatedItem => "related_item",
            FieldKind::TypedRelation => "typed_relation",
            FieldKind::TypedText => "typed_text",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValues {
    Integer(Vec<i64>),
    Boolean(Vec<bool>),
    Generic(Vec<GenericValue>),
    Edtf(Vec<String>),
    Email(Vec<String>),
    EntityReference(Vec<EntityReference>),
    ConfigReference(Vec<ConfigReference>),
    GeoLocation(Vec<GeoLocation>),
    HierarchicalGeographic(Vec<HierarchicalGeographic>),
    PartDetail(Vec<PartDetail>),
    RelatedItem(Vec<RelatedItem>),
    TypedRelation(Vec<TypedRelation>),
    TypedText(Vec<TypedText>),
}

impl FieldValues {
    pub fn empty(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Integer => FieldValues::Integer(Vec::new()),
            FieldKind::Boolean => FieldValues::Boolean(Vec::new()),
            FieldKind::Generic => FieldValues::Generic(Vec::new()),
            FieldKind::Edtf => FieldValues::Edtf(Vec::new()),
            FieldKind::Email => FieldValues::Email(Vec::new()),
            FieldKind::EntityReference => FieldValues::EntityReference(Vec::new()),
            FieldKind::ConfigReference => FieldValues::ConfigReference(Vec::new()),
            FieldKind::GeoLocation => FieldValues::GeoLocation(Vec::new()),
            FieldKind::HierarchicalGeographic => FieldValues::HierarchicalGeographic(Vec::new()),
            FieldKind::PartDetail => FieldValues::PartDetail(Vec::new()),
            FieldKind::RelatedItem => FieldValues::RelatedItem(Vec::new()),
            FieldKind::TypedRelation => FieldValues::TypedRelation(Vec::new()),
            FieldKind::TypedText => FieldValues::TypedText(Vec::new()),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValues::Integer(_) => FieldKind::Integer,
            FieldValues::Boolean(_) => FieldKind::Boolean,
            FieldValues::Generic(_) => FieldKind::Generic,
            FieldValues::Edtf(_) => FieldKind::Edtf,
            FieldValues::Email(_) => FieldKind::Email,
            FieldValues::EntityReference(_) => FieldKind::EntityReference,
            FieldValues::ConfigReference(_) => FieldKind::ConfigReference,
            FieldValues::GeoLocation(_) => FieldKind::GeoLocation,
            FieldValues::HierarchicalGeographic(_) => FieldKind::HierarchicalGeographic,
            FieldValues::PartDetail(_) => FieldKind::PartDetail,
            FieldValues::RelatedItem(_) => FieldKind::RelatedItem,
            FieldValues::TypedRelation(_) => FieldKind::TypedRelation,
            FieldValues::TypedText(_) => FieldKind::TypedText,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FieldValues::Integer(v) => v.len(),
            FieldValues::Boolean(v) => v.len(),
            FieldValues::Generic(v) => v.len(),
            FieldValues::Edtf(v) => v.len(),
            FieldValues::Email(v) => v.len(),
            FieldValues::EntityReference(v) => v.len(),
            FieldValues::ConfigReference(v) => v.len(),
            FieldValues::GeoLocation(v) => v.len(),
            FieldValues::HierarchicalGeographic(v) => v.len(),
            FieldValues::PartDetail(v) => v.len(),
            FieldValues::RelatedItem(v) => v.len(),
            FieldValues::TypedRelation(v) => v.len(),
            FieldValues::TypedText(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode to interchange text. An empty sequence encodes to `""`.
    pub fn encode(&self) -> String {
        let segments: Vec<String> = match self {
            FieldValues::Integer(v) => v.iter().map(|i| i.to_string()).collect(),
            FieldValues::Boolean(v) => v
                .iter()
                .map(|b| if *b { "1" } else { "0" }.to_string())
                .collect(),
            FieldValues::Generic(v) => v.iter().map(|g| g.value.clone()).collect(),
            FieldValues::Edtf(v) | FieldValues::Email(v) => v.clone(),
            FieldValues::EntityReference(v) => v.iter().map(|r| r.target_id.to_string()).collect(),
            FieldValues::ConfigReference(v) => v.iter().map(|r| r.target_id.clone()).collect(),
            FieldValues::GeoLocation(v) => v.iter().map(|g| format!("{}, {}", g.lat, g.lng)).collect(),
            FieldValues::HierarchicalGeographic(v) => v.iter().map(to_json_segment).collect(),
            FieldValues::PartDetail(v) => v.iter().map(to_json_segment).collect(),
            FieldValues::RelatedItem(v) => v.iter().map(to_json_segment).collect(),
            FieldValues::TypedRelation(v) => v.iter().map(to_json_segment).collect(),
            FieldValues::TypedText(v) => v.iter().map(to_json_segment).collect(),
        };
        segments.join(&VALUE_SEPARATOR.to_string())
    }

    /// Decode interchange text. Each `|`-separated segment is decoded on its
    /// own; the first segment that fails structurally aborts the decode.
    pub fn decode(kind: FieldKind, text: &str) -> Result<Self, FieldDecodeError> {
        if text.is_empty() {
            return Ok(Self::empty(kind));
        }
        let segments = text.split(VALUE_SEPARATOR);
        let decoded = match kind {
            FieldKind::Integer => FieldValues::Integer(
                segments
                    .map(|s| s.parse::<i64>().map_err(|e| FieldDecodeError::new(kind, s, e)))
                    .collect::<Result<_, _>>()?,
            ),
            FieldKind::Boolean => FieldValues::Boolean(segments.map(is_truthy).collect()),
            FieldKind::Generic => FieldValues::Generic(segments.map(GenericValue::new).collect()),
            FieldKind::Edtf => FieldValues::Edtf(segments.map(str::to_string).collect()),
            FieldKind::Email => FieldValues::Email(segments.map(str::to_string).collect()),
            FieldKind::EntityReference => FieldValues::EntityReference(
                segments
                    .map(|s| {
                        s.parse::<i64>()
                            .map(EntityReference::to)
                            .map_err(|e| FieldDecodeError::new(kind, s, e))
                    })
                    .collect::<Result<_, _>>()?,
            ),
            FieldKind::ConfigReference => FieldValues::ConfigReference(
                segments
                    .map(|s| ConfigReference {
                        target_id: s.to_string(),
                        ..Default::default()
                    })
                    .collect(),
            ),
            FieldKind::GeoLocation => FieldValues::GeoLocation(
                segments.map(decode_geolocation).collect::<Result<_, _>>()?,
            ),
            FieldKind::HierarchicalGeographic => FieldValues::HierarchicalGeographic(
                segments.map(|s| from_json_segment(kind, s)).collect::<Result<_, _>>()?,
            ),
            FieldKind::PartDetail => FieldValues::PartDetail(
                segments.map(|s| from_json_segment(kind, s)).collect::<Result<_, _>>()?,
            ),
            FieldKind::RelatedItem => FieldValues::RelatedItem(
                segments.map(|s| from_json_segment(kind, s)).collect::<Result<_, _>>()?,
            ),
            FieldKind::TypedRelation => FieldValues::TypedRelation(
                segments.map(|s| from_json_segment(kind, s)).collect::<Result<_, _>>()?,
            ),
            FieldKind::TypedText => FieldValues::TypedText(
                segments.map(|s| from_json_segment(kind, s)).collect::<Result<_, _>>()?,
            ),
        };
        Ok(decoded)
    }

    /// Decode the REST wire form: a JSON array of per-value objects.
    pub fn decode_json(kind: FieldKind, bytes: &[u8]) -> Result<Self, FieldDecodeError> {
        let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| {
            FieldDecodeError::new(kind, &String::from_utf8_lossy(bytes), e)
        })?;
        Self::from_json_value(kind, &value)
    }

    pub fn from_json_value(
        kind: FieldKind,
        value: &serde_json::Value,
    ) -> Result<Self, FieldDecodeError> {
        let decoded = match kind {
            FieldKind::Integer => FieldValues::Integer(
                wire_array::<IntWire>(kind, value)?
                    .into_iter()
                    .map(|w| w.value)
                    .collect(),
            ),
            FieldKind::Boolean => FieldValues::Boolean(
                wire_array::<BoolWire>(kind, value)?
                    .into_iter()
                    .map(|w| w.value)
                    .collect(),
            ),
            FieldKind::Generic => FieldValues::Generic(wire_array(kind, value)?),
            FieldKind::Edtf => FieldValues::Edtf(
                wire_array::<TextWire>(kind, value)?
                    .into_iter()
                    .map(|w| w.value)
                    .collect(),
            ),
            FieldKind::Email => FieldValues::Email(
                wire_array::<TextWire>(kind, value)?
                    .into_iter()
                    .map(|w| w.value)
                    .collect(),
            ),
            FieldKind::EntityReference => FieldValues::EntityReference(wire_array(kind, value)?),
            FieldKind::ConfigReference => FieldValues::ConfigReference(wire_array(kind, value)?),
            FieldKind::GeoLocation => FieldValues::GeoLocation(wire_array(kind, value)?),
            FieldKind::HierarchicalGeographic => {
                FieldValues::HierarchicalGeographic(wire_array(kind, value)?)
            }
            FieldKind::PartDetail => FieldValues::PartDetail(wire_array(kind, value)?),
            FieldKind::RelatedItem => FieldValues::RelatedItem(wire_array(kind, value)?),
            FieldKind::TypedRelation => FieldValues::TypedRelation(wire_array(kind, value)?),
            FieldKind::TypedText => FieldValues::TypedText(wire_array(kind, value)?),
        };
        Ok(decoded)
    }

    /// Text of the first value, for kinds that carry free text.
    pub fn first_text(&self) -> Option<&str> {
        match self {
            FieldValues::Generic(v) => v.first().map(|g| g.value.as_str()),
            FieldValues::TypedText(v) => v.first().map(|t| t.value.as_str()),
            FieldValues::Edtf(v) | FieldValues::Email(v) => v.first().map(String::as_str),
            _ => None,
        }
    }

    pub fn integers(&self) -> &[i64] {
        match self {
            FieldValues::Integer(v) => v,
            _ => &[],
        }
    }

    pub fn edtf(&self) -> &[String] {
        match self {
            FieldValues::Edtf(v) => v,
            _ => &[],
        }
    }

    pub fn entity_references(&self) -> &[EntityReference] {
        match self {
            FieldValues::EntityReference(v) => v,
            _ => &[],
        }
    }

    pub fn part_details(&self) -> &[PartDetail] {
        match self {
            FieldValues::PartDetail(v) => v,
            _ => &[],
        }
    }

    pub fn typed_relations(&self) -> &[TypedRelation] {
        match self {
            FieldValues::TypedRelation(v) => v,
            _ => &[],
        }
    }

    pub fn typed_texts(&self) -> &[TypedText] {
        match self {
            FieldValues::TypedText(v) => v,
            _ => &[],
        }
    }
}

fn decode_geolocation(segment: &str) -> Result<GeoLocation, FieldDecodeError> {
    let kind = FieldKind::GeoLocation;
    let parts: Vec<&str> = segment.split(", ").collect();
    if parts.len() != 2 {
        return Err(FieldDecodeError::new(kind, segment, "expected \"lat, lng\""));
    }
    let lat = parts[0]
        .parse::<f64>()
        .map_err(|e| FieldDecodeError::new(kind, segment, format!("invalid latitude: {e}")))?;
    let lng = parts[1]
        .parse::<f64>()
        .map_err(|e| FieldDecodeError::new(kind, segment, format!("invalid longitude: {e}")))?;
    Ok(GeoLocation::new(lat, lng))
}

fn to_json_segment<T: Serialize>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = ?e, "Failed to encode field value as JSON");
            String::new()
        }
    }
}

fn from_json_segment<T: DeserializeOwned>(
    kind: FieldKind,
    segment: &str,
) -> Result<T, FieldDecodeError> {
    serde_json::from_str(segment).map_err(|e| FieldDecodeError::new(kind, segment, e))
}

fn wire_array<T: DeserializeOwned>(
    kind: FieldKind,
    value: &serde_json::Value,
) -> Result<Vec<T>, FieldDecodeError> {
    Vec::<T>::deserialize(value).map_err(|e| FieldDecodeError::new(kind, &value.to_string(), e))
}
