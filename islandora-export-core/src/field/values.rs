//! Per-kind value records, shaped after the repository's REST JSON.
//!
//! Compound records serialize with `skip_serializing_if` so that the
//! JSON written into interchange text decodes back to the same value.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenericValue {
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed: Option<String>,
}

impl GenericValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityReference {
    #[serde(deserialize_with = "lenient_i64")]
    pub target_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl EntityReference {
    pub fn to(target_id: i64) -> Self {
        Self {
            target_id,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigReference {
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat_sin: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat_cos: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng_rad: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl GeoLocation {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HierarchicalGeographic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub territory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub island: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraterrestrial_area: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartDetail {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub part_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RelatedItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A typed relation, e.g. a linked agent with a `relators:aut` role.
/// `url` is the path of the related term, relative to the site root.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypedRelation {
    #[serde(deserialize_with = "lenient_i64")]
    pub target_id: i64,
    #[serde(default)]
    pub rel_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Text with up to two discriminator attributes (`attr0` is the
/// identifier type for `field_identifier`, e.g. `"doi"`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypedText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr0: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub value: String,
}

impl TypedText {
    pub fn with_attr(attr0: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attr0: Some(attr0.into()),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn has_attr0(&self, attr: &str) -> bool {
        self.attr0.as_deref() == Some(attr)
    }
}

// Wire shapes for the scalar kinds, which the REST API wraps as {"value": ...}.

#[derive(Deserialize)]
pub(crate) struct IntWire {
    #[serde(deserialize_with = "lenient_i64")]
    pub value: i64,
}

#[derive(Deserialize)]
pub(crate) struct BoolWire {
    #[serde(deserialize_with = "lenient_bool")]
    pub value: bool,
}

#[derive(Deserialize)]
pub(crate) struct TextWire {
    #[serde(default)]
    pub value: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

fn lenient_i64<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    match Loose::deserialize(d)? {
        Loose::Int(n) => Ok(n),
        Loose::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected an integer, got {}",
            other.describe()
        ))),
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    match Loose::deserialize(d)? {
        Loose::Int(n) => Ok(n as f64),
        Loose::Float(f) => Ok(f),
        Loose::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Loose::Bool(_) => Err(serde::de::Error::custom("expected a number, got a boolean")),
    }
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Loose::deserialize(d)? {
        Loose::Bool(b) => b,
        Loose::Int(n) => n == 1,
        Loose::Float(f) => f == 1.0,
        Loose::Str(s) => is_truthy(&s),
    })
}

/// Only the literal tokens `1` and `true` are true.
pub(crate) fn is_truthy(token: &str) -> bool {
    token == "1" || token == "true"
}

impl Loose {
    fn describe(&self) -> &'static str {
        match self {
            Loose::Bool(_) => "a boolean",
            Loose::Int(_) => "an integer",
            Loose::Float(_) => "a float",
            Loose::Str(_) => "a string",
        }
    }
}
