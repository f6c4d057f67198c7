//! Repository nodes decoded into the typed field model.

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::NodeError;
use crate::field::{FieldValues, TypedText};
use crate::schema;

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub nid: i64,
    pub fields: BTreeMap<String, FieldValues>,
}

impl Entity {
    pub fn new(nid: i64) -> Self {
        Self {
            nid,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, values: FieldValues) -> Self {
        self.fields.insert(name.into(), values);
        self
    }

    /// Decode a `?_format=json` node body. Each top-level key is a field
    /// machine name mapping to an array of per-value objects. Fields that
    /// fail to decode are logged and left out; the node itself only fails
    /// when it has no usable `nid`.
    pub fn from_json(url: &str, bytes: &[u8]) -> Result<Self, NodeError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|source| NodeError::Json {
                url: url.to_string(),
                source,
            })?;
        let object = match value {
            serde_json::Value::Object(map) => map,
            _ => {
                return Err(NodeError::MissingNid {
                    url: url.to_string(),
                })
            }
        };

        let mut fields = BTreeMap::new();
        for (name, raw) in &object {
            if !raw.is_array() {
                continue;
            }
            let kind = schema::kind_of(name);
            match FieldValues::from_json_value(kind, raw) {
                Ok(values) => {
                    fields.insert(name.clone(), values);
                }
                Err(e) => warn!(url = %url, field = %name, error = %e, "Skipping undecodable field"),
            }
        }

        let nid = fields
            .get(schema::NID)
            .and_then(|v| v.integers().first().copied())
            .ok_or_else(|| NodeError::MissingNid {
                url: url.to_string(),
            })?;
        Ok(Self { nid, fields })
    }

    pub fn field(&self, name: &str) -> Option<&FieldValues> {
        self.fields.get(name)
    }

    /// First free-text value of a field, ignoring empty strings.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name)
            .and_then(FieldValues::first_text)
            .filter(|s| !s.is_empty())
    }

    pub fn member_of(&self) -> impl Iterator<Item = i64> + '_ {
        self.field(schema::MEMBER_OF)
            .map(FieldValues::entity_references)
            .unwrap_or(&[])
            .iter()
            .map(|r| r.target_id)
    }

    pub fn is_member_of(&self, parent: i64) -> bool {
        self.member_of().any(|id| id == parent)
    }

    /// First `field_identifier` value whose type attribute equals `attr`.
    pub fn identifier(&self, attr: &str) -> Option<&TypedText> {
        self.field(schema::IDENTIFIER)?
            .typed_texts()
            .iter()
            .find(|t| t.has_attr0(attr))
    }

    /// Leading year of the first issued date (`"2020-05"` -> 2020).
    pub fn issued_year(&self) -> Option<i32> {
        let date = self.field(schema::EDTF_DATE_ISSUED)?.edtf().first()?;
        date.split('-').next()?.trim().parse().ok()
    }
}

pub fn node_url(base_url: &str, nid: i64) -> String {
    format!("{}/node/{}?_format=json", base_url.trim_end_matches('/'), nid)
}

pub fn members_url(base_url: &str, nid: i64) -> String {
    format!(
        "{}/node/{}/members?_format=json",
        base_url.trim_end_matches('/'),
        nid
    )
}

pub fn export_url(base_url: &str, nid: impl std::fmt::Display) -> String {
    format!(
        "{}/node/{}?_format=workbench_csv",
        base_url.trim_end_matches('/'),
        nid
    )
}
