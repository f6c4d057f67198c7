//! Contributors from linked agents, enriched through taxonomy terms.

use serde::Deserialize;
use tracing::{debug, warn};

use super::escape_html;
use crate::contract::Fetcher;
use crate::error::ProjectionError;
use crate::field::{GenericValue, TypedRelation, TypedText};

pub const WORKS_FOR: &str = "schema:worksFor";
pub const AUTHOR_ROLES: &[&str] = &["relators:cre", "relators:aut"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    First,
    Additional,
}

impl Sequence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sequence::First => "first",
            Sequence::Additional => "additional",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contributor {
    pub given: String,
    pub surname: String,
    pub institution: Option<String>,
    pub orcid: Option<String>,
    pub role: String,
    pub sequence: Sequence,
}

/// A taxonomy term as served by `/taxonomy/term/{tid}?_format=json`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Term {
    pub tid: Option<i64>,
    pub name: String,
    pub relationships: Vec<TypedRelation>,
    pub identifier: Vec<TypedText>,
}

#[derive(Deserialize)]
struct TermWire {
    #[serde(default)]
    tid: Vec<serde_json::Value>,
    #[serde(default)]
    name: Vec<GenericValue>,
    #[serde(default)]
    field_relationships: Vec<TypedRelation>,
    #[serde(default)]
    field_identifier: Vec<TypedText>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TermBody {
    Many(Vec<TermWire>),
    One(TermWire),
}

impl From<TermWire> for Term {
    fn from(wire: TermWire) -> Self {
        let tid = wire.tid.first().and_then(|v| match v.get("value") {
            Some(serde_json::Value::Number(n)) => n.as_i64(),
            Some(serde_json::Value::String(s)) => s.parse().ok(),
            _ => None,
        });
        Self {
            tid,
            name: wire.name.into_iter().next().map(|n| n.value).unwrap_or_default(),
            relationships: wire.field_relationships,
            identifier: wire.field_identifier,
        }
    }
}

impl Term {
    /// Decode a single term object, or the first of an array of them.
    pub fn from_json(url: &str, bytes: &[u8]) -> Result<Option<Self>, ProjectionError> {
        let body: TermBody = serde_json::from_slice(bytes).map_err(|source| ProjectionError::Term {
            url: url.to_string(),
            source,
        })?;
        Ok(match body {
            TermBody::One(wire) => Some(wire.into()),
            TermBody::Many(wires) => wires.into_iter().next().map(Term::from),
        })
    }

    pub fn orcid(&self) -> Option<&str> {
        self.identifier
            .iter()
            .find(|i| i.has_attr0("orcid") && !i.value.is_empty())
            .map(|i| i.value.as_str())
    }
}

pub async fn fetch_term<F: Fetcher + ?Sized>(
    fetcher: &F,
    base_url: &str,
    path: &str,
) -> Result<Option<Term>, ProjectionError> {
    let url = format!("{}{}?_format=json", base_url.trim_end_matches('/'), path);
    let body = fetcher.fetch(&url).await?;
    Term::from_json(&url, &body)
}

pub fn is_author(agent: &TypedRelation) -> bool {
    AUTHOR_ROLES.contains(&agent.rel_type.as_str())
}

/// Build the contributor for one linked agent. Agents with no term URL,
/// or whose term lookup comes back empty, are skipped.
pub async fn build_contributor<F: Fetcher + ?Sized>(
    fetcher: &F,
    base_url: &str,
    agent: &TypedRelation,
    sequence: Sequence,
) -> Result<Option<Contributor>, ProjectionError> {
    let Some(path) = agent.url.as_deref().filter(|u| !u.is_empty()) else {
        warn!(target_id = agent.target_id, "Linked agent has no term URL, skipping");
        return Ok(None);
    };
    let Some(term) = fetch_term(fetcher, base_url, path).await? else {
        warn!(path = %path, "Linked agent term not found, skipping");
        return Ok(None);
    };

    let mut name = term.name.clone();
    let mut institution = None;
    for rel in term.relationships.iter().filter(|r| r.rel_type == WORKS_FOR) {
        let Some(rel_path) = rel.url.as_deref().filter(|u| !u.is_empty()) else {
            continue;
        };
        if let Some(org) = fetch_term(fetcher, base_url, rel_path).await? {
            name = name.replacen(&format!(" - {}", org.name), "", 1);
            institution = Some(org.name);
            break;
        }
    }

    let (surname, given) = split_name(&name);
    debug!(name = %name, sequence = sequence.as_str(), "Built contributor");
    Ok(Some(Contributor {
        given: escape_html(&given),
        surname: escape_html(&surname),
        institution,
        orcid: term.orcid().map(str::to_string),
        role: "author".to_string(),
        sequence,
    }))
}

/// `"Surname, Given"`, or `"Given Names Surname"` when there is no comma.
/// Returns `(surname, given)`.
pub fn split_name(name: &str) -> (String, String) {
    if let Some((surname, given)) = name.split_once(", ") {
        return (surname.to_string(), given.to_string());
    }
    let tokens: Vec<&str> = name.split(' ').filter(|t| !t.is_empty()).collect();
    match tokens.split_last() {
        Some((surname, given)) => (surname.to_string(), given.join(" ")),
        None => (String::new(), String::new()),
    }
}
