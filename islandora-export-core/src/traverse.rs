//! Breadth-first walk of the membership graph.
//!
//! Strictly sequential: one request in flight at a time. An identifier is
//! marked seen when it is dequeued, before its members are listed, so a
//! node reachable from two parents (or from a cycle back to an ancestor)
//! is fetched and emitted once, in first-discovered position.

use std::collections::{HashSet, VecDeque};

use serde::Deserialize;
use tracing::{debug, info};

use crate::contract::Fetcher;
use crate::entity::{members_url, node_url, Entity};
use crate::error::NodeError;

#[derive(Deserialize)]
struct MemberWire {
    nid: serde_json::Value,
}

/// Every node reachable from `root_id`, parents before children.
///
/// Any failure aborts the walk and nothing fetched so far is returned.
pub async fn traverse<F: Fetcher + ?Sized>(
    fetcher: &F,
    base_url: &str,
    root_id: i64,
) -> Result<Vec<Entity>, NodeError> {
    let mut queue = VecDeque::from([root_id]);
    let mut seen = HashSet::new();
    let mut nodes = Vec::new();

    while let Some(nid) = queue.pop_front() {
        if !seen.insert(nid) {
            continue;
        }

        let url = node_url(base_url, nid);
        let body = fetcher.fetch(&url).await?;
        let entity = Entity::from_json(&url, &body)?;
        debug!(nid, fields = entity.fields.len(), "Fetched node");
        nodes.push(entity);

        for child in fetch_members(fetcher, base_url, nid).await? {
            if !seen.contains(&child) {
                queue.push_back(child);
            }
        }
    }

    info!(root = root_id, count = nodes.len(), "Traversal complete");
    Ok(nodes)
}

/// Direct children of `nid`, in the order the repository lists them.
pub async fn fetch_members<F: Fetcher + ?Sized>(
    fetcher: &F,
    base_url: &str,
    nid: i64,
) -> Result<Vec<i64>, NodeError> {
    let url = members_url(base_url, nid);
    let body = fetcher.fetch(&url).await?;
    let members: Vec<MemberWire> =
        serde_json::from_slice(&body).map_err(|source| NodeError::Json {
            url: url.clone(),
            source,
        })?;

    members
        .into_iter()
        .map(|m| {
            let parsed = match &m.nid {
                serde_json::Value::Number(n) => n.as_i64(),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            parsed.ok_or_else(|| NodeError::InvalidMember {
                url: url.clone(),
                value: m.nid.to_string(),
            })
        })
        .collect()
}
