#![allow(dead_code)]

use std::collections::HashMap;

use islandora_export_core::contract::MockFetcher;
use islandora_export_core::error::FetchError;

pub const BASE: &str = "https://repo.test";

/// A fetcher that serves fixed bodies by URL and 404s everything else.
pub fn routes(pairs: Vec<(String, String)>) -> MockFetcher {
    let table: HashMap<String, String> = pairs.into_iter().collect();
    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch().returning(move |url| match table.get(url) {
        Some(body) => Ok(body.clone().into_bytes()),
        None => Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: 404,
        }),
    });
    fetcher
}

pub fn node_url(nid: i64) -> String {
    format!("{BASE}/node/{nid}?_format=json")
}

pub fn members_url(nid: i64) -> String {
    format!("{BASE}/node/{nid}/members?_format=json")
}

pub fn export_url(nid: i64) -> String {
    format!("{BASE}/node/{nid}?_format=workbench_csv")
}

pub fn node_json(nid: i64, extra: serde_json::Value) -> String {
    let mut body = serde_json::json!({
        "nid": [{"value": nid}],
        "title": [{"value": format!("Node {nid}")}],
    });
    if let (Some(obj), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            obj.insert(k.clone(), v.clone());
        }
    }
    body.to_string()
}

pub fn members_json(children: &[i64]) -> String {
    let items: Vec<serde_json::Value> = children
        .iter()
        .map(|c| serde_json::json!({"nid": c.to_string()}))
        .collect();
    serde_json::Value::Array(items).to_string()
}
