//! Merge the workbench CSV export of a node and of every container below it
//! into one wide table.
//!
//! - The header is the union of all columns in first-seen order.
//! - Rows are de-duplicated on `node_id`; the first occurrence wins.
//! - A newly kept row whose `field_model` is a container model has its own
//!   export merged in immediately after it, depth first. De-duplication is
//!   cumulative across the whole run and is also what stops cycles.
//! - Failing to fetch a container's export is logged and that branch is
//!   skipped; only the root export is fatal.
//! - The result is stably sorted by `field_member_of`, then numeric
//!   `field_weight` (0 when missing or not a number).

use std::collections::{HashMap, HashSet};
use std::io;

use tracing::{debug, info, warn};

use crate::contract::Fetcher;
use crate::entity::export_url;
use crate::error::AggregateError;
use crate::schema;

pub const NODE_ID_COLUMN: &str = "node_id";
pub const MODEL_COLUMN: &str = "field_model";

/// Object models whose export is merged into their parent's.
pub const CONTAINER_MODELS: &[&str] = &[
    "Collection",
    "Compound Object",
    "Paged Content",
    "Publication Issue",
    "Sub-Collection",
];

pub type Row = HashMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Cells of `row` in header order; absent columns are empty.
    pub fn record<'a>(&'a self, row: &'a Row) -> Vec<&'a str> {
        self.header
            .iter()
            .map(|h| row.get(h).map(String::as_str).unwrap_or(""))
            .collect()
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(&self.header)?;
        for row in &self.rows {
            out.write_record(self.record(row))?;
        }
        out.flush()?;
        Ok(())
    }
}

struct RawExport {
    nid: String,
    header: Vec<String>,
    records: Vec<csv::StringRecord>,
    next: usize,
}

#[derive(Default)]
struct Merge {
    table: Table,
    seen_columns: HashSet<String>,
    seen_nodes: HashSet<String>,
}

impl Merge {
    /// The kept row and its node id, or `None` for a duplicate.
    fn add(&mut self, header: &[String], record: &csv::StringRecord) -> Option<(String, Row)> {
        let mut row = Row::new();
        for (i, column) in header.iter().enumerate() {
            if self.seen_columns.insert(column.clone()) {
                self.table.header.push(column.clone());
            }
            row.insert(column.clone(), record.get(i).unwrap_or("").to_string());
        }
        let nid = row.get(NODE_ID_COLUMN).cloned().unwrap_or_default();
        if !self.seen_nodes.insert(nid.clone()) {
            debug!(nid = %nid, "Dropping duplicate row");
            return None;
        }
        self.table.rows.push(row.clone());
        Some((nid, row))
    }
}

pub async fn aggregate<F: Fetcher + ?Sized>(
    fetcher: &F,
    base_url: &str,
    root_id: i64,
) -> Result<Table, AggregateError> {
    let root = fetch_export(fetcher, base_url, &root_id.to_string()).await?;
    let mut merge = Merge::default();
    let mut stack = vec![root];

    while let Some(current) = stack.last_mut() {
        let Some(record) = current.records.get(current.next).cloned() else {
            stack.pop();
            continue;
        };
        current.next += 1;
        let parent = current.nid.clone();
        let header = current.header.clone();

        let Some((nid, row)) = merge.add(&header, &record) else {
            continue;
        };
        let is_container = row
            .get(MODEL_COLUMN)
            .is_some_and(|m| CONTAINER_MODELS.contains(&m.as_str()));
        if !is_container || nid == parent || nid.is_empty() {
            continue;
        }

        match fetch_export(fetcher, base_url, &nid).await {
            Ok(sub) => stack.push(sub),
            Err(e) => warn!(nid = %nid, error = %e, "Failed to fetch sub-collection export, skipping"),
        }
    }

    let mut table = merge.table;
    table.rows.sort_by(|a, b| {
        let group = |r: &Row| r.get(schema::MEMBER_OF).cloned().unwrap_or_default();
        group(a)
            .cmp(&group(b))
            .then_with(|| weight(a).cmp(&weight(b)))
    });

    info!(
        root = root_id,
        rows = table.rows.len(),
        columns = table.header.len(),
        "Aggregated CSV export"
    );
    Ok(table)
}

fn weight(row: &Row) -> i64 {
    row.get(schema::WEIGHT)
        .and_then(|w| w.trim().parse().ok())
        .unwrap_or(0)
}

async fn fetch_export<F: Fetcher + ?Sized>(
    fetcher: &F,
    base_url: &str,
    nid: &str,
) -> Result<RawExport, AggregateError> {
    let url = export_url(base_url, nid);
    let body = fetcher.fetch(&url).await?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_slice());
    let csv_err = |source| AggregateError::Csv {
        url: url.clone(),
        source,
    };
    let header = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_err)?;
    Ok(RawExport {
        nid: nid.to_string(),
        header,
        records,
        next: 0,
    })
}
