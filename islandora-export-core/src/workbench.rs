//! Rebuild entities from a workbench CSV in interchange form, e.g. the
//! output of [`crate::aggregate`], so it can be projected offline.

use std::io;

use tracing::{info, warn};

use crate::aggregate::NODE_ID_COLUMN;
use crate::entity::Entity;
use crate::field::FieldValues;
use crate::schema;

/// Every row with a numeric `node_id` becomes an entity. Non-empty cells
/// are decoded through the field schema; a cell that does not decode is
/// logged and its field left out.
pub fn entities_from_csv<R: io::Read>(reader: R) -> Result<Vec<Entity>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut entities = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let nid_cell = header
            .iter()
            .position(|h| h == NODE_ID_COLUMN)
            .and_then(|i| record.get(i))
            .unwrap_or("");
        let Ok(nid) = nid_cell.trim().parse::<i64>() else {
            warn!(row = line + 1, value = %nid_cell, "Row has no numeric node_id, skipping");
            continue;
        };

        let mut entity = Entity::new(nid).with_field(schema::NID, FieldValues::Integer(vec![nid]));
        for (column, value) in header.iter().zip(record.iter()) {
            if column == NODE_ID_COLUMN || value.is_empty() {
                continue;
            }
            let kind = schema::kind_of(column);
            match FieldValues::decode(kind, value) {
                Ok(values) => {
                    entity.fields.insert(column.clone(), values);
                }
                Err(e) => warn!(nid, field = %column, error = %e, "Skipping undecodable cell"),
            }
        }
        entities.push(entity);
    }

    info!(count = entities.len(), "Loaded entities from CSV");
    Ok(entities)
}
