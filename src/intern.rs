//! Interning of repeated reference entities.
//!
//! Each distinct key maps to exactly one stored row, created and persisted on
//! first sight. First occurrence wins: a key seen again with different
//! descriptive fields keeps the values captured the first time. All caches
//! live on the import session and die with it.

use std::collections::{HashMap, HashSet};

use anyhow::Result;

use crate::{
    catalog::PROJECT_DESCRIPTIONS,
    dates,
    model::{LocationRow, PlannerRow, ProjectDescriptionRow, RecordTypeRow},
    rows::RowView,
    store::Store,
};

/// Planner dictionary, keyed by the source-provided planner id.
#[derive(Debug, Default)]
pub struct Planners {
    by_source_id: HashMap<String, i64>,
    next_id: i64,
}

impl Planners {
    /// Interns the row's planner, persisting it on first sight. Rows without
    /// a planner id yield `None`.
    pub fn intern(&mut self, row: &RowView<'_>, store: &mut dyn Store) -> Result<Option<i64>> {
        let source_id = row.trimmed("planner_id");
        if source_id.is_empty() {
            return Ok(None);
        }
        if let Some(&id) = self.by_source_id.get(source_id) {
            return Ok(Some(id));
        }
        let id = self.next_id;
        self.next_id += 1;
        store.insert_planner(&PlannerRow {
            id,
            planner_id: source_id.to_string(),
            name: row.trimmed("planner_name").to_string(),
            email: row.trimmed("planner_email").to_string(),
            phone: row.trimmed("planner_phone").to_string(),
        })?;
        self.by_source_id.insert(source_id.to_string(), id);
        Ok(Some(id))
    }

    pub fn len(&self) -> usize {
        self.by_source_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_source_id.is_empty()
    }
}

/// Record-type dictionary with the category repair rule.
///
/// Cached by the raw input category, so the repair runs exactly once per
/// distinct raw value; distinct raw spellings that repair to the same cleaned
/// code share one stored row.
#[derive(Debug, Default)]
pub struct RecordTypes {
    by_raw_category: HashMap<String, String>,
    created: HashSet<String>,
}

impl RecordTypes {
    pub fn intern(&mut self, row: &RowView<'_>, store: &mut dyn Store) -> Result<Option<String>> {
        let raw = row.trimmed("record_type_category");
        if raw.is_empty() {
            return Ok(None);
        }
        if let Some(cleaned) = self.by_raw_category.get(raw) {
            return Ok(Some(cleaned.clone()));
        }
        let cleaned = clean_category(raw, row.trimmed("record_type"));
        if !self.created.contains(&cleaned) {
            store.insert_record_type(&RecordTypeRow {
                category: cleaned.clone(),
                name: row.trimmed("record_type").to_string(),
                subtype: row.trimmed("record_type_subtype").to_string(),
                kind: row.trimmed("record_type_type").to_string(),
                group: row.trimmed("record_type_group").to_string(),
                module: row.trimmed("module").to_string(),
            })?;
            self.created.insert(cleaned.clone());
        }
        self.by_raw_category.insert(raw.to_string(), cleaned.clone());
        Ok(Some(cleaned))
    }
}

/// Repairs a non-conforming category. Valid inputs are the case-insensitive
/// literal "other" or a 3-letter acronym; anything else derives the acronym
/// from the parenthesised tail of the record-type name, e.g.
/// "Project Profile (PRJ)" → "PRJ".
fn clean_category(raw: &str, type_name: &str) -> String {
    if raw.eq_ignore_ascii_case("other") {
        return raw.to_string();
    }
    if raw.len() == 3 {
        return raw.to_ascii_uppercase();
    }
    let name = type_name.trim();
    if name.len() >= 4 {
        if let Some(tail) = name.get(name.len() - 4..name.len() - 1) {
            return tail.to_ascii_uppercase();
        }
    }
    "other".to_string()
}

/// Location deduplicator, keyed by exact geometry payload equality. Ids come
/// from an internal counter independent of record identity.
#[derive(Debug, Default)]
pub struct Locations {
    by_geom: HashMap<String, i64>,
    next_id: i64,
}

impl Locations {
    /// Returns the location id for the row's geometry, plus the freshly built
    /// row when the geometry has not been seen before. Repeats must not be
    /// re-inserted, so only the `Some` case goes into the location batch.
    pub fn dedup(&mut self, row: &RowView<'_>) -> Option<(i64, Option<LocationRow>)> {
        let geom = row.field("the_geom");
        if geom.trim().is_empty() {
            return None;
        }
        if let Some(&id) = self.by_geom.get(geom) {
            return Some((id, None));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.by_geom.insert(geom.to_string(), id);
        Some((
            id,
            Some(LocationRow {
                id,
                the_geom: geom.to_string(),
                shape_length: dates::optional_decimal(row.field("Shape_Length")),
                shape_area: dates::optional_decimal(row.field("Shape_Area")),
                address: row.trimmed("address").to_string(),
            }),
        ))
    }

    pub fn len(&self) -> usize {
        self.by_geom.len()
    }
}

/// Creates one row per project-description tag before the row scan begins.
/// The tags form a closed enumeration referenced by checkbox columns, so lazy
/// interning could silently miss members whose column never appears.
pub fn prepopulate_descriptions(store: &mut dyn Store) -> Result<()> {
    let rows = PROJECT_DESCRIPTIONS
        .iter()
        .map(|&(code, label)| ProjectDescriptionRow { code, label })
        .collect::<Vec<_>>();
    store.insert_project_descriptions(&rows)
}
