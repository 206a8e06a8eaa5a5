//! Storage seam for the import pipeline.
//!
//! The import core only knows the [`Store`] trait: single-row inserts for the
//! interned reference entities (persisted on first sight) and an atomic
//! [`Store::write_batch`] for the bulk kinds. [`SqliteStore`] is the real
//! backend; each batch is one transaction, written in dependency order so
//! foreign keys always resolve. A write failure aborts the run with no retry.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    batch::Batch,
    error::ImportError,
    model::{PlannerRow, ProjectDescriptionRow, RecordTypeRow},
};

pub trait Store {
    fn insert_planner(&mut self, row: &PlannerRow) -> Result<()>;
    fn insert_record_type(&mut self, row: &RecordTypeRow) -> Result<()>;
    fn insert_project_descriptions(&mut self, rows: &[ProjectDescriptionRow]) -> Result<()>;
    /// Writes every kind in the batch atomically: all rows commit or none do.
    fn write_batch(&mut self, batch: &Batch) -> Result<()>;
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS planner (
    id           INTEGER PRIMARY KEY,
    planner_id   TEXT NOT NULL,
    name         TEXT NOT NULL,
    email        TEXT NOT NULL,
    phone        TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS location (
    id           INTEGER PRIMARY KEY,
    the_geom     TEXT NOT NULL,
    shape_length REAL,
    shape_area   REAL,
    address      TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS record_type (
    category     TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    subtype      TEXT NOT NULL,
    type         TEXT NOT NULL,
    \"group\"    TEXT NOT NULL,
    module       TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS project_description (
    type         TEXT PRIMARY KEY,
    label        TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS record (
    id                      INTEGER PRIMARY KEY,
    record_id               TEXT NOT NULL,
    planner_id              INTEGER REFERENCES planner(id),
    location_id             INTEGER REFERENCES location(id),
    record_type_category    TEXT REFERENCES record_type(category),
    object_id               INTEGER,
    template_id             TEXT NOT NULL,
    name                    TEXT NOT NULL,
    description             TEXT NOT NULL,
    status                  TEXT NOT NULL,
    construct_cost          REAL,
    related_building_permit TEXT NOT NULL,
    acalink                 TEXT NOT NULL,
    aalink                  TEXT NOT NULL,
    date_opened             TEXT,
    date_closed             TEXT,
    bos_1st_read            TEXT,
    bos_2nd_read            TEXT,
    com_hearing             TEXT,
    mayoral_sign            TEXT,
    transmit_date_bos       TEXT,
    com_hearing_date_bos    TEXT,
    mcd_referral            TEXT NOT NULL,
    environmental_review    TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS record_project_description (
    record_id    INTEGER NOT NULL REFERENCES record(id),
    type         TEXT NOT NULL REFERENCES project_description(type)
);
CREATE TABLE IF NOT EXISTS record_relation (
    child_id     INTEGER NOT NULL REFERENCES record(id),
    parent_id    INTEGER NOT NULL REFERENCES record(id)
);
CREATE TABLE IF NOT EXISTS dwelling_type (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id    INTEGER NOT NULL REFERENCES record(id),
    type         TEXT NOT NULL,
    exist        REAL NOT NULL,
    proposed     REAL NOT NULL,
    net          REAL NOT NULL,
    area         REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS land_use (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id    INTEGER NOT NULL REFERENCES record(id),
    type         TEXT NOT NULL,
    exist        REAL NOT NULL,
    proposed     REAL NOT NULL,
    net          REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS project_feature (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id    INTEGER NOT NULL REFERENCES record(id),
    type         TEXT NOT NULL,
    other_name   TEXT NOT NULL,
    exist        REAL NOT NULL,
    proposed     REAL NOT NULL,
    net          REAL NOT NULL
);
";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the target database, applies the schema, and
    /// rejects stores that already hold records: each run assumes a fresh
    /// target and a reimport requires clearing first.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Opening target database {path:?}"))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        conn.execute_batch(SCHEMA)
            .context("Applying target schema")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let existing: i64 = conn.query_row("SELECT COUNT(*) FROM record", [], |r| r.get(0))?;
        if existing > 0 {
            return Err(ImportError::StoreNotEmpty(existing).into());
        }
        Ok(Self { conn })
    }
}

fn date_text(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

fn real(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

impl Store for SqliteStore {
    fn insert_planner(&mut self, row: &PlannerRow) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO planner (id, planner_id, name, email, phone) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![row.id, row.planner_id, row.name, row.email, row.phone],
            )
            .with_context(|| format!("Inserting planner '{}'", row.planner_id))?;
        Ok(())
    }

    fn insert_record_type(&mut self, row: &RecordTypeRow) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO record_type (category, name, subtype, type, \"group\", module)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    row.category,
                    row.name,
                    row.subtype,
                    row.kind,
                    row.group,
                    row.module
                ],
            )
            .with_context(|| format!("Inserting record type '{}'", row.category))?;
        Ok(())
    }

    fn insert_project_descriptions(&mut self, rows: &[ProjectDescriptionRow]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO project_description (type, label) VALUES (?1, ?2)")?;
            for row in rows {
                stmt.execute(params![row.code, row.label])?;
            }
        }
        tx.commit().context("Committing project descriptions")?;
        Ok(())
    }

    fn write_batch(&mut self, batch: &Batch) -> Result<()> {
        let tx = self.conn.transaction().context("Beginning batch write")?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO location (id, the_geom, shape_length, shape_area, address)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for row in &batch.locations {
                stmt.execute(params![
                    row.id,
                    row.the_geom,
                    row.shape_length.map(real),
                    row.shape_area.map(real),
                    row.address
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO record (
                     id, record_id, planner_id, location_id, record_type_category,
                     object_id, template_id, name, description, status, construct_cost,
                     related_building_permit, acalink, aalink, date_opened, date_closed,
                     bos_1st_read, bos_2nd_read, com_hearing, mayoral_sign,
                     transmit_date_bos, com_hearing_date_bos, mcd_referral,
                     environmental_review
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                           ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)",
            )?;
            for row in &batch.records {
                stmt.execute(params![
                    row.id,
                    row.record_id,
                    row.planner_id,
                    row.location_id,
                    row.record_type_category,
                    row.object_id,
                    row.template_id,
                    row.name,
                    row.description,
                    row.status,
                    row.construct_cost,
                    row.related_building_permit,
                    row.acalink,
                    row.aalink,
                    date_text(row.date_opened),
                    date_text(row.date_closed),
                    date_text(row.bos_1st_read),
                    date_text(row.bos_2nd_read),
                    date_text(row.com_hearing),
                    date_text(row.mayoral_sign),
                    date_text(row.transmit_date_bos),
                    date_text(row.com_hearing_date_bos),
                    row.mcd_referral,
                    row.environmental_review
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO record_project_description (record_id, type) VALUES (?1, ?2)",
            )?;
            for row in &batch.descriptions {
                stmt.execute(params![row.record_id, row.description_code])?;
            }

            let mut stmt =
                tx.prepare("INSERT INTO record_relation (child_id, parent_id) VALUES (?1, ?2)")?;
            for row in &batch.edges {
                stmt.execute(params![row.child_id, row.parent_id])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO dwelling_type (record_id, type, exist, proposed, net, area)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in &batch.dwelling_types {
                stmt.execute(params![
                    row.record_id,
                    row.kind,
                    real(row.exist),
                    real(row.proposed),
                    real(row.net),
                    real(row.area)
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO land_use (record_id, type, exist, proposed, net)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for row in &batch.land_uses {
                stmt.execute(params![
                    row.record_id,
                    row.kind,
                    real(row.exist),
                    real(row.proposed),
                    real(row.net)
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO project_feature (record_id, type, other_name, exist, proposed, net)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in &batch.project_features {
                stmt.execute(params![
                    row.record_id,
                    row.kind,
                    row.other_name,
                    real(row.exist),
                    real(row.proposed),
                    real(row.net)
                ])?;
            }
        }
        tx.commit().context("Committing batch write")?;
        Ok(())
    }
}

/// In-memory sink for unit tests; records exactly what the pipeline handed it.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub planners: Vec<PlannerRow>,
    pub record_types: Vec<RecordTypeRow>,
    pub project_descriptions: Vec<ProjectDescriptionRow>,
    pub batches: Vec<Batch>,
}

#[cfg(test)]
impl Store for MemoryStore {
    fn insert_planner(&mut self, row: &PlannerRow) -> Result<()> {
        self.planners.push(row.clone());
        Ok(())
    }

    fn insert_record_type(&mut self, row: &RecordTypeRow) -> Result<()> {
        self.record_types.push(row.clone());
        Ok(())
    }

    fn insert_project_descriptions(&mut self, rows: &[ProjectDescriptionRow]) -> Result<()> {
        self.project_descriptions.extend_from_slice(rows);
        Ok(())
    }

    fn write_batch(&mut self, batch: &Batch) -> Result<()> {
        self.batches.push(batch.clone());
        Ok(())
    }
}
