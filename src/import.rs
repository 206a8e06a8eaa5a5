//! Single-pass import driver.
//!
//! One forward pass over the export in file order. Per row: normalize,
//! intern/dedupe references, build the record with its 0-based stream
//! identity, expand the three wide-column groups, feed the relation resolver,
//! and buffer everything for batched writes. Every per-run cache lives on the
//! session and is discarded when the run ends.

use std::time::Instant;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, info};

use crate::{
    batch::BatchWriter,
    catalog::{self, PROJECT_DESCRIPTIONS},
    cli::ImportArgs,
    dates, expand,
    intern::{self, Locations, Planners, RecordTypes},
    io_utils,
    model::{RecordDescriptionRow, RecordRow},
    relations::RelationResolver,
    rows::{HeaderIndex, RowView},
    store::{SqliteStore, Store},
};

pub struct ImportSession<S: Store> {
    store: S,
    planners: Planners,
    record_types: RecordTypes,
    locations: Locations,
    resolver: RelationResolver,
    writer: BatchWriter,
    next_record_id: i64,
    edges_emitted: usize,
}

#[derive(Debug)]
pub struct ImportSummary {
    pub records: usize,
    pub planners: usize,
    pub locations: usize,
    pub edges: usize,
    pub unresolved_references: usize,
}

impl<S: Store> ImportSession<S> {
    /// Prepares a session against a fresh store, creating the full
    /// project-description catalog before any record is processed.
    pub fn new(mut store: S, batch_rows: usize) -> Result<Self> {
        intern::prepopulate_descriptions(&mut store)?;
        Ok(Self {
            store,
            planners: Planners::default(),
            record_types: RecordTypes::default(),
            locations: Locations::default(),
            resolver: RelationResolver::default(),
            writer: BatchWriter::new(batch_rows),
            next_record_id: 0,
            edges_emitted: 0,
        })
    }

    pub fn process_row(&mut self, row: &RowView<'_>) -> Result<()> {
        let id = self.next_record_id;
        self.next_record_id += 1;

        let planner_id = self.planners.intern(row, &mut self.store)?;
        let record_type_category = self.record_types.intern(row, &mut self.store)?;
        let location_id = match self.locations.dedup(row) {
            Some((location_id, fresh)) => {
                if let Some(location) = fresh {
                    self.writer.batch_mut().locations.push(location);
                }
                Some(location_id)
            }
            None => None,
        };

        self.writer.batch_mut().records.push(RecordRow {
            id,
            record_id: row.trimmed("record_id").to_string(),
            planner_id,
            location_id,
            record_type_category,
            object_id: dates::optional_i64(row.field("OBJECTID")),
            template_id: row.trimmed("templateid").to_string(),
            name: row.trimmed("record_name").to_string(),
            description: row.field("description").to_string(),
            status: row.trimmed("record_status").to_string(),
            construct_cost: dates::optional_f64(row.field("constructcost")),
            related_building_permit: row.trimmed("RELATED_BUILDING_PERMIT").to_string(),
            acalink: row.trimmed("acalink").to_string(),
            aalink: row.trimmed("aalink").to_string(),
            date_opened: dates::optional_date(row.field("date_opened")),
            date_closed: dates::optional_date(row.field("date_closed")),
            bos_1st_read: dates::optional_date(row.field("BOS_1ST_READ")),
            bos_2nd_read: dates::optional_date(row.field("BOS_2ND_READ")),
            com_hearing: dates::optional_date(row.field("COM_HEARING")),
            mayoral_sign: dates::optional_date(row.field("MAYORAL_SIGN")),
            transmit_date_bos: dates::optional_date(row.field("TRANSMIT_DATE_BOS")),
            com_hearing_date_bos: dates::optional_date(row.field("COM_HEARING_DATE_BOS")),
            mcd_referral: row.trimmed("MCD_REFERRAL").to_string(),
            environmental_review: row.trimmed("ENVIRONMENTAL_REVIEW_TYPE").to_string(),
        });

        for &(code, _label) in PROJECT_DESCRIPTIONS {
            if catalog::is_checked(row.field(code)) {
                self.writer.batch_mut().descriptions.push(RecordDescriptionRow {
                    record_id: id,
                    description_code: code,
                });
            }
        }

        let batch = self.writer.batch_mut();
        batch.dwelling_types.extend(expand::dwelling_types(row, id));
        batch.land_uses.extend(expand::land_uses(row, id));
        batch
            .project_features
            .extend(expand::project_features(row, id));

        let parents = row.id_list("parent");
        let children = row.id_list("children");
        let edges = self
            .resolver
            .observe(row.trimmed("record_id"), id, &parents, &children);
        self.edges_emitted += edges.len();
        self.writer.batch_mut().edges.extend(edges);

        self.writer.maybe_flush(&mut self.store)
    }

    /// Final flush and summary. Pending parent/child references are dropped
    /// here; the source data legitimately points at out-of-window records.
    pub fn finish(mut self) -> Result<(S, ImportSummary)> {
        self.writer.flush(&mut self.store)?;
        let unresolved = self.resolver.unresolved_count();
        if unresolved > 0 {
            debug!(
                "Unresolved relative source id(s): {}",
                self.resolver.unresolved_source_ids().sorted().join(", ")
            );
        }
        let summary = ImportSummary {
            records: self.next_record_id as usize,
            planners: self.planners.len(),
            locations: self.locations.len(),
            edges: self.edges_emitted,
            unresolved_references: unresolved,
        };
        Ok((self.store, summary))
    }
}

pub fn execute(args: &ImportArgs) -> Result<()> {
    let started = Instant::now();
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let chunk_rows = args.chunk_rows.max(1);
    info!(
        "Importing '{}' into {:?} (delimiter '{}', batch {} row(s))",
        args.input.display(),
        args.database,
        crate::printable_delimiter(delimiter),
        args.batch_rows
    );

    let store = SqliteStore::open(&args.database)?;
    let mut session = ImportSession::new(store, args.batch_rows)?;

    let mut reader = io_utils::open_csv_reader(&args.input, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)?;
    let index = HeaderIndex::from_headers(&headers)?;

    let mut processed = 0usize;
    for result in reader.byte_records() {
        let record = result.with_context(|| format!("Reading row {processed}"))?;
        let fields = io_utils::decode_record(&record, encoding)?;
        let row = RowView::new(&index, &fields);
        session
            .process_row(&row)
            .with_context(|| format!("Processing row {processed}"))?;
        processed += 1;
        if processed % chunk_rows == 0 {
            info!("Processed {processed} row(s)");
            if args.first_chunk {
                info!("Stopping after first chunk (--first-chunk)");
                break;
            }
        }
    }

    let (_store, summary) = session.finish()?;
    if summary.unresolved_references > 0 {
        info!(
            "Dropped {} unresolved parent/child reference(s)",
            summary.unresolved_references
        );
    }
    info!(
        "Imported {} record(s), {} planner(s), {} location(s), {} relation edge(s) in {:.2}s",
        summary.records,
        summary.planners,
        summary.locations,
        summary.edges,
        started.elapsed().as_secs_f64()
    );
    Ok(())
}
