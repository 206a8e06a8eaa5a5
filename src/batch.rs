//! Per-kind row buffering with bounded-size flushes.
//!
//! Rows accumulate per entity kind; once any one buffer crosses the
//! threshold, every buffer is flushed in the same round so the store always
//! receives a dependency-consistent slice of the stream. The store writes a
//! batch atomically in dependency order (locations, records, associations,
//! edges, then the measurement child rows).

use anyhow::Result;
use log::debug;

use crate::{
    model::{
        DwellingTypeRow, EdgeRow, LandUseRow, LocationRow, ProjectFeatureRow,
        RecordDescriptionRow, RecordRow,
    },
    store::Store,
};

pub const DEFAULT_BATCH_ROWS: usize = 10_000;

/// One flush round's worth of buffered rows.
#[derive(Debug, Default, Clone)]
pub struct Batch {
    pub locations: Vec<LocationRow>,
    pub records: Vec<RecordRow>,
    pub descriptions: Vec<RecordDescriptionRow>,
    pub edges: Vec<EdgeRow>,
    pub dwelling_types: Vec<DwellingTypeRow>,
    pub land_uses: Vec<LandUseRow>,
    pub project_features: Vec<ProjectFeatureRow>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn row_count(&self) -> usize {
        self.locations.len()
            + self.records.len()
            + self.descriptions.len()
            + self.edges.len()
            + self.dwelling_types.len()
            + self.land_uses.len()
            + self.project_features.len()
    }

    fn any_buffer_exceeds(&self, threshold: usize) -> bool {
        self.locations.len() > threshold
            || self.records.len() > threshold
            || self.descriptions.len() > threshold
            || self.edges.len() > threshold
            || self.dwelling_types.len() > threshold
            || self.land_uses.len() > threshold
            || self.project_features.len() > threshold
    }
}

#[derive(Debug)]
pub struct BatchWriter {
    batch: Batch,
    threshold: usize,
    rows_written: usize,
    flushes: usize,
}

impl BatchWriter {
    pub fn new(threshold: usize) -> Self {
        Self {
            batch: Batch::default(),
            threshold,
            rows_written: 0,
            flushes: 0,
        }
    }

    pub fn batch_mut(&mut self) -> &mut Batch {
        &mut self.batch
    }

    /// Flushes every buffer if any single one has crossed the threshold.
    pub fn maybe_flush(&mut self, store: &mut dyn Store) -> Result<()> {
        if self.batch.any_buffer_exceeds(self.threshold) {
            self.flush(store)?;
        }
        Ok(())
    }

    /// Unconditional flush; a no-op when nothing is buffered.
    pub fn flush(&mut self, store: &mut dyn Store) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.batch);
        let rows = batch.row_count();
        store.write_batch(&batch)?;
        self.rows_written += rows;
        self.flushes += 1;
        debug!(
            "Flushed batch {} ({} row(s), {} total)",
            self.flushes, rows, self.rows_written
        );
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn edge(child_id: i64, parent_id: i64) -> EdgeRow {
        EdgeRow {
            child_id,
            parent_id,
        }
    }

    #[test]
    fn flush_is_noop_on_empty_batch() {
        let mut store = MemoryStore::default();
        let mut writer = BatchWriter::new(4);
        writer.flush(&mut store).unwrap();
        assert_eq!(writer.flushes(), 0);
        assert!(store.batches.is_empty());
    }

    #[test]
    fn threshold_on_one_buffer_flushes_all_buffers() {
        let mut store = MemoryStore::default();
        let mut writer = BatchWriter::new(2);

        for i in 0..3 {
            writer.batch_mut().edges.push(edge(i, i + 10));
        }
        writer.batch_mut().descriptions.push(RecordDescriptionRow {
            record_id: 0,
            description_code: "ADU",
        });
        writer.maybe_flush(&mut store).unwrap();

        assert_eq!(writer.flushes(), 1);
        assert_eq!(store.batches.len(), 1);
        // The under-threshold buffer was flushed in the same round.
        assert_eq!(store.batches[0].edges.len(), 3);
        assert_eq!(store.batches[0].descriptions.len(), 1);
        assert!(writer.batch_mut().is_empty());
    }

    #[test]
    fn below_threshold_nothing_is_written_until_final_flush() {
        let mut store = MemoryStore::default();
        let mut writer = BatchWriter::new(10);
        writer.batch_mut().edges.push(edge(0, 1));
        writer.maybe_flush(&mut store).unwrap();
        assert!(store.batches.is_empty());

        writer.flush(&mut store).unwrap();
        assert_eq!(store.batches.len(), 1);
        assert_eq!(writer.rows_written(), 1);
    }
}
