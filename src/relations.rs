//! Incremental resolution of the parent/children record-relationship lists.
//!
//! Each row names its parents and children by the source system's record-id
//! strings, and the referenced rows may appear earlier or later in the stream
//! (or never, when the relative falls outside the export window). The
//! resolver keeps a two-sided pending index keyed by the not-yet-seen
//! counterpart's source id:
//!
//! - `pending_children[P]` holds rows that declared `P` as a parent, waiting
//!   for `P` to appear,
//! - `pending_parents[C]` holds rows that declared `C` as a child.
//!
//! When a row arrives, both pending sets for its source id are drained and
//! emitted as edges; its own declarations that matched a drained entry are
//! skipped so a relationship declared from both sides still yields exactly
//! one edge. Declarations whose counterpart never arrives stay pending and
//! are dropped at end of run.

use std::collections::HashMap;

use itertools::Itertools;

use crate::model::EdgeRow;

#[derive(Debug, Default)]
pub struct RelationResolver {
    /// Source id → assigned identity for every row processed so far.
    /// First occurrence wins if the export repeats a source id.
    seen: HashMap<String, i64>,
    /// Unseen parent source id → {declaring child source id → child identity}.
    pending_children: HashMap<String, HashMap<String, i64>>,
    /// Unseen child source id → {declaring parent source id → parent identity}.
    pending_parents: HashMap<String, HashMap<String, i64>>,
}

impl RelationResolver {
    /// Processes one row and returns every edge that became resolvable.
    /// `identity` is the row's assigned record id, `source_id` the source
    /// system's identifier, and the slices its declared relatives.
    pub fn observe(
        &mut self,
        source_id: &str,
        identity: i64,
        parents: &[&str],
        children: &[&str],
    ) -> Vec<EdgeRow> {
        let found_children = self.pending_children.remove(source_id).unwrap_or_default();
        let found_parents = self.pending_parents.remove(source_id).unwrap_or_default();

        let mut edges = Vec::new();
        for &child_identity in found_children.values() {
            edges.push(EdgeRow {
                child_id: child_identity,
                parent_id: identity,
            });
        }
        for &parent_identity in found_parents.values() {
            edges.push(EdgeRow {
                child_id: identity,
                parent_id: parent_identity,
            });
        }

        for &parent in parents.iter().unique() {
            // Already emitted above when the earlier row declared us as child.
            if found_parents.contains_key(parent) {
                continue;
            }
            match self.seen.get(parent) {
                Some(&parent_identity) => edges.push(EdgeRow {
                    child_id: identity,
                    parent_id: parent_identity,
                }),
                None => {
                    self.pending_children
                        .entry(parent.to_string())
                        .or_default()
                        .insert(source_id.to_string(), identity);
                }
            }
        }
        for &child in children.iter().unique() {
            if found_children.contains_key(child) {
                continue;
            }
            match self.seen.get(child) {
                Some(&child_identity) => edges.push(EdgeRow {
                    child_id: child_identity,
                    parent_id: identity,
                }),
                None => {
                    self.pending_parents
                        .entry(child.to_string())
                        .or_default()
                        .insert(source_id.to_string(), identity);
                }
            }
        }

        self.seen.entry(source_id.to_string()).or_insert(identity);
        edges
    }

    /// Number of declared references whose counterpart never appeared.
    pub fn unresolved_count(&self) -> usize {
        self.pending_children
            .values()
            .chain(self.pending_parents.values())
            .map(HashMap::len)
            .sum()
    }

    /// Source ids still referenced by pending declarations.
    pub fn unresolved_source_ids(&self) -> impl Iterator<Item = &str> {
        self.pending_children
            .keys()
            .chain(self.pending_parents.keys())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(child_id: i64, parent_id: i64) -> EdgeRow {
        EdgeRow {
            child_id,
            parent_id,
        }
    }

    #[test]
    fn backward_reference_resolves_on_the_later_row() {
        let mut resolver = RelationResolver::default();
        assert!(resolver.observe("Y", 0, &[], &[]).is_empty());
        let edges = resolver.observe("X", 1, &["Y"], &[]);
        assert_eq!(edges, vec![edge(1, 0)]);
        assert_eq!(resolver.unresolved_count(), 0);
    }

    #[test]
    fn forward_reference_resolves_when_counterpart_arrives() {
        let mut resolver = RelationResolver::default();
        // X declares parent Y before Y has been seen.
        assert!(resolver.observe("X", 0, &["Y"], &[]).is_empty());
        let edges = resolver.observe("Y", 1, &[], &[]);
        assert_eq!(edges, vec![edge(0, 1)]);
    }

    #[test]
    fn mutual_declaration_emits_exactly_one_edge() {
        // Row 0 declares child R2, row 1 declares parent R1: same edge from
        // both sides, in either file order.
        let mut forward = RelationResolver::default();
        assert!(forward.observe("R1", 0, &[], &["R2"]).is_empty());
        assert_eq!(forward.observe("R2", 1, &["R1"], &[]), vec![edge(1, 0)]);
        assert_eq!(forward.unresolved_count(), 0);

        let mut backward = RelationResolver::default();
        assert!(backward.observe("R2", 0, &["R1"], &[]).is_empty());
        assert_eq!(backward.observe("R1", 1, &[], &["R2"]), vec![edge(0, 1)]);
        assert_eq!(backward.unresolved_count(), 0);
    }

    #[test]
    fn multiple_parents_and_children_all_link() {
        let mut resolver = RelationResolver::default();
        let mut edges = Vec::new();
        edges.extend(resolver.observe("A", 0, &[], &[]));
        edges.extend(resolver.observe("B", 1, &["A"], &[]));
        edges.extend(resolver.observe("C", 2, &["A", "B"], &[]));
        edges.sort();
        assert_eq!(edges, vec![edge(1, 0), edge(2, 0), edge(2, 1)]);
    }

    #[test]
    fn out_of_window_references_stay_pending() {
        let mut resolver = RelationResolver::default();
        assert!(
            resolver
                .observe("X", 0, &["GONE_P"], &["GONE_C"])
                .is_empty()
        );
        assert_eq!(resolver.unresolved_count(), 2);
        let mut ids: Vec<&str> = resolver.unresolved_source_ids().collect();
        ids.sort();
        assert_eq!(ids, vec!["GONE_C", "GONE_P"]);
    }

    #[test]
    fn repeated_declaration_tokens_emit_one_edge() {
        let mut resolver = RelationResolver::default();
        assert!(resolver.observe("P", 0, &[], &[]).is_empty());
        let edges = resolver.observe("C", 1, &["P", "P"], &[]);
        assert_eq!(edges, vec![edge(1, 0)]);
    }

    #[test]
    fn self_reference_never_links() {
        let mut resolver = RelationResolver::default();
        assert!(resolver.observe("X", 0, &["X"], &[]).is_empty());
        assert_eq!(resolver.unresolved_count(), 1);
    }
}
