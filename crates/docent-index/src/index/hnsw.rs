//! HNSW-backed vector index
//!
//! Wraps `hnsw_rs` for approximate nearest-neighbor search. The graph has no
//! hard delete, so removals tombstone the slot and searches over-fetch by the
//! tombstone count before filtering.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use hnsw_rs::prelude::{DistCosine, Hnsw};
use parking_lot::RwLock;
use uuid::Uuid;

use super::{ChunkRef, IndexError, Neighbor, Result, VectorIndex};

/// HNSW graph parameters
#[derive(Debug, Clone)]
pub struct HnswParams {
    /// Connections per layer (M)
    pub max_connections: usize,
    /// Candidate list size during construction
    pub ef_construction: usize,
    /// Candidate list size during search
    pub ef_search: usize,
    /// Expected maximum element count (sizing hint, not a hard cap)
    pub capacity: usize,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            max_connections: 32,
            ef_construction: 200,
            ef_search: 100,
            capacity: 100_000,
        }
    }
}

struct Slot {
    chunk_id: Uuid,
    document_id: Uuid,
    alive: bool,
}

/// Approximate cosine-similarity index backed by an HNSW graph
pub struct HnswIndex {
    graph: Hnsw<'static, f32, DistCosine>,
    /// Slot id (graph data id) -> chunk identity, in insertion order
    slots: RwLock<Vec<Slot>>,
    by_document: RwLock<HashMap<Uuid, Vec<usize>>>,
    tombstones: AtomicUsize,
    dimensions: usize,
    ef_search: usize,
}

impl HnswIndex {
    /// Create an empty index for vectors of the given width
    pub fn new(dimensions: usize, params: HnswParams) -> Self {
        let graph = Hnsw::new(
            params.max_connections,
            params.capacity,
            16,
            params.ef_construction,
            DistCosine {},
        );
        Self {
            graph,
            slots: RwLock::new(Vec::new()),
            by_document: RwLock::new(HashMap::new()),
            tombstones: AtomicUsize::new(0),
            dimensions,
            ef_search: params.ef_search,
        }
    }

    /// Configured vector width
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

impl VectorIndex for HnswIndex {
    fn insert(&self, entry: ChunkRef) -> Result<()> {
        if entry.vector.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: entry.vector.len(),
            });
        }

        // The write lock keeps slot ids aligned with insertion order
        let mut slots = self.slots.write();
        let slot = slots.len();
        self.graph.insert((&entry.vector, slot));
        slots.push(Slot {
            chunk_id: entry.chunk_id,
            document_id: entry.document_id,
            alive: true,
        });
        self.by_document
            .write()
            .entry(entry.document_id)
            .or_default()
            .push(slot);
        Ok(())
    }

    fn remove_document(&self, document_id: &Uuid) -> usize {
        let doc_slots = match self.by_document.write().remove(document_id) {
            Some(s) => s,
            None => return 0,
        };

        let mut slots = self.slots.write();
        let mut removed = 0;
        for slot in doc_slots {
            if let Some(s) = slots.get_mut(slot) {
                if s.alive {
                    s.alive = false;
                    removed += 1;
                }
            }
        }
        self.tombstones.fetch_add(removed, Ordering::Relaxed);
        tracing::debug!(document_id = %document_id, removed, "tombstoned document entries");
        removed
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let slots = self.slots.read();
        if slots.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        // Over-fetch past tombstoned entries, then filter them out
        let fetch = (k + self.tombstones.load(Ordering::Relaxed)).min(slots.len());
        let ef = self.ef_search.max(fetch);
        let neighbours = self.graph.search(query, fetch, ef);

        let mut hits: Vec<(usize, Neighbor)> = neighbours
            .into_iter()
            .filter_map(|n| {
                let slot = slots.get(n.d_id)?;
                if !slot.alive {
                    return None;
                }
                Some((
                    n.d_id,
                    Neighbor {
                        chunk_id: slot.chunk_id,
                        document_id: slot.document_id,
                        similarity: 1.0 - n.distance,
                    },
                ))
            })
            .collect();

        hits.sort_by(|a, b| {
            b.1.similarity
                .partial_cmp(&a.1.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        hits.truncate(k);

        Ok(hits.into_iter().map(|(_, n)| n).collect())
    }

    fn len(&self) -> usize {
        self.slots.read().len() - self.tombstones.load(Ordering::Relaxed)
    }

    fn name(&self) -> &str {
        "hnsw"
    }
}
