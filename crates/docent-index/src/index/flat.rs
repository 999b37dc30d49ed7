//! Brute-force vector index
//!
//! Scans every stored vector on each query. Exact, simple, and fast enough
//! for stores up to the tens of thousands of chunks; the HNSW backend takes
//! over beyond that.

use parking_lot::RwLock;
use uuid::Uuid;

use crate::distance::cosine_similarity;

use super::{ChunkRef, IndexError, Neighbor, Result, VectorIndex};

/// Exact cosine-similarity index backed by a linear scan
pub struct FlatIndex {
    entries: RwLock<Vec<ChunkRef>>,
    dimensions: usize,
}

impl FlatIndex {
    /// Create an empty index for vectors of the given width
    pub fn new(dimensions: usize) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            dimensions,
        }
    }

    /// Configured vector width
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

impl VectorIndex for FlatIndex {
    fn insert(&self, entry: ChunkRef) -> Result<()> {
        if entry.vector.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: entry.vector.len(),
            });
        }
        self.entries.write().push(entry);
        Ok(())
    }

    fn remove_document(&self, document_id: &Uuid) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.document_id != *document_id);
        before - entries.len()
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let entries = self.entries.read();
        let mut scored: Vec<(usize, Neighbor)> = entries
            .iter()
            .enumerate()
            .map(|(pos, e)| {
                (
                    pos,
                    Neighbor {
                        chunk_id: e.chunk_id,
                        document_id: e.document_id,
                        similarity: cosine_similarity(query, &e.vector),
                    },
                )
            })
            .collect();

        // Descending similarity; equal scores keep insertion order
        scored.sort_by(|a, b| {
            b.1.similarity
                .partial_cmp(&a.1.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);

        Ok(scored.into_iter().map(|(_, n)| n).collect())
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn name(&self) -> &str {
        "flat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(doc: Uuid, vector: Vec<f32>) -> ChunkRef {
        ChunkRef {
            chunk_id: Uuid::new_v4(),
            document_id: doc,
            vector,
        }
    }

    #[test]
    fn rejects_wrong_width() {
        let index = FlatIndex::new(3);
        let err = index.insert(entry(Uuid::new_v4(), vec![1.0, 2.0])).unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch { expected: 3, actual: 2 }
        ));
    }

    #[test]
    fn nearest_first() {
        let index = FlatIndex::new(2);
        let doc = Uuid::new_v4();
        let near = entry(doc, vec![1.0, 0.1]);
        let far = entry(doc, vec![0.0, 1.0]);
        let near_id = near.chunk_id;
        index.insert(far).unwrap();
        index.insert(near).unwrap();

        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].chunk_id, near_id);
        assert!(hits[0].similarity > hits[1].similarity);
    }
}
