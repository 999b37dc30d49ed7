//! SQLite catalog for documents and chunks
//!
//! The catalog is the durability layer: documents and chunks (with their
//! embedding vectors) live here, and the in-memory vector index is rebuilt
//! from it at startup. A document and its chunks are written and deleted in
//! single transactions, so partial state is never observable.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use docent_index::ChunkRef;

use crate::error::{Error, Result};
use crate::types::{Chunk, ContentType, Document};

/// A chunk joined with its parent document's display name
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub id: Uuid,
    pub document_id: Uuid,
    pub document_name: String,
    pub content: String,
    pub chunk_index: u32,
}

/// SQLite-backed document/chunk catalog
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create or open the catalog at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory catalog (tests, throwaway runs)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;

            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                content_type TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                total_chunks INTEGER NOT NULL DEFAULT 0,
                ingested_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_documents_content_hash ON documents(content_hash);

            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                chunk_index INTEGER NOT NULL,
                content TEXT NOT NULL,
                embedding BLOB
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_document_id ON chunks(document_id);
            "#,
        )?;

        tracing::debug!("catalog migrations complete");
        Ok(())
    }

    /// Insert a document and all of its chunks in one transaction
    pub fn insert_document(&self, document: &Document, chunks: &[Chunk]) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO documents (id, filename, content_type, content_hash, file_size, total_chunks, ingested_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                document.id.to_string(),
                document.filename,
                document.content_type.as_str(),
                document.content_hash,
                document.file_size,
                document.total_chunks,
                document.ingested_at,
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO chunks (id, document_id, chunk_index, content, embedding)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for chunk in chunks {
                let embedding = if chunk.is_embedded() {
                    Some(encode_vector(&chunk.embedding))
                } else {
                    None
                };
                stmt.execute(params![
                    chunk.id.to_string(),
                    chunk.document_id.to_string(),
                    chunk.chunk_index,
                    chunk.content,
                    embedding,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Delete a document and its chunks atomically, returning the chunk count
    pub fn delete_document(&self, id: &Uuid) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let chunk_count: usize = tx.query_row(
            "SELECT COUNT(*) FROM chunks WHERE document_id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;

        let deleted = tx.execute("DELETE FROM documents WHERE id = ?1", params![id.to_string()])?;
        if deleted == 0 {
            return Err(Error::NotFound(*id));
        }

        tx.commit()?;
        Ok(chunk_count)
    }

    /// Fetch one document
    pub fn get_document(&self, id: &Uuid) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, filename, content_type, content_hash, file_size, total_chunks, ingested_at
             FROM documents WHERE id = ?1",
            params![id.to_string()],
            row_to_document,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Find a document by content hash (deduplication)
    pub fn find_document_by_hash(&self, content_hash: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, filename, content_type, content_hash, file_size, total_chunks, ingested_at
             FROM documents WHERE content_hash = ?1 LIMIT 1",
            params![content_hash],
            row_to_document,
        )
        .optional()
        .map_err(Error::from)
    }

    /// List all documents, newest first
    pub fn list_documents(&self) -> Result<Vec<Document>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, filename, content_type, content_hash, file_size, total_chunks, ingested_at
             FROM documents ORDER BY ingested_at DESC",
        )?;
        let rows = stmt.query_map([], row_to_document)?;
        let mut documents = Vec::new();
        for row in rows {
            documents.push(row?);
        }
        Ok(documents)
    }

    /// Fetch chunks by id, joined with their document names
    pub fn chunks_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ChunkRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT c.id, c.document_id, d.filename, c.content, c.chunk_index
             FROM chunks c JOIN documents d ON d.id = c.document_id
             WHERE c.id = ?1",
        )?;

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let record = stmt
                .query_row(params![id.to_string()], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, u32>(4)?,
                    ))
                })
                .optional()?;
            if let Some((id, document_id, document_name, content, chunk_index)) = record {
                records.push(ChunkRecord {
                    id: parse_uuid(&id)?,
                    document_id: parse_uuid(&document_id)?,
                    document_name,
                    content,
                    chunk_index,
                });
            }
        }
        Ok(records)
    }

    /// Load every embedded chunk for index rebuild at startup.
    ///
    /// Chunks whose stored vector width differs from the configured dimension
    /// are logged and skipped rather than poisoning the index.
    pub fn embedded_chunks(&self, dimensions: usize) -> Result<Vec<ChunkRef>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, document_id, embedding FROM chunks
             WHERE embedding IS NOT NULL ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Vec<u8>>(2)?,
            ))
        })?;

        let mut refs = Vec::new();
        for row in rows {
            let (id, document_id, blob) = row?;
            let vector = decode_vector(&blob);
            if vector.len() != dimensions {
                tracing::warn!(
                    chunk_id = %id,
                    width = vector.len(),
                    expected = dimensions,
                    "skipping chunk with mismatched vector width; re-ingest its document"
                );
                continue;
            }
            refs.push(ChunkRef {
                chunk_id: parse_uuid(&id)?,
                document_id: parse_uuid(&document_id)?,
                vector,
            });
        }
        Ok(refs)
    }
}

fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
    let id: String = row.get(0)?;
    let content_type: String = row.get(2)?;
    Ok(Document {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        filename: row.get(1)?,
        content_type: ContentType::from_tag(&content_type),
        content_hash: row.get(3)?,
        file_size: row.get(4)?,
        total_chunks: row.get(5)?,
        ingested_at: row.get::<_, DateTime<Utc>>(6)?,
    })
}

fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| Error::Internal(format!("corrupt id in catalog: {}", e)))
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(vector.len() * 4);
    for x in vector {
        out.extend_from_slice(&x.to_le_bytes());
    }
    out
}

fn decode_vector(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
