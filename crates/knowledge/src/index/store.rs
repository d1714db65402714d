//! SQLite persistence for built indexes.
//!
//! One file per index with two tables: a single-row `manifest` and
//! `entries` in build order. Vectors are stored as little-endian f32 blobs.
//! Saving writes a sibling temp file and renames it over the target, so a
//! reader never sees a half-written index.

use crate::index::vector_index::MemoryIndex;
use crate::types::{Chunk, DocumentMetadata, IndexEntry, IndexManifest};
use chrono::{DateTime, Utc};
use pulsepoint_core::{AppError, AppResult};
use rusqlite::{params, Connection, OpenFlags};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const SCHEMA: &str = r#"
CREATE TABLE manifest (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    embedding_version TEXT NOT NULL,
    dimensions INTEGER NOT NULL,
    entry_count INTEGER NOT NULL,
    thread_count INTEGER NOT NULL,
    content_hash TEXT NOT NULL,
    built_at TEXT NOT NULL
);

CREATE TABLE entries (
    ordinal INTEGER PRIMARY KEY,
    thread_id TEXT NOT NULL,
    source_label TEXT NOT NULL,
    title TEXT NOT NULL,
    position INTEGER NOT NULL,
    text TEXT NOT NULL,
    embedding BLOB NOT NULL
);
"#;

/// Persist entries and manifest to `path`, replacing any previous index.
pub fn save_index(path: &Path, manifest: &IndexManifest, entries: &[IndexEntry]) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path);
    if tmp_path.exists() {
        std::fs::remove_file(&tmp_path)?;
    }

    write_index(&tmp_path, manifest, entries).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        e
    })?;

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(
        "Saved index with {} entries to {:?}",
        entries.len(),
        path
    );
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_index(path: &Path, manifest: &IndexManifest, entries: &[IndexEntry]) -> AppResult<()> {
    let mut conn = Connection::open(path)
        .map_err(|e| AppError::Other(format!("Failed to create index file: {}", e)))?;

    conn.execute_batch(SCHEMA)
        .map_err(|e| AppError::Other(format!("Failed to create index tables: {}", e)))?;

    let tx = conn
        .transaction()
        .map_err(|e| AppError::Other(format!("Failed to start index transaction: {}", e)))?;

    tx.execute(
        "INSERT INTO manifest (id, embedding_version, dimensions, entry_count, thread_count, content_hash, built_at)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            manifest.embedding_version,
            manifest.dimensions as i64,
            manifest.entry_count as i64,
            manifest.thread_count as i64,
            manifest.content_hash,
            manifest.built_at.to_rfc3339(),
        ],
    )
    .map_err(|e| AppError::Other(format!("Failed to write manifest: {}", e)))?;

    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO entries (ordinal, thread_id, source_label, title, position, text, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .map_err(|e| AppError::Other(format!("Failed to prepare entry insert: {}", e)))?;

        for (ordinal, entry) in entries.iter().enumerate() {
            let meta = &entry.chunk.metadata;
            stmt.execute(params![
                ordinal as i64,
                meta.thread_id,
                meta.source_label,
                meta.title,
                entry.chunk.position as i64,
                entry.chunk.text,
                embedding_to_bytes(&entry.vector),
            ])
            .map_err(|e| AppError::Other(format!("Failed to insert entry: {}", e)))?;
        }
    }

    tx.commit()
        .map_err(|e| AppError::Other(format!("Failed to commit index: {}", e)))?;

    Ok(())
}

fn open_read_only(path: &Path) -> AppResult<Connection> {
    if !path.exists() {
        return Err(AppError::IndexUnavailable(format!(
            "No index at {:?}. Run 'pulsepoint index build' first.",
            path
        )));
    }

    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| AppError::IndexUnavailable(format!("Failed to open index {:?}: {}", path, e)))
}

/// Read only the manifest of a persisted index.
pub fn read_manifest(path: &Path) -> AppResult<IndexManifest> {
    let conn = open_read_only(path)?;
    query_manifest(&conn)
}

fn query_manifest(conn: &Connection) -> AppResult<IndexManifest> {
    let (embedding_version, dimensions, entry_count, thread_count, content_hash, built_at) = conn
        .query_row(
            "SELECT embedding_version, dimensions, entry_count, thread_count, content_hash, built_at
             FROM manifest WHERE id = 1",
            [],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .map_err(|e| AppError::IndexUnavailable(format!("Index manifest unreadable: {}", e)))?;

    let built_at = DateTime::parse_from_rfc3339(&built_at)
        .map_err(|e| AppError::IndexUnavailable(format!("Invalid build timestamp: {}", e)))?
        .with_timezone(&Utc);

    Ok(IndexManifest {
        embedding_version,
        dimensions: to_usize(dimensions, "dimensions")?,
        entry_count: to_usize(entry_count, "entry_count")?,
        thread_count: to_usize(thread_count, "thread_count")?,
        content_hash,
        built_at,
    })
}

fn to_usize(value: i64, field: &str) -> AppResult<usize> {
    usize::try_from(value)
        .map_err(|_| AppError::IndexUnavailable(format!("Invalid manifest {}: {}", field, value)))
}

/// Load a persisted index, refusing one built with another embedding function.
pub fn load_index(path: &Path, expected_version: &str) -> AppResult<(IndexManifest, MemoryIndex)> {
    let conn = open_read_only(path)?;
    let manifest = query_manifest(&conn)?;

    if manifest.embedding_version != expected_version {
        return Err(AppError::IndexUnavailable(format!(
            "Index was built with embedding '{}' but '{}' is configured. Rebuild with 'pulsepoint index build'.",
            manifest.embedding_version, expected_version
        )));
    }

    let mut stmt = conn
        .prepare(
            "SELECT thread_id, source_label, title, position, text, embedding
             FROM entries ORDER BY ordinal",
        )
        .map_err(|e| AppError::IndexUnavailable(format!("Failed to read entries: {}", e)))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                DocumentMetadata {
                    thread_id: row.get(0)?,
                    source_label: row.get(1)?,
                    title: row.get(2)?,
                },
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Vec<u8>>(5)?,
            ))
        })
        .map_err(|e| AppError::IndexUnavailable(format!("Failed to read entries: {}", e)))?;

    let mut entries = Vec::with_capacity(manifest.entry_count);
    for row in rows {
        let (metadata, position, text, blob) =
            row.map_err(|e| AppError::IndexUnavailable(format!("Corrupt index entry: {}", e)))?;

        let vector = bytes_to_embedding(&blob, manifest.dimensions)?;
        let position = u32::try_from(position).map_err(|_| {
            AppError::IndexUnavailable(format!("Invalid chunk position: {}", position))
        })?;

        entries.push(IndexEntry {
            chunk: Chunk {
                text,
                metadata,
                position,
            },
            vector,
        });
    }

    if entries.len() != manifest.entry_count {
        return Err(AppError::IndexUnavailable(format!(
            "Index manifest lists {} entries but {} are stored",
            manifest.entry_count,
            entries.len()
        )));
    }

    let index = MemoryIndex::new(entries, manifest.dimensions)?;

    tracing::info!(
        "Loaded index with {} entries ({})",
        index.entries().len(),
        manifest.embedding_version
    );

    Ok((manifest, index))
}

/// SHA-256 over entries in order, hex encoded.
///
/// Covers thread metadata, position, text and vector bits, so identical
/// builds hash the same.
pub fn content_hash(entries: &[IndexEntry]) -> String {
    let mut hasher = Sha256::new();
    for entry in entries {
        let meta = &entry.chunk.metadata;
        hasher.update(meta.thread_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(meta.source_label.as_bytes());
        hasher.update([0u8]);
        hasher.update(meta.title.as_bytes());
        hasher.update([0u8]);
        hasher.update(entry.chunk.position.to_le_bytes());
        hasher.update(entry.chunk.text.as_bytes());
        hasher.update([0u8]);
        hasher.update(embedding_to_bytes(&entry.vector));
    }
    format!("{:x}", hasher.finalize())
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to an embedding vector of the expected length.
fn bytes_to_embedding(bytes: &[u8], dimensions: usize) -> AppResult<Vec<f32>> {
    if bytes.len() != dimensions * 4 {
        return Err(AppError::IndexUnavailable(format!(
            "Invalid embedding blob: {} bytes for {} dimensions",
            bytes.len(),
            dimensions
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
