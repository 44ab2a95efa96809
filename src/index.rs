//! SQLite-backed vector index.
//!
//! The index is a single SQLite file: an `entries` table holding one
//! (embedding BLOB, chunk text, provenance) row per chunk, and a `meta` row
//! recording the embedding model and its dimensionality. The artifact is
//! versioned to one embedding model — querying through an embedder whose
//! dimensionality differs from the stored one is a
//! [`PipelineError::RetrievalMismatch`], never a silent wrong answer.
//!
//! Build regenerates the artifact from scratch; there is no per-entry
//! update path. After [`VectorIndex::open`] the index is read-only, so
//! concurrent readers are safe.
//!
//! Similarity is brute-force cosine over all stored vectors, computed in
//! process, the same metric at build and query time. Results come back
//! best-first with entry position as the deterministic tie-break.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::cmp::Ordering;
use std::path::Path;
use std::str::FromStr;

use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob, Embedder};
use crate::error::PipelineError;
use crate::models::{Chunk, RetrievedChunk};

#[derive(Debug)]
pub struct VectorIndex {
    pool: SqlitePool,
    model: String,
    dims: usize,
}

impl VectorIndex {
    /// Embed every chunk (batched) and write the index artifact at `path`,
    /// replacing whatever was there.
    pub async fn build(
        path: &Path,
        embedder: &dyn Embedder,
        chunks: &[Chunk],
        batch_size: usize,
    ) -> Result<Self, PipelineError> {
        if chunks.is_empty() {
            return Err(PipelineError::Configuration(
                "refusing to build an empty index: no chunks were produced from the corpus"
                    .to_string(),
            ));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| PipelineError::Storage(e.to_string()))?;
            }
        }

        let pool = open_pool(path, true).await?;
        create_schema(&pool).await?;

        // Rebuild means regenerate: the artifact is never patched in place.
        sqlx::query("DELETE FROM entries").execute(&pool).await?;
        sqlx::query("DELETE FROM meta").execute(&pool).await?;

        let dims = embedder.dims();
        let mut position = 0i64;

        for batch in chunks.chunks(batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = embedder.embed_batch(&texts).await?;

            if vectors.len() != batch.len() {
                return Err(PipelineError::Service(format!(
                    "embedding service returned {} vectors for {} texts",
                    vectors.len(),
                    batch.len()
                )));
            }

            let mut tx = pool.begin().await?;
            for (chunk, vector) in batch.iter().zip(vectors.iter()) {
                if vector.len() != dims {
                    return Err(PipelineError::RetrievalMismatch {
                        index_dims: dims,
                        query_dims: vector.len(),
                    });
                }

                sqlx::query(
                    r#"
                    INSERT INTO entries (id, position, source, page, chunk_index, text, hash, embedding)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&chunk.id)
                .bind(position)
                .bind(&chunk.source)
                .bind(chunk.page.map(i64::from))
                .bind(chunk.chunk_index)
                .bind(&chunk.text)
                .bind(&chunk.hash)
                .bind(vec_to_blob(vector))
                .execute(&mut *tx)
                .await?;

                position += 1;
            }
            tx.commit().await?;
        }

        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO meta (id, model, dims, entry_count, created_at) VALUES (1, ?, ?, ?, ?)",
        )
        .bind(embedder.model_name())
        .bind(dims as i64)
        .bind(position)
        .bind(now)
        .execute(&pool)
        .await?;

        Ok(Self {
            pool,
            model: embedder.model_name().to_string(),
            dims,
        })
    }

    /// Open a previously built index artifact read-only.
    ///
    /// A missing or unreadable artifact is a configuration error; an empty
    /// index is never constructed silently.
    pub async fn open(path: &Path) -> Result<Self, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::Configuration(format!(
                "index not found at {}; run `fad build` first",
                path.display()
            )));
        }

        let pool = open_pool(path, false).await.map_err(|e| {
            PipelineError::Configuration(format!(
                "index at {} could not be opened: {}",
                path.display(),
                e
            ))
        })?;

        let row = sqlx::query("SELECT model, dims FROM meta WHERE id = 1")
            .fetch_optional(&pool)
            .await
            .map_err(|e| {
                PipelineError::Configuration(format!(
                    "index at {} is unreadable: {}",
                    path.display(),
                    e
                ))
            })?
            .ok_or_else(|| {
                PipelineError::Configuration(format!(
                    "index at {} is unreadable: missing metadata",
                    path.display()
                ))
            })?;

        let model: String = row.get("model");
        let dims: i64 = row.get("dims");

        Ok(Self {
            pool,
            model,
            dims: dims as usize,
        })
    }

    /// The embedding model the artifact was built with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Stored vector dimensionality.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Number of stored entries.
    pub async fn entry_count(&self) -> Result<usize, PipelineError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    /// Embed `text` and return the `k` nearest entries, best-first.
    ///
    /// Returns fewer than `k` entries only when the index holds fewer. An
    /// embedder whose dimensionality differs from the artifact's fails
    /// before any network call is made.
    pub async fn query(
        &self,
        embedder: &dyn Embedder,
        text: &str,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, PipelineError> {
        if embedder.dims() != self.dims {
            return Err(PipelineError::RetrievalMismatch {
                index_dims: self.dims,
                query_dims: embedder.dims(),
            });
        }
        if embedder.model_name() != self.model {
            eprintln!(
                "Warning: index was built with embedding model '{}', querying with '{}'",
                self.model,
                embedder.model_name()
            );
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_vec = embedder.embed(text).await?;
        if query_vec.len() != self.dims {
            return Err(PipelineError::RetrievalMismatch {
                index_dims: self.dims,
                query_dims: query_vec.len(),
            });
        }

        let rows =
            sqlx::query("SELECT position, source, page, text, embedding FROM entries ORDER BY position")
                .fetch_all(&self.pool)
                .await?;

        let mut scored: Vec<(i64, RetrievedChunk)> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let vector = blob_to_vec(&blob);
                let score = cosine_similarity(&query_vec, &vector);
                let page: Option<i64> = row.get("page");
                (
                    row.get::<i64, _>("position"),
                    RetrievedChunk {
                        text: row.get("text"),
                        source: row.get("source"),
                        page: page.map(|p| p as u32),
                        score,
                    },
                )
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.score
                .partial_cmp(&a.1.score)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        Ok(scored.into_iter().take(k).map(|(_, c)| c).collect())
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

async fn open_pool(path: &Path, create: bool) -> Result<SqlitePool, PipelineError> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
        .create_if_missing(create)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

async fn create_schema(pool: &SqlitePool) -> Result<(), PipelineError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            id TEXT PRIMARY KEY,
            position INTEGER NOT NULL UNIQUE,
            source TEXT NOT NULL,
            page INTEGER,
            chunk_index INTEGER NOT NULL,
            text TEXT NOT NULL,
            hash TEXT NOT NULL,
            embedding BLOB NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            model TEXT NOT NULL,
            dims INTEGER NOT NULL,
            entry_count INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
