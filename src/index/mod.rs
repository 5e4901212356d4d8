//! Index store
//!
//! Holds one embedding per corpus chunk together with the chunk texts, index-aligned:
//! the vector in slot `i` belongs to the chunk in slot `i`. The store is built offline,
//! persisted as two JSON files, and loaded read-only for serving.
//!
//! # Storage Model
//!
//! ```text
//! <index dir>/index.json   { version, model, metric, dimension, vectors: [[f32; dimension]; n] }
//! <index dir>/chunks.json  ["chunk text", ...]                                        (n entries)
//! ```
//!
//! Loading rejects any artifact whose vector and chunk counts differ, or whose vectors
//! disagree on dimensionality.


use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::chunking::Chunk;
use crate::provider::{Embedder, Embedding, ProviderError};

pub const INDEX_FILE_NAME: &str = "index.json";
pub const CHUNKS_FILE_NAME: &str = "chunks.json";
const FORMAT_VERSION: u32 = 1;

/// Similarity metric used to rank stored vectors against a query vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Euclidean distance; smaller distance ranks higher
    #[default]
    L2,
    /// Dot product; larger product ranks higher
    InnerProduct,
}

impl Metric {
    /// Similarity of `a` and `b` where larger always means more similar
    #[inline]
    pub fn similarity(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::L2 => {
                let squared: f32 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
                -squared.sqrt()
            }
            Self::InnerProduct => a.iter().zip(b).map(|(x, y)| x * y).sum(),
        }
    }
}

impl fmt::Display for Metric {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::L2 => f.write_str("l2"),
            Self::InnerProduct => f.write_str("inner_product"),
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l2" | "euclidean" => Ok(Self::L2),
            "inner_product" | "ip" | "dot" => Ok(Self::InnerProduct),
            other => Err(format!(
                "unknown metric '{other}' (expected 'l2' or 'inner_product')"
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index artifact not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported index format version {0}")]
    UnsupportedVersion(u32),
    #[error("index holds {vectors} vectors but {chunks} chunk texts")]
    CountMismatch { vectors: usize, chunks: usize },
    #[error("vector {position} has {found} dimensions, expected {expected}")]
    InconsistentDimension {
        position: usize,
        expected: usize,
        found: usize,
    },
    #[error("query vector has {found} dimensions but the index holds {expected}-dimensional vectors")]
    QueryDimension { expected: usize, found: usize },
    #[error("failed to embed chunk: {0}")]
    Embedding(#[source] ProviderError),
}

impl IndexError {
    /// Whether this error means the artifact's vectors and chunks cannot be trusted
    #[inline]
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            Self::CountMismatch { .. } | Self::InconsistentDimension { .. }
        )
    }
}

/// A retrieved chunk and its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// Ordinal position of the chunk in the corpus
    pub position: usize,
    pub text: String,
    /// Higher is more similar; for `l2` this is the negated distance
    pub score: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    model: String,
    metric: Metric,
    dimension: usize,
    vectors: Vec<Embedding>,
}

/// Read-only, index-aligned store of chunk vectors and chunk texts
#[derive(Debug, Clone)]
pub struct IndexStore {
    model: String,
    metric: Metric,
    dimension: usize,
    vectors: Vec<Embedding>,
    chunks: Vec<String>,
}

impl IndexStore {
    /// Assemble a store from already computed vectors, checking alignment
    #[inline]
    pub fn from_parts(
        model: impl Into<String>,
        metric: Metric,
        vectors: Vec<Embedding>,
        chunks: Vec<String>,
    ) -> Result<Self, IndexError> {
        if vectors.len() != chunks.len() {
            return Err(IndexError::CountMismatch {
                vectors: vectors.len(),
                chunks: chunks.len(),
            });
        }

        let dimension = vectors.first().map_or(0, Vec::len);
        check_dimensions(&vectors, dimension)?;

        Ok(Self {
            model: model.into(),
            metric,
            dimension,
            vectors,
            chunks,
        })
    }

    /// Embed every chunk in order and build the store
    #[inline]
    pub fn build(
        chunks: &[Chunk],
        embedder: &dyn Embedder,
        metric: Metric,
    ) -> Result<Self, IndexError> {
        Self::build_with_progress(chunks, embedder, metric, |_, _| {})
    }

    /// Like [`build`](Self::build), calling `on_progress(done, total)` after each chunk
    #[inline]
    pub fn build_with_progress<F>(
        chunks: &[Chunk],
        embedder: &dyn Embedder,
        metric: Metric,
        mut on_progress: F,
    ) -> Result<Self, IndexError>
    where
        F: FnMut(usize, usize),
    {
        info!(
            "Building {} index over {} chunks with model {}",
            metric,
            chunks.len(),
            embedder.model()
        );

        let mut vectors = Vec::with_capacity(chunks.len());
        for (done, chunk) in chunks.iter().enumerate() {
            let vector = embedder.embed(&chunk.text).map_err(IndexError::Embedding)?;
            vectors.push(vector);
            on_progress(done + 1, chunks.len());
        }

        let texts = chunks.iter().map(|c| c.text.clone()).collect();
        let store = Self::from_parts(embedder.model(), metric, vectors, texts)?;

        info!(
            "Built index with {} entries ({} dimensions)",
            store.len(),
            store.dimension
        );
        Ok(store)
    }

    /// Load a persisted store from `dir`
    #[inline]
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, IndexError> {
        let dir = dir.as_ref();
        let index_path = dir.join(INDEX_FILE_NAME);
        let chunks_path = dir.join(CHUNKS_FILE_NAME);

        debug!("Loading index from {}", dir.display());

        let index: IndexFile = read_json(&index_path)?;
        let chunks: Vec<String> = read_json(&chunks_path)?;

        if index.version != FORMAT_VERSION {
            return Err(IndexError::UnsupportedVersion(index.version));
        }

        if index.vectors.len() != chunks.len() {
            return Err(IndexError::CountMismatch {
                vectors: index.vectors.len(),
                chunks: chunks.len(),
            });
        }

        // An empty index carries no vectors to agree with its header
        if !index.vectors.is_empty() {
            check_dimensions(&index.vectors, index.dimension)?;
        }

        info!(
            "Loaded index with {} entries ({} dimensions, {} metric, model {})",
            chunks.len(),
            index.dimension,
            index.metric,
            index.model
        );

        Ok(Self {
            model: index.model,
            metric: index.metric,
            dimension: index.dimension,
            vectors: index.vectors,
            chunks,
        })
    }

    /// Persist the store to `dir`, creating it if needed
    #[inline]
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<(), IndexError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| IndexError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let index = IndexFile {
            version: FORMAT_VERSION,
            model: self.model.clone(),
            metric: self.metric,
            dimension: self.dimension,
            vectors: self.vectors.clone(),
        };

        write_json(&dir.join(INDEX_FILE_NAME), &index)?;
        write_json(&dir.join(CHUNKS_FILE_NAME), &self.chunks)?;

        info!("Saved index with {} entries to {}", self.len(), dir.display());
        Ok(())
    }

    /// The `k` chunks most similar to `query`, best first.
    ///
    /// Equal scores keep corpus order. Asking for more than the store holds returns
    /// everything; an empty store returns nothing.
    #[inline]
    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, IndexError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if query.len() != self.dimension {
            return Err(IndexError::QueryDimension {
                expected: self.dimension,
                found: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, self.metric.similarity(query, vector)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        debug!(
            "Index query returned {} of {} entries",
            scored.len(),
            self.len()
        );

        Ok(scored
            .into_iter()
            .map(|(position, score)| ScoredChunk {
                position,
                text: self.chunks[position].clone(),
                score,
            })
            .collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embedding model the stored vectors were produced with
    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[inline]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }
}

fn check_dimensions(vectors: &[Embedding], expected: usize) -> Result<(), IndexError> {
    match vectors
        .iter()
        .enumerate()
        .find(|(_, v)| v.len() != expected)
    {
        Some((position, vector)) => Err(IndexError::InconsistentDimension {
            position,
            expected,
            found: vector.len(),
        }),
        None => Ok(()),
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, IndexError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            IndexError::Missing(path.to_path_buf())
        } else {
            IndexError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_str(&content).map_err(|source| IndexError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), IndexError> {
    let content = serde_json::to_string(value).map_err(|source| IndexError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, content).map_err(|source| IndexError::Write {
        path: path.to_path_buf(),
        source,
    })
}
