//! Domain types shared by the sparse, dense and hybrid engines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ChunkId = String;

/// Position of a chunk inside its source.
///
/// `page` is the 1-based page/slide/section number. `span` is the character
/// range `[start, end)` within that page when the page had to be split into
/// several windows; it is `None` when the whole page fits in one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub page: usize,
    pub span: Option<(usize, usize)>,
}

impl Locator {
    pub fn page(page: usize) -> Self { Self { page, span: None } }

    pub fn span(page: usize, start: usize, end: usize) -> Self { Self { page, span: Some((start, end)) } }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some((start, end)) => write!(f, "{}:{}-{}", self.page, start, end),
            None => write!(f, "{}", self.page),
        }
    }
}

impl FromStr for Locator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || format!("invalid locator '{s}'");
        match s.split_once(':') {
            None => Ok(Self::page(s.trim().parse().map_err(|_| bad())?)),
            Some((page, range)) => {
                let (start, end) = range.split_once('-').ok_or_else(bad)?;
                Ok(Self::span(
                    page.trim().parse().map_err(|_| bad())?,
                    start.trim().parse().map_err(|_| bad())?,
                    end.trim().parse().map_err(|_| bad())?,
                ))
            }
        }
    }
}

/// A retrievable unit of source text.
///
/// - `id`: identifier assigned at ingestion (`source:page:index`); not a content key
/// - `source`: originating document (file name)
/// - `locator`: page and optional character span within the source
/// - `content`: the text payload, never blank
///
/// Chunks are immutable once ingested. Two chunks may carry identical
/// `content`; the hybrid merge deduplicates on content, not on `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub source: String,
    pub locator: Locator,
    pub content: String,
}

/// Indicates which engine produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMethod {
    Vector,
    Bm25,
}

impl RetrievalMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Bm25 => "bm25",
        }
    }
}

impl fmt::Display for RetrievalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// A chunk annotated with where it came from.
///
/// `score` is engine-specific: a similarity (`1 - distance`) for vector
/// results, a raw BM25 magnitude for lexical ones. Scores from different
/// engines are never compared with each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub chunk: Chunk,
    pub score: Option<f32>,
    pub retrieval_method: RetrievalMethod,
}

impl RetrievedDocument {
    pub fn new(chunk: Chunk, score: Option<f32>, retrieval_method: RetrievalMethod) -> Self {
        Self { chunk, score, retrieval_method }
    }

    pub fn content(&self) -> &str { &self.chunk.content }
}

/// Raw nearest-neighbour hit from a vector store. `distance` is lower-is-better.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    pub chunk: Chunk,
    pub distance: f32,
}

impl VectorHit {
    pub fn similarity(&self) -> f32 { 1.0 - self.distance }
}
