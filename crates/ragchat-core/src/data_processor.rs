//! Source extraction and chunking.
//!
//! Extraction is pluggable per source format via [`DocumentExtractor`]; the
//! [`Chunker`] turns each extracted page into overlapping character windows.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::{Chunk, Locator};

/// Text of one logical unit (page, slide, section) of a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub source: String,
    pub page: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Plain text; pages are separated by form feeds (`\x0c`).
    Text,
    /// Markdown; each level-1 heading starts a new section.
    Markdown,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "text" => Some(Self::Text),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }
}

pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<Vec<ExtractedPage>>;
}

/// Select the extractor for a path, keyed on its format. `None` means the
/// format is not supported and the source should be skipped.
pub fn extractor_for(path: &Path) -> Option<Box<dyn DocumentExtractor>> {
    match SourceFormat::from_path(path)? {
        SourceFormat::Text => Some(Box::new(PlainTextExtractor)),
        SourceFormat::Markdown => Some(Box::new(MarkdownExtractor)),
    }
}

pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<ExtractedPage>> {
        let source = source_name(path);
        let content = read_file_content(path, &source)?;
        Ok(content
            .split('\u{0c}')
            .enumerate()
            .map(|(i, text)| ExtractedPage { source: source.clone(), page: i + 1, text: text.to_string() })
            .collect())
    }
}

pub struct MarkdownExtractor;

impl DocumentExtractor for MarkdownExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<ExtractedPage>> {
        let source = source_name(path);
        let content = read_file_content(path, &source)?;
        let mut sections: Vec<String> = Vec::new();
        let mut current = String::new();
        for line in content.lines() {
            if line.starts_with("# ") && !current.trim().is_empty() {
                sections.push(std::mem::take(&mut current));
            }
            current.push_str(line);
            current.push('\n');
        }
        if !current.trim().is_empty() {
            sections.push(current);
        }
        Ok(sections
            .into_iter()
            .enumerate()
            .map(|(i, text)| ExtractedPage { source: source.clone(), page: i + 1, text })
            .collect())
    }
}

fn source_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| path.display().to_string())
}

fn read_file_content(path: &Path, source: &str) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(_) => {
            let bytes = fs::read(path).map_err(|e| Error::extraction(source, e))?;
            Ok(String::from_utf8_lossy(&bytes).to_string())
        }
    }
}

/// Fixed-size character windows with overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Split one page of `source_id`. A page that fits in `chunk_size`
    /// characters becomes a single chunk; longer pages are cut into windows
    /// advancing by `chunk_size - chunk_overlap`, stopping at the window that
    /// reaches the end of the text. Blank pages and blank windows yield nothing.
    pub fn chunk(&self, text: &str, source_id: &str, page: usize) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        if len <= self.chunk_size {
            return vec![Chunk {
                id: format!("{source_id}:{page}:0"),
                source: source_id.to_string(),
                locator: Locator::page(page),
                content: text.to_string(),
            }];
        }

        let stride = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(len);
            let content: String = chars[start..end].iter().collect();
            if !content.trim().is_empty() {
                chunks.push(Chunk {
                    id: format!("{source_id}:{page}:{}", chunks.len()),
                    source: source_id.to_string(),
                    locator: Locator::span(page, start, end),
                    content,
                });
            }
            if end >= len {
                break;
            }
            start += stride;
        }
        chunks
    }

    pub fn chunk_pages(&self, pages: &[ExtractedPage]) -> Vec<Chunk> {
        pages.iter().flat_map(|p| self.chunk(&p.text, &p.source, p.page)).collect()
    }
}

pub struct DataProcessor {
    chunker: Chunker,
}

impl DataProcessor {
    pub fn new(chunker: Chunker) -> Self { Self { chunker } }

    pub fn chunker(&self) -> &Chunker { &self.chunker }

    pub fn process_file(&self, path: &Path) -> Result<Vec<Chunk>> {
        let extractor = extractor_for(path)
            .ok_or_else(|| Error::extraction(source_name(path), "unsupported file format"))?;
        let pages = extractor.extract(path)?;
        Ok(self.chunker.chunk_pages(&pages))
    }

    /// Process every supported file under `data_dir` in path order. A source
    /// that fails to extract is logged and skipped; the rest of the batch goes on.
    pub fn process_directory(&self, data_dir: &Path) -> Vec<SourceChunks> {
        let files = list_source_files(data_dir);
        if files.is_empty() {
            warn!(dir = %data_dir.display(), "no supported source files found");
            return Vec::new();
        }
        let mut processed = Vec::new();
        for (file_index, path) in files.iter().enumerate() {
            info!(file = %path.display(), "processing file {}/{}", file_index + 1, files.len());
            match self.process_file(path) {
                Ok(chunks) => processed.push(SourceChunks { path: path.clone(), chunks }),
                Err(e) => warn!(file = %path.display(), error = %e, "skipping source"),
            }
        }
        let total: usize = processed.iter().map(|s| s.chunks.len()).sum();
        info!(files = processed.len(), chunks = total, "processed source files");
        processed
    }
}

/// Chunks produced from one source file.
#[derive(Debug, Clone)]
pub struct SourceChunks {
    pub path: PathBuf,
    pub chunks: Vec<Chunk>,
}

/// Write a human-readable copy of the chunks of one source.
pub fn save_chunks(chunks: &[Chunk], output_dir: &Path, filename: &str) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join(filename);
    let mut file = fs::File::create(&output_path)?;
    for chunk in chunks {
        writeln!(file, "--- Chunk from {} (Page/Slide {}) ---", chunk.source, chunk.locator)?;
        file.write_all(chunk.content.as_bytes())?;
        file.write_all(b"\n\n")?;
    }
    info!(path = %output_path.display(), "saved processed content");
    Ok(output_path)
}

fn list_source_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
        let path = entry.path();
        if SourceFormat::from_path(path).is_some() {
            files.push(path.to_path_buf());
        } else {
            warn!(file = %path.display(), "unsupported file format");
        }
    }
    files.sort();
    files
}
