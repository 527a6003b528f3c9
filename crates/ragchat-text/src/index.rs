use async_trait::async_trait;
use std::sync::Mutex;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{doc, Index, Term, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};
use tracing::info;

use ragchat_core::error::{Error, Result};
use ragchat_core::traits::SearchEngine;
use ragchat_core::types::{Chunk, Locator, RetrievalMethod, RetrievedDocument};

use crate::tantivy_utils::{build_schema, query_terms, register_tokenizer};

const ENGINE: &str = "bm25";
const WRITER_MEMORY_BYTES: usize = 50_000_000;

fn index_err(e: impl ToString) -> Error { Error::index(ENGINE, e) }

/// Sparse lexical index. Lives in RAM only and is rebuilt from the chunk
/// corpus at startup.
pub struct TantivyIndexer {
	index: Index,
	id_field: Field,
	source_field: Field,
	locator_field: Field,
	content_field: Field,
	write_lock: Mutex<()>,
}

impl TantivyIndexer {
	pub fn new() -> Result<Self> {
		let schema = build_schema();
		let index = Index::create_in_ram(schema.clone());
		register_tokenizer(&index);
		let id_field = schema.get_field("id").map_err(index_err)?;
		let source_field = schema.get_field("source").map_err(index_err)?;
		let locator_field = schema.get_field("locator").map_err(index_err)?;
		let content_field = schema.get_field("content").map_err(index_err)?;
		Ok(Self { index, id_field, source_field, locator_field, content_field, write_lock: Mutex::new(()) })
	}

	/// A reader pinned to the latest commit.
	fn reader(&self) -> Result<IndexReader> {
		self.index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into().map_err(index_err)
	}

	pub fn num_docs(&self) -> Result<usize> {
		Ok(self.reader()?.searcher().num_docs() as usize)
	}

	fn add(&self, chunks: &[Chunk]) -> Result<()> {
		let _guard = self.write_lock.lock().map_err(|_| index_err("writer lock poisoned"))?;
		let mut index_writer: IndexWriter = self.index.writer(WRITER_MEMORY_BYTES).map_err(index_err)?;
		for c in chunks {
			let doc = doc!(
				self.id_field => c.id.clone(),
				self.source_field => c.source.clone(),
				self.locator_field => c.locator.to_string(),
				self.content_field => c.content.clone(),
			);
			index_writer.add_document(doc).map_err(index_err)?;
		}
		index_writer.commit().map_err(index_err)?;
		info!(chunks = chunks.len(), "bm25 index updated");
		Ok(())
	}

	fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>> {
		if k == 0 {
			return Ok(Vec::new());
		}
		let terms = query_terms(&self.index, self.content_field, query).map_err(index_err)?;
		if terms.is_empty() {
			return Ok(Vec::new());
		}
		let searcher = self.reader()?.searcher();
		if searcher.num_docs() == 0 {
			return Ok(Vec::new());
		}
		let clauses: Vec<(Occur, Box<dyn Query>)> = terms
			.iter()
			.map(|t| {
				let term = Term::from_field_text(self.content_field, t);
				(Occur::Should, Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs)) as Box<dyn Query>)
			})
			.collect();
		let q = BooleanQuery::new(clauses);
		let top_docs = searcher.search(&q, &TopDocs::with_limit(k)).map_err(index_err)?;
		let mut hits = Vec::with_capacity(top_docs.len());
		for (score, addr) in top_docs {
			let doc: TantivyDocument = searcher.doc(addr).map_err(index_err)?;
			let text = |field: Field| doc.get_first(field).and_then(|v| v.as_str()).unwrap_or("").to_string();
			let locator: Locator = text(self.locator_field).parse().map_err(index_err)?;
			let chunk = Chunk { id: text(self.id_field), source: text(self.source_field), locator, content: text(self.content_field) };
			hits.push(RetrievedDocument::new(chunk, Some(score), RetrievalMethod::Bm25));
		}
		Ok(hits)
	}
}

#[async_trait]
impl SearchEngine for TantivyIndexer {
	async fn index(&self, chunks: &[Chunk]) -> Result<()> {
		if chunks.is_empty() {
			return Ok(());
		}
		self.add(chunks)
	}

	async fn query(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>> {
		self.search(query, k)
	}
}
