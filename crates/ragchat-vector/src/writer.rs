use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection, DistanceType};
use arrow_array::{Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use ragchat_core::error::{Error, Result};
use ragchat_core::traits::VectorIndexer;
use ragchat_core::types::{Chunk, Locator, VectorHit};

use crate::schema::build_arrow_schema;

const ENGINE: &str = "lancedb";
const INSERT_BATCH_ROWS: usize = 1000;

fn lance_err(e: impl ToString) -> Error { Error::index(ENGINE, e) }

/// Persistent vector store: one LanceDB table of `(id, source, locator, content, vector)`.
/// Survives restarts; searched by cosine distance.
pub struct LanceDbIndexer { db: Connection, db_path: PathBuf, table_name: String, dim: usize }

impl LanceDbIndexer {
	pub async fn new(db_path: &Path, table_name: &str, dim: usize) -> Result<Self> {
		std::fs::create_dir_all(db_path)?;
		let db = connect(db_path.to_string_lossy().as_ref()).execute().await.map_err(lance_err)?;
		Ok(Self { db, db_path: db_path.to_path_buf(), table_name: table_name.to_string(), dim })
	}

	async fn table_exists(&self) -> Result<bool> {
		Ok(self.db.table_names().execute().await.map_err(lance_err)?.contains(&self.table_name))
	}

	/// Drop all stored vectors so the table can be rebuilt from scratch.
	pub async fn reset(&self) -> Result<()> {
		let table_dir = self.db_path.join(format!("{}.lance", self.table_name));
		if table_dir.exists() {
			std::fs::remove_dir_all(&table_dir)?;
			info!(table = %self.table_name, "dropped vector table");
		}
		Ok(())
	}

	async fn insert_batch(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<()> {
		if chunks.is_empty() { return Ok(()); }
		let record_batch = self.to_record_batch(chunks, embeddings)?; let schema = record_batch.schema();
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
		if self.table_exists().await? {
			self.db.open_table(&self.table_name).execute().await.map_err(lance_err)?.add(reader).execute().await.map_err(lance_err)?;
		} else {
			self.db.create_table(&self.table_name, reader).execute().await.map_err(lance_err)?;
		}
		Ok(())
	}

	fn to_record_batch(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<RecordBatch> {
		let dim = i32::try_from(self.dim).map_err(lance_err)?;
		let schema = build_arrow_schema(dim);
		let mut ids = Vec::new(); let mut sources = Vec::new(); let mut locators = Vec::new(); let mut contents = Vec::new(); let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
		for (c, v) in chunks.iter().zip(embeddings) { ids.push(c.id.clone()); sources.push(c.source.clone()); locators.push(c.locator.to_string()); contents.push(c.content.clone()); vectors.push(Some(v.iter().map(|&x| Some(x)).collect())); }
		let record_batch = RecordBatch::try_new(schema, vec![
			Arc::new(StringArray::from(ids)),
			Arc::new(StringArray::from(sources)),
			Arc::new(StringArray::from(locators)),
			Arc::new(StringArray::from(contents)),
			Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), dim)),
		]).map_err(lance_err)?;
		Ok(record_batch)
	}
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
	batch.column_by_name(name).and_then(|c| c.as_any().downcast_ref::<StringArray>()).ok_or_else(|| lance_err(format!("column '{name}' missing")))
}

#[async_trait]
impl VectorIndexer for LanceDbIndexer {
	async fn index(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<()> {
		if chunks.is_empty() { return Ok(()); }
		if chunks.len() != embeddings.len() {
			return Err(lance_err(format!("{} chunks but {} embeddings", chunks.len(), embeddings.len())));
		}
		if let Some(bad) = embeddings.iter().find(|v| v.len() != self.dim) {
			return Err(lance_err(format!("expected {}-dim vectors, got {}", self.dim, bad.len())));
		}
		for (cs, es) in chunks.chunks(INSERT_BATCH_ROWS).zip(embeddings.chunks(INSERT_BATCH_ROWS)) {
			self.insert_batch(cs, es).await?;
		}
		info!(chunks = chunks.len(), table = %self.table_name, "indexed chunks into LanceDB");
		Ok(())
	}

	async fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<VectorHit>> {
		if k == 0 || !self.table_exists().await? { return Ok(Vec::new()); }
		let table = self.db.open_table(&self.table_name).execute().await.map_err(lance_err)?;
		let mut stream = table.vector_search(query_vec.to_vec()).map_err(lance_err)?
			.distance_type(DistanceType::Cosine).limit(k).execute().await.map_err(lance_err)?;
		let mut hits = Vec::new();
		while let Some(batch) = stream.try_next().await.map_err(lance_err)? {
			let ids = string_column(&batch, "id")?;
			let sources = string_column(&batch, "source")?;
			let locators = string_column(&batch, "locator")?;
			let contents = string_column(&batch, "content")?;
			let distances = batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<Float32Array>()).ok_or_else(|| lance_err("column '_distance' missing"))?;
			for i in 0..batch.num_rows() {
				let locator: Locator = locators.value(i).parse().map_err(lance_err)?;
				let chunk = Chunk { id: ids.value(i).to_string(), source: sources.value(i).to_string(), locator, content: contents.value(i).to_string() };
				let distance = if distances.is_null(i) { 1.0 } else { distances.value(i) };
				hits.push(VectorHit { chunk, distance });
			}
		}
		hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
		hits.truncate(k);
		Ok(hits)
	}

	async fn count(&self) -> Result<usize> {
		if !self.table_exists().await? { return Ok(0); }
		let table = self.db.open_table(&self.table_name).execute().await.map_err(lance_err)?;
		table.count_rows(None).await.map_err(lance_err)
	}
}
