use async_openai::{Client, config::OpenAIConfig, types::embeddings::CreateEmbeddingRequestArgs};
use sea_orm::prelude::PgVector;
use tracing::warn;

use crate::embed_shared::{TARGET_DIM, hash_seeded_fallback, process_embedding};
use plastmem_shared::APP_ENV;

/// Embed a single text. Never fails: an unavailable provider degrades to a
/// deterministic pseudo-vector rather than surfacing an error to the caller.
pub async fn embed(input: &str) -> sea_orm::prelude::PgVector {
  match try_embed(input).await {
    Ok(vector) => vector,
    Err(err) => {
      warn!(error = %err, "embedding provider failed, using hash-seeded fallback vector");
      PgVector::from(hash_seeded_fallback(input))
    }
  }
}

async fn try_embed(input: &str) -> anyhow::Result<PgVector> {
  let config = OpenAIConfig::new()
    .with_api_key(&APP_ENV.openai_api_key)
    .with_api_base(&APP_ENV.openai_base_url);

  let client = Client::with_config(config);

  let request = CreateEmbeddingRequestArgs::default()
    .model(&APP_ENV.openai_embedding_model)
    .input(input)
    .dimensions(TARGET_DIM as u32)
    .build()?;

  let embedding = client
    .embeddings()
    .create(request)
    .await
    .map(|r| r.data.into_iter())?
    .map(|e| e.embedding)
    .next_back()
    .ok_or_else(|| anyhow::anyhow!("empty embedding"))?;

  let processed = process_embedding(embedding)?;
  Ok(PgVector::from(processed))
}
