use async_openai::{Client, config::OpenAIConfig, types::embeddings::CreateEmbeddingRequestArgs};
use plastmem_shared::APP_ENV;
use sea_orm::prelude::PgVector;
use tracing::warn;

use crate::embed_shared::{TARGET_DIM, hash_seeded_fallback};

/// Embed multiple texts in a single API call, one `PgVector` per input, same order.
///
/// Like [`crate::embed`], never fails: a provider error degrades every input in the
/// batch to its own deterministic fallback vector rather than failing the whole batch.
pub async fn embed_many(inputs: &[String]) -> Vec<PgVector> {
  if inputs.is_empty() {
    return vec![];
  }

  match try_embed_many(inputs).await {
    Ok(vectors) => vectors,
    Err(err) => {
      warn!(error = %err, "embedding provider failed for batch, using hash-seeded fallback vectors");
      inputs
        .iter()
        .map(|s| PgVector::from(hash_seeded_fallback(s)))
        .collect()
    }
  }
}

async fn try_embed_many(inputs: &[String]) -> anyhow::Result<Vec<PgVector>> {
  let config = OpenAIConfig::new()
    .with_api_key(&APP_ENV.openai_api_key)
    .with_api_base(&APP_ENV.openai_base_url);

  let client = Client::with_config(config);

  let request = CreateEmbeddingRequestArgs::default()
    .model(&APP_ENV.openai_embedding_model)
    .input(inputs.to_vec())
    .dimensions(TARGET_DIM as u32)
    .build()?;

  let response = client.embeddings().create(request).await?;

  let mut data = response.data;
  data.sort_by_key(|e| e.index);

  if data.len() != inputs.len() {
    return Err(anyhow::anyhow!(
      "embedding count mismatch: expected {}, got {}",
      inputs.len(),
      data.len()
    ));
  }

  Ok(
    data
      .into_iter()
      .map(|e| PgVector::from(e.embedding))
      .collect(),
  )
}
