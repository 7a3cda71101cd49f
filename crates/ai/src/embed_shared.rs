use std::hash::{Hash, Hasher};

/// Target dimension for embeddings. Matches `text-embedding-3-small`.
pub const TARGET_DIM: usize = 1536;
/// Threshold for determining if L2 normalization is needed.
const L2_NORM_TOLERANCE: f32 = 1e-6;

/// Deterministic fallback used when the embedding provider is unavailable.
///
/// The provider is treated as a `ProviderError`: the caller never sees the failure,
/// it gets back a stable pseudo-vector instead, so retrieval degrades gracefully
/// (same input always maps to the same vector) instead of hard-failing the request.
pub fn hash_seeded_fallback(input: &str) -> Vec<f32> {
  let mut state = std::collections::hash_map::DefaultHasher::new();
  input.hash(&mut state);
  let mut seed = state.finish();

  let mut vec = Vec::with_capacity(TARGET_DIM);
  for _ in 0..TARGET_DIM {
    // xorshift64 — cheap, deterministic, no extra dependency.
    seed ^= seed << 13;
    seed ^= seed >> 7;
    seed ^= seed << 17;
    let unit = (seed >> 11) as f64 / (1u64 << 53) as f64;
    vec.push((unit * 2.0 - 1.0) as f32);
  }
  let mut vec = vec;
  l2_normalize(&mut vec);
  vec
}

/// Process embedding vector to ensure it's L2 normalized with exactly [`TARGET_DIM`] dimensions.
///
/// - If dim > `TARGET_DIM`: truncate and L2 normalize
/// - If dim == `TARGET_DIM`: check if already L2 normalized, normalize if not
/// - If dim < `TARGET_DIM`: return error
pub fn process_embedding(mut vec: Vec<f32>) -> anyhow::Result<Vec<f32>> {
  match vec.len() {
    d if d > TARGET_DIM => {
      vec.truncate(TARGET_DIM);
      l2_normalize(&mut vec);
      Ok(vec)
    }
    d if d == TARGET_DIM => {
      let norm_sq: f32 = vec.iter().map(|x| x * x).sum();
      if (norm_sq - 1.0).abs() > L2_NORM_TOLERANCE {
        l2_normalize(&mut vec);
      }
      Ok(vec)
    }
    d => Err(anyhow::anyhow!(
      "embedding dimension {} is less than required {}",
      d,
      TARGET_DIM
    )),
  }
}

/// L2 normalize a vector in-place.
fn l2_normalize(vec: &mut [f32]) {
  let norm_sq: f32 = vec.iter().map(|x| x * x).sum();
  let norm = norm_sq.sqrt();
  if norm > 1e-12 {
    for x in vec.iter_mut() {
      *x /= norm;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fallback_is_deterministic_and_normalized() {
    let a = hash_seeded_fallback("hello world");
    let b = hash_seeded_fallback("hello world");
    assert_eq!(a, b);
    assert_eq!(a.len(), TARGET_DIM);
    let norm_sq: f32 = a.iter().map(|x| x * x).sum();
    assert!((norm_sq - 1.0).abs() < 1e-3);
  }

  #[test]
  fn fallback_differs_across_inputs() {
    let a = hash_seeded_fallback("hello world");
    let b = hash_seeded_fallback("goodbye world");
    assert_ne!(a, b);
  }

  #[test]
  fn process_embedding_rejects_short_vectors() {
    assert!(process_embedding(vec![0.1; 8]).is_err());
  }
}
