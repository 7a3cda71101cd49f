use std::collections::HashSet;

/// Word-set Jaccard similarity, used for semantic-memory dedup (spec §4.7: "approximate
/// dedup by word-set Jaccard > 0.8 or containment over strings > 20 chars").
#[must_use]
pub fn word_jaccard(a: &str, b: &str) -> f32 {
  let words_a: HashSet<&str> = a.split_whitespace().collect();
  let words_b: HashSet<&str> = b.split_whitespace().collect();
  if words_a.is_empty() || words_b.is_empty() {
    return 0.0;
  }
  let intersection = words_a.intersection(&words_b).count();
  let union = words_a.union(&words_b).count();
  if union == 0 { 0.0 } else { intersection as f32 / union as f32 }
}

/// True when one string (lowercased) contains the other and both exceed 20 characters.
#[must_use]
pub fn is_containment_duplicate(a: &str, b: &str) -> bool {
  if a.len() <= 20 || b.len() <= 20 {
    return false;
  }
  let a_lower = a.to_lowercase();
  let b_lower = b.to_lowercase();
  a_lower.contains(&b_lower) || b_lower.contains(&a_lower)
}

/// True when `candidate` should be treated as a duplicate of `existing` under the
/// semantic-memory global dedup rule (Jaccard > 0.8 or containment).
#[must_use]
pub fn is_semantic_duplicate(existing: &str, candidate: &str) -> bool {
  word_jaccard(existing, candidate) > 0.8 || is_containment_duplicate(existing, candidate)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn identical_text_has_jaccard_one() {
    assert!((word_jaccard("TC Boiler is NET15", "TC Boiler is NET15") - 1.0).abs() < 1e-6);
  }

  #[test]
  fn disjoint_text_has_jaccard_zero() {
    assert_eq!(word_jaccard("hello world", "goodbye moon"), 0.0);
  }

  #[test]
  fn near_duplicate_phrasing_exceeds_threshold() {
    let a = "TC Boiler is NET15 and agreed ACH";
    let b = "TC Boiler is NET15 and agreed to ACH";
    assert!(is_semantic_duplicate(a, b));
  }

  #[test]
  fn containment_over_twenty_chars_is_duplicate() {
    let a = "Kai Media prefers Friday delivery windows";
    let b = "Kai Media prefers Friday delivery windows always";
    assert!(is_containment_duplicate(a, b));
  }

  #[test]
  fn short_strings_never_trigger_containment() {
    assert!(!is_containment_duplicate("NET15", "NET15 please"));
  }
}
