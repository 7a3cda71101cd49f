//! C6: decide whether candidates can be auto-selected, need clarification, or whether the
//! current message is itself a reply to a previous clarification (spec §4.4).

use serde::Serialize;
use utoipa::ToSchema;

use crate::alias::AliasStore;
use crate::entity_extraction::CandidateEntity;
use crate::error::CoreError;

const CLARIFICATION_MARKERS: &[&str] = &[
  "clarify",
  "which one",
  "multiple matches",
  "please choose",
  "found multiple possible",
  "please respond with the number",
];

/// Score gap above which the top candidate is auto-selected without asking (spec §4.4).
const AUTO_SELECT_GAP: f32 = 0.05;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "outcome")]
pub enum Disambiguation {
  NoneNeeded,
  Selected(CandidateEntity),
  ClarificationNeeded { candidates: Vec<CandidateEntity>, prompt: String },
}

#[must_use]
pub fn is_clarification_message(text: &str) -> bool {
  let lower = text.to_lowercase();
  CLARIFICATION_MARKERS.iter().any(|m| lower.contains(m))
}

#[must_use]
pub fn build_clarification_prompt(candidates: &[CandidateEntity]) -> String {
  let mut out = String::from("I found multiple possible matches. Please respond with the number or name:\n");
  for (i, c) in candidates.iter().enumerate() {
    out.push_str(&format!("{}. {}\n", i + 1, c.name));
  }
  out.push_str("Please respond with the number.");
  out
}

fn word_overlap_ratio(a: &str, b: &str) -> f32 {
  let words_a: std::collections::HashSet<&str> = a.to_lowercase().split_whitespace().collect();
  let words_b: std::collections::HashSet<&str> = b.to_lowercase().split_whitespace().collect();
  if words_a.is_empty() || words_b.is_empty() {
    return 0.0;
  }
  let intersection = words_a.intersection(&words_b).count();
  let smaller = words_a.len().min(words_b.len());
  intersection as f32 / smaller as f32
}

/// Resolve a clarification reply against the candidates offered last turn.
#[must_use]
pub fn resolve_clarification_reply<'a>(
  reply: &str,
  candidates: &'a [CandidateEntity],
) -> Option<&'a CandidateEntity> {
  if candidates.is_empty() {
    return None;
  }
  let trimmed = reply.trim();

  // (i) 1-based ordinal
  if let Ok(n) = trimmed.parse::<usize>() {
    if n >= 1 && n <= candidates.len() {
      return Some(&candidates[n - 1]);
    }
  }

  // (ii) exact/substring name match
  let reply_lower = trimmed.to_lowercase();
  if let Some(c) = candidates.iter().find(|c| c.name.to_lowercase() == reply_lower) {
    return Some(c);
  }
  if let Some(c) = candidates.iter().find(|c| {
    c.name.to_lowercase().contains(&reply_lower) || reply_lower.contains(&c.name.to_lowercase())
  }) {
    return Some(c);
  }

  // (iii) >= 50% word-overlap match
  let best = candidates
    .iter()
    .map(|c| (c, word_overlap_ratio(&c.name, trimmed)))
    .filter(|(_, ratio)| *ratio >= 0.5)
    .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
  if let Some((c, _)) = best {
    return Some(c);
  }

  // default to candidates[0]
  Some(&candidates[0])
}

/// Full C6 decision. `previous_candidates` is the candidate set offered by the last
/// assistant clarification turn (empty if there wasn't one); `current_candidates` is the
/// extraction result for the message being processed right now.
#[tracing::instrument(skip_all)]
pub async fn disambiguate(
  db: &sea_orm::DatabaseConnection,
  user_id: &str,
  raw_message: &str,
  last_assistant_message: Option<&str>,
  previous_candidates: &[CandidateEntity],
  current_candidates: Vec<CandidateEntity>,
) -> Result<Disambiguation, CoreError> {
  if let Some(last) = last_assistant_message {
    if is_clarification_message(last) {
      let Some(chosen) = resolve_clarification_reply(raw_message, previous_candidates) else {
        return Ok(Disambiguation::NoneNeeded);
      };
      AliasStore::store_alias(db, user_id, raw_message, &chosen.name, chosen.id).await?;
      return Ok(Disambiguation::Selected(chosen.clone()));
    }
  }

  match current_candidates.len() {
    0 => Ok(Disambiguation::NoneNeeded),
    1 => Ok(Disambiguation::Selected(current_candidates.into_iter().next().unwrap())),
    _ => {
      let mut scored: Vec<(f32, CandidateEntity)> =
        current_candidates.into_iter().map(|c| (c.confidence.score(), c)).collect();
      scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

      let top = scored[0].0;
      let second = scored.get(1).map_or(0.0, |(s, _)| *s);
      if top - second > AUTO_SELECT_GAP {
        Ok(Disambiguation::Selected(scored.into_iter().next().unwrap().1))
      } else {
        let candidates: Vec<CandidateEntity> = scored.into_iter().map(|(_, c)| c).collect();
        let prompt = build_clarification_prompt(&candidates);
        Ok(Disambiguation::ClarificationNeeded { candidates, prompt })
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entity_extraction::MatchConfidence;
  use plastmem_entities::app::entity::EntityKind;
  use uuid::Uuid;

  fn candidate(name: &str) -> CandidateEntity {
    CandidateEntity {
      name: name.to_owned(),
      kind: EntityKind::Customer,
      confidence: MatchConfidence::Fuzzy,
      table: "customers",
      id: Uuid::new_v4(),
    }
  }

  #[test]
  fn detects_clarification_markers() {
    assert!(is_clarification_message("I found multiple possible matches, which one did you mean?"));
    assert!(!is_clarification_message("Here is the status of your order."));
  }

  #[test]
  fn resolves_ordinal_reply() {
    let candidates = vec![candidate("Kai Media"), candidate("Kai Media Europe")];
    let chosen = resolve_clarification_reply("1", &candidates).unwrap();
    assert_eq!(chosen.name, "Kai Media");
  }

  #[test]
  fn resolves_name_reply() {
    let candidates = vec![candidate("Kai Media"), candidate("Kai Media Europe")];
    let chosen = resolve_clarification_reply("Kai Media Europe", &candidates).unwrap();
    assert_eq!(chosen.name, "Kai Media Europe");
  }

  #[test]
  fn defaults_to_first_candidate_when_unparseable() {
    let candidates = vec![candidate("Kai Media"), candidate("Kai Media Europe")];
    let chosen = resolve_clarification_reply("huh?", &candidates).unwrap();
    assert_eq!(chosen.name, "Kai Media");
  }

  #[test]
  fn clarification_prompt_is_one_indexed() {
    let candidates = vec![candidate("Kai Media"), candidate("Kai Media Europe")];
    let prompt = build_clarification_prompt(&candidates);
    assert!(prompt.contains("1. Kai Media\n"));
    assert!(prompt.contains("2. Kai Media Europe\n"));
  }
}
