//! Memory-vs-memory conflict detection (spec §4.8 step 5).

use plastmem_entities::app::entity::EntityKind;
use serde::Serialize;
use utoipa::ToSchema;

use crate::entity_extraction::CandidateEntity;
use crate::memory::{Memory, MemoryKind};

const CONTRADICTING_PAIRS: &[(&str, &str)] = &[
  ("thursday", "friday"),
  ("monday", "tuesday"),
  ("morning", "afternoon"),
];

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemoryConflict {
  pub customer: String,
  pub memory_a: String,
  pub memory_b: String,
  pub resolution: &'static str,
}

fn mentions(text_lower: &str, token: &str) -> bool {
  text_lower.contains(token)
}

/// Flag semantic-memory pairs for the same customer that contain contradicting
/// day/time tokens. Resolution is always `most_recent`: the caller sorts memories by
/// `created_at` before calling this, so `memory_b` in each conflict is the newer one.
#[must_use]
pub fn detect_conflicts(customers: &[CandidateEntity], memories: &[Memory]) -> Vec<MemoryConflict> {
  let mut conflicts = Vec::new();

  for customer in customers.iter().filter(|c| c.kind == EntityKind::Customer) {
    let name_lower = customer.name.to_lowercase();
    let mut relevant: Vec<&Memory> = memories
      .iter()
      .filter(|m| m.kind == MemoryKind::Semantic && m.text.to_lowercase().contains(&name_lower))
      .collect();
    relevant.sort_by_key(|m| m.created_at);

    for i in 0..relevant.len() {
      for j in (i + 1)..relevant.len() {
        let a_lower = relevant[i].text.to_lowercase();
        let b_lower = relevant[j].text.to_lowercase();
        for (tok_a, tok_b) in CONTRADICTING_PAIRS {
          let contradicts = (mentions(&a_lower, tok_a) && mentions(&b_lower, tok_b))
            || (mentions(&a_lower, tok_b) && mentions(&b_lower, tok_a));
          if contradicts {
            conflicts.push(MemoryConflict {
              customer: customer.name.clone(),
              memory_a: relevant[i].text.clone(),
              memory_b: relevant[j].text.clone(),
              resolution: "most_recent",
            });
          }
        }
      }
    }
  }

  conflicts
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entity_extraction::MatchConfidence;
  use chrono::Utc;
  use uuid::Uuid;

  fn customer(name: &str) -> CandidateEntity {
    CandidateEntity { name: name.to_owned(), kind: EntityKind::Customer, confidence: MatchConfidence::Exact, table: "customers", id: Uuid::new_v4() }
  }

  fn memory(text: &str, minutes_ago: i64) -> Memory {
    Memory {
      id: 1,
      session_id: Uuid::new_v4(),
      kind: MemoryKind::Semantic,
      text: text.to_owned(),
      embedding: None,
      importance: 0.9,
      ttl_days: None,
      external_ref: None,
      created_at: Utc::now() - chrono::Duration::minutes(minutes_ago),
    }
  }

  #[test]
  fn flags_contradicting_day_preferences() {
    let customers = vec![customer("Kai Media")];
    let memories = vec![
      memory("Kai Media prefers Thursday delivery.", 60),
      memory("Kai Media prefers Friday delivery.", 5),
    ];
    let conflicts = detect_conflicts(&customers, &memories);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].resolution, "most_recent");
    assert!(conflicts[0].memory_b.contains("Friday"));
  }

  #[test]
  fn no_conflict_for_unrelated_memories() {
    let customers = vec![customer("Kai Media")];
    let memories = vec![memory("Kai Media prefers Thursday delivery.", 60), memory("TC Boiler is NET15.", 5)];
    assert!(detect_conflicts(&customers, &memories).is_empty());
  }
}
