//! Prompt assembly: system message (tone, PII directive, facts, memories, staleness and
//! conflict-resolution rules) followed by recent chat history and the current message
//! (spec §4.8 closing paragraph).

use plastmem_ai::{
  ChatCompletionRequestMessage, ChatCompletionRequestAssistantMessage, ChatCompletionRequestSystemMessage,
  ChatCompletionRequestUserMessage,
};
use plastmem_entities::app::chat_event::{self, ChatRole};

use crate::retrieval::engine::RetrievalResult;

const SYSTEM_PREAMBLE: &str = "\
You are a business operations assistant. Be concise and professional.
Never echo unmasked personal information (phone numbers, etc.) back to the user; if a
masked placeholder appears in a fact or memory, keep it masked in your reply.
For any preference noted as more than 90 days old, ask the customer whether it is still
accurate rather than assuming it.
When the database and a memory disagree about status, trust the database and mention
the discrepancy. Surface any active invoice or SLA reminders you see in the facts below.";

fn format_facts(result: &RetrievalResult) -> String {
  if result.used_domain_facts.is_empty() {
    return "No domain facts retrieved.".to_owned();
  }
  result
    .used_domain_facts
    .iter()
    .map(|f| format!("- ({:.2}) {}: {}", f.relevance, f.label, f.detail))
    .collect::<Vec<_>>()
    .join("\n")
}

fn format_memories(result: &RetrievalResult) -> String {
  if result.used_memories.is_empty() {
    return "No relevant memories retrieved.".to_owned();
  }
  result
    .used_memories
    .iter()
    .map(|m| format!("- ({:.2}) {}", m.score, m.text))
    .collect::<Vec<_>>()
    .join("\n")
}

fn format_conflicts(result: &RetrievalResult) -> Option<String> {
  if result.memory_conflicts.is_empty() {
    return None;
  }
  Some(
    result
      .memory_conflicts
      .iter()
      .map(|c| {
        format!(
          "- {} has contradicting memories: \"{}\" vs \"{}\"; resolve by preferring the more recent one.",
          c.customer, c.memory_a, c.memory_b
        )
      })
      .collect::<Vec<_>>()
      .join("\n"),
  )
}

fn format_inconsistencies(result: &RetrievalResult) -> Option<String> {
  if result.db_memory_inconsistencies.is_empty() {
    return None;
  }
  Some(
    result
      .db_memory_inconsistencies
      .iter()
      .map(|i| {
        format!(
          "- {} is {} in the database, but a memory claims otherwise (\"{}\"); trust the database.",
          i.identifier, i.db_status, i.conflicting_memory
        )
      })
      .collect::<Vec<_>>()
      .join("\n"),
  )
}

fn format_reasoning(result: &RetrievalResult) -> Option<String> {
  if result.reasoning_chains.is_empty() {
    return None;
  }
  Some(
    result
      .reasoning_chains
      .iter()
      .flat_map(|chain| {
        chain.sales_orders.iter().map(move |so| {
          format!(
            "- {}/{}: can_invoice={} should_send_invoice={} blocked_work_orders={:?}",
            chain.customer_name, so.so_number, so.can_invoice, so.should_send_invoice, so.blocked_work_orders
          )
        })
      })
      .collect::<Vec<_>>()
      .join("\n"),
  )
}

fn system_message(result: &RetrievalResult) -> String {
  let mut sections = vec![
    SYSTEM_PREAMBLE.to_owned(),
    format!("Domain facts:\n{}", format_facts(result)),
    format!("Relevant memories:\n{}", format_memories(result)),
  ];
  if let Some(conflicts) = format_conflicts(result) {
    sections.push(format!("Conflicting memories:\n{conflicts}"));
  }
  if let Some(reasoning) = format_reasoning(result) {
    sections.push(format!("Reasoning chains:\n{reasoning}"));
  }
  if let Some(inconsistencies) = format_inconsistencies(result) {
    sections.push(format!("Database vs memory inconsistencies:\n{inconsistencies}"));
  }
  sections.join("\n\n")
}

fn history_messages(history: &[chat_event::Model]) -> Vec<ChatCompletionRequestMessage> {
  history
    .iter()
    .filter_map(|event| match event.role {
      ChatRole::User => {
        Some(ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(event.content.as_str())))
      }
      ChatRole::Assistant => Some(ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage::from(
        event.content.as_str(),
      ))),
      ChatRole::System => None,
    })
    .collect()
}

/// Assemble the full message list sent to C2: system message, then history, then the
/// current user message. `retrieval` is `None` in `simple` intent mode (spec §4.5 step 6).
#[must_use]
pub fn assemble(
  retrieval: Option<&RetrievalResult>,
  history: &[chat_event::Model],
  current_message: &str,
) -> Vec<ChatCompletionRequestMessage> {
  let system_text = match retrieval {
    Some(result) => system_message(result),
    None => SYSTEM_PREAMBLE.to_owned(),
  };

  let mut messages = vec![ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage::from(
    system_text.as_str(),
  ))];
  messages.extend(history_messages(history));
  messages.push(ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(current_message)));
  messages
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn simple_mode_uses_bare_preamble() {
    let messages = assemble(None, &[], "hello");
    assert_eq!(messages.len(), 2);
  }

  #[test]
  fn full_mode_includes_retrieval_sections() {
    let result = RetrievalResult::default();
    let system = system_message(&result);
    assert!(system.contains("Domain facts"));
    assert!(system.contains("Relevant memories"));
  }
}
