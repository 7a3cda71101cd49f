// Re-export async_openai types for consumers
pub use async_openai::types::chat::{
  ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
  ChatCompletionRequestUserMessage,
};

mod cosine_similarity;
pub use cosine_similarity::cosine_similarity;

mod embed;
pub use embed::embed;

mod embed_shared;
pub use embed_shared::{TARGET_DIM, hash_seeded_fallback};

mod embed_many;
pub use embed_many::embed_many;

mod generate_object;
pub use generate_object::generate_object;

mod generate_text;
pub use generate_text::generate_text;
