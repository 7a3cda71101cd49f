use axum::{
  Json, Router,
  routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::utils::AppState;

mod chat;
mod consolidate;
mod entities;
mod explain;
mod health_check;
mod memory;

pub use chat::{ChatRequest, chat};
pub use consolidate::{ConsolidateRequest, ConsolidateResponse, consolidate};
pub use entities::{EntitiesResponse, EntityDto, get_entities};
pub use explain::{ExplainResponse, explain};
pub use health_check::{HealthCheckResponse, health_check};
pub use memory::get_memory;

#[derive(OpenApi)]
#[openapi(
  info(
    title = "Ontomem API",
    version = "0.1.0",
    description = "Ontology-aware conversational memory engine for a small-business ERP assistant"
  ),
  paths(
    health_check::health_check,
    chat::chat,
    memory::get_memory,
    consolidate::consolidate,
    entities::get_entities,
    explain::explain,
  ),
  components(schemas(
    HealthCheckResponse,
    ChatRequest,
    plastmem_core::pipeline::ChatOutcome,
    plastmem_core::entity_extraction::CandidateEntity,
    plastmem_core::entity_extraction::MatchConfidence,
    plastmem_core::retrieval::DomainFact,
    plastmem_entities::app::entity::EntityKind,
    plastmem_core::pipeline::MemoryQueryResult,
    plastmem_core::pipeline::ScoredMemory,
    ConsolidateRequest,
    ConsolidateResponse,
    EntitiesResponse,
    EntityDto,
    ExplainResponse,
  ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
  Json(ApiDoc::openapi())
}

pub fn app() -> Router<AppState> {
  Router::new()
    .route("/health-check/", get(health_check::health_check))
    .route("/chat/", post(chat::chat))
    .route("/memory/", get(memory::get_memory))
    .route("/consolidate/", post(consolidate::consolidate))
    .route("/entities/", get(entities::get_entities))
    .route("/explain/", get(explain::explain))
    .route("/openapi.json", get(openapi_json))
    .merge(Scalar::with_url("/openapi/", ApiDoc::openapi()))
}
