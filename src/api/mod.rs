//! HTTP JSON API
//!
//! Routes are mounted under `/api` by [`crate::web`]. Handlers map
//! [`PlannerError`] variants onto status codes and return the error's
//! display text as the body.

use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::PlannerError;
use crate::config::PlannerConfig;
use crate::delivery::{self, DeliveryReport, MessageSender};
use crate::export::{ExportFormat, Exporter};
use crate::extract;
use crate::models::{Plan, TripRequest};
use crate::pipeline::Planner;

/// Largest upload accepted by `/extract`
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    planner: Arc<Planner>,
    sender: Option<Arc<dyn MessageSender>>,
    max_chunk_len: usize,
    exporter: Exporter,
}

impl AppState {
    pub fn new(
        planner: Planner,
        sender: Option<Arc<dyn MessageSender>>,
        max_chunk_len: usize,
        exporter: Exporter,
    ) -> Self {
        Self {
            planner: Arc::new(planner),
            sender,
            max_chunk_len,
            exporter,
        }
    }

    /// Build every collaborator from configuration
    pub fn from_config(config: &PlannerConfig) -> crate::Result<Self> {
        let planner = Planner::from_config(config)?;
        let sender = match delivery::sender_from_config(&config.delivery) {
            Ok(sender) => Some(sender),
            Err(PlannerError::NotConfigured { message, .. }) => {
                warn!("Delivery disabled: {}", message);
                None
            }
            Err(e) => return Err(e),
        };
        Ok(Self::new(
            planner,
            sender,
            config.delivery.max_chunk_len,
            Exporter::from_config(&config.export),
        ))
    }
}

/// Body of `POST /plan`; `text` plans from an existing itinerary
#[derive(Debug, Serialize, Deserialize)]
pub struct PlanRequest {
    #[serde(flatten)]
    pub trip: TripRequest,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeliverRequest {
    pub text: String,
    /// Prefixes the message with the plan greeting when set
    #[serde(default)]
    pub destination: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportRequest {
    pub text: String,
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub file_name: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Capabilities {
    pub generation: bool,
    pub delivery: bool,
    pub pdf: bool,
}

type ApiError = (StatusCode, String);

fn error_response(e: &PlannerError) -> ApiError {
    let status = match e {
        PlannerError::Validation { .. } => StatusCode::BAD_REQUEST,
        PlannerError::Encoding { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PlannerError::NotConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
        PlannerError::CapabilityUnavailable { .. } => StatusCode::NOT_IMPLEMENTED,
        PlannerError::Upstream { .. } | PlannerError::Delivery { .. } => StatusCode::BAD_GATEWAY,
        PlannerError::Config { .. } | PlannerError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/capabilities", get(get_capabilities))
        .route("/plan", post(create_plan))
        .route("/deliver", post(deliver_document))
        .route("/export", post(export_document))
        .route("/extract", post(extract_upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn get_capabilities(State(state): State<AppState>) -> Json<Capabilities> {
    Json(Capabilities {
        generation: state.planner.generation_enabled(),
        delivery: state.sender.is_some(),
        pdf: state.exporter.pdf_available(),
    })
}

async fn create_plan(
    State(state): State<AppState>,
    Json(payload): Json<PlanRequest>,
) -> Result<Json<Plan>, ApiError> {
    let plan = match payload.text.as_deref() {
        Some(text) if !text.trim().is_empty() => {
            state.planner.plan_from_text(&payload.trip, text).await
        }
        _ => state.planner.run(&payload.trip).await,
    }
    .map_err(|e| error_response(&e))?;
    Ok(Json(plan))
}

async fn deliver_document(
    State(state): State<AppState>,
    Json(payload): Json<DeliverRequest>,
) -> Result<Json<DeliveryReport>, ApiError> {
    let Some(sender) = state.sender.as_ref() else {
        return Err(error_response(&PlannerError::not_configured(
            "Delivery",
            "no message channel credentials",
        )));
    };

    let body = match payload.destination.as_deref() {
        Some(destination) => delivery::compose_message(destination, &payload.text),
        None => payload.text,
    };
    let report = delivery::deliver(sender.as_ref(), &body, state.max_chunk_len).await;
    info!("Delivery finished: {:?}", report);
    Ok(Json(report))
}

async fn export_document(
    State(state): State<AppState>,
    Json(payload): Json<ExportRequest>,
) -> Result<Response, ApiError> {
    let bytes = state
        .exporter
        .export(&payload.text, payload.format)
        .map_err(|e| error_response(&e))?;

    let disposition = format!(
        "attachment; filename=\"travel_plan.{}\"",
        payload.format.extension()
    );
    Ok((
        [
            (header::CONTENT_TYPE, payload.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn extract_upload(mut multipart: Multipart) -> Result<Json<ExtractResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        let text = extract::extract_text(&file_name, &bytes).map_err(|e| error_response(&e))?;
        return Ok(Json(ExtractResponse { file_name, text }));
    }

    Err((
        StatusCode::BAD_REQUEST,
        "Missing multipart field 'file'".to_string(),
    ))
}
