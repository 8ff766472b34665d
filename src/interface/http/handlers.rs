use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::application::{
    CheckOutcome, CheckReport, Command, CommandOutcome, DispatchReport, MonitoringSession,
    Snapshot,
};
use crate::domain::Verdict;

/// Error response carrying a status code and a JSON message
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<MonitoringSession>,
}

/// Query params for /api/snapshot
#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    pub history_limit: Option<usize>,
}

/// Response for POST /api/alerts
#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub verdict: Verdict,
    pub delivery: DispatchReport,
}

/// Handler for GET /api/health
pub async fn health_handler() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "service": "qdmon"
        })),
    )
}

/// Handler for GET /api/snapshot
pub async fn snapshot_handler(
    State(state): State<AppState>,
    Query(params): Query<SnapshotQuery>,
) -> Json<Snapshot> {
    Json(
        state
            .session
            .snapshot(chrono::Utc::now(), params.history_limit)
            .await,
    )
}

/// Handler for POST /api/check
pub async fn check_handler(
    State(state): State<AppState>,
) -> Result<Json<CheckReport>, AppError> {
    match state.session.handle(Command::CheckNow).await {
        CommandOutcome::Check(CheckOutcome::Completed(report)) => Ok(Json(report)),
        CommandOutcome::Check(CheckOutcome::InFlight | CheckOutcome::NotDue) => {
            Err(AppError::conflict("a check is already in flight"))
        }
        CommandOutcome::Alerts(_) => Err(AppError::internal("unexpected command outcome")),
    }
}

/// Handler for POST /api/alerts: the operator confirms the latest verdict
pub async fn alerts_handler(
    State(state): State<AppState>,
) -> Result<Json<AlertsResponse>, AppError> {
    let verdict = match state.session.last_verdict().await {
        Some(verdict) if verdict.is_alert() => verdict,
        _ => return Err(AppError::conflict("no alert to send")),
    };

    match state
        .session
        .handle(Command::SendAlerts(verdict.clone()))
        .await
    {
        CommandOutcome::Alerts(delivery) => Ok(Json(AlertsResponse { verdict, delivery })),
        CommandOutcome::Check(_) => Err(AppError::internal("unexpected command outcome")),
    }
}
