use crate::app::state::{AppState, AuthState};
use crate::core::{matrix, statistics};
use crate::domain::model::{
    AuthenticatedUser, LoginRequest, RelayPayload, RotateRequest, RotateResponse, TokenResponse,
};
use crate::utils::error::{AppError, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn login(
    State(auth): State<AuthState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected login body: {}", e);
        AppError::validation("Invalid request")
    })?;

    if request.username.is_empty() || request.password.is_empty() {
        return Err(AppError::validation("Username and password are required"));
    }

    // 示範用的單一帳號，不做密碼雜湊
    if request.username != auth.login.username || request.password != auth.login.password {
        tracing::warn!("🔒 Failed login attempt for {}", request.username);
        return Err(AppError::InvalidCredentials);
    }

    let token = auth
        .tokens
        .issue(&request.username)
        .map_err(|e| AppError::internal(e.to_string()))?;
    tracing::info!("🔑 Issued token for {}", request.username);

    Ok(Json(TokenResponse {
        token,
        user: request.username,
    }))
}

pub async fn rotate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: std::result::Result<Json<RotateRequest>, JsonRejection>,
) -> Result<Json<RotateResponse>> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected rotate body: {}", e);
        AppError::validation("Invalid JSON format")
    })?;

    tracing::info!(
        "🔄 Rotate request from {} ({} rows)",
        user.username,
        request.data.len()
    );

    let response = state.pipeline.run(request.data).await?;
    tracing::info!("✅ Rotation relayed for {}", user.username);

    Ok(Json(response))
}

/// `POST /api/statistics` on the downstream statistics service.
pub async fn calculate_statistics(
    Extension(user): Extension<AuthenticatedUser>,
    payload: std::result::Result<Json<RelayPayload>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected statistics body: {}", e);
        AppError::validation(
            "Invalid input. Expected an object with a \"data\" property containing an array of arrays.",
        )
    })?;

    matrix::validate(&request.data)?;
    let statistics = statistics::calculate(&request.data, request.original_diagonal);
    tracing::info!("📊 Computed statistics for {} ({} rows)", user.username, request.data.len());

    Ok(Json(json!({
        "rotatedMatrix": request.data,
        "statistics": statistics,
        "processedBy": "statistics-service",
        "user": user.username,
    })))
}
