use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

pub mod cocktails;
pub mod recipes;

pub use cocktails::CocktailProvider;
pub use recipes::RecipeProvider;

/// Failure talking to an upstream content provider. Bodies are opaque
/// pass-throughs, so classification is by HTTP status only.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} responded with status {status}")]
    Upstream {
        provider: &'static str,
        status: u16,
        message: String,
    },
    #[error("upstream request failed")]
    Network(#[from] reqwest::Error),
}

impl IntoResponse for ProviderError {
    fn into_response(self) -> Response {
        match self {
            ProviderError::Upstream {
                provider,
                status,
                message,
            } => (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": {
                        "code": format!("{provider}_{status}"),
                        "message": message,
                        "status": status,
                    }
                })),
            )
                .into_response(),
            ProviderError::Network(e) => {
                warn!(error = %e, "upstream request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": "Upstream provider unavailable" })),
                )
                    .into_response()
            }
        }
    }
}

/// Pulls a human-readable message out of an upstream error body, falling
/// back to a provider-specific default.
pub(crate) fn upstream_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| fallback.to_string())
}
