//! Axum request handlers for all service endpoints.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::protocol::{
    DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, ErrorResponse,
    HealthResponse,
};
use common::ServiceError;
use illuminate_crypt::{AuthenticatedCodec, CipherSpec, CryptError};
use tracing::{error, info, warn};

use super::page::{run_tool, ToolParams};
use super::state::AppState;

/// `GET /` — the tool page; parameters come from the query string.
pub async fn page(State(state): State<AppState>, Query(params): Query<ToolParams>) -> Response {
    render_tool(&state, &params)
}

/// `POST /` — the tool page submitted as a urlencoded form.
pub async fn page_submit(State(state): State<AppState>, Form(params): Form<ToolParams>) -> Response {
    render_tool(&state, &params)
}

fn render_tool(state: &AppState, params: &ToolParams) -> Response {
    let outcome = run_tool(params);
    match state.renderer.render(params, &outcome) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "page rendering failed");
            error_response(ServiceError::Internal("page rendering failed".into()))
        }
    }
}

/// `POST /api/encrypt` — encrypt a string into an outer payload.
pub async fn encrypt(Json(req): Json<EncryptRequest>) -> Response {
    let codec = match build_codec(req.key_size, &req.secret_key) {
        Ok(c) => c,
        Err(e) => return crypt_error_response(&e),
    };

    match codec.encrypt(req.plaintext.as_bytes(), req.serialize) {
        Ok(payload) => {
            info!(
                cipher = %codec.cipher(),
                input_len = req.plaintext.len(),
                serialize = req.serialize,
                "encrypted"
            );
            (StatusCode::OK, Json(EncryptResponse { payload })).into_response()
        }
        Err(e) => crypt_error_response(&e),
    }
}

/// `POST /api/decrypt` — decrypt an outer payload.
///
/// UTF-8 plaintext is returned as `plaintext`, anything else as
/// `plaintext_base64`.
pub async fn decrypt(Json(req): Json<DecryptRequest>) -> Response {
    let codec = match build_codec(req.key_size, &req.secret_key) {
        Ok(c) => c,
        Err(e) => return crypt_error_response(&e),
    };

    match codec.decrypt(&req.payload, req.unserialize) {
        Ok(bytes) => {
            info!(
                cipher = %codec.cipher(),
                output_len = bytes.len(),
                unserialize = req.unserialize,
                "decrypted"
            );
            let body = match String::from_utf8(bytes) {
                Ok(text) => DecryptResponse {
                    plaintext: Some(text),
                    plaintext_base64: None,
                },
                Err(e) => DecryptResponse {
                    plaintext: None,
                    plaintext_base64: Some(STANDARD.encode(e.into_bytes())),
                },
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => crypt_error_response(&e),
    }
}

/// `GET /health` — liveness check.
pub async fn health() -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn build_codec(key_size: u16, secret_key: &str) -> Result<AuthenticatedCodec, CryptError> {
    AuthenticatedCodec::new(CipherSpec::from_key_size(key_size)?, secret_key)
}

/// Map a codec failure to the service error reported to the caller.
fn service_error(e: &CryptError) -> ServiceError {
    match e {
        CryptError::Encryption | CryptError::Encoding => {
            ServiceError::EncryptionFailure(e.to_string())
        }
        CryptError::UnsupportedCipher(_)
        | CryptError::InvalidKey(_)
        | CryptError::Payload
        | CryptError::Authentication
        | CryptError::Decryption
        | CryptError::Serialization(_) => ServiceError::BadRequest(e.to_string()),
    }
}

fn crypt_error_response(e: &CryptError) -> Response {
    warn!(error_kind = e.kind(), "codec request failed");
    error_response(service_error(e))
}

fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(err.code(), err.message()))).into_response()
}
