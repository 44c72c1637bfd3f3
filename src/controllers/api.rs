//! The token-protected API surface.

use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError, get, post};
use thiserror::Error;

use crate::token::{TokenCodec, TokenError};

/// Greeting returned to a caller presenting a valid token.
pub const GREETING: &str = "Hello World!";

/// Uniform denial for a missing, malformed, expired or forged token.
pub const NO_TOKEN: &str = "You don't have a token";

static INDEX_HTML: &str = include_str!("../../static/index.html");

/// Where `/api/first` forwards its freshly issued token.
#[derive(Debug, Clone)]
pub struct ProtectedTarget {
    pub url: String,
}

impl ProtectedTarget {
    /// Target the protected endpoint on the local listener.
    pub fn local(port: u16) -> Self {
        Self {
            url: format!("http://127.0.0.1:{port}/api/second"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to issue token")]
    Issue(#[from] TokenError),
    #[error("protected endpoint call failed: {0}")]
    Relay(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Issue(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Relay(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Issue a token, call the protected endpoint with it, relay the body.
#[post("/api/first")]
pub async fn first(
    codec: Data<TokenCodec>,
    target: Data<ProtectedTarget>,
) -> Result<HttpResponse, ApiError> {
    let token = codec.issue().inspect_err(|e| {
        ::tracing::error!(error = %e, "token issuance failed");
    })?;

    let mut response = awc::Client::new()
        .get(target.url.as_str())
        .append_header(("Token", token))
        .send()
        .await
        .map_err(|e| ApiError::Relay(e.to_string()))?;

    let body = response
        .body()
        .await
        .map_err(|e| ApiError::Relay(e.to_string()))?;

    Ok(HttpResponse::Ok().body(body))
}

/// Greet the caller when the `Token` header verifies; deny uniformly
/// otherwise.
#[get("/api/second")]
pub async fn second(req: HttpRequest, codec: Data<TokenCodec>) -> impl Responder {
    let Some(token) = req.headers().get("Token").and_then(|v| v.to_str().ok()) else {
        return HttpResponse::Ok().body(NO_TOKEN);
    };

    match codec.verify(token) {
        Ok(verification) if verification.valid => HttpResponse::Ok().body(GREETING),
        Ok(_) => HttpResponse::Ok().body(NO_TOKEN),
        Err(e) => {
            ::tracing::debug!(error = %e, "presented token failed to parse");
            HttpResponse::Ok().body(NO_TOKEN)
        }
    }
}

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}
