use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Basic};
use axum_extra::typed_header::TypedHeaderRejection;
use tracing::warn;

use arkhyz_types::Envelope;

/// Username/password pair guarding the admin page and admin API routes.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// HTTP Basic check in front of admin routes. Every failure, including an
/// `Authorization` header of another scheme or with undecodable credentials,
/// is answered with the 401 challenge.
pub async fn require_admin(
    State(credentials): State<Arc<AdminCredentials>>,
    auth: Result<TypedHeader<Authorization<Basic>>, TypedHeaderRejection>,
    req: Request,
    next: Next,
) -> Response {
    match auth {
        Ok(TypedHeader(Authorization(basic)))
            if credentials.matches(basic.username(), basic.password()) =>
        {
            next.run(req).await
        }
        Err(rejection) if rejection.is_missing() => {
            challenge("Authorization required")
        }
        _ => {
            warn!("Rejected admin credentials for {}", req.uri().path());
            challenge("Invalid credentials")
        }
    }
}

fn challenge(reason: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"Admin Panel\"")],
        Json(Envelope::<()>::failed(reason)),
    )
        .into_response()
}
