use std::sync::Arc;

use axum::{
    Json, Router, middleware,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};

use arkhyz_types::Envelope;

use crate::admin;
use crate::dispatcher::Dispatcher;
use crate::error::ApiError;
use crate::forms;
use crate::middleware::{AdminCredentials, require_admin};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub dispatcher: Dispatcher,
}

/// Which admin surface the router exposes.
#[derive(Debug, Clone)]
pub enum AdminAccess {
    /// Reduced configuration: listings are public, no update or delete.
    Disabled,
    /// Listings, update and delete behind HTTP Basic credentials.
    Protected(AdminCredentials),
}

/// All `/api` routes plus `/ping`. Callers add CORS, tracing and static files.
///
/// Unknown `/api` paths and unsupported methods answer with the failure
/// envelope like every other API error.
pub fn build_router(dispatcher: Dispatcher, access: &AdminAccess) -> Router {
    let state: AppState = Arc::new(AppStateInner { dispatcher });

    let public_routes = Router::new().route("/submit-form", post(forms::submit_form));

    let listing_routes = Router::new()
        .route("/bookings", get(admin::list_bookings))
        .route("/reviews", get(admin::list_reviews))
        .route("/investments", get(admin::list_investments));

    let api = match access {
        AdminAccess::Disabled => public_routes.merge(listing_routes),
        AdminAccess::Protected(credentials) => {
            let protected_routes = listing_routes
                .route(
                    "/{collection}/{id}",
                    put(admin::update_record).delete(admin::delete_record),
                )
                .layer(middleware::from_fn_with_state(
                    Arc::new(credentials.clone()),
                    require_admin,
                ));
            public_routes.merge(protected_routes)
        }
    };

    let api = api
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(unknown_route);

    Router::new()
        .route("/ping", get(forms::ping))
        .nest("/api", api)
        .with_state(state)
}

async fn unknown_route() -> ApiError {
    ApiError::NotFound("Route not found".into())
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(Envelope::<()>::failed("Method not allowed")),
    )
        .into_response()
}
