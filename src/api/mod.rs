//! REST surface over the inventory services.
//!
//! Successful responses are wrapped as `{"data": ...}`; failures as
//! `{"error": CODE, "message": ...}` with the status from [`AppError::status_code`].

pub mod extract;
pub mod handlers;

use crate::error::AppError;
use crate::AppState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: self.code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;
pub type CreatedResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

pub(crate) fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::new(data)))
}

pub(crate) fn created<T>(data: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::new(data))))
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/token", post(handlers::issue_token))
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route("/brands", get(handlers::list_brands).post(handlers::create_brand))
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/firms", get(handlers::list_firms).post(handlers::create_firm))
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/products/:id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/products/:id/movements", get(handlers::list_movements))
        .route(
            "/purchases",
            get(handlers::list_purchases).post(handlers::create_purchase),
        )
        .route(
            "/purchases/:id",
            get(handlers::get_purchase)
                .put(handlers::update_purchase)
                .delete(handlers::delete_purchase),
        )
        .route("/sells", get(handlers::list_sells).post(handlers::create_sell))
        .route(
            "/sells/:id",
            get(handlers::get_sell)
                .put(handlers::update_sell)
                .delete(handlers::delete_sell),
        )
        .route("/reports/purchases", get(handlers::purchase_report))
        .route("/reports/sells", get(handlers::sell_report))
        .route("/reports/stock", get(handlers::stock_report))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
