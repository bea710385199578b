use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub message: String,
    pub data: T,
}

#[derive(Serialize)]
pub struct ApiListResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub fn success<T>(data: T, message: impl Into<String>) -> impl IntoResponse
where
    T: Serialize,
{
    with_status(StatusCode::OK, data, message)
}

pub fn created<T>(data: T, message: impl Into<String>) -> impl IntoResponse
where
    T: Serialize,
{
    with_status(StatusCode::CREATED, data, message)
}

pub fn list<T>(data: Vec<T>) -> impl IntoResponse
where
    T: Serialize,
{
    let body = ApiListResponse {
        success: true,
        count: data.len(),
        data,
    };
    (StatusCode::OK, Json(body))
}

pub fn error(error: impl Into<String>, details: Option<String>, status: StatusCode) -> Response {
    let body = ApiErrorResponse {
        success: false,
        error: error.into(),
        details,
    };

    (status, Json(body)).into_response()
}

fn with_status<T>(status: StatusCode, data: T, message: impl Into<String>) -> impl IntoResponse
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        message: message.into(),
        data,
    };
    (status, Json(body))
}
