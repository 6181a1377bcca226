use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use derive_more::Display;
use serde::Serialize;

#[derive(Debug, Display)]
pub enum ApiError {
    #[display("not found")]
    NotFound,
    #[display("bad request: {}", _0)]
    BadRequest(String),
    #[display("conflict: {}", _0)]
    Conflict(String),
    #[display("internal")]
    Internal,
}

#[derive(Serialize)]
struct ErrBody {
    success: bool,
    message: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrBody {
            success: false,
            message: self.to_string(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepoErr {
    #[error("not found")]
    NotFound,
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("invalid: {0}")]
    Invalid(String),
}

impl From<RepoErr> for ApiError {
    fn from(err: RepoErr) -> Self {
        match err {
            RepoErr::NotFound => ApiError::NotFound,
            RepoErr::PreconditionFailed(msg) => ApiError::Conflict(msg),
            RepoErr::Invalid(msg) => ApiError::BadRequest(msg),
        }
    }
}
