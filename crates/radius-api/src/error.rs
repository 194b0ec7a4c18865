//! Translates store/queue/operation-tracker failures into the ARM error envelope clients
//! expect (`{"error": {"code": ..., "message": ...}}`) with the matching HTTP status.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("{source}"))]
    Store { source: radius_store::Error },

    #[snafu(display("{source}"))]
    Queue { source: radius_queue::Error },

    #[snafu(display("{source}"))]
    Operation { source: radius_async_ops::Error },

    #[snafu(display("resource id {id:?} is not a well-formed ARM resource id"))]
    MalformedResourceId { id: String },

    #[snafu(display("{message}"))]
    BadRequest { message: String },
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl Error {
    fn code(&self) -> &'static str {
        match self {
            Error::Store { source } if source.is_not_found() => "NotFound",
            Error::Store {
                source: radius_store::Error::Concurrency { .. },
            } => "PreconditionFailed",
            Error::Store { .. } => "InternalServerError",
            Error::Queue { .. } => "InternalServerError",
            Error::Operation {
                source: radius_async_ops::Error::NotFound { .. },
            } => "NotFound",
            Error::Operation { .. } => "InternalServerError",
            Error::MalformedResourceId { .. } | Error::BadRequest { .. } => "BadRequest",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::Store { source } if source.is_not_found() => StatusCode::NOT_FOUND,
            Error::Store {
                source: radius_store::Error::Concurrency { .. },
            } => StatusCode::PRECONDITION_FAILED,
            Error::Operation {
                source: radius_async_ops::Error::NotFound { .. },
            } => StatusCode::NOT_FOUND,
            Error::MalformedResourceId { .. } | Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorEnvelope {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
