use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use wither::WitherError;
use wither::bson;
use wither::mongodb::error::Error as MongoError;
use wither::mongodb::error::{ErrorKind, WriteFailure};

#[derive(thiserror::Error, Debug)]
#[error("...")]
pub enum Error {
    #[error("{0}")]
    Wither(#[from] WitherError),

    #[error("{0}")]
    Mongo(#[from] MongoError),

    #[error("Error parsing ObjectID {0}")]
    ParseObjectID(String),

    #[error("{0}")]
    SerializeMongoResponse(#[from] bson::de::Error),

    #[error("{0}")]
    SerializeMongoRequest(#[from] bson::ser::Error),

    #[error("{0}")]
    BadRequest(#[from] BadRequest),

    #[error("{0}")]
    NotFound(#[from] NotFound),

    #[error("{0}")]
    Conflict(#[from] Conflict),

    #[error("{0}")]
    Internal(#[from] Internal),
}

impl Error {
    fn get_codes(&self) -> (StatusCode, u16) {
        match *self {
            // 4XX Errors
            Error::ParseObjectID(_) => (StatusCode::BAD_REQUEST, 40001),
            Error::BadRequest(_) => (StatusCode::BAD_REQUEST, 40002),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, 40003),
            Error::Conflict(_) => (StatusCode::CONFLICT, 40004),

            // 5XX Errors
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, 5000),
            Error::Wither(_) => (StatusCode::INTERNAL_SERVER_ERROR, 5002),
            Error::Mongo(_) => (StatusCode::INTERNAL_SERVER_ERROR, 5003),
            Error::SerializeMongoResponse(_) => (StatusCode::INTERNAL_SERVER_ERROR, 5004),
            Error::SerializeMongoRequest(_) => (StatusCode::INTERNAL_SERVER_ERROR, 5005),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Error::BadRequest(BadRequest {
            message: message.to_string(),
        })
    }

    pub fn not_found(message: &str) -> Self {
        Error::NotFound(NotFound {
            message: message.to_string(),
        })
    }

    pub fn conflict(message: &str) -> Self {
        Error::Conflict(Conflict {
            message: message.to_string(),
        })
    }

    pub fn internal_err(message: &str) -> Self {
        Error::Internal(Internal {
            message: message.to_string(),
        })
    }

    /// Duplicate key writes against the unique `userId` index mean the
    /// record already exists, not that storage failed.
    pub fn is_duplicate_key(&self) -> bool {
        match self {
            Error::Mongo(err) => is_mongo_duplicate_key(err),
            Error::Wither(WitherError::Mongo(err)) => is_mongo_duplicate_key(err),
            _ => false,
        }
    }
}

const MONGO_DUPLICATE_KEY_CODE: i32 = 11000;

fn is_mongo_duplicate_key(err: &MongoError) -> bool {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) => {
            write_error.code == MONGO_DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(ref command_error) => command_error.code == MONGO_DUPLICATE_KEY_CODE,
        _ => false,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("{self:?}");

        let (status_code, code) = self.get_codes();
        let message = self.to_string();
        let body = Json(json!({ "code": code, "message": message }));

        (status_code, body).into_response()
    }
}

#[derive(thiserror::Error, Debug)]
#[error("Bad Request: {message}")]
pub struct BadRequest {
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
#[error("Not found: {message}")]
pub struct NotFound {
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
#[error("Conflict: {message}")]
pub struct Conflict {
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
#[error("Internal error: {message}")]
pub struct Internal {
    pub message: String,
}
