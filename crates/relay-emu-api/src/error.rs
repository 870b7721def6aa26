//! ---
//! emu_section: "05-networking-external-interfaces"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "HTTP surfaces for the device and the standalone store."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use relay_emu_device::DeviceError;
use relay_emu_kvs::KvsError;
use serde_json::{json, Value};

/// Status code and JSON body for a failed request.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl From<&DeviceError> for ApiError {
    fn from(err: &DeviceError) -> Self {
        let status = match err {
            DeviceError::OperationNotFound { .. }
            | DeviceError::ComponentIdNotFound { .. }
            | DeviceError::ComponentNotFound(_)
            | DeviceError::KeyNotFound(_) => StatusCode::NOT_FOUND,
            DeviceError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            DeviceError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            body: err.to_body(),
        }
    }
}

impl From<&KvsError> for ApiError {
    fn from(err: &KvsError) -> Self {
        let status = match err {
            KvsError::KeyNotFound(_) => StatusCode::NOT_FOUND,
            KvsError::InvalidOperation(_)
            | KvsError::MissingArgument(_)
            | KvsError::MalformedQuery(_) => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            body: err.to_body(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
