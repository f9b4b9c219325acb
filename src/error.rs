// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error and Result implementations.

use std::any::Any;
use std::fmt;

use reqwest::Error as HttpClientError;
use reqwest::StatusCode;

/// Kind of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Authentication failure
    ///
    /// Maps to HTTP 401.
    AuthenticationFailed,

    /// Access denied.
    ///
    /// Maps to HTTP 403.
    AccessDenied,

    /// Requested resource was not found.
    ///
    /// Roughly maps to HTTP 404 and 410.
    ResourceNotFound,

    /// Request returned more items than expected.
    TooManyItems,

    /// Invalid value passed to one of paremeters.
    ///
    /// May be result of HTTP 400.
    InvalidInput,

    /// Conflict in the request.
    Conflict,

    /// Operation has reached the specified time out.
    OperationTimedOut,

    /// Operation failed to complete.
    ///
    /// Waiters report this kind when a resource gets into one of the fatal
    /// states, see [Error::observed_state](struct.Error.html#method.observed_state).
    OperationFailed,

    /// Operation was cancelled by the caller.
    OperationCancelled,

    /// Configuration is missing or invalid.
    InvalidConfig,

    /// Protocol-level error reported by underlying HTTP library.
    ProtocolError,

    /// Response received from the server is malformed.
    InvalidResponse,

    /// Internal server error.
    ///
    /// Maps to HTTP 5xx codes.
    InternalServerError,
}

/// Error from a cloud call.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    status: Option<StatusCode>,
    message: Option<String>,
    observed_state: Option<String>,
    last_seen: Option<Box<dyn Any + Send + Sync>>,
}

/// Result of a cloud call.
pub type Result<T> = ::std::result::Result<T, Error>;

impl Error {
    /// Create a new error of the provided kind.
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Error {
        Error {
            kind,
            status: None,
            message: Some(message.into()),
            observed_state: None,
            last_seen: None,
        }
    }

    /// Create with providing all details.
    pub fn new_with_details(
        kind: ErrorKind,
        status: Option<StatusCode>,
        message: Option<String>,
    ) -> Error {
        Error {
            kind,
            status,
            message,
            observed_state: None,
            last_seen: None,
        }
    }

    /// Create an error from an HTTP status code.
    ///
    /// Useful for providers that check responses by hand instead of relying
    /// on `Response::error_for_status`.
    pub fn from_status<S: Into<String>>(status: StatusCode, message: S) -> Error {
        Error::new_with_details(kind_for_status(status), Some(status), Some(message.into()))
    }

    /// Helper - error of kind ResourceNotFound.
    pub fn new_not_found<D: fmt::Display>(resource: D) -> Error {
        Error::new(
            ErrorKind::ResourceNotFound,
            format!("Resource {} was not found", resource),
        )
    }

    /// Helper - a resource got into a state it cannot recover from.
    pub(crate) fn new_unexpected_state<D, T>(description: D, state: String, entity: T) -> Error
    where
        D: fmt::Display,
        T: Any + Send + Sync,
    {
        Error {
            kind: ErrorKind::OperationFailed,
            status: None,
            message: Some(format!("{} got into unexpected state {}", description, state)),
            observed_state: Some(state),
            last_seen: Some(Box::new(entity)),
        }
    }

    /// Error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status code (if available).
    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Error message (if available).
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The state a waiter observed before giving up (if any).
    #[inline]
    pub fn observed_state(&self) -> Option<&str> {
        self.observed_state.as_deref()
    }

    /// The last resource representation fetched by a waiter (if any).
    ///
    /// Returns `None` if the error does not carry a resource or if it has a
    /// different type.
    pub fn last_seen<T: Any>(&self) -> Option<&T> {
        self.last_seen.as_ref().and_then(|value| value.downcast_ref())
    }

    /// Take the last resource representation fetched by a waiter.
    pub fn into_last_seen<T: Any>(self) -> Option<T> {
        self.last_seen
            .and_then(|value| value.downcast().ok())
            .map(|value| *value)
    }
}

fn kind_for_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::UNAUTHORIZED => ErrorKind::AuthenticationFailed,
        StatusCode::FORBIDDEN => ErrorKind::AccessDenied,
        StatusCode::NOT_FOUND | StatusCode::GONE => ErrorKind::ResourceNotFound,
        StatusCode::NOT_ACCEPTABLE => ErrorKind::InvalidInput,
        StatusCode::CONFLICT => ErrorKind::Conflict,
        c if c.is_client_error() => ErrorKind::InvalidInput,
        c if c.is_server_error() => ErrorKind::InternalServerError,
        _ => ErrorKind::InvalidResponse,
    }
}

impl ErrorKind {
    /// Short description of the error kind.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::AuthenticationFailed => "Failed to authenticate",
            ErrorKind::AccessDenied => "Access to the resource is denied",
            ErrorKind::ResourceNotFound => "Requested resource was not found",
            ErrorKind::TooManyItems => "Request returned too many items",
            ErrorKind::InvalidInput => "Input value(s) are invalid or missing",
            ErrorKind::Conflict => "Requested cannot be fulfilled due to a conflict",
            ErrorKind::OperationTimedOut => "Time out reached while waiting for the operation",
            ErrorKind::OperationFailed => "Requested operation has failed",
            ErrorKind::OperationCancelled => "Operation was cancelled",
            ErrorKind::InvalidConfig => "Configuration is missing or invalid",
            ErrorKind::ProtocolError => "Error when accessing the server",
            ErrorKind::InvalidResponse => "Received invalid response",
            ErrorKind::InternalServerError => "Internal server error or bad gateway",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(ref msg) = self.message {
            write!(f, ": {}", msg)
        } else {
            Ok(())
        }
    }
}

impl ::std::error::Error for Error {}

impl From<HttpClientError> for Error {
    fn from(value: HttpClientError) -> Error {
        let msg = value.to_string();
        let kind = match value.status() {
            Some(status) => kind_for_status(status),
            None if value.is_decode() => ErrorKind::InvalidResponse,
            None => ErrorKind::ProtocolError,
        };

        Error::new_with_details(kind, value.status(), Some(msg))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Error {
        Error::new(ErrorKind::InvalidResponse, value.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(value: serde_yaml::Error) -> Error {
        Error::new(ErrorKind::InvalidConfig, value.to_string())
    }
}
