use thiserror::Error;

use crate::status::StatusError;
use crate::transport::TransportError;
use crate::xmlrpc::decode::DecodeError;

/// A fault returned by the XML-RPC layer itself, as opposed to an
/// application status string inside a successful call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    /// The fault code as text, or an empty string for code 0 (no fault).
    pub fn code_string(&self) -> String {
        if self.code == 0 {
            String::new()
        } else {
            self.code.to_string()
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid domain: {0:?}")]
    InvalidDomain(String),

    #[error("empty registered domain")]
    EmptyRegisteredDomain,

    #[error("empty subdomain")]
    EmptySubdomain,

    #[error("{method} for {domain}: encode request: {source}")]
    Encoding {
        method: &'static str,
        domain: String,
        #[source]
        source: xml::writer::Error,
    },

    #[error("{method} for {domain}: transport: {source}")]
    Transport {
        method: &'static str,
        domain: String,
        #[source]
        source: TransportError,
    },

    #[error("{method} for {domain}: empty response body")]
    EmptyResponseBody { method: &'static str, domain: String },

    #[error("{method} for {domain}: malformed response: {source} (body: {body:?})")]
    MalformedResponse {
        method: &'static str,
        domain: String,
        body: String,
        #[source]
        source: DecodeError,
    },

    #[error("{method} for {domain}: rpc fault {}: {}", .source.code, .source.message)]
    RpcFault {
        method: &'static str,
        domain: String,
        #[source]
        source: RpcError,
    },

    #[error("{method} for {domain}: {source}")]
    Status {
        method: &'static str,
        domain: String,
        #[source]
        source: StatusError,
    },
}

impl Error {
    /// The XML-RPC fault behind this error, if any.
    pub fn rpc_fault(&self) -> Option<&RpcError> {
        match self {
            Error::RpcFault { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The rejected application status behind this error, if any.
    pub fn status(&self) -> Option<&StatusError> {
        match self {
            Error::Status { source, .. } => Some(source),
            _ => None,
        }
    }
}
