//! Client for the Loopia XML-RPC DNS API: add, remove and list zone records
//! and remove subdomains.

pub mod client;
pub mod domain;
pub mod error;
pub mod record;
pub mod status;
pub mod transport;
pub mod xmlrpc;

pub use client::{Client, BASE_URL};
pub use domain::{Breakdown, DomainBreakdown, PublicSuffixList, ZoneName, APEX};
pub use error::{Error, RpcError};
pub use record::{Record, DEFAULT_TTL};
pub use status::StatusError;
pub use transport::{HttpRequest, HttpTransport, Transport, TransportError, DEFAULT_TIMEOUT};
