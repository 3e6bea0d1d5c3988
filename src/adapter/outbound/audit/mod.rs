//! Audit transports.
//!
//! - [`HttpAuditClient`]: unary remote logging service over HTTP/JSON
//! - [`SpoolQueue`]: append-only JSON-lines queue, one file per destination

mod http;
mod spool;

pub use http::HttpAuditClient;
pub use spool::SpoolQueue;
