//! Synchronous WBEM operation client (DSP0200)
//!
//! Issues CIM-XML operations over HTTP/HTTPS with Basic authentication,
//! TLS validation, bounded retries with exponential backoff, pulled
//! enumerations, capability-probing iterators, and operation recording
//! hooks. The [`LiveRepository`] adapter lets the MOF compiler target a
//! real server through the same contract as the in-memory mock.
//!
//! Connections are thread-compatible but not thread-safe: use one
//! connection per thread.

pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod iter;
pub mod pull;
pub mod recorder;
pub mod repository;
pub mod retry;
pub mod status;

pub use config::ConnectionConfig;
pub use connection::{
    AssocOptions, ClassOptions, EnumClassOptions, InstanceOptions, WbemConnection,
};
pub use error::{CimError, ClientError, ClientResult};
pub use iter::EnumerationIter;
pub use pull::PullHandle;
pub use recorder::{OperationRecord, OperationRecorder};
pub use repository::LiveRepository;
pub use retry::RetryPolicy;
pub use status::CimStatusCode;
