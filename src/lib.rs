//! Faultwire Core - error and message reporting client
//!
//! Turns errors, exceptions and log messages into size-bounded, scrubbed JSON
//! payloads for an error-tracking API. The implementation prioritizes:
//!
//! 1. **Safety** - Sensitive fields are redacted before anything is encoded
//! 2. **Logging** - Every decision point logged with report context
//! 3. **Resilience** - Reporting never raises into the host application
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `pipeline` - The `Reporter` service and the `Sender` boundary
//! - `builder` - Record assembly from messages, wrapped errors and exceptions
//! - `frames` - Stack frame capture, normalization and exception chains
//! - `model` - The record and its body, request, person and server parts
//! - `security` - Field, pattern and query-string scrubbing
//! - `truncation` - Ordered size-reduction strategies
//! - `payload` - Wire serialization
//! - `routing` - Send-or-drop decisions
//! - `extraction` - Dotted-path access into payload trees
//! - `config` - Reporter configuration
//! - `logging` - Structured logging with report context
//!
//! ## Example
//! ```no_run
//! use faultwire_core::{Reporter, ReporterConfig, ReportContext, Response, Sender, ToLog};
//! use faultwire_core::truncation::EncodedPayload;
//!
//! struct Stdout;
//!
//! impl Sender for Stdout {
//!     fn send(&self, payload: &EncodedPayload, _access_token: &str) -> Response {
//!         println!("{}", String::from_utf8_lossy(payload.encoded()));
//!         Response::new(200, "OK", None)
//!     }
//! }
//!
//! faultwire_core::init_logger();
//! let config = ReporterConfig::new("abcdef0123456789abcdef0123456789").apply_env_overrides();
//! let reporter = Reporter::new(&config, Box::new(Stdout)).unwrap();
//! reporter.log(None, ToLog::Text("cache warmed"), &ReportContext::new());
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod extraction;
pub mod frames;
pub mod logging;
pub mod model;
pub mod payload;
pub mod pipeline;
pub mod routing;
pub mod security;
pub mod truncation;

pub use builder::{DataBuilder, ReportContext, ToLog};
pub use config::ReporterConfig;
pub use error::{ConfigError, ReportError};
pub use frames::{ErrorWrapper, Exception, Throwable};
pub use logging::init_logger;
pub use model::{Level, PsrLevel, Record};
pub use pipeline::{Reporter, Response, Sender};
