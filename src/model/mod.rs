//! Record data model.
//!
//! In-memory representation of one reportable occurrence, serialized with
//! the field names the collection API documents.

pub mod body;
pub mod level;
pub mod person;
pub mod record;
pub mod request;

pub use body::*;
pub use level::*;
pub use person::*;
pub use record::*;
pub use request::*;
