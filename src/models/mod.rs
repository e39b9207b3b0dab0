//! Data Models
//!
//! Request, record and configuration types shared by services and storage.

pub mod dashboard;
pub mod discovery;
pub mod evaluation;
pub mod settings;

pub use dashboard::*;
pub use discovery::*;
pub use evaluation::*;
pub use settings::*;
