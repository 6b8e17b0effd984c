//! Core support module
//!
//! This module provides the ambient pieces shared by the rest of the crate:
//! - Configuration management
//! - Structured logging system
//! - Error handling and type system
//! - Clock abstraction

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use error::{ErrorResponse, ExtensionError, Result};
pub use logging::Logger;
