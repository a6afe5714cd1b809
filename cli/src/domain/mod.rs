//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod classify;
pub mod command;
pub mod config;
pub mod distro;
pub mod encoding;
pub mod error;
pub mod security;
pub mod validate;

pub use classify::{ClassifiedError, RawFailure, UserMessage, classify, to_user_message};
pub use command::{CommandSpec, arg_roles, build};
pub use config::{WslmConfig, validate_config_key, validate_config_value};
pub use error::{ConfigError, ProcessError, ValidationError};
pub use security::{RateLimitPolicy, SecurityEvent, SecurityEventKind, SecurityValidator};
pub use validate::{
    ArgRole, ValidatedArgument, sanitize, validate_distribution_name, validate_file_path,
};
