//! Core types for llauncher: the `llama-server` option record, its
//! rendering into command-line arguments, and the shared error type.

pub mod args;
pub mod error;
pub mod models;

pub use args::{build_args, format_args_for_display};
pub use error::{LauncherError, Result, LAUNCHER_FAILURE_EXIT_CODE};
pub use models::{
    ConfigRecord, FieldDescriptor, FieldValue, LlamaConfig, ValueKind, LLAMA_FIELDS,
};
