// file: src/utils/mod.rs
// description: utility module exports
// reference: shared helpers

pub mod logging;

pub use logging::{format_error, format_success, format_warning, init_logger};
