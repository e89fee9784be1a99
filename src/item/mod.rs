/// This module provides a flat-file item reader implementation.
pub mod flat_file;

/// This module provides a SQLite item writer and schema initializer.
pub mod rdbc;
