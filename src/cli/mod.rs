//! CLI command handlers
//!
//! Argument parsing structures, command routing and the per-command
//! implementations of the `kiva` binary.

pub mod args;
pub mod commands;
pub mod router;

pub use args::{Cli, Commands};
pub use router::execute_command;

/// Log filter for a `-v` count, falling back to the configured level
pub fn get_log_level(verbose: u8, configured: Option<&str>) -> &str {
    match verbose {
        0 => configured.unwrap_or("info"),
        1 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_log_level() {
        assert_eq!(get_log_level(0, None), "info");
        assert_eq!(get_log_level(0, Some("warn")), "warn");
        assert_eq!(get_log_level(1, Some("warn")), "debug");
        assert_eq!(get_log_level(3, None), "trace");
    }
}
