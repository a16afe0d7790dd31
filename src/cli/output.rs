//! Shared output helpers for the CLI.
//!
//! Global flags are exported as environment variables by `main` so every
//! subcommand can check them without threading them through call sites.

fn flag(name: &str) -> bool {
    std::env::var(name).map(|v| v == "1").unwrap_or(false)
}

/// True when `--json` was passed: machine-readable output only.
pub fn is_json() -> bool {
    flag("BEACON_JSON")
}

/// True when `--quiet` was passed: suppress non-essential output.
pub fn is_quiet() -> bool {
    flag("BEACON_QUIET")
}

/// True when `--verbose` was passed.
pub fn is_verbose() -> bool {
    flag("BEACON_VERBOSE")
}

/// Print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}
