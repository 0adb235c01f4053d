//! Clone failure type.

use thiserror::Error;

/// Why a repository clone did not produce a checkout.
#[derive(Debug, Error)]
pub enum CloneError {
    /// The version-control program could not be started (missing binary, permissions).
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The clone ran and exited unsuccessfully. `code` is None when killed by a signal.
    #[error("clone exited with {}: {stderr}", exit_label(.code))]
    Exit { code: Option<i32>, stderr: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "a signal".to_string(),
    }
}
