pub mod check;
pub mod derive;
pub mod dump;
pub mod input;


use rankdef_properties::CodecError;

use input::LoadError;

/// Anything that makes a command exit with status 1.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Derive(#[from] rankdef_compiler::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rank profile '{profile}' not found in schema '{schema}'")]
    UnknownProfile { schema: String, profile: String },
}

/// Print `error: ...` to stderr and exit with status 1.
pub fn exit_on_error<T>(result: Result<T, CommandError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
