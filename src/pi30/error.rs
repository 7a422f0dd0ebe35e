use thiserror::Error;

/// Errors raised by the protocol core. Every variant carries enough
/// context (command name, field label, offending token) for the caller
/// to log or surface without re-deriving it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown command: {command}")]
    UnknownCommand { command: String },

    #[error("{command} does not satisfy the parameter pattern of {name}")]
    ParameterMismatch { command: String, name: String },

    #[error("bad framing: {reason}")]
    Framing { reason: &'static str },

    #[error("checksum mismatch: frame carries {got:02x?}, computed {want:02x?}")]
    Checksum { got: [u8; 2], want: [u8; 2] },

    #[error("short response to {command}: needed {needed} tokens, got {got}")]
    ShortResponse {
        command: String,
        needed: usize,
        got: usize,
    },

    #[error("cannot decode field {label:?} of {command}: bad token {token:?}")]
    FieldDecode {
        command: String,
        label: &'static str,
        token: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
