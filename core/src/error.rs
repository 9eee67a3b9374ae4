use thiserror::Error;

/// Error type for the transit catalog core.
///
/// Query "not found" (unknown stop/bus, unreachable route) is never
/// represented here — it is a reply value, not a fault. Only malformed
/// input, a broken binary artifact, or a violated structural invariant
/// reach this type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("json parse error at byte {offset}: {message}")]
    JsonParse { offset: usize, message: String },

    #[error("unknown request type: {0}")]
    UnknownRequestType(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("stop '{0}' already exists")]
    DuplicateStop(String),

    #[error("bus '{0}' already exists")]
    DuplicateBus(String),

    #[error("stop id {0} already assigned")]
    DuplicateStopId(u32),

    #[error("bus id {0} already assigned")]
    DuplicateBusId(u32),

    #[error("stop id {0} referenced by the graph has no catalog entry")]
    DanglingStopId(u32),

    #[error("bus id {0} referenced by the graph has no catalog entry")]
    DanglingBusId(u32),

    #[error("router was queried before the graph was built")]
    RouterNotBuilt,

    #[error("codec error: {0}")]
    Codec(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
