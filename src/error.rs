use thiserror::Error;

pub type Result<T> = std::result::Result<T, CutError>;

/// An arena could not hand out more records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to allocate {requested} {kind} record(s)")]
pub struct AllocError {
    pub kind: &'static str,
    pub requested: usize,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CutError {
    #[error("invalid argument: {name} = {value} ({reason})")]
    InvalidArgument { name: &'static str, value: String, reason: &'static str },

    #[error("out of memory: {0}")]
    OutOfMemory(#[from] AllocError),

    #[error("seed {seed} could not be resolved to a mesh face")]
    UnresolvedSeed { seed: &'static str },
}

impl CutError {
    pub fn invalid_argument<T: std::fmt::Display>(name: &'static str, value: T, reason: &'static str) -> Self {
        CutError::InvalidArgument { name, value: value.to_string(), reason }
    }
}
