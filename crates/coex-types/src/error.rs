use thiserror::Error;

/// Failure to parse one of the string-encoded enums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
