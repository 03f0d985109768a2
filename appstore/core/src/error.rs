use thiserror::Error;

/**
    Error returned by `FromStr` implementations on storefront and pricing types.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}
