use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("missing required fields ({})", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}
