/// Outcome of a filtering query: either some records, or a successful "nothing matched".
///
/// Kept apart from `ServiceError::NotFound` so callers can decide how to render
/// an empty result without inspecting the payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Matches<T> {
    Found(Vec<T>),
    Empty,
}

impl<T> Matches<T> {
    pub fn from_vec(records: Vec<T>) -> Self {
        if records.is_empty() {
            Self::Empty
        } else {
            Self::Found(records)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Found(records) => records,
            Self::Empty => Vec::new(),
        }
    }
}
