use std::fmt;

/// Failures of the backing score store.
#[derive(Debug)]
pub enum StoreError {
    Missing,
    Malformed(String),
    Io(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Missing => write!(f, "score store is missing"),
            StoreError::Malformed(detail) => write!(f, "score store is malformed: {detail}"),
            StoreError::Io(detail) => write!(f, "score store io error: {detail}"),
        }
    }
}

impl std::error::Error for StoreError {}

// Domain-level errors for leaderboard workflows.
#[derive(Debug)]
pub enum ScoresError {
    InvalidInitials,
    Store(StoreError),
}

impl From<StoreError> for ScoresError {
    fn from(err: StoreError) -> Self {
        ScoresError::Store(err)
    }
}

impl fmt::Display for ScoresError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoresError::InvalidInitials => write!(f, "initials are required"),
            ScoresError::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ScoresError {}
