use thiserror::Error;

#[derive(Error, Debug)]
pub enum TangochoError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no words in genre \"{0}\"")]
    EmptyGroup(String),

    #[error("word index {0} is out of range")]
    NotFound(usize),

    #[error("TangochoError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for TangochoError {
    fn from(error: std::io::Error) -> Self {
        TangochoError::Io(Box::new(error))
    }
}
