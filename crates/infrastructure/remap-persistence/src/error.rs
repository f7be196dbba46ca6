#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid profiles document: {0}")]
    InvalidDocument(String),
    #[error("watch error: {0}")]
    Watch(Box<notify::Error>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    Io,
    Codec,
    InvalidDocument,
    Watch,
}

impl StorageError {
    pub fn kind(&self) -> StorageErrorKind {
        match self {
            StorageError::Io(_) => StorageErrorKind::Io,
            StorageError::Serde(_) => StorageErrorKind::Codec,
            StorageError::InvalidDocument(_) => StorageErrorKind::InvalidDocument,
            StorageError::Watch(_) => StorageErrorKind::Watch,
        }
    }
}

impl From<notify::Error> for StorageError {
    fn from(value: notify::Error) -> Self {
        Self::Watch(Box::new(value))
    }
}
