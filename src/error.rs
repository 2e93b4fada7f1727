use thiserror::Error;

/// Faults of the record source. Everything downstream of a successful read
/// reports "no data" through its return values instead.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Store unreachable, timed out, refused the request, or a local snapshot
    /// could not be read.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The store answered, but not with a record collection.
    #[error("malformed source data: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        SourceError::Unavailable(e.to_string())
    }
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        SourceError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Malformed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_kind() {
        let e = SourceError::Unavailable("timed out".to_string());
        assert_eq!(e.to_string(), "source unavailable: timed out");
        let e: SourceError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(e, SourceError::Malformed(_)));
    }
}
