use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Short, stable tag for the failure class. Shows up in summary
    /// placeholders, sentinel entities and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
            Error::Http(_) => "http",
            Error::Inference(_) => "inference",
            Error::EmptyInput(_) => "empty_input",
            Error::Feed(_) => "feed",
            Error::Config(_) => "config",
            Error::External(_) => "external",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(Error::Inference("boom".into()).kind(), "inference");
        assert_eq!(Error::EmptyInput("nothing".into()).kind(), "empty_input");
        assert_eq!(Error::External(anyhow::anyhow!("x")).kind(), "external");
    }

    #[test]
    fn test_display_includes_message() {
        let err = Error::Feed("bad xml".to_string());
        assert_eq!(err.to_string(), "Feed error: bad xml");
    }
}
