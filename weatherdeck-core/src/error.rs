use thiserror::Error;

/// Errors produced while fetching or shaping provider data.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The provider answered with a non-2xx status.
    #[error("provider returned HTTP {status}: {message}")]
    ProviderHttp { status: u16, message: String },

    /// The response body was not JSON, or lacked a required field.
    #[error("unexpected provider response: {0}")]
    ProviderShape(String),

    /// Transport failure before a response was obtained.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("could not format local time: {0}")]
    Format(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl WeatherError {
    pub(crate) fn missing(path: impl AsRef<str>) -> Self {
        WeatherError::ProviderShape(format!("missing field `{}`", path.as_ref()))
    }

    /// Message suitable for direct display in a UI.
    pub fn display_message(&self) -> String {
        match self {
            WeatherError::ProviderHttp { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Unwrap a required field, naming its dotted path on failure.
pub(crate) fn require<T>(value: Option<T>, path: &str) -> Result<T, WeatherError> {
    value.ok_or_else(|| WeatherError::missing(path))
}
