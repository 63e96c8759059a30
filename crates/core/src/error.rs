pub type Result<T, E = RankError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum RankError {
    #[error("{message}")]
    Validation { message: String },
    #[error("{message}")]
    Configuration { message: String },
    #[error("{provider} error: {status}")]
    Provider {
        provider: &'static str,
        status: String,
    },
    #[error("{message}")]
    Transport { message: String },
    #[error("{message}")]
    Persistence { message: String },
}

impl RankError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Configuration { .. } => "configuration",
            Self::Provider { .. } => "provider",
            Self::Transport { .. } => "transport",
            Self::Persistence { .. } => "persistence",
        }
    }
}

impl From<reqwest::Error> for RankError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(format!("places request failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_embeds_status() {
        let err = RankError::Provider {
            provider: "Google Places API",
            status: "REQUEST_DENIED".to_string(),
        };
        assert_eq!(err.to_string(), "Google Places API error: REQUEST_DENIED");
        assert_eq!(err.kind(), "provider");
    }
}
