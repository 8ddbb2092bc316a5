use thiserror::Error;

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Why a single fetch failed.
///
/// Cloneable because one outcome is delivered to every caller waiting on the
/// same request key.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("unrecognized {kind} address {address}")]
    AddressShape { kind: &'static str, address: String },
}

impl FetchError {
    pub fn transport(url: &str, err: impl std::fmt::Display) -> Self {
        FetchError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    pub fn decode(url: &str, err: impl std::fmt::Display) -> Self {
        FetchError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}
