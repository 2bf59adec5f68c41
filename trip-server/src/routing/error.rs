//! Route provider error types.

use crate::domain::Mode;

/// Errors from a [`RouteProvider`](super::RouteProvider).
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Engine returned a non-success status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Engine answered but found no route
    #[error("no route found ({code}): {message}")]
    NoRoute { code: String, message: String },

    /// Origin or destination is too far from the road network
    #[error("point is {distance:.0} m from the network (max {max:.0} m)")]
    TooFarFromNetwork { distance: f64, max: f64 },

    /// Mode has no profile on this engine
    #[error("mode {0} is not supported by this routing engine")]
    UnsupportedMode(Mode),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProviderError::NoRoute {
            code: "NoRoute".into(),
            message: "Impossible route between points".into(),
        };
        assert_eq!(
            err.to_string(),
            "no route found (NoRoute): Impossible route between points"
        );

        let err = ProviderError::TooFarFromNetwork {
            distance: 1523.4,
            max: 1000.0,
        };
        assert_eq!(
            err.to_string(),
            "point is 1523 m from the network (max 1000 m)"
        );

        let err = ProviderError::UnsupportedMode(Mode::Rail);
        assert_eq!(
            err.to_string(),
            "mode rail is not supported by this routing engine"
        );
    }
}
