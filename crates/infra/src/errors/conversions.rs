//! Conversions from external infrastructure errors into domain errors.

use std::io;

use dynconnect_domain::{ConnectorError, TransportError};
use reqwest::Error as HttpError;
use thiserror::Error;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct InfraError(#[from] pub ConnectorError);

impl From<InfraError> for ConnectorError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

trait IntoConnectorError {
    fn into_connector(self) -> ConnectorError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → description */
/* -------------------------------------------------------------------------- */

/// One-line description of an HTTP client failure.
///
/// Used as the transport failure text, so it must never be empty.
pub fn describe_http_error(err: &HttpError) -> String {
    if err.is_timeout() {
        return "HTTP request timed out".into();
    }

    if err.is_connect() {
        return format!("HTTP connection failure: {}", root_cause(err));
    }

    if err.is_builder() {
        return format!("invalid HTTP request: {}", root_cause(err));
    }

    let text = err.to_string();
    if text.trim().is_empty() {
        dynconnect_domain::constants::GENERAL_CONNECTION_ERROR.into()
    } else {
        text
    }
}

fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
/// Transport failure for an HTTP client error, carrying
/// [`describe_http_error`] as its message.
pub fn transport_error(err: HttpError) -> TransportError {
    TransportError::new(describe_http_error(&err))
}

impl IntoConnectorError for HttpError {
    fn into_connector(self) -> ConnectorError {
        if self.is_builder() {
            return ConnectorError::Config(describe_http_error(&self));
        }
        ConnectorError::Transport(describe_http_error(&self))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_connector())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → ConnectorError */
/* -------------------------------------------------------------------------- */

impl IntoConnectorError for io::Error {
    fn into_connector(self) -> ConnectorError {
        match self.kind() {
            io::ErrorKind::NotFound => ConnectorError::NotFound(self.to_string()),
            io::ErrorKind::PermissionDenied => {
                ConnectorError::Storage(format!("permission denied: {self}"))
            }
            _ => ConnectorError::Storage(self.to_string()),
        }
    }
}

impl From<io::Error> for InfraError {
    fn from(value: io::Error) -> Self {
        InfraError(value.into_connector())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml → ConnectorError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(ConnectorError::Config(format!("Invalid JSON format: {value}")))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(ConnectorError::Config(format!("Invalid TOML format: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → ConnectorError */
/* -------------------------------------------------------------------------- */

#[cfg(feature = "keychain")]
impl IntoConnectorError for keyring::Error {
    fn into_connector(self) -> ConnectorError {
        use keyring::Error as KE;

        match self {
            KE::NoEntry => ConnectorError::NotFound("keychain entry not found".into()),
            KE::BadEncoding(_) => {
                ConnectorError::Storage("credential in keychain is not valid UTF-8".into())
            }
            KE::TooLong(name, limit) => ConnectorError::Storage(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            KE::Invalid(attr, reason) => {
                ConnectorError::Storage(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            KE::PlatformFailure(err) => {
                ConnectorError::Storage(format!("keychain platform error: {err}"))
            }
            KE::NoStorageAccess(err) => {
                ConnectorError::Storage(format!("unable to access secure storage: {err}"))
            }
            other => ConnectorError::Storage(other.to_string()),
        }
    }
}

#[cfg(feature = "keychain")]
impl From<keyring::Error> for InfraError {
    fn from(value: keyring::Error) -> Self {
        InfraError(value.into_connector())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::Client;

    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err = io::Error::new(io::ErrorKind::NotFound, "token file missing");
        let mapped: ConnectorError = InfraError::from(err).into();
        assert!(matches!(mapped, ConnectorError::NotFound(msg) if msg.contains("token file")));
    }

    #[test]
    fn io_other_maps_to_storage() {
        let err = io::Error::new(io::ErrorKind::Other, "disk full");
        let mapped: ConnectorError = InfraError::from(err).into();
        assert!(matches!(mapped, ConnectorError::Storage(_)));
    }

    #[test]
    fn parse_errors_map_to_config() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let mapped: ConnectorError = InfraError::from(json_err).into();
        assert!(matches!(mapped, ConnectorError::Config(msg) if msg.starts_with("Invalid JSON")));

        let toml_err = toml::from_str::<toml::Table>("host = ").unwrap_err();
        let mapped: ConnectorError = InfraError::from(toml_err).into();
        assert!(matches!(mapped, ConnectorError::Config(msg) if msg.starts_with("Invalid TOML")));
    }

    #[tokio::test]
    async fn refused_connection_maps_to_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let err = client.post(format!("http://{addr}/api/echo")).send().await.unwrap_err();

        let description = describe_http_error(&err);
        assert!(description.starts_with("HTTP connection failure"), "{description}");

        let transport = transport_error(err);
        assert_eq!(transport.message(), description);
    }

    #[tokio::test]
    async fn refused_connection_maps_to_connector_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let err = client.post(format!("http://{addr}/api/echo")).send().await.unwrap_err();

        let mapped: ConnectorError = InfraError::from(err).into();
        assert!(matches!(mapped, ConnectorError::Transport(_)));
    }

    #[cfg(feature = "keychain")]
    #[test]
    fn keyring_no_entry_maps_to_not_found() {
        let mapped: ConnectorError = InfraError::from(keyring::Error::NoEntry).into();
        assert!(matches!(mapped, ConnectorError::NotFound(msg) if msg.contains("keychain")));
    }
}
