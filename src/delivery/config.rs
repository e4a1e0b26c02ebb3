//! InfluxDB connection credentials.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CollectorError, Result};

/// Default credentials file path, shared by all deployed field units.
pub const DEFAULT_CREDENTIALS_PATH: &str = ".influxdb";

/// Connection settings for the remote time-series store.
///
/// Loaded once at startup and immutable for the process lifetime. A missing
/// or malformed file is the one fatal startup condition besides CLI usage.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Base URL of the InfluxDB instance, e.g. `http://influx.local:8086`
    pub url: String,
    /// Target bucket
    pub bucket: String,
    /// Organization identifier
    pub org: String,
    /// API token with write access to the bucket
    pub token: String,
}

impl DeliveryConfig {
    /// Load credentials from a JSON file with required string keys `url`,
    /// `bucket`, `org`, and `token`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            CollectorError::credentials_error(format!(
                "cannot read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: DeliveryConfig = serde_json::from_str(&contents).map_err(|e| {
            CollectorError::credentials_error(format!(
                "malformed credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("url", &self.url),
            ("bucket", &self.bucket),
            ("org", &self.org),
            ("token", &self.token),
        ] {
            if value.is_empty() {
                return Err(CollectorError::credentials_error(format!(
                    "credentials field `{}` must not be empty",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_credentials(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_credentials() {
        let file = write_credentials(
            r#"{
                "url": "http://influx.local:8086",
                "bucket": "solar",
                "org": "home",
                "token": "secret-token"
            }"#,
        );

        let config = DeliveryConfig::load(file.path()).unwrap();
        assert_eq!(config.url, "http://influx.local:8086");
        assert_eq!(config.bucket, "solar");
        assert_eq!(config.org, "home");
        assert_eq!(config.token, "secret-token");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = DeliveryConfig::load("/nonexistent/.influxdb");
        assert!(matches!(result, Err(CollectorError::Credentials(_))));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let file = write_credentials("{ not json");
        assert!(matches!(
            DeliveryConfig::load(file.path()),
            Err(CollectorError::Credentials(_))
        ));
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let file = write_credentials(r#"{"url": "http://x", "bucket": "b", "org": "o"}"#);
        assert!(matches!(
            DeliveryConfig::load(file.path()),
            Err(CollectorError::Credentials(_))
        ));
    }

    #[test]
    fn test_empty_field_is_an_error() {
        let file = write_credentials(r#"{"url": "", "bucket": "b", "org": "o", "token": "t"}"#);
        assert!(matches!(
            DeliveryConfig::load(file.path()),
            Err(CollectorError::Credentials(_))
        ));
    }
}
