use crate::error::{PipelineError, Result};

use super::KeyStore;

/// Resolves secrets from process environment variables.
///
/// `.env` is expected to have been loaded already (see `dotenvy::dotenv`).
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvKeyStore;

#[async_trait::async_trait]
impl KeyStore for EnvKeyStore {
    async fn get(&self, reference: &str) -> Result<String> {
        std::env::var(reference).map_err(|e| {
            PipelineError::Config(format!("environment variable '{reference}' not usable: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unset_variable_is_config_error() {
        let err = EnvKeyStore
            .get("WEATHER_ENERGY_PIPELINE_SURELY_UNSET_VAR")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
        assert!(err.to_string().contains("WEATHER_ENERGY_PIPELINE_SURELY_UNSET_VAR"));
    }

    #[tokio::test]
    async fn test_reads_existing_variable() {
        // PATH is set in any environment the test runner uses.
        assert!(!EnvKeyStore.get("PATH").await.unwrap().is_empty());
    }
}
