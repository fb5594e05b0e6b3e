use crate::error::{PipelineError, Result};
use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects a credential as an HTTP header.
///
/// The weather API expects its access token in a `token` header. Header name
/// and value are validated once here so `execute` never has to fail on them.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    key: HeaderValue,
}

impl<C> ApiKey<C> {
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes()).map_err(|e| {
            PipelineError::Config(format!("invalid header name '{header_name}': {e}"))
        })?;
        let mut key = HeaderValue::from_str(key)
            .map_err(|e| PipelineError::Config(format!("credential is not a valid header value: {e}")))?;
        key.set_sensitive(true);

        Ok(Self {
            inner,
            header_name,
            key,
        })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.key.clone());
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Never;

    #[async_trait]
    impl HttpClient for Never {
        async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            unreachable!("not called in construction tests")
        }
    }

    #[test]
    fn test_rejects_invalid_header_parts() {
        assert!(ApiKey::new(Never, "token", "abc123").is_ok());
        assert!(matches!(
            ApiKey::new(Never, "bad header", "abc"),
            Err(PipelineError::Config(_))
        ));
        assert!(matches!(
            ApiKey::new(Never, "token", "line\nbreak"),
            Err(PipelineError::Config(_))
        ));
    }
}
