//! API credential lookup.
//!
//! Configuration names a *reference* for each secret (an environment
//! variable name for [`EnvKeyStore`]). [`KeyStore`] is the async trait for
//! resolving a reference into its plaintext value.

mod env;

pub use env::EnvKeyStore;

use crate::error::Result;

/// Resolves a secret reference into a plaintext value.
#[async_trait::async_trait]
pub trait KeyStore: Send + Sync {
    async fn get(&self, reference: &str) -> Result<String>;
}
