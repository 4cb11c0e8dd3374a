//! Network and engine configuration for the Polymesh SDK.
//!
//! The node and middleware URLs are consumed by [`ChainQuery`](crate::context::ChainQuery)
//! and [`Submitter`](crate::context::Submitter) implementations. The remaining
//! settings tune how the engine assembles and runs transactions.

use std::fmt;
use url::Url;

/// Default upper bound on the number of calls in one atomic batch.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 10;

/// Known Polymesh networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// Polymesh mainnet
    Mainnet,
    /// Polymesh public testnet
    Testnet,
    /// Local development chain
    Local,
    /// Custom network
    Custom,
}

impl Network {
    /// Returns the network name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Local => "local",
            Network::Custom => "custom",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the Polymesh SDK.
///
/// Use one of the presets and adjust it with the `with_*` methods.
///
/// # Example
///
/// ```rust
/// use polymesh_sdk::PolymeshConfig;
///
/// let config = PolymeshConfig::testnet()
///     .with_max_batch_size(5)
///     .with_fee_check(false);
/// assert_eq!(config.max_batch_size(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct PolymeshConfig {
    network: Network,
    node_url: Url,
    middleware_url: Option<Url>,
    max_batch_size: usize,
    check_fees: bool,
}

impl Default for PolymeshConfig {
    fn default() -> Self {
        Self::local()
    }
}

impl PolymeshConfig {
    fn preset(network: Network, node_url: &str, middleware_url: Option<&str>) -> Self {
        Self {
            network,
            node_url: Url::parse(node_url).expect("valid preset node URL"),
            middleware_url: middleware_url
                .map(|u| Url::parse(u).expect("valid preset middleware URL")),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            check_fees: true,
        }
    }

    /// Creates a configuration for Polymesh mainnet.
    pub fn mainnet() -> Self {
        Self::preset(
            Network::Mainnet,
            "wss://mainnet-rpc.polymesh.network",
            Some("https://mainnet-graphql.polymesh.network"),
        )
    }

    /// Creates a configuration for the Polymesh public testnet.
    pub fn testnet() -> Self {
        Self::preset(
            Network::Testnet,
            "wss://testnet-rpc.polymesh.live",
            Some("https://testnet-graphql.polymesh.live"),
        )
    }

    /// Creates a configuration for a local development chain on the default
    /// RPC port.
    pub fn local() -> Self {
        Self::preset(Network::Local, "ws://127.0.0.1:9944", None)
    }

    /// Creates a custom configuration with the specified node URL.
    pub fn custom(node_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            network: Network::Custom,
            node_url: Url::parse(node_url)?,
            middleware_url: None,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            check_fees: true,
        })
    }

    /// Sets a custom middleware (indexer) URL.
    pub fn with_middleware_url(mut self, url: &str) -> Result<Self, url::ParseError> {
        self.middleware_url = Some(Url::parse(url)?);
        Ok(self)
    }

    /// Sets the maximum number of calls per atomic batch. Values below one are
    /// raised to one.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.max(1);
        self
    }

    /// Enables or disables the pre-submission check that the paying account
    /// can cover the fees.
    pub fn with_fee_check(mut self, enabled: bool) -> Self {
        self.check_fees = enabled;
        self
    }

    /// Returns the network this config is for.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Returns the node RPC URL.
    pub fn node_url(&self) -> &Url {
        &self.node_url
    }

    /// Returns the middleware URL, if configured.
    pub fn middleware_url(&self) -> Option<&Url> {
        self.middleware_url.as_ref()
    }

    /// Returns the maximum number of calls per atomic batch.
    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Returns true if fees are checked before submission.
    pub fn check_fees(&self) -> bool {
        self.check_fees
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_config() {
        let config = PolymeshConfig::mainnet();
        assert_eq!(config.network(), Network::Mainnet);
        assert!(config.node_url().as_str().contains("mainnet"));
        assert!(config.middleware_url().is_some());
        assert!(config.check_fees());
    }

    #[test]
    fn test_local_config() {
        let config = PolymeshConfig::local();
        assert_eq!(config.network(), Network::Local);
        assert!(config.middleware_url().is_none());
        assert_eq!(config.max_batch_size(), DEFAULT_MAX_BATCH_SIZE);
    }

    #[test]
    fn test_custom_config() {
        let config = PolymeshConfig::custom("wss://node.example.com").unwrap();
        assert_eq!(config.network(), Network::Custom);
        assert_eq!(config.node_url().as_str(), "wss://node.example.com/");
        assert!(PolymeshConfig::custom("not a url").is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = PolymeshConfig::testnet()
            .with_max_batch_size(0)
            .with_fee_check(false)
            .with_middleware_url("https://indexer.example.com")
            .unwrap();

        assert_eq!(config.max_batch_size(), 1);
        assert!(!config.check_fees());
        assert_eq!(
            config.middleware_url().map(Url::as_str),
            Some("https://indexer.example.com/")
        );
    }
}
