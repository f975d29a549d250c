//! Configuration for a constant-product pair.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::domain::{Address, TokenPair};
use crate::error::PairError;

/// Default share-token name.
pub const DEFAULT_NAME: &str = "Pair Liquidity Share";
/// Default share-token symbol.
pub const DEFAULT_SYMBOL: &str = "PAIR-LP";
/// Share-token decimals.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Immutable parameters of a pair.
///
/// Fixes, once and for all, the registry that created the pair, the two
/// canonically ordered assets, the pair's own address, and the share-token
/// metadata that scopes permit signatures (`name`, `chain_id`, `address`).
///
/// # Derived Values
///
/// - Pair address: `keccak256(factory ‖ token_a ‖ token_b)` unless set
///   explicitly with [`PairConfig::with_address`].
///
/// # Validation
///
/// - Assets must be distinct and non-zero (checked by [`TokenPair`]).
/// - The pair address must not be zero or equal to either asset.
/// - Name and symbol must be non-empty.
///
/// # Examples
///
/// ```
/// use pair_amm::config::PairConfig;
/// use pair_amm::domain::Address;
///
/// let factory = Address::from_bytes([9u8; 32]);
/// let weth = Address::from_bytes([2u8; 32]);
/// let usdc = Address::from_bytes([1u8; 32]);
///
/// let cfg = PairConfig::new(factory, weth, usdc).expect("valid config");
/// assert_eq!(cfg.token_pair().token_a(), usdc);
/// assert_eq!(cfg.address(), PairConfig::derive_address(&factory, cfg.token_pair()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairConfig {
    factory: Address,
    token_pair: TokenPair,
    address: Address,
    name: String,
    symbol: String,
    decimals: u8,
    chain_id: u64,
}

/// On-disk representation accepted by [`PairConfig::from_toml_str`].
#[derive(Debug, Deserialize)]
struct PairConfigFile {
    factory: Address,
    token_x: Address,
    token_y: Address,
    address: Option<Address>,
    name: Option<String>,
    symbol: Option<String>,
    decimals: Option<u8>,
    chain_id: Option<u64>,
}

impl PairConfig {
    /// Creates a configuration with default share metadata and chain id 1.
    ///
    /// The assets may be given in either order.
    ///
    /// # Errors
    ///
    /// Returns [`PairError::InvalidToken`] if the assets are equal or zero.
    pub fn new(factory: Address, token_x: Address, token_y: Address) -> Result<Self, PairError> {
        let token_pair = TokenPair::new(token_x, token_y)?;
        let config = Self {
            factory,
            token_pair,
            address: Self::derive_address(&factory, &token_pair),
            name: DEFAULT_NAME.to_owned(),
            symbol: DEFAULT_SYMBOL.to_owned(),
            decimals: DEFAULT_DECIMALS,
            chain_id: 1,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a TOML document.
    ///
    /// ```toml
    /// factory = "0x0909…09"
    /// token_x = "0x0101…01"
    /// token_y = "0x0202…02"
    /// # optional
    /// name = "Pair Liquidity Share"
    /// symbol = "PAIR-LP"
    /// chain_id = 1
    /// ```
    ///
    /// # Errors
    ///
    /// - [`PairError::InvalidConfiguration`] if the document is malformed.
    /// - Any validation error from [`PairConfig::validate`].
    pub fn from_toml_str(source: &str) -> Result<Self, PairError> {
        let file: PairConfigFile =
            toml::from_str(source).map_err(|e| PairError::InvalidConfiguration(e.to_string()))?;

        let mut config = Self::new(file.factory, file.token_x, file.token_y)?;
        if let Some(address) = file.address {
            config.address = address;
        }
        if let Some(name) = file.name {
            config.name = name;
        }
        if let Some(symbol) = file.symbol {
            config.symbol = symbol;
        }
        if let Some(decimals) = file.decimals {
            config.decimals = decimals;
        }
        if let Some(chain_id) = file.chain_id {
            config.chain_id = chain_id;
        }
        config.validate()?;
        Ok(config)
    }

    /// Deterministic pair address for a registry and asset pair.
    #[must_use]
    pub fn derive_address(factory: &Address, token_pair: &TokenPair) -> Address {
        let mut hasher = Keccak256::new();
        hasher.update(factory.as_bytes());
        hasher.update(token_pair.token_a().as_bytes());
        hasher.update(token_pair.token_b().as_bytes());
        Address::from_bytes(hasher.finalize().into())
    }

    /// Overrides the pair address.
    ///
    /// # Errors
    ///
    /// See [`PairConfig::validate`].
    pub fn with_address(mut self, address: Address) -> Result<Self, PairError> {
        self.address = address;
        self.validate()?;
        Ok(self)
    }

    /// Overrides the share-token name and symbol.
    ///
    /// # Errors
    ///
    /// See [`PairConfig::validate`].
    pub fn with_share_metadata(
        mut self,
        name: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Result<Self, PairError> {
        self.name = name.into();
        self.symbol = symbol.into();
        self.validate()?;
        Ok(self)
    }

    /// Overrides the chain id used in the permit domain.
    #[must_use]
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PairError::InvalidConfiguration`] on the first violated rule.
    pub fn validate(&self) -> Result<(), PairError> {
        if self.address.is_zero() {
            return Err(PairError::InvalidConfiguration(
                "pair address must not be zero".to_owned(),
            ));
        }
        if self.token_pair.contains(&self.address) {
            return Err(PairError::InvalidConfiguration(
                "pair address collides with an asset".to_owned(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(PairError::InvalidConfiguration(
                "share name must not be empty".to_owned(),
            ));
        }
        if self.symbol.trim().is_empty() {
            return Err(PairError::InvalidConfiguration(
                "share symbol must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Registry that created the pair.
    #[must_use]
    pub const fn factory(&self) -> Address {
        self.factory
    }

    /// The canonically ordered asset pair.
    #[must_use]
    pub const fn token_pair(&self) -> &TokenPair {
        &self.token_pair
    }

    /// The pair's own address (holder of its reserves).
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Share-token name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Share-token symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Share-token decimals.
    #[must_use]
    pub const fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Chain id used in the permit domain.
    #[must_use]
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }
}
