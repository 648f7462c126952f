//! Configuration types for the SwapLock engine.

use std::path::Path;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{Result, SwaplockError};

/// Persistent singleton configuration of an initialized engine.
///
/// Lives inside the engine state and is handed by reference to every
/// operation that reads it. Only the administration module mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Current external venue. Zero means "unset": every swap locks.
    pub venue: Address,
    /// Sole identity allowed to change the venue or sweep retained funds.
    pub administrator: Address,
}

impl ExchangeConfig {
    /// Whether a venue has been configured.
    #[must_use]
    pub fn has_venue(&self) -> bool {
        !self.venue.is_zero()
    }

    /// Whether `caller` is the administrator.
    #[must_use]
    pub fn is_administrator(&self, caller: Address) -> bool {
        caller == self.administrator
    }
}

/// Deployment-time configuration, typically read from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The engine's own custody address on the token ledger.
    pub engine_address: Address,
    /// Identity of the deployer performing initialization.
    pub deployer: Address,
    /// Administrator established at initialization.
    pub administrator: Address,
    /// Initial venue. Absent means the venue is set later by the administrator.
    #[serde(default)]
    pub venue: Option<Address>,
}

impl EngineConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    /// Returns [`SwaplockError::Serialization`] for bad JSON and
    /// [`SwaplockError::Configuration`] for invalid values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON configuration file.
    ///
    /// # Errors
    /// Returns [`SwaplockError::Io`] if the file cannot be read, otherwise
    /// as [`EngineConfig::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that the addresses are usable.
    ///
    /// # Errors
    /// Returns [`SwaplockError::Configuration`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.engine_address.is_zero() {
            return Err(SwaplockError::Configuration(
                "engine_address must not be the zero address".into(),
            ));
        }
        if self.administrator.is_zero() {
            return Err(SwaplockError::Configuration(
                "administrator must not be the zero address".into(),
            ));
        }
        if self.administrator == self.engine_address {
            return Err(SwaplockError::Configuration(
                "administrator must differ from engine_address".into(),
            ));
        }
        Ok(())
    }

    /// The initial venue, or zero when none is configured.
    #[must_use]
    pub fn initial_venue(&self) -> Address {
        self.venue.unwrap_or(Address::ZERO)
    }
}
