//! Client configuration
//!
//! Kept as `config.json` in the data directory and created with defaults on
//! first use. Defaults target a local development chain.

use crate::storage::persistence::{load_json, save_json, StorageError};
use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "config.json";

/// Local development chain id
pub const DEV_CHAIN_ID: u64 = 31337;

/// Pool server of the local development environment
pub const DEV_POOL_SERVER: &str = "http://localhost:49832/";

/// First block the vault's withdrawal events can appear in
pub const DEFAULT_EVENTS_FROM_BLOCK: u64 = 1416542;

/// Deployed contract addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAddresses {
    pub multisig: Address,
    pub operator_delegator: Address,
    pub delegation_manager: Address,
    pub restake_manager: Address,
    pub steth: Address,
    pub yeth: Address,
}

impl Default for ContractAddresses {
    fn default() -> Self {
        Self {
            multisig: address!("56d13eb21a625eda8438f55df2c31dc3632034f5"),
            operator_delegator: address!("e70f935c32da4db13e7876795f1e175465e6458e"),
            delegation_manager: address!("a44151489861fe9e3055d95adc98fbd462b948e7"),
            restake_manager: address!("e8addd62fed354203d079926a8e563bc1a7fe81e"),
            steth: address!("3f1c547b21f65e10480de3ad8e19faac46c95034"),
            yeth: address!("071586ba1b380b00b793cc336fe01106b0bfbe6d"),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub contracts: ContractAddresses,
    pub events_from_block: u64,
    /// Pool server URL per chain id
    pub pool_servers: BTreeMap<u64, String>,
    pub default_pool_server: String,
    pub poll_interval_ms: u64,
    pub sign_timeout_ms: u64,
    pub receipt_poll_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut pool_servers = BTreeMap::new();
        pool_servers.insert(DEV_CHAIN_ID, DEV_POOL_SERVER.to_string());

        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: DEV_CHAIN_ID,
            contracts: ContractAddresses::default(),
            events_from_block: DEFAULT_EVENTS_FROM_BLOCK,
            pool_servers,
            default_pool_server: DEV_POOL_SERVER.to_string(),
            poll_interval_ms: 4_000,
            sign_timeout_ms: 120_000,
            receipt_poll_ms: 1_000,
        }
    }
}

impl AppConfig {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Load the configuration, writing the defaults if there is none yet
    pub fn load_or_create(data_dir: &Path) -> Result<Self, StorageError> {
        let path = Self::path(data_dir);
        let config = match load_json::<AppConfig>(&path)? {
            Some(config) => config,
            None => {
                let config = AppConfig::default();
                save_json(&config, &path)?;
                log::info!("Wrote default configuration to {}", path.display());
                config
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), StorageError> {
        save_json(self, &Self::path(data_dir))
    }

    pub fn validate(&self) -> Result<(), StorageError> {
        if self.rpc_url.trim().is_empty() {
            return Err(StorageError::InvalidData("rpcUrl is empty".to_string()));
        }
        if self.poll_interval_ms == 0 || self.receipt_poll_ms == 0 {
            return Err(StorageError::InvalidData(
                "poll intervals must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Pool server for `chain_id`, falling back to the default
    pub fn pool_server_url(&self, chain_id: u64) -> &str {
        self.pool_servers
            .get(&chain_id)
            .map(String::as_str)
            .unwrap_or(&self.default_pool_server)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// `None` when signing should wait indefinitely
    pub fn sign_timeout(&self) -> Option<Duration> {
        (self.sign_timeout_ms > 0).then(|| Duration::from_millis(self.sign_timeout_ms))
    }

    pub fn receipt_poll(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }
}
