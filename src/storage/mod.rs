//! Storage module for local client state

pub mod config;
pub mod draft;
pub mod persistence;

pub use config::{AppConfig, ContractAddresses, DEV_CHAIN_ID, DEV_POOL_SERVER};
pub use draft::DraftStore;
pub use persistence::{default_data_dir, load_json, save_json, StorageError};
