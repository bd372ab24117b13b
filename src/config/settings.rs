//! Runtime settings read from the process environment (after `.env` is loaded).

use std::path::PathBuf;
use std::str::FromStr;

use log::warn;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::chain::{RpcUrl, SafeUrlError};
use crate::core::base_types::{Address, AddressError};
use crate::registry::builtin::{BNW_CHAIN_ID, BSC_TESTNET_CHAIN_ID};
use crate::registry::{Chain, ChainRegistry, RegistryError};

pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("{var} has an invalid value {value:?}: {reason}")]
    InvalidValue { var: String, value: String, reason: String },

    #[error("Invalid RPC URL in {var}: {source}")]
    Url { var: String, source: SafeUrlError },

    #[error("Invalid router address in {var}: {source}")]
    Router { var: String, source: AddressError },

    #[error("Chain table: {0}")]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Replaces the chain table's endpoints when set; tried in order
    pub bsc_testnet_rpc: Option<Vec<RpcUrl>>,
    pub bnw_rpc: Option<Vec<RpcUrl>>,
    pub bsc_testnet_router: Option<Address>,
    pub bnw_router: Option<Address>,
    /// Native-asset relay fee sent with each swap
    pub fee_value: Decimal,
    pub rpc_timeout_secs: u64,
    pub confirmation_timeout_secs: u64,
    pub poll_interval_secs: f64,
    /// TOML chain table replacing the built-in one
    pub chain_registry: Option<PathBuf>,
}

impl Settings {
    /// Reads every setting from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as `from_env`, with `lookup` standing in for the environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let poll_interval_secs = parsed("RECEIPT_POLL_INTERVAL_SECS", get("RECEIPT_POLL_INTERVAL_SECS"), 2.0_f64)?;
        if !poll_interval_secs.is_finite() || poll_interval_secs <= 0.0 {
            return Err(SettingsError::InvalidValue {
                var: "RECEIPT_POLL_INTERVAL_SECS".to_string(),
                value: poll_interval_secs.to_string(),
                reason: "must be a positive number of seconds".to_string(),
            });
        }

        Ok(Self {
            bsc_testnet_rpc: rpc_list("BSC_TESTNET_RPC", get("BSC_TESTNET_RPC"), get("BSC_TESTNET_RPC_API_KEY"))?,
            bnw_rpc: rpc_list("BNW_RPC", get("BNW_RPC"), get("BNW_RPC_API_KEY"))?,
            bsc_testnet_router: router("BSC_TESTNET_ROUTER", get("BSC_TESTNET_ROUTER"))?,
            bnw_router: router("BNW_ROUTER", get("BNW_ROUTER"))?,
            fee_value: parsed("SWAP_FEE_VALUE", get("SWAP_FEE_VALUE"), Decimal::new(1, 2))?,
            rpc_timeout_secs: parsed("RPC_TIMEOUT_SECS", get("RPC_TIMEOUT_SECS"), 30)?,
            confirmation_timeout_secs: parsed("CONFIRMATION_TIMEOUT_SECS", get("CONFIRMATION_TIMEOUT_SECS"), 120)?,
            poll_interval_secs,
            chain_registry: get("CHAIN_REGISTRY").map(PathBuf::from),
        })
    }

    /// Endpoints for `chain`: the env override for the built-in ids, else the chain table's list.
    pub fn rpc_urls(&self, chain: &Chain) -> Result<Vec<RpcUrl>, SettingsError> {
        let overridden = match chain.id {
            BSC_TESTNET_CHAIN_ID => self.bsc_testnet_rpc.as_ref(),
            BNW_CHAIN_ID => self.bnw_rpc.as_ref(),
            _ => None,
        };
        if let Some(urls) = overridden {
            return Ok(urls.clone());
        }
        chain
            .rpc_urls
            .iter()
            .map(|url| {
                RpcUrl::public(url).map_err(|source| SettingsError::Url {
                    var: format!("rpc of chain {}", chain.id),
                    source,
                })
            })
            .collect()
    }

    /// The TOML table when `CHAIN_REGISTRY` is set, the built-in pair otherwise.
    ///
    /// Unset routers become the zero address; such a chain can be browsed but not swapped from.
    pub fn registry(&self) -> Result<ChainRegistry, SettingsError> {
        if let Some(path) = &self.chain_registry {
            return Ok(ChainRegistry::from_toml_file(path)?);
        }
        let bsc_router = self.bsc_testnet_router.unwrap_or_else(|| {
            warn!("BSC_TESTNET_ROUTER is not set; swaps from BSC Testnet are disabled");
            Address::ZERO
        });
        let bnw_router = self.bnw_router.unwrap_or_else(|| {
            warn!("BNW_ROUTER is not set; swaps from BNW Chain are disabled");
            Address::ZERO
        });
        Ok(ChainRegistry::builtin(bsc_router, bnw_router)?)
    }
}

/// Comma-separated endpoint list. Entries with a `{}` placeholder take the key from `{var}_API_KEY`.
fn rpc_list(var: &str, value: Option<String>, api_key: Option<String>) -> Result<Option<Vec<RpcUrl>>, SettingsError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let urls = raw
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(|url| {
            let parsed = match (&api_key, url.contains("{}")) {
                (Some(key), true) => RpcUrl::new(url, key),
                (None, true) => {
                    return Err(SettingsError::InvalidValue {
                        var: var.to_string(),
                        value: url.to_string(),
                        reason: format!("placeholder needs {}_API_KEY", var),
                    })
                }
                (_, false) => RpcUrl::public(url),
            };
            parsed.map_err(|source| SettingsError::Url {
                var: var.to_string(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if urls.is_empty() {
        return Err(SettingsError::InvalidValue {
            var: var.to_string(),
            value: raw.clone(),
            reason: "no endpoints listed".to_string(),
        });
    }
    Ok(Some(urls))
}

fn router(var: &str, value: Option<String>) -> Result<Option<Address>, SettingsError> {
    value
        .map(|v| {
            Address::from_string(&v).map_err(|source| SettingsError::Router {
                var: var.to_string(),
                source,
            })
        })
        .transpose()
}

fn parsed<T>(var: &str, value: Option<String>, default: T) -> Result<T, SettingsError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| SettingsError::InvalidValue {
            var: var.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
