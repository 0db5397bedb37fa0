//! API credentials held in memory for the lifetime of a gateway.
//!
//! Credentials arrive already decrypted from the caller (or from the
//! environment via [`crate::config`]). They are never written anywhere: the
//! secret lives in a [`Zeroizing`] buffer that is wiped on drop, and the
//! `Debug` impl redacts both key and secret so they cannot leak through
//! `tracing` fields.

use std::fmt;

use zeroize::Zeroizing;

use crate::{GatewayError, Result};

/// Immutable API credentials for one exchange account.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: Zeroizing<String>,
    passphrase: Option<Zeroizing<String>>,
    subaccount: Option<String>,
    testnet: bool,
}

impl Credentials {
    /// Creates credentials for the production environment.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the key or secret is blank.
    pub fn new(api_key: &str, api_secret: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(GatewayError::Config("API key is empty".to_string()));
        }
        if api_secret.trim().is_empty() {
            return Err(GatewayError::Config("API secret is empty".to_string()));
        }

        Ok(Self {
            api_key: api_key.trim().to_string(),
            api_secret: Zeroizing::new(api_secret.trim().to_string()),
            passphrase: None,
            subaccount: None,
            testnet: false,
        })
    }

    /// Targets the exchange's test environment.
    #[must_use]
    pub fn with_testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    /// Sets the passphrase some exchanges require alongside key and secret.
    #[must_use]
    pub fn with_passphrase(mut self, passphrase: &str) -> Self {
        self.passphrase = Some(Zeroizing::new(passphrase.to_string()));
        self
    }

    /// Sets the subaccount requests are made on behalf of.
    #[must_use]
    pub fn with_subaccount(mut self, subaccount: &str) -> Self {
        self.subaccount = Some(subaccount.to_string());
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref().map(String::as_str)
    }

    pub fn subaccount(&self) -> Option<&str> {
        self.subaccount.as_deref()
    }

    pub fn is_testnet(&self) -> bool {
        self.testnet
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked_key = if self.api_key.chars().count() > 4 {
            format!("{}****", self.api_key.chars().take(4).collect::<String>())
        } else {
            "****".to_string()
        };

        f.debug_struct("Credentials")
            .field("api_key", &masked_key)
            .field("api_secret", &"[REDACTED]")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "[REDACTED]"))
            .field("subaccount", &self.subaccount)
            .field("testnet", &self.testnet)
            .finish()
    }
}
