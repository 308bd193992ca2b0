// Copyright (C) 2024-2026 MinePulse Developers (see AUTHORS)
//
// This file is part of MinePulse
//
// MinePulse is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// MinePulse is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// MinePulse. If not, see <https://www.gnu.org/licenses/>.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use sessionrpc::WalletCredential;
use thiserror::Error;
use tracing::debug;

/// 20 byte account address
const ADDRESS_BYTES: usize = 20;
/// r, s and recovery id of a personal-sign signature
const SIGNATURE_BYTES: usize = 65;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Invalid wallet address {0}")]
    InvalidAddress(String),
    #[error("Invalid signature returned by wallet: {0}")]
    InvalidSignature(String),
    #[error("Wallet refused to sign: {0}")]
    SigningFailed(String),
}

/// The wallet's personal message signing primitive
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// Returns the 0x prefixed hex signature over `message`
    async fn sign_message(&self, address: &str, message: &str) -> Result<String, CredentialError>;
}

pub fn challenge_message(address: &str, timestamp: i64) -> String {
    format!("MinePulse authentication\nAddress: {address}\nTimestamp: {timestamp}")
}

/// Decode a 0x prefixed hex string of exactly `expected_len` bytes
fn decode_prefixed_hex(value: &str, expected_len: usize) -> Option<Vec<u8>> {
    let bytes = hex::decode(value.strip_prefix("0x")?).ok()?;
    (bytes.len() == expected_len).then_some(bytes)
}

/// Have the wallet sign a fresh challenge and assemble the backend credential
pub async fn build_credential(
    signer: &dyn MessageSigner,
    address: &str,
    now: DateTime<Utc>,
) -> Result<WalletCredential, CredentialError> {
    if decode_prefixed_hex(address, ADDRESS_BYTES).is_none() {
        return Err(CredentialError::InvalidAddress(address.to_string()));
    }
    // Addresses are compared case-insensitively by the backend
    let address = address.to_lowercase();
    let message = challenge_message(&address, now.timestamp());

    let signature = signer.sign_message(&address, &message).await?;
    if decode_prefixed_hex(&signature, SIGNATURE_BYTES).is_none() {
        return Err(CredentialError::InvalidSignature(signature));
    }

    debug!("Built wallet credential for {}", address);
    Ok(WalletCredential {
        address,
        signature,
        message,
    })
}
