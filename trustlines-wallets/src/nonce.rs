//! Nonce sources for transactions and meta-transactions.
use crate::{relay::Relay, WalletError};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Mutex};
use tracing::debug;
use trustlines_core::types::{Address, U256};

/// How a wallet picks the nonce of its next transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonceMechanism {
    /// The next value of the account's counter, as reported by the relay
    #[default]
    Counting,
    /// A fresh random value from `[2^255 + 1, 2^256)`
    Random,
}

impl FromStr for NonceMechanism {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counting" => Ok(NonceMechanism::Counting),
            "random" => Ok(NonceMechanism::Random),
            other => Err(WalletError::UnknownNonceMechanism(other.to_owned())),
        }
    }
}

impl fmt::Display for NonceMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NonceMechanism::Counting => f.write_str("counting"),
            NonceMechanism::Random => f.write_str("random"),
        }
    }
}

/// A cryptographically secure random source that can be moved between threads
pub trait SecureRng: RngCore + CryptoRng + Send {}

impl<T: RngCore + CryptoRng + Send> SecureRng for T {}

/// Produces nonces under one [`NonceMechanism`].
///
/// Counting nonces are fetched fresh from the relay on every call, since confirmed
/// transactions move the counter outside of this process. Callers must serialize
/// `prepare`/`confirm` pairs of one account, no locking is done here. Random nonces need
/// no coordination; the random source is injected rather than taken from global state.
pub enum NonceStrategy {
    Counting,
    Random(Mutex<Box<dyn SecureRng>>),
}

impl NonceStrategy {
    /// A random nonce strategy drawing from `rng`
    pub fn random(rng: impl SecureRng + 'static) -> Self {
        NonceStrategy::Random(Mutex::new(Box::new(rng)))
    }

    /// The strategy for `mechanism`, using the operating system's random source for
    /// random nonces
    pub fn from_mechanism(mechanism: NonceMechanism) -> Self {
        match mechanism {
            NonceMechanism::Counting => NonceStrategy::Counting,
            NonceMechanism::Random => NonceStrategy::random(rand::rngs::OsRng),
        }
    }

    pub fn mechanism(&self) -> NonceMechanism {
        match self {
            NonceStrategy::Counting => NonceMechanism::Counting,
            NonceStrategy::Random(_) => NonceMechanism::Random,
        }
    }

    /// Returns the nonce for the next transaction of `account`
    pub async fn next_nonce<R: Relay>(
        &self,
        relay: &R,
        account: Address,
    ) -> Result<U256, WalletError> {
        let nonce = match self {
            NonceStrategy::Counting => relay.get_nonce(account).await?,
            NonceStrategy::Random(rng) => {
                // a poisoned lock still holds a usable generator
                let mut rng = rng.lock().unwrap_or_else(|e| e.into_inner());
                random_nonce(&mut **rng)
            }
        };
        debug!(?account, mechanism = %self.mechanism(), %nonce, "picked nonce");
        Ok(nonce)
    }
}

impl fmt::Debug for NonceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NonceStrategy({})", self.mechanism())
    }
}

/// Samples a nonce uniformly from `[2^255 + 1, 2^256)`.
///
/// The top bit is forced and the remaining 255 bits are drawn at random, which is
/// uniform over `[2^255, 2^256)`; the single value `2^255` is rejected and drawn again.
pub fn random_nonce<R: RngCore + ?Sized>(rng: &mut R) -> U256 {
    let lower_bound = U256::one() << 255;
    loop {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        bytes[0] |= 0x80;
        let nonce = U256::from_big_endian(&bytes);
        if nonce != lower_bound {
            return nonce
        }
    }
}
