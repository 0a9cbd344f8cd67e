//! Fees owed to the relay for forwarding a transaction.
use crate::{FeeBreakdown, FeeEstimate, WalletError, WalletKind};
use tracing::debug;
use trustlines_core::types::{PendingTransaction, TransactionError, U256};

/// Computes delegation fees, dispatching on the wallet kind:
///
/// | kind | total fee |
/// |---|---|
/// | direct | `gasPrice * gasLimit` |
/// | identity | `gasPrice * gasLimit + baseFee` |
/// | smart wallet | `gasPrice * (baseGas + safeTxGas)` |
///
/// All arithmetic is checked 256-bit arithmetic; a fee that does not fit fails with
/// [`WalletError::NegativeOrOverflowFee`]. The identity `baseFee` is signed as a `uint64`
/// and fails the same way when it is wider.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeeDelegationCalculator;

impl FeeDelegationCalculator {
    /// Fills the fee fields of `tx` the caller left empty from the relay's `estimate`, and
    /// returns the resulting fees.
    pub fn apply_estimate(
        &self,
        kind: WalletKind,
        tx: &mut PendingTransaction,
        estimate: &FeeEstimate,
    ) -> Result<FeeBreakdown, WalletError> {
        tx.gas_price.get_or_insert(estimate.gas_price);
        match kind {
            WalletKind::Direct => {
                fill(&mut tx.gas_limit, estimate.gas_limit, "gasLimit")?;
            }
            WalletKind::Identity => {
                tx.base_fee.get_or_insert(estimate.base_fee);
                fill(&mut tx.gas_limit, estimate.gas_limit, "gasLimit")?;
                tx.fee_recipient.get_or_insert(estimate.fee_recipient);
                tx.fee_currency.get_or_insert(estimate.fee_currency);
            }
            WalletKind::SmartWallet => {
                fill(&mut tx.safe_tx_gas, estimate.safe_tx_gas, "safeTxGas")?;
                fill(&mut tx.base_gas, estimate.base_gas, "baseGas")?;
                tx.fee_recipient.get_or_insert(estimate.fee_recipient);
                tx.fee_currency.get_or_insert(estimate.fee_currency);
            }
        }
        let fees = self.breakdown(kind, tx)?;
        debug!(%kind, total_fee = %fees.total_fee, gas_price = %fees.gas_price, gas = %fees.gas, "computed delegation fees");
        Ok(fees)
    }

    /// The total fee of a transaction whose fee fields are populated
    pub fn total_fee(&self, kind: WalletKind, tx: &PendingTransaction) -> Result<U256, WalletError> {
        Ok(self.breakdown(kind, tx)?.total_fee)
    }

    /// The fee components of a transaction whose fee fields are populated
    pub fn breakdown(
        &self,
        kind: WalletKind,
        tx: &PendingTransaction,
    ) -> Result<FeeBreakdown, WalletError> {
        let gas_price = required(tx.gas_price, "gasPrice")?;
        let (base_fee, gas) = match kind {
            WalletKind::Direct => (U256::zero(), required(tx.gas_limit, "gasLimit")?),
            WalletKind::Identity => {
                let base_fee = required(tx.base_fee, "baseFee")?;
                if base_fee > U256::from(u64::MAX) {
                    return Err(WalletError::NegativeOrOverflowFee(format!(
                        "baseFee {base_fee} does not fit into 64 bits"
                    )))
                }
                (base_fee, required(tx.gas_limit, "gasLimit")?)
            }
            WalletKind::SmartWallet => {
                let base_gas = required(tx.base_gas, "baseGas")?;
                let safe_tx_gas = required(tx.safe_tx_gas, "safeTxGas")?;
                let gas = base_gas.checked_add(safe_tx_gas).ok_or_else(|| {
                    overflow(format!("baseGas {base_gas} + safeTxGas {safe_tx_gas}"))
                })?;
                (U256::zero(), gas)
            }
        };

        let total_fee = gas_price
            .checked_mul(gas)
            .ok_or_else(|| overflow(format!("gasPrice {gas_price} * gas {gas}")))?
            .checked_add(base_fee)
            .ok_or_else(|| overflow(format!("gas fee + baseFee {base_fee}")))?;

        let (fee_recipient, fee_currency) = if kind.is_meta() {
            (tx.fee_recipient, tx.fee_currency)
        } else {
            (None, None)
        };

        Ok(FeeBreakdown { base_fee, gas_price, gas, total_fee, fee_recipient, fee_currency })
    }
}

fn fill(
    field: &mut Option<U256>,
    estimate: Option<U256>,
    name: &'static str,
) -> Result<(), TransactionError> {
    if field.is_none() {
        *field = Some(estimate.ok_or(TransactionError::MissingField(name))?);
    }
    Ok(())
}

fn required(value: Option<U256>, field: &'static str) -> Result<U256, TransactionError> {
    value.ok_or(TransactionError::MissingField(field))
}

fn overflow(what: String) -> WalletError {
    WalletError::NegativeOrOverflowFee(format!("{what} does not fit into 256 bits"))
}
