//! Wallet-scannable QR payloads. The formats are consumed verbatim by
//! external wallet apps, so they are bit-exact contracts, not display text.

use crate::domain::asset::Chain;

/// Payload for a deposit of `amount` to `address` on `chain`.
///
/// UTXO chains use the BIP-21 shape `scheme:address?amount=`; EVM chains use
/// the ERC-681 shape `ethereum:address[@chainId]?value=`, with the chain id
/// omitted on Ethereum's own L1. Chains without a URI convention fall back
/// to the bare address and the GUI shows the amount separately.
pub fn payload(chain: Chain, address: &str, amount: &str) -> String {
    match chain {
        Chain::Btc => utxo("bitcoin", address, amount),
        Chain::Ltc => utxo("litecoin", address, amount),
        Chain::Bch => utxo("bitcoincash", address, amount),
        Chain::Doge => utxo("dogecoin", address, amount),
        Chain::Eth => evm(None, address, amount),
        Chain::Bsc => evm(Some(56), address, amount),
        Chain::Base => evm(Some(8453), address, amount),
        Chain::Avax => evm(Some(43114), address, amount),
        Chain::Gaia | Chain::Thor => address.to_string(),
    }
}

fn utxo(scheme: &str, address: &str, amount: &str) -> String {
    format!("{scheme}:{address}?amount={amount}")
}

fn evm(chain_id: Option<u64>, address: &str, amount: &str) -> String {
    match chain_id {
        Some(id) => format!("ethereum:{address}@{id}?value={amount}"),
        None => format!("ethereum:{address}?value={amount}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utxo_payloads() {
        assert_eq!(
            payload(Chain::Btc, "bc1qxyz", "1.00000003"),
            "bitcoin:bc1qxyz?amount=1.00000003"
        );
        assert_eq!(
            payload(Chain::Ltc, "ltc1qabc", "0.50000042"),
            "litecoin:ltc1qabc?amount=0.50000042"
        );
        assert_eq!(
            payload(Chain::Doge, "D6abc", "10.00000007"),
            "dogecoin:D6abc?amount=10.00000007"
        );
    }

    #[test]
    fn test_evm_payloads() {
        assert_eq!(
            payload(Chain::Eth, "0xabc", "1.000000000000000003"),
            "ethereum:0xabc?value=1.000000000000000003"
        );
        assert_eq!(
            payload(Chain::Bsc, "0xabc", "2.000000000000000003"),
            "ethereum:0xabc@56?value=2.000000000000000003"
        );
        assert_eq!(
            payload(Chain::Base, "0xabc", "2.000000000000000003"),
            "ethereum:0xabc@8453?value=2.000000000000000003"
        );
    }

    #[test]
    fn test_plain_fallback() {
        assert_eq!(payload(Chain::Gaia, "cosmos1xyz", "1.000042"), "cosmos1xyz");
    }
}
