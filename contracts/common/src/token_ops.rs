//! Identity Token Operations
//!
//! Name derivation and mint-map checks shared by the identity policies.

use crate::constants::labels;
use crate::errors::{StakeError, StakeResult};
use crate::tx::{TokenName, Transaction};
use crate::{BTreeMap, Vec};
use sha2::{Digest, Sha256};

/// One-shot token name: the SHA-256 digest of the first consumed input's
/// transaction id. That input can never be consumed again, so no second
/// transaction can ever derive — and therefore mint — the same name.
pub fn one_shot_token_name(tx: &Transaction) -> StakeResult<TokenName> {
    let first = tx.first_input()?;
    Ok(Sha256::digest(first.out_ref.tx_id).to_vec())
}

/// Reference token name: reference label prefix plus the position id.
pub fn reference_token_name(position_id: &[u8]) -> TokenName {
    let mut name = Vec::with_capacity(labels::REFERENCE.len() + position_id.len());
    name.extend_from_slice(&labels::REFERENCE);
    name.extend_from_slice(position_id);
    name
}

/// User token name: user label prefix plus the position id.
pub fn user_token_name(position_id: &[u8]) -> TokenName {
    let mut name = Vec::with_capacity(labels::USER.len() + position_id.len());
    name.extend_from_slice(&labels::USER);
    name.extend_from_slice(position_id);
    name
}

/// The policy's mint map must contain exactly one entry: `name` with
/// quantity one.
pub fn expect_sole_mint(minted: &BTreeMap<TokenName, i64>, name: &[u8]) -> StakeResult<()> {
    if minted.len() != 1 {
        return Err(StakeError::WrongMintEntryCount { expected: 1, actual: minted.len() });
    }
    expect_minted(minted, name, 1, "identity")
}

/// The named entry must be present with exactly the given signed quantity.
pub fn expect_minted(
    minted: &BTreeMap<TokenName, i64>,
    name: &[u8],
    expected: i64,
    token: &'static str,
) -> StakeResult<()> {
    match minted.get(name) {
        None => Err(StakeError::MintedNameNotFound { token }),
        Some(&quantity) if quantity == expected => Ok(()),
        Some(&quantity) => Err(StakeError::WrongMintQuantity { token, expected, actual: quantity }),
    }
}

/// Every quantity under the policy must be negative.
pub fn expect_all_burns(minted: &BTreeMap<TokenName, i64>) -> StakeResult<()> {
    for &quantity in minted.values() {
        if quantity >= 0 {
            return Err(StakeError::MustBurn { quantity });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{Address, MintValue, OutputRef, TxInput, TxOut, Value};

    fn tx_with_first_input(tx_id: [u8; 32]) -> Transaction {
        let mut tx = Transaction::new();
        tx.inputs.push(TxInput {
            out_ref: OutputRef::new(tx_id, 0),
            resolved: TxOut::new(Address::key(&[1u8; 28]), Value::new()),
        });
        tx
    }

    #[test]
    fn one_shot_name_is_deterministic_in_the_first_input() {
        let a = one_shot_token_name(&tx_with_first_input([1u8; 32])).unwrap();
        let b = one_shot_token_name(&tx_with_first_input([1u8; 32])).unwrap();
        let c = one_shot_token_name(&tx_with_first_input([2u8; 32])).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn one_shot_name_requires_an_input() {
        assert_eq!(
            one_shot_token_name(&Transaction::new()),
            Err(StakeError::NoInputs)
        );
    }

    #[test]
    fn position_names_carry_distinct_labels() {
        let id = [7u8; 28];
        let reference = reference_token_name(&id);
        let user = user_token_name(&id);
        assert_eq!(&reference[..4], [0x00, 0x06, 0x43, 0xb0]);
        assert_eq!(&user[..4], [0x00, 0x0d, 0xe1, 0x40]);
        assert_eq!(&reference[4..], &id[..]);
        assert_ne!(reference, user);
    }

    #[test]
    fn sole_mint_rejects_extra_entries() {
        let mint = MintValue::new()
            .with_entry(&[1u8; 28], b"wanted", 1)
            .with_entry(&[1u8; 28], b"stowaway", 1);
        let minted = mint.under_policy(&[1u8; 28]).unwrap();
        assert_eq!(
            expect_sole_mint(minted, b"wanted"),
            Err(StakeError::WrongMintEntryCount { expected: 1, actual: 2 })
        );
    }

    #[test]
    fn sole_mint_rejects_wrong_quantity() {
        let mint = MintValue::new().with_entry(&[1u8; 28], b"wanted", 2);
        let minted = mint.under_policy(&[1u8; 28]).unwrap();
        assert!(matches!(
            expect_sole_mint(minted, b"wanted"),
            Err(StakeError::WrongMintQuantity { expected: 1, actual: 2, .. })
        ));
    }

    #[test]
    fn burns_must_all_be_negative() {
        let mint = MintValue::new()
            .with_entry(&[1u8; 28], b"a", -1)
            .with_entry(&[1u8; 28], b"b", 1);
        let minted = mint.under_policy(&[1u8; 28]).unwrap();
        assert_eq!(expect_all_burns(minted), Err(StakeError::MustBurn { quantity: 1 }));
    }
}
