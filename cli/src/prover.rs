//! Prover Inputs
//!
//! Computes the targets a circuit prover needs for a burn or a mint and
//! packages them as JSON the node accepts once the proof bytes are filled in.

use anyhow::{Context, Result};
use serde::Serialize;
use shade_account::AccountId;
use shade_core::ledger::{BalanceShiftProof, CommitmentTransitionProof, ProofBundle};
use shade_privacy::{
    BalanceShiftInputs, CommitmentScheme, CommitmentTransitionInputs, FieldElement, PrivateState,
    burn_inputs, mint_inputs,
};

/// Private witness values; never sent to the node
#[derive(Debug, Serialize)]
pub struct Witness {
    pub secret: FieldElement,
    pub current_private: String,
    pub new_private: String,
}

#[derive(Debug, Serialize)]
pub struct BurnPackage {
    pub witness: Witness,
    pub inputs: BalanceShiftInputs,
    /// Request body template for `/burn`
    pub request: BurnTemplate,
}

#[derive(Debug, Serialize)]
pub struct BurnTemplate {
    pub account: AccountId,
    pub bundle: ProofBundle,
}

#[derive(Debug, Serialize)]
pub struct MintPackage {
    pub witness: Witness,
    pub balance_shift: BalanceShiftInputs,
    pub commitment_transition: CommitmentTransitionInputs,
    /// Request body template for `/mint`
    pub request: MintTemplate,
}

#[derive(Debug, Serialize)]
pub struct MintTemplate {
    pub account: AccountId,
    pub balance_shift: ProofBundle,
    pub commitment_transition: ProofBundle,
}

/// Arguments shared by `burn-input` and `mint-input`
pub struct ShiftArgs {
    pub state: PrivateState,
    pub amount: u128,
}

impl ShiftArgs {
    /// `<account> <secret> <private> <public> <amount>`
    pub fn parse(args: &[String]) -> Result<Self> {
        let [account, secret, private, public, amount] = args else {
            anyhow::bail!("expected <account> <secret> <private> <public> <amount>");
        };
        Ok(Self {
            state: PrivateState {
                account: account
                    .parse::<AccountId>()
                    .with_context(|| format!("invalid account id: {}", account))?,
                secret: parse_field("secret", secret)?,
                private_balance: parse_amount("private", private)?,
                public_balance: parse_amount("public", public)?,
            },
            amount: parse_amount("amount", amount)?,
        })
    }
}

pub fn parse_field(name: &str, value: &str) -> Result<FieldElement> {
    FieldElement::parse_literal(value).with_context(|| format!("invalid {}: {}", name, value))
}

pub fn parse_amount(name: &str, value: &str) -> Result<u128> {
    value
        .parse()
        .with_context(|| format!("{} must be a non-negative integer, got {}", name, value))
}

pub fn burn(args: &ShiftArgs) -> Result<BurnPackage> {
    let scheme = CommitmentScheme::new();
    let inputs = burn_inputs(&scheme, &args.state, args.amount)?;
    log::debug!("burn nullifier {}", inputs.nullifier);

    Ok(BurnPackage {
        witness: witness(&args.state, args.state.private_balance + args.amount),
        request: BurnTemplate {
            account: args.state.account,
            bundle: BalanceShiftProof::new(Vec::new(), &inputs).into(),
        },
        inputs,
    })
}

pub fn mint(args: &ShiftArgs) -> Result<MintPackage> {
    let scheme = CommitmentScheme::new();
    let (a, b) = mint_inputs(&scheme, &args.state, args.amount)?;
    log::debug!("mint nullifier {}", a.nullifier);

    Ok(MintPackage {
        witness: witness(&args.state, args.state.private_balance - args.amount),
        request: MintTemplate {
            account: args.state.account,
            balance_shift: BalanceShiftProof::new(Vec::new(), &a).into(),
            commitment_transition: CommitmentTransitionProof::new(Vec::new(), &b).into(),
        },
        balance_shift: a,
        commitment_transition: b,
    })
}

fn witness(state: &PrivateState, new_private: u128) -> Witness {
    Witness {
        secret: state.secret,
        current_private: state.private_balance.to_string(),
        new_private: new_private.to_string(),
    }
}

/// Random secret below 2^248, always a canonical field element
pub fn random_secret() -> Result<FieldElement> {
    let mut bytes = [0u8; 32];
    bytes[..31].copy_from_slice(&rand::random::<[u8; 31]>());
    Ok(FieldElement::from_le_bytes(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(private: &str, amount: &str) -> Vec<String> {
        [
            format!("0x{}", "01".repeat(32)),
            "99999".to_string(),
            private.to_string(),
            "100".to_string(),
            amount.to_string(),
        ]
        .to_vec()
    }

    #[test]
    fn burn_package_targets_grown_commitment() {
        let parsed = ShiftArgs::parse(&args("0", "40")).unwrap();
        let package = burn(&parsed).unwrap();

        let scheme = CommitmentScheme::new();
        assert_eq!(
            package.inputs.new_commitment,
            scheme.commit_balance(&FieldElement::from_u64(99999), 40)
        );
        assert_eq!(package.witness.new_private, "40");
    }

    #[test]
    fn mint_rejects_overdraw() {
        let parsed = ShiftArgs::parse(&args("10", "25")).unwrap();
        assert!(mint(&parsed).is_err());
    }

    #[test]
    fn wrong_argument_count_is_an_error() {
        assert!(ShiftArgs::parse(&args("0", "1")[..4]).is_err());
    }

    #[test]
    fn random_secrets_differ() {
        assert_ne!(random_secret().unwrap(), random_secret().unwrap());
    }
}
