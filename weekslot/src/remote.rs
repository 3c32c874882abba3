//! Narrow interface to the cluster.

use solana_sdk::account::Account;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::signer::keypair::Keypair;

use crate::Result;

/// Operations the workflow needs from the cluster.
///
/// Every method is a single request passed straight to the transport.
/// Implementations must not retry nor cache; timeouts are whatever the
/// transport imposes.
pub trait Remote {
    /// Checks the connection and returns the cluster’s version.
    ///
    /// Fails with [`crate::Error::Connection`] if the cluster cannot be
    /// reached.
    fn version(&self) -> Result<String>;

    /// Returns balance of the account in lamports.
    fn get_balance(&self, address: &Pubkey) -> Result<u64>;

    /// Requests `lamports` to be airdropped to the account.
    fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<Signature>;

    /// Blocks until the transaction is confirmed.
    ///
    /// Fails with [`crate::Error::ConfirmationTimeout`] if it isn’t.
    fn confirm(&self, signature: &Signature) -> Result;

    /// Returns minimum balance an account of given size needs to be exempt
    /// from rent.
    fn minimum_balance_for_rent_exemption(&self, len: usize) -> Result<u64>;

    /// Returns fee for a transaction with a single signature paid by `payer`.
    fn signature_fee(&self, payer: &Pubkey) -> Result<u64>;

    /// Fetches the account or returns `None` if it doesn’t exist.
    fn get_account(&self, address: &Pubkey) -> Result<Option<Account>>;

    /// Sends a transaction with given instructions signed and paid for by
    /// `signer` and blocks until it’s confirmed.
    ///
    /// Fails with [`crate::Error::Submission`] if the transaction is rejected.
    fn submit(&self, instructions: &[Instruction], signer: &Keypair) -> Result<Signature>;

    /// Fetches data of the account or returns `None` if it doesn’t exist.
    fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        self.get_account(address).map(|acc| acc.map(|acc| acc.data))
    }

    /// Derives address of an account owned by `owner` from `base` and `seed`.
    ///
    /// This is the same derivation the system program performs for
    /// `CreateAccountWithSeed` so the result is a pure function of the
    /// arguments.
    fn derive_address(&self, base: &Pubkey, seed: &str, owner: &Pubkey) -> Result<Pubkey> {
        Ok(Pubkey::create_with_seed(base, seed, owner)?)
    }
}

impl<R: Remote + ?Sized> Remote for &R {
    fn version(&self) -> Result<String> { (**self).version() }

    fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        (**self).get_balance(address)
    }

    fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<Signature> {
        (**self).request_airdrop(address, lamports)
    }

    fn confirm(&self, signature: &Signature) -> Result {
        (**self).confirm(signature)
    }

    fn minimum_balance_for_rent_exemption(&self, len: usize) -> Result<u64> {
        (**self).minimum_balance_for_rent_exemption(len)
    }

    fn signature_fee(&self, payer: &Pubkey) -> Result<u64> {
        (**self).signature_fee(payer)
    }

    fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        (**self).get_account(address)
    }

    fn submit(&self, instructions: &[Instruction], signer: &Keypair) -> Result<Signature> {
        (**self).submit(instructions, signer)
    }

    fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        (**self).get_account_data(address)
    }

    fn derive_address(&self, base: &Pubkey, seed: &str, owner: &Pubkey) -> Result<Pubkey> {
        (**self).derive_address(base, seed, owner)
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Remote which cannot do anything but derive addresses.
    struct Offline;

    impl Remote for Offline {
        fn version(&self) -> Result<String> { unimplemented!() }
        fn get_balance(&self, _: &Pubkey) -> Result<u64> { unimplemented!() }
        fn request_airdrop(&self, _: &Pubkey, _: u64) -> Result<Signature> {
            unimplemented!()
        }
        fn confirm(&self, _: &Signature) -> Result { unimplemented!() }
        fn minimum_balance_for_rent_exemption(&self, _: usize) -> Result<u64> {
            unimplemented!()
        }
        fn signature_fee(&self, _: &Pubkey) -> Result<u64> { unimplemented!() }
        fn get_account(&self, _: &Pubkey) -> Result<Option<Account>> {
            unimplemented!()
        }
        fn submit(&self, _: &[Instruction], _: &Keypair) -> Result<Signature> {
            unimplemented!()
        }
    }

    #[test]
    fn test_derive_address() {
        let payer = Pubkey::new_unique();
        let program = Pubkey::new_unique();

        let first = Offline.derive_address(&payer, "hello", &program).unwrap();
        let second = Offline.derive_address(&payer, "hello", &program).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            Pubkey::create_with_seed(&payer, "hello", &program).unwrap(),
            first
        );

        let other = Offline.derive_address(&payer, "world", &program).unwrap();
        assert_ne!(first, other);
        let other = Offline.derive_address(&program, "hello", &payer).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_derive_address_long_seed() {
        let payer = Pubkey::new_unique();
        let program = Pubkey::new_unique();
        let seed = "x".repeat(33);
        let got = (&Offline).derive_address(&payer, &seed, &program);
        assert!(matches!(got, Err(crate::Error::Address(_))), "{got:?}");
    }
}
