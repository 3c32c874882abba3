//! [`Remote`] implementation talking to a cluster over JSON RPC.

use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::rpc_request::RpcError;
use solana_client::rpc_client::RpcClient;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Signature, Signer};
use solana_sdk::signer::keypair::Keypair;
use solana_sdk::transaction::Transaction;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::UiTransactionEncoding;

use crate::remote::Remote;
use crate::{Error, Result};

/// Remote account client backed by a blocking [`RpcClient`].
pub struct RpcRemote {
    client: RpcClient,
}

impl RpcRemote {
    /// Creates a client for the cluster at `url` and performs the version
    /// handshake.
    ///
    /// Returns the client together with the cluster’s version.
    pub fn connect(
        url: impl Into<String>,
        commitment: CommitmentConfig,
    ) -> Result<(Self, String)> {
        let this = Self::new(url, commitment);
        let version = this.version()?;
        Ok((this, version))
    }

    /// Creates a client without contacting the cluster.
    pub fn new(url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self { client: RpcClient::new_with_commitment(url.into(), commitment) }
    }

    /// Returns the underlying RPC client.
    pub fn client(&self) -> &RpcClient { &self.client }

    /// Fetches log messages of a confirmed transaction.
    pub fn transaction_logs(&self, signature: &Signature) -> Result<Vec<String>> {
        let encoding = UiTransactionEncoding::Binary;
        let resp = self.client.get_transaction(signature, encoding)?;
        let (slot, tx) = (resp.slot, resp.transaction);
        log::debug!("Executed in slot: {slot}");
        let log_messages = tx
            .meta
            .map(|meta| meta.log_messages)
            .ok_or_else(|| Error::Remote("No transaction metadata".into()))?;
        match log_messages {
            OptionSerializer::Some(messages) => Ok(messages),
            _ => Err(Error::Remote("No log message".into())),
        }
    }
}

impl Remote for RpcRemote {
    fn version(&self) -> Result<String> {
        self.client
            .get_version()
            .map(|version| version.solana_core)
            .map_err(|err| Error::Connection(Box::new(err)))
    }

    fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        Ok(self.client.get_balance(address)?)
    }

    fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<Signature> {
        Ok(self.client.request_airdrop(address, lamports)?)
    }

    /// Polls until the transaction is seen and then checks its status.
    ///
    /// Polling which gives up yields [`Error::ConfirmationTimeout`].  A
    /// transaction which landed but failed yields [`Error::Submission`].  Any
    /// other RPC failure is [`Error::Remote`].
    fn confirm(&self, signature: &Signature) -> Result {
        self.client
            .poll_for_signature(signature)
            .map_err(|err| confirm_error(signature, err))?;
        let commitment = self.client.commitment();
        match self.client.get_signature_status_with_commitment(signature, commitment)? {
            Some(Err(err)) => Err(Error::Submission(Box::new(err))),
            Some(Ok(())) => Ok(()),
            None => Err(Error::ConfirmationTimeout(*signature)),
        }
    }

    fn minimum_balance_for_rent_exemption(&self, len: usize) -> Result<u64> {
        Ok(self.client.get_minimum_balance_for_rent_exemption(len)?)
    }

    fn signature_fee(&self, payer: &Pubkey) -> Result<u64> {
        let blockhash = self.client.get_latest_blockhash()?;
        let message = Message::new_with_blockhash(&[], Some(payer), &blockhash);
        Ok(self.client.get_fee_for_message(&message)?)
    }

    fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        let commitment = self.client.commitment();
        Ok(self.client.get_account_with_commitment(address, commitment)?.value)
    }

    fn submit(&self, instructions: &[Instruction], signer: &Keypair) -> Result<Signature> {
        let blockhash = self.client.get_latest_blockhash()?;
        log::debug!("Latest blockhash: {blockhash}");

        let message = Message::new_with_blockhash(
            instructions,
            Some(&signer.pubkey()),
            &blockhash,
        );
        let mut tx = Transaction::new_unsigned(message);
        tx.try_sign(&[signer], blockhash)
            .map_err(|err| Error::Submission(Box::new(err)))?;

        let sig = self
            .client
            .send_and_confirm_transaction(&tx)
            .map_err(|err| Error::Submission(Box::new(err)))?;
        log::info!("Signature: {sig}");

        match self.transaction_logs(&sig) {
            Ok(messages) => {
                for msg in messages {
                    log::debug!("{msg}");
                }
            }
            Err(err) => log::warn!("{sig}: cannot fetch logs: {err}"),
        }
        Ok(sig)
    }
}

/// Classifies error returned when polling for a transaction.
///
/// The RPC client reports polling giving up as a user-facing RPC error.
fn confirm_error(signature: &Signature, err: ClientError) -> Error {
    log::debug!("{signature}: {err}");
    let kind = err.kind();
    if matches!(kind, ClientErrorKind::RpcError(RpcError::ForUser(_))) {
        Error::ConfirmationTimeout(*signature)
    } else if matches!(kind, ClientErrorKind::TransactionError(_)) {
        Error::Submission(Box::new(err))
    } else {
        Error::from(err)
    }
}

impl From<ClientError> for Error {
    fn from(err: ClientError) -> Self { Self::Remote(Box::new(err)) }
}
