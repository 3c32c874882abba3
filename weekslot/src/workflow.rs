//! Sequencing of a single update session.
//!
//! A run goes through the following stages, each made of blocking calls
//! into the [`Remote`]:
//!
//! 1. connect: version handshake with the cluster,
//! 2. fund: make sure the payer can cover rent and fees, requesting an
//!    airdrop if it can’t,
//! 3. resolve: check the program and derive the week slot account,
//! 4. update: send the [`UpdateCommand`] to the program,
//! 5. report: read the week slot account back and decode it.
//!
//! Any failure aborts the run; nothing is retried.

use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Signature, Signer};
use solana_sdk::signer::keypair::Keypair;

use crate::instruction::UpdateCommand;
use crate::record::WeekSlot;
use crate::remote::Remote;
use crate::{Error, Result};

/// Seed used to derive the week slot account by default.
pub const DEFAULT_SEED: &str = "hello";

/// Policy deciding how many lamports the payer needs before a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeePolicy {
    /// Number of single-signature transaction fees to keep on top of the
    /// rent-exempt minimum of the week slot account.
    pub signature_margin: u64,
}

impl Default for FeePolicy {
    fn default() -> Self { Self { signature_margin: 100 } }
}

impl FeePolicy {
    /// Returns lamports the payer is required to hold.
    pub fn required(&self, rent: u64, signature_fee: u64) -> u64 {
        signature_fee.saturating_mul(self.signature_margin).saturating_add(rent)
    }
}

/// Parameters of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Address of the week slot program.
    pub program_id: Pubkey,
    /// Seed the week slot account address is derived from.
    pub seed: String,
    /// Update to send to the program.
    pub command: UpdateCommand,
    /// Policy deciding how many lamports the payer must hold.
    pub fees: FeePolicy,
    /// Whether to create the week slot account if it doesn’t exist.
    pub create_account: bool,
}

impl Config {
    /// Returns configuration which sends `command` to `program_id` with
    /// default seed and fee policy.
    pub fn new(program_id: Pubkey, command: UpdateCommand) -> Self {
        Self {
            program_id,
            seed: DEFAULT_SEED.into(),
            command,
            fees: FeePolicy::default(),
            create_account: false,
        }
    }
}

/// Addresses resolved for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub program_id: Pubkey,
    pub weekslot: Pubkey,
}

/// Context threaded through the stages of a run.
pub struct Session<'a, R> {
    remote: R,
    payer: &'a Keypair,
    config: &'a Config,
}

impl<'a, R: Remote> Session<'a, R> {
    pub fn new(remote: R, payer: &'a Keypair, config: &'a Config) -> Self {
        Self { remote, payer, config }
    }

    /// Checks the connection with the cluster.
    pub fn connect(&self) -> Result<String> {
        let version = self.remote.version()?;
        log::info!("Connection to cluster established, version {version}");
        Ok(version)
    }

    /// Makes sure the payer can cover rent of the week slot account and
    /// transaction fees.  Returns the payer’s balance.
    ///
    /// If the balance is too low, requests an airdrop of the difference and
    /// checks the balance again.  Whether the airdrop was enough is not
    /// verified beyond a warning; an underfunded payer fails later when
    /// submitting.
    pub fn fund(&self) -> Result<u64> {
        let payer = self.payer.pubkey();
        let rent =
            self.remote.minimum_balance_for_rent_exemption(WeekSlot::SIZE)?;
        let fee = self.remote.signature_fee(&payer)?;
        let required = self.config.fees.required(rent, fee);

        let mut lamports = self.remote.get_balance(&payer)?;
        if lamports < required {
            let amount = required - lamports;
            log::info!("Requesting airdrop of {amount} lamports to {payer}…");
            let sig = self.remote.request_airdrop(&payer, amount)?;
            self.remote.confirm(&sig)?;
            lamports = self.remote.get_balance(&payer)?;
            if lamports < required {
                log::warn!(
                    "{payer} holds {lamports} lamports after airdrop; \
                     {required} required"
                );
            }
        }

        log::info!(
            "Using account {payer} containing {} SOL to pay for fees",
            lamports as f64 / LAMPORTS_PER_SOL as f64
        );
        Ok(lamports)
    }

    /// Checks that the program is deployed and derives address of the week
    /// slot account.
    ///
    /// If [`Config::create_account`] is set and the account doesn’t exist,
    /// creates it.
    pub fn resolve(&self) -> Result<Resolved> {
        let program_id = self.config.program_id;
        match self.remote.get_account(&program_id)? {
            None => return Err(Error::ProgramNotDeployed(program_id)),
            Some(acc) if !acc.executable => {
                return Err(Error::ProgramNotExecutable(program_id))
            }
            Some(_) => (),
        }
        log::info!("Using program {program_id}");

        let payer = self.payer.pubkey();
        let seed = self.config.seed.as_str();
        let weekslot = self.remote.derive_address(&payer, seed, &program_id)?;
        log::debug!("Week slot account: {weekslot}");

        if self.config.create_account &&
            self.remote.get_account(&weekslot)?.is_none()
        {
            self.create_account(seed, weekslot, program_id)?;
        }

        Ok(Resolved { program_id, weekslot })
    }

    /// Creates a rent-exempt week slot account owned by the program.
    fn create_account(
        &self,
        seed: &str,
        weekslot: Pubkey,
        program_id: Pubkey,
    ) -> Result<Signature> {
        log::info!("Creating week slot account {weekslot}…");
        let payer = self.payer.pubkey();
        let lamports =
            self.remote.minimum_balance_for_rent_exemption(WeekSlot::SIZE)?;
        let instruction =
            solana_system_interface::instruction::create_account_with_seed(
                &payer,
                &weekslot,
                &payer,
                seed,
                lamports,
                WeekSlot::SIZE as u64,
                &program_id,
            );
        self.remote.submit(core::slice::from_ref(&instruction), self.payer)
    }

    /// Sends the configured update to the week slot account.
    pub fn update(&self, resolved: &Resolved) -> Result<Signature> {
        let command = self.config.command;
        log::info!(
            "Updating week slot {} with {:?}",
            resolved.weekslot,
            command.to_bytes()
        );
        let instruction =
            command.instruction(resolved.program_id, resolved.weekslot);
        self.remote.submit(core::slice::from_ref(&instruction), self.payer)
    }

    /// Reads and decodes the week slot account.
    pub fn report(&self, resolved: &Resolved) -> Result<WeekSlot> {
        let data = self
            .remote
            .get_account_data(&resolved.weekslot)?
            .ok_or(Error::AccountNotFound(resolved.weekslot))?;
        Ok(WeekSlot::decode(&data)?)
    }

    /// Performs all stages in order and returns the week slot record read
    /// after the update.
    pub fn run(&self) -> Result<WeekSlot> {
        self.connect()?;
        self.fund()?;
        let resolved = self.resolve()?;
        self.update(&resolved)?;
        let record = self.report(&resolved)?;
        log::info!("{} has slot 1 with value {}", resolved.weekslot, record.slot1);
        Ok(record)
    }
}

/// Runs a complete session; see [`Session::run`].
pub fn run<R: Remote>(
    remote: R,
    payer: &Keypair,
    config: &Config,
) -> Result<WeekSlot> {
    Session::new(remote, payer, config).run()
}
