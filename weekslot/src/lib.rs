// weekslot — client library for the week slot Solana program
// © 2025 by Michał Nazarewicz <mina86@mina86.com>
//
// This program is free software; you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation; either version 2 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program; if not, see <https://www.gnu.org/licenses/>.

//! Client library for the week slot Solana program.
//!
//! The week slot program keeps a 28-byte [`record::WeekSlot`] in an account
//! whose address is derived from the payer’s key, a seed string and the
//! program id.  Each of the seven 32-bit slots is a bitmap of booked hours for
//! one day of the week.  The program accepts a three-byte instruction
//! ([`instruction::UpdateCommand`]) which sets or clears a single hour.
//!
//! All communication with the cluster goes through the [`remote::Remote`]
//! trait.  [`workflow::run`] drives a complete session: it checks the
//! connection, makes sure the payer can cover fees, resolves the week slot
//! account, sends the update and reads the record back.
//!
//! # Features
#![doc = document_features::document_features!()]

pub mod instruction;
pub mod record;
pub mod remote;
#[cfg(feature = "rpc")]
pub mod rpc;
pub mod workflow;

use solana_sdk::pubkey::{Pubkey, PubkeyError};
use solana_sdk::signature::Signature;

pub use record::MalformedRecord;


pub type Result<T = (), E = Error> = core::result::Result<T, E>;


/// Error returned by the remote account client and the workflow.
///
/// None of the errors is recovered from locally; all of them abort the run.
#[derive(Debug, derive_more::From, derive_more::Display)]
pub enum Error {
    /// The cluster could not be reached or responded with garbage to the
    /// version handshake.
    #[display("cannot connect to cluster: {_0}")]
    #[from(ignore)]
    Connection(Box<dyn std::error::Error>),

    /// An airdrop transaction has not been confirmed in time.
    #[display("transaction {_0} was not confirmed")]
    #[from(ignore)]
    ConfirmationTimeout(Signature),

    /// Sending or confirming a transaction failed.
    #[display("transaction failed: {_0}")]
    #[from(ignore)]
    Submission(Box<dyn std::error::Error>),

    /// The week slot account does not exist.
    #[display("cannot find week slot account {_0}")]
    #[from(ignore)]
    AccountNotFound(Pubkey),

    /// The week slot account holds fewer bytes than a record needs.
    MalformedRecord(MalformedRecord),

    /// There is no account at the program id.
    #[display("program {_0} has not been deployed")]
    #[from(ignore)]
    ProgramNotDeployed(Pubkey),

    /// The account at the program id is not executable.
    #[display("account {_0} is not an executable program")]
    #[from(ignore)]
    ProgramNotExecutable(Pubkey),

    /// Address derivation failed, e.g. because the seed is too long.
    #[display("cannot derive address: {_0}")]
    Address(PubkeyError),

    /// Any other failed request to the cluster.
    #[display("{_0}")]
    #[from(ignore)]
    Remote(Box<dyn std::error::Error>),
}

impl std::error::Error for Error {}
