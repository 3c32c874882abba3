use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signer;
use solana_sdk::signer::keypair::Keypair;
use weekslot::instruction::UpdateCommand;
use weekslot::rpc::RpcRemote;
use weekslot::workflow::{self, FeePolicy, DEFAULT_SEED};


type Result<T = (), E = Error> = core::result::Result<T, E>;


/// Sets or clears an hour in a week slot account and prints the first slot.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// URL of the cluster’s JSON RPC endpoint.
    #[arg(long, env = "WEEKSLOT_URL", default_value = "https://api.devnet.solana.com")]
    url: String,

    /// Commitment level used for queries and confirmations.
    #[arg(long, value_enum, default_value_t = Commitment::Confirmed)]
    commitment: Commitment,

    /// Keypair file of the fee payer.  Defaults to
    /// `~/.config/solana/id.json`.
    #[arg(long, env = "WEEKSLOT_KEYPAIR")]
    keypair: Option<PathBuf>,

    #[command(flatten)]
    program: ProgramArgs,

    /// Seed the week slot account address is derived from.
    #[arg(long, env = "WEEKSLOT_SEED", default_value = DEFAULT_SEED)]
    seed: String,

    /// Number of signature fees the payer must hold on top of the account’s
    /// rent-exempt minimum.
    #[arg(long, env = "WEEKSLOT_FEE_MARGIN", default_value_t = 100)]
    fee_margin: u64,

    /// Day of the week, counting from zero.
    #[arg(long, default_value_t = 0)]
    day: u8,

    /// Hour of the day.
    #[arg(long, default_value_t = 11)]
    hour: u8,

    /// Whether to set or clear the hour.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    state: bool,

    /// Create the week slot account if it doesn’t exist.
    #[arg(long)]
    create_account: bool,
}

/// Identity of the week slot program.
#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct ProgramArgs {
    /// Address of the week slot program.
    #[arg(long, env = "WEEKSLOT_PROGRAM_ID")]
    program_id: Option<Pubkey>,

    /// Keypair file of the week slot program.
    #[arg(long, env = "WEEKSLOT_PROGRAM_KEYPAIR")]
    program_keypair: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl From<Commitment> for CommitmentConfig {
    fn from(commitment: Commitment) -> Self {
        match commitment {
            Commitment::Processed => Self::processed(),
            Commitment::Confirmed => Self::confirmed(),
            Commitment::Finalized => Self::finalized(),
        }
    }
}


fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("{err}");
        ExitCode::FAILURE
    } else {
        println!("Success");
        ExitCode::SUCCESS
    }
}


/// Executes the program.
fn run(cli: Cli) -> Result {
    let payer = read_keypair(cli.keypair.as_deref())?;
    let config = cli.config()?;

    log::info!("Using cluster at {}", cli.url);
    log::debug!("{config:?}");
    let record = workflow::run(cli.remote(), &payer, &config)?;
    println!("slot1: {}", record.slot1);
    Ok(())
}

impl Cli {
    /// Creates client for the configured cluster.  The version handshake is
    /// left to the workflow.
    fn remote(&self) -> RpcRemote {
        RpcRemote::new(self.url.as_str(), self.commitment.into())
    }

    /// Builds workflow configuration from the arguments.
    fn config(&self) -> Result<workflow::Config> {
        let program = &self.program;
        let program_id = match (program.program_id, &program.program_keypair) {
            (Some(id), _) => id,
            (None, Some(path)) => read_keypair_file(path)?.pubkey(),
            (None, None) => return Err(Error::Usage),
        };
        let command = UpdateCommand {
            day: self.day,
            hour: self.hour,
            state: self.state,
        };
        Ok(workflow::Config {
            seed: self.seed.clone(),
            fees: FeePolicy { signature_margin: self.fee_margin },
            create_account: self.create_account,
            ..workflow::Config::new(program_id, command)
        })
    }
}


/// Reads the payer keypair from given file or the default Solana CLI
/// location.
fn read_keypair(path: Option<&std::path::Path>) -> Result<Keypair> {
    if let Some(path) = path {
        return read_keypair_file(path);
    }
    let home = std::env::var_os("HOME").ok_or(Error::NoHome)?;
    let mut path = PathBuf::from(home);
    path.push(".config/solana/id.json");
    read_keypair_file(&path)
}

fn read_keypair_file(path: &std::path::Path) -> Result<Keypair> {
    solana_sdk::signer::keypair::read_keypair_file(path)
        .map_err(|err| Error::Keypair(path.to_owned(), err))
}


#[derive(derive_more::From, derive_more::Display)]
enum Error {
    #[display("either --program-id or --program-keypair is required")]
    #[from(ignore)]
    Usage,
    #[display("HOME is not set; pass --keypair")]
    #[from(ignore)]
    NoHome,
    #[display("{}: {_1}", _0.display())]
    #[from(ignore)]
    Keypair(PathBuf, Box<dyn std::error::Error>),
    WeekSlot(weekslot::Error),
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Environment variables the command line falls back to.
    const ENV_VARS: [&str; 6] = [
        "WEEKSLOT_URL",
        "WEEKSLOT_KEYPAIR",
        "WEEKSLOT_PROGRAM_ID",
        "WEEKSLOT_PROGRAM_KEYPAIR",
        "WEEKSLOT_SEED",
        "WEEKSLOT_FEE_MARGIN",
    ];

    /// Parses arguments with the fallback environment variables cleared.
    fn parse<const N: usize>(args: [&str; N]) -> Result<Cli, clap::Error> {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
        Cli::try_parse_from(args)
    }

    #[test]
    fn test_defaults() {
        let program_id = Pubkey::new_unique();
        let id = program_id.to_string();
        let cli = parse([
            "weekslot",
            "--program-id",
            id.as_str(),
        ])
        .unwrap();
        assert_eq!(Commitment::Confirmed, cli.commitment);
        let config = cli.config().ok().unwrap();
        let command = UpdateCommand { day: 0, hour: 11, state: true };
        assert_eq!(workflow::Config::new(program_id, command), config);
        assert_eq!([0, 11, 1], config.command.to_bytes());
    }

    #[test]
    fn test_overrides() {
        let program_id = Pubkey::new_unique();
        let id = program_id.to_string();
        let cli = parse([
            "weekslot",
            "--program-id",
            id.as_str(),
            "--seed",
            "other",
            "--fee-margin",
            "3",
            "--day",
            "5",
            "--hour",
            "9",
            "--state",
            "false",
            "--create-account",
            "--commitment",
            "finalized",
        ])
        .unwrap();
        assert_eq!(
            CommitmentConfig::finalized(),
            CommitmentConfig::from(cli.commitment)
        );
        let config = cli.config().ok().unwrap();
        assert_eq!("other", config.seed);
        assert_eq!(FeePolicy { signature_margin: 3 }, config.fees);
        assert_eq!([5, 9, 0], config.command.to_bytes());
        assert!(config.create_account);
    }

    #[test]
    fn test_program_required() {
        assert!(parse(["weekslot"]).is_err());
        let program_id = Pubkey::new_unique().to_string();
        let got = parse([
            "weekslot",
            "--program-id",
            program_id.as_str(),
            "--program-keypair",
            "program.json",
        ]);
        assert!(got.is_err());
    }

    #[test]
    fn test_missing_keypair_file() {
        let path = std::path::Path::new("/nonexistent/weekslot/id.json");
        let got = read_keypair(Some(path));
        assert!(matches!(got, Err(Error::Keypair(p, _)) if p == path));
    }

    #[test]
    fn test_remote_without_handshake() {
        let id = Pubkey::new_unique().to_string();
        let cli = parse(["weekslot", "--program-id", id.as_str()]).unwrap();
        assert_eq!("https://api.devnet.solana.com", cli.url);

        // Nothing listens on the discard port; creating the client must not
        // contact the cluster.
        let cli = parse([
            "weekslot",
            "--program-id",
            id.as_str(),
            "--url",
            "http://127.0.0.1:9",
            "--commitment",
            "processed",
        ])
        .unwrap();
        let remote = cli.remote();
        assert_eq!("http://127.0.0.1:9", remote.client().url());
        assert_eq!(CommitmentConfig::processed(), remote.client().commitment());
    }
}
