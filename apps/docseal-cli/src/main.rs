//! docseal binary
//!
//! Exit status: 0 on success or a valid signature, 1 when a signature is
//! invalid, 2 on any error.

use clap::{Parser, Subcommand};
use docseal_cli::{commands, session::Session, Config, Format};
use docseal_core::{FileSink, SignatureEngine, VerificationResult};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "docseal")]
#[command(version, about = "Sign documents with RSA-PSS and verify detached signatures")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Accept files of any type, not only the configured extensions
    #[arg(long, global = true)]
    any_file: bool,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the SHA-256 digest of a document
    Hash { file: PathBuf },

    /// Sign a document, writing the signature and the public key
    Sign {
        file: PathBuf,

        /// Signature file (defaults to the configured sink)
        #[arg(short, long)]
        signature: Option<String>,

        /// Public key file (defaults to the signature name with .pub.pem)
        #[arg(short, long)]
        public_key: Option<String>,
    },

    /// Verify a document against a signature and a public key
    Verify {
        file: PathBuf,

        /// PEM public key written by `sign`
        #[arg(short, long)]
        public_key: String,

        /// Signature file (defaults to the configured sink)
        #[arg(short, long)]
        signature: Option<String>,
    },

    /// Interactive load/sign/save/verify session with one key pair
    Session,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "docseal=info,docseal_core=info,docseal_cli=info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // stdout carries command output only
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let mut config = Config::load(args.config.as_deref())?;
    if args.any_file {
        config.picker = config.picker.any_file();
    }
    let format = if args.json { Format::Json } else { Format::Text };

    tracing::debug!(?config, "Loaded configuration");

    match args.command {
        Command::Hash { file } => {
            println!("{}", commands::hash(&config, &file, format)?);
        }
        Command::Sign {
            file,
            signature,
            public_key,
        } => {
            let text = commands::sign(
                &config,
                FileSink::current_dir(),
                &file,
                signature.as_deref(),
                public_key.as_deref(),
                format,
            )?;
            println!("{}", text);
        }
        Command::Verify {
            file,
            public_key,
            signature,
        } => {
            let (result, text) = commands::verify(
                &config,
                &FileSink::current_dir(),
                &file,
                signature.as_deref(),
                &public_key,
                format,
            )?;
            println!("{}", text);
            if result == VerificationResult::Invalid {
                return Ok(ExitCode::from(1));
            }
        }
        Command::Session => {
            let engine = SignatureEngine::new(config.engine.clone(), FileSink::current_dir())?;
            tracing::info!(fingerprint = %engine.fingerprint(), "Session key pair ready");
            let mut session = Session::new(engine, config.picker, format);
            session.run(io::stdin().lock(), io::stdout().lock())?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
