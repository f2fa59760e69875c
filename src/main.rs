use anyhow::{bail, Context, Result};
use base64::Engine;
use clap::{Parser, Subcommand};
use hidapi::HidApi;
use ledger_transport_hid::TransportNativeHID;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cosmos_ledger_signer::chain::amino::{AminoMsg, Coin};
use cosmos_ledger_signer::chain::proto::Any;
use cosmos_ledger_signer::chain::wallet::LedgerCosmosApp;
use cosmos_ledger_signer::chain::{
    encode_tx_raw, GrpcMetadataSource, HardwareSigner, LedgerTxBuilder, MessageRegistry,
    RestMetadataSource, SignOptions, SignerMetadata, SignerMetadataSource, TxFee,
};
use cosmos_ledger_signer::config::{Config, MetadataBackend};

#[derive(Parser)]
#[command(name = "cosmos-ledger-signer")]
#[command(about = "Sign Cosmos transactions with a Ledger in Amino JSON mode", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "config.toml")]
        output: String,
    },

    /// Print the Ledger account address
    Address {
        /// Configuration file path
        #[arg(short, long, default_value = "config.toml", env = "SIGNER_CONFIG")]
        config: String,

        /// Also display the address on the device for verification
        #[arg(long)]
        show: bool,
    },

    /// Print the Cosmos app version
    Version {
        /// Configuration file path
        #[arg(short, long, default_value = "config.toml", env = "SIGNER_CONFIG")]
        config: String,
    },

    /// Sign Amino JSON messages and print the base64 encoded TxRaw
    Sign {
        /// Configuration file path
        #[arg(short, long, default_value = "config.toml", env = "SIGNER_CONFIG")]
        config: String,

        /// JSON array of `{"type": ..., "value": ...}` messages
        #[arg(short, long)]
        messages: PathBuf,

        /// Fee, e.g. "20000ufct"
        #[arg(long)]
        fee: Option<String>,

        /// Gas limit
        #[arg(long)]
        gas: Option<String>,

        #[arg(long, default_value = "")]
        memo: String,

        /// Fee granter address
        #[arg(long, default_value = "")]
        granter: String,

        /// Sign offline with this sequence (requires --account-number and --chain-id)
        #[arg(long, requires_all = ["account_number", "chain_id"])]
        sequence: Option<u64>,

        #[arg(long, requires = "sequence")]
        account_number: Option<u64>,

        #[arg(long, requires = "sequence")]
        chain_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cosmos_ledger_signer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output } => {
            let config = Config::default();
            config.save(&output)?;
            info!("Configuration file created at: {}", output);
        }
        Commands::Address { config, show } => {
            let config = load_config(&config)?;
            let ledger = open_ledger(&config)?;
            let identity = ledger.address_and_public_key().await?;
            println!("{}", identity.address);
            println!("{}", hex::encode(&identity.public_key));
            if show {
                info!("Confirm the address on the device");
                ledger.show_address_on_device().await?;
            }
        }
        Commands::Version { config } => {
            let config = load_config(&config)?;
            let ledger = open_ledger(&config)?;
            println!("Cosmos app {}", ledger.app_version().await?);
        }
        Commands::Sign {
            config,
            messages,
            fee,
            gas,
            memo,
            granter,
            sequence,
            account_number,
            chain_id,
        } => {
            let config = load_config(&config)?;
            let registry = MessageRegistry::with_defaults();
            let messages = read_messages(&registry, &messages)?;

            let fee_amount = match fee {
                Some(fee) => fee.parse::<Coin>()?,
                None => Coin::new(config.tx.fee_amount.to_string(), &config.chain.fee_denom),
            };
            let options = SignOptions {
                fee: TxFee::new(
                    vec![fee_amount],
                    gas.unwrap_or_else(|| config.tx.gas.to_string()),
                )
                .with_granter(granter),
                memo,
            };

            let ledger = open_ledger(&config)?;
            let metadata = metadata_source(&config).await?;
            let builder = LedgerTxBuilder::new(&ledger, metadata.as_ref(), &registry);

            let tx = match (sequence, account_number, chain_id) {
                (Some(sequence), Some(account_number), Some(chain_id)) => {
                    let signer_data = SignerMetadata {
                        chain_id,
                        account_number,
                        sequence,
                    };
                    builder
                        .sign_with_signer_data(&messages, &options, &signer_data)
                        .await?
                }
                (None, _, _) => builder.sign(&messages, &options).await?,
                _ => bail!("--sequence requires both --account-number and --chain-id"),
            };

            println!(
                "{}",
                base64::engine::general_purpose::STANDARD.encode(encode_tx_raw(&tx))
            );
        }
    }

    Ok(())
}

fn load_config(path: &str) -> Result<Config> {
    Config::load(path).with_context(|| format!("failed to load config from {}", path))
}

fn read_messages(registry: &MessageRegistry, path: &PathBuf) -> Result<Vec<Any>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let amino: Vec<AminoMsg> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of Amino messages", path.display()))?;
    if amino.is_empty() {
        bail!("{} contains no messages", path.display());
    }

    let messages = amino
        .iter()
        .map(|msg| registry.from_amino(msg))
        .collect::<cosmos_ledger_signer::Result<Vec<_>>>()?;
    Ok(messages)
}

async fn metadata_source(config: &Config) -> Result<Box<dyn SignerMetadataSource>> {
    let source: Box<dyn SignerMetadataSource> = match config.chain.backend {
        MetadataBackend::Grpc => {
            Box::new(GrpcMetadataSource::connect(&config.client_config()).await?)
        }
        MetadataBackend::Rest => Box::new(RestMetadataSource::new(
            &config.chain.rest_endpoint,
            config.chain.request_timeout,
            config.chain.chain_id.clone(),
        )?),
    };
    Ok(source)
}

fn open_ledger(config: &Config) -> Result<LedgerCosmosApp<TransportNativeHID>> {
    let api = HidApi::new().context("failed to initialize USB HID")?;
    let transport = TransportNativeHID::new(&api)
        .context("no Ledger found; connect the device and unlock it")?;
    let path = config.ledger_path();
    info!("Using Ledger path {}", path);
    Ok(LedgerCosmosApp::new(
        transport,
        path,
        config.chain.address_prefix.clone(),
    ))
}
