//! Command line client for DeltaDeFi.
//!
//! Connection settings come from `DELTADEFI_*` environment variables (a `.env`
//! file is honoured) and can be overridden per call. The operation passcode is
//! read from `DELTADEFI_OPERATION_PASSCODE` or prompted for.
//!
//! ```bash
//! deltadefi-cli --network staging place-order --side buy --quantity 100 --price 0.75
//! deltadefi-cli cancel-all
//! deltadefi-cli withdraw --asset lovelace:5000000
//! ```

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use secrecy::{ExposeSecret, SecretString};

use deltadefi_sdk::config::{ApiConfig, ApiNetwork};
use deltadefi_sdk::security::{SecurePassword, decrypt_operation_key, encrypt_operation_key};
use deltadefi_sdk::value::Asset;
use deltadefi_sdk::venue_module::venue_types::{ADAUSDM, OrderSide, PlaceOrderRequest};
use deltadefi_sdk::venue_module::{OrderWallet, OrderWalletError, VenueApi, VenueHttpClient};
use deltadefi_sdk::wallet::{OperationKeySigner, TxSigner};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Venue network (dev, staging, mainnet)
    #[arg(long, global = true)]
    network: Option<ApiNetwork>,

    /// Override the network's base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// API key; defaults to DELTADEFI_API_KEY
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build, sign and submit a new order
    PlaceOrder {
        #[arg(long, default_value = ADAUSDM)]
        symbol: String,
        #[arg(long, value_enum)]
        side: Side,
        #[arg(long)]
        quantity: f64,
        /// Limit price; omit for a market order
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        post_only: bool,
        /// Slippage cap for market orders, in basis points
        #[arg(long)]
        max_slippage_bps: Option<u32>,
    },
    /// Cancel one open order
    CancelOrder { order_id: String },
    /// Cancel every open order
    CancelAll,
    /// Look up an order, e.g. after a failed submit
    OrderStatus { order_id: String },
    /// Withdraw assets, given as UNIT:QUANTITY
    Withdraw {
        #[arg(long = "asset", value_parser = parse_asset, required = true)]
        assets: Vec<Asset>,
    },
    /// Transfer assets to another account
    Transfer {
        #[arg(long)]
        to: String,
        #[arg(long = "asset", value_parser = parse_asset, required = true)]
        assets: Vec<Asset>,
    },
    /// Show free and locked balances
    Balance,
    /// Encrypt an operation key under a new passcode
    EncryptKey,
    /// Decrypt the venue-held operation key and print its public key
    ShowKey,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Side {
    Buy,
    Sell,
}

impl From<Side> for OrderSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => OrderSide::Buy,
            Side::Sell => OrderSide::Sell,
        }
    }
}

fn parse_asset(s: &str) -> std::result::Result<Asset, String> {
    let (unit, quantity) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected UNIT:QUANTITY, got {:?}", s))?;
    if unit.is_empty() {
        return Err("asset unit is empty".to_string());
    }
    Ok(Asset::new(unit, quantity))
}

fn api_config(args: &Args) -> ApiConfig {
    let mut config = ApiConfig::from_env();
    if let Some(network) = args.network {
        config = config.with_network(network);
    }
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(api_key) = &args.api_key {
        config = config.with_api_key(api_key.clone());
    }
    config
}

async fn loaded_wallet(config: &ApiConfig) -> Result<OrderWallet> {
    let mut wallet = OrderWallet::new(config).context("Failed to create venue client")?;
    let passcode = SecurePassword::get_passcode()?;
    wallet
        .load_operation_key(&passcode)
        .await
        .context("Failed to load operation key")?;
    Ok(wallet)
}

fn report(err: OrderWalletError) -> anyhow::Error {
    if err.remote_state_uncertain() {
        warn!("submit outcome unknown; check order status before retrying");
    }
    anyhow!(err)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    dotenv::dotenv().ok();

    let args = Args::parse();
    let config = api_config(&args);
    info!("using {} ({})", config.network, config.base_url());

    match args.command {
        Command::PlaceOrder {
            symbol,
            side,
            quantity,
            price,
            post_only,
            max_slippage_bps,
        } => {
            let mut request = match price {
                Some(price) => PlaceOrderRequest::limit(symbol, side.into(), quantity, price),
                None => PlaceOrderRequest::market(symbol, side.into(), quantity),
            };
            request = request.with_post_only(post_only);
            if let Some(bps) = max_slippage_bps {
                request = request.with_max_slippage_bps(bps);
            }
            let wallet = loaded_wallet(&config).await?;
            let order = wallet.place_order(&request).await.map_err(report)?;
            println!("{}", serde_json::to_string_pretty(&order)?);
        }
        Command::CancelOrder { order_id } => {
            let wallet = loaded_wallet(&config).await?;
            let tx_hash = wallet.cancel_order(&order_id).await.map_err(report)?;
            println!("cancelled {} in tx {}", order_id, tx_hash);
        }
        Command::CancelAll => {
            let wallet = loaded_wallet(&config).await?;
            let cancelled = wallet.cancel_all_orders().await.map_err(report)?;
            if cancelled.is_empty() {
                println!("no open orders");
            }
            for order_id in cancelled {
                println!("cancelled {}", order_id);
            }
        }
        Command::OrderStatus { order_id } => {
            let client = VenueHttpClient::new(&config)?;
            let record = client.get_order_record(&order_id).await?;
            println!("{}", serde_json::to_string_pretty(&record.order_json)?);
        }
        Command::Withdraw { assets } => {
            let wallet = loaded_wallet(&config).await?;
            let tx_hash = wallet.withdraw(&assets).await.map_err(report)?;
            println!("withdrawal tx {}", tx_hash);
        }
        Command::Transfer { to, assets } => {
            let wallet = loaded_wallet(&config).await?;
            let tx_hash = wallet.transfer(&assets, &to).await.map_err(report)?;
            println!("transferal tx {}", tx_hash);
        }
        Command::Balance => {
            let client = VenueHttpClient::new(&config)?;
            for balance in client.get_account_balance().await? {
                println!(
                    "{:<12} free {:>16} locked {:>16}",
                    balance.asset, balance.free, balance.locked
                );
            }
        }
        Command::EncryptKey => {
            let key = SecretString::new(
                rpassword::prompt_password("Operation key: ")
                    .context("Failed to read operation key")?,
            );
            let passcode = SecurePassword::create_new_passcode()?;
            let blob = encrypt_operation_key(key.expose_secret().as_bytes(), &passcode)?;
            // Check the blob before handing it out.
            decrypt_operation_key(&blob.to_json(), &passcode)?;
            println!("{}", blob.to_json());
        }
        Command::ShowKey => {
            let client = VenueHttpClient::new(&config)?;
            let response = client
                .get_operation_key()
                .await
                .context("Failed to fetch operation key")?;
            let passcode = SecurePassword::get_passcode()?;
            let key = decrypt_operation_key(&response.encrypted_operation_key, &passcode)?;
            let signer = OperationKeySigner::from_operation_key(&key)?;
            println!("operation key hash: {}", response.operation_key_hash);
            println!("public key:         {}", signer.public_key_hex());
        }
    }
    Ok(())
}
