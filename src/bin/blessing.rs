//! Blessing Post Office CLI
//!
//! Creates blessing cards with Gemini, turns them into figures, and runs the
//! simulated postal delivery.
//!
//! Usage:
//!   cargo run --features cli --bin blessing -- card --to "지은" --theme "새로운 시작"
//!   cargo run --features cli --bin blessing -- figure --to "지은" --theme "건강" --style fantasy --out ./out
//!   cargo run --features cli --bin blessing -- mail --to "지은" --theme "행복" \
//!     --address "서울시 중구 세종대로 110" --phone 010-0000-0000
//!
//! Requires GEMINI_API_KEY (or API_KEY) in the environment or a .env file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use blessing_post::image::{card_file_name, decode_data_uri, figure_file_name, DecodedImage};
use blessing_post::{AppConfig, BlessingCard, BlessingSession, CardStyle, DeliveryInfo, ImageRef};

#[derive(Parser, Debug)]
#[command(name = "blessing")]
#[command(about = "Generate blessing cards, figures and simulated mail")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a blessing card
    Card(CardArgs),
    /// Create a card, then a collectible figure from it
    Figure(CardArgs),
    /// Create a card, then send it through the simulated post
    Mail {
        #[command(flatten)]
        card: CardArgs,
        /// Delivery address
        #[arg(long)]
        address: String,
        /// Contact phone number
        #[arg(long)]
        phone: String,
    },
}

#[derive(Args, Debug)]
struct CardArgs {
    /// Who the blessing is for
    #[arg(long = "to")]
    recipient: String,
    /// Blessing theme
    #[arg(long)]
    theme: String,
    /// Art style: watercolor, minimalist, popart, fantasy
    #[arg(long, default_value = "watercolor")]
    style: CardStyle,
    /// Directory to write generated images into
    #[arg(long)]
    out: Option<PathBuf>,
}

impl CardArgs {
    fn validate(&self) -> Result<()> {
        if self.recipient.trim().is_empty() || self.theme.trim().is_empty() {
            bail!("--to and --theme must not be empty");
        }
        Ok(())
    }
}

fn save_image(out: &Path, image: &ImageRef, name: impl Fn(&DecodedImage) -> String) -> Result<()> {
    if image.is_empty() {
        eprintln!("No image was returned; nothing to save.");
        return Ok(());
    }
    let decoded = decode_data_uri(image).context("decoding generated image")?;
    std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
    let path = out.join(name(&decoded));
    std::fs::write(&path, &decoded.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Saved {}", path.display());
    Ok(())
}

async fn create_card(session: &BlessingSession, args: &CardArgs) -> Result<BlessingCard> {
    args.validate()?;
    let card = session
        .cards()
        .create_card(&args.recipient, &args.theme, args.style)
        .await
        .map_err(|e| {
            tracing::error!("{}", e);
            anyhow::anyhow!(e.user_notice())
        })?;

    println!("{}", serde_json::to_string_pretty(&card)?);
    if let Some(out) = &args.out {
        save_image(out, card.image_url(), |d| card_file_name(card.recipient(), d))?;
    }
    Ok(card)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let session = BlessingSession::with_gemini(&config)?;

    match cli.command {
        Command::Card(args) => {
            create_card(&session, &args).await?;
        }
        Command::Figure(args) => {
            let card = create_card(&session, &args).await?;
            let figures = session.figure_session();
            let figure = figures.create().await.map_err(|e| {
                tracing::error!("{}", e);
                anyhow::anyhow!(e.user_notice())
            })?;
            println!("{}", serde_json::to_string_pretty(&figure)?);
            if let Some(out) = &args.out {
                save_image(out, &figure.figure_image_url, |d| {
                    figure_file_name(card.recipient(), d)
                })?;
            }
        }
        Command::Mail {
            card: args,
            address,
            phone,
        } => {
            let card = create_card(&session, &args).await?;
            println!("Sending by post...");
            let receipt = session
                .mailer()
                .spawn_dispatch(card.id().clone(), DeliveryInfo::new(address, phone))
                .await??;
            println!("{}", receipt.acknowledgement);
        }
    }

    Ok(())
}
