use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pickup_lines::{
    constants::CompletionConfig, llm_interaction::CompletionClient, web_server, GenerateRequest,
    Intensity, PickupLineGenerator,
};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the web server hosting the chat page and the generation API.
    Serve {
        #[arg(long, env = "PORT", default_value_t = 3000, help = "Port for the web server.")]
        port: u16,
    },
    /// Generate three lines for a single message and print them.
    Generate {
        #[arg(help = "What the other person said.")]
        message: String,
        #[arg(
            long,
            default_value_t = 5,
            value_parser = clap::value_parser!(u8).range(1..=10),
            help = "How flirty the replies should be, from 1 to 10."
        )]
        intensity: u8,
    },
}

fn build_generator() -> Result<PickupLineGenerator> {
    let config = CompletionConfig::from_env().context("Completion service is not configured")?;
    let client = CompletionClient::new(&config).context("Failed to create completion client")?;
    Ok(PickupLineGenerator::new(client))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for environment variables like API keys)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG (e.g. RUST_LOG=info,pickup_lines=debug).
    // Logs go to stderr so `generate` output can be piped.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let generator = build_generator()?;
            info!("Starting pickup-lines server on port {}...", port);
            web_server::start_web_server(port, generator).await?;
        }
        Commands::Generate { message, intensity } => {
            let generator = build_generator()?;
            let request = GenerateRequest::new(message, Intensity::from(intensity));
            let lines = generator.generate(&request).await?;
            for line in lines.lines() {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
