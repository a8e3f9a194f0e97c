use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the unified gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the gateway catalog (services and routes)
    Catalog,
    /// Probe the proxied health endpoint
    Health,
    /// Check a single query for breaches
    Check {
        /// Email, phone, or username to check
        query: String,
    },
    /// Check a batch of queries (max 20)
    Search {
        /// Queries to check
        queries: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Catalog => {
            let res = client.get(format!("{}/", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client
                .get(format!("{}/api/health", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Check { query } => {
            let res = client
                .get(format!("{}/api/check", cli.url))
                .query(&[("query", query)])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Search { queries } => {
            let res = client
                .post(format!("{}/api/search", cli.url))
                .json(&json!({ "queries": queries }))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
