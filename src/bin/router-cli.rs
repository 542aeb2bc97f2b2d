use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Management CLI for the multi-backend router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8090")]
    url: String,

    #[arg(short, long, env = "ROUTER_ADMIN_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show backend health, load and latency
    Status,
    /// Show a single backend
    Backend { name: String },
    /// Probe every backend once
    Benchmark {
        #[arg(short, long)]
        prompt: Option<String>,
    },
    /// Route a prompt through the router
    Route {
        prompt: String,
        /// Backend to try first
        #[arg(long)]
        prefer: Option<String>,
        /// Required capability (repeatable)
        #[arg(long = "capability")]
        capabilities: Vec<String>,
        #[arg(long)]
        max_tokens: Option<u32>,
    },
    /// Ask which backend would be selected
    Select {
        /// "weighted" or "capability"
        #[arg(long, default_value = "weighted")]
        mode: String,
        #[arg(long = "capability")]
        capabilities: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = match cli.command {
        Commands::Status => {
            client.get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Backend { name } => {
            client.get(format!("{}/admin/backends/{}", cli.url, name))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Benchmark { prompt } => {
            let body = match prompt {
                Some(prompt) => json!({ "prompt": prompt }),
                None => json!({}),
            };
            client.post(format!("{}/admin/benchmark", cli.url))
                .headers(headers)
                .json(&body)
                .send()
                .await?
        }
        Commands::Route { prompt, prefer, capabilities, max_tokens } => {
            client.post(format!("{}/v1/route", cli.url))
                .json(&json!({
                    "prompt": prompt,
                    "preferred": prefer,
                    "capabilities": capabilities,
                    "max_tokens": max_tokens,
                }))
                .send()
                .await?
        }
        Commands::Select { mode, capabilities } => {
            client.post(format!("{}/admin/select", cli.url))
                .headers(headers)
                .json(&json!({ "mode": mode, "capabilities": capabilities }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    if !status.is_success() {
        eprintln!("Error: router returned status {}", status);
    }
    Ok(())
}
