use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::{json, Value};

use edge_gateway::auth::{sign_token, unix_now};

#[derive(Parser)]
#[command(name = "edge-cli")]
#[command(about = "Client CLI for the edge function gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9000")]
    url: String,

    /// Bearer token (JWT, anon key or service-role key).
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway health
    Health,
    /// Invoke a function by name
    Invoke {
        name: String,
        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
        #[arg(short = 'X', long, default_value = "POST")]
        method: String,
    },
    /// Mint an HS256 token for local testing
    Token {
        #[arg(short, long)]
        secret: String,
        /// Seconds until expiry; omit for a token without `exp`
        #[arg(long)]
        exp_in: Option<u64>,
        #[arg(long, default_value = "authenticated")]
        role: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
    }

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Invoke { name, data, method } => {
            let method: Method = method.to_uppercase().parse()?;
            let mut req = client
                .request(method, format!("{}/functions/v1/{}", cli.url, name))
                .headers(headers);
            if let Some(data) = data {
                let body: Value = serde_json::from_str(&data)?;
                req = req.json(&body);
            }
            print_response(req.send().await?).await?;
        }
        Commands::Token { secret, exp_in, role } => {
            let mut claims = json!({ "role": role, "iat": unix_now() });
            if let Some(secs) = exp_in {
                claims["exp"] = json!(unix_now() + secs);
            }
            println!("{}", sign_token(&secret, &claims)?);
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
