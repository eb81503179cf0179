use clap::Parser;
use riot_connect::{
    EnvConfig, LocalServerConfig, RiotClient, RiotClientConfig, RiotError,
};

#[derive(Debug, Parser)]
#[command(
    name = "riot-connect",
    about = "Log in with a Riot Games account and print the linked Riot ID as JSON."
)]
struct Cli {
    /// OAuth client id; falls back to RIOT_GAMES_CLIENT_ID.
    #[arg(long)]
    client_id: Option<String>,

    /// OAuth client secret; falls back to RIOT_GAMES_CLIENT_SECRET.
    #[arg(long)]
    client_secret: Option<String>,

    /// Port for the loopback callback server. The matching redirect URI
    /// must be registered with the Riot developer portal.
    #[arg(long, default_value_t = 8765)]
    port: u16,

    /// Callback path served by the loopback server.
    #[arg(long, default_value = "/callback")]
    path: String,
}

#[tokio::main]
async fn main() -> Result<(), RiotError> {
    let cli = Cli::parse();

    let mut config = RiotClientConfig::new();
    config.client_id = cli.client_id;
    config.client_secret = cli.client_secret;
    let client = RiotClient::with_config_source(config, &EnvConfig::new())?;

    let server = LocalServerConfig::new("localhost", cli.port, cli.path);
    let access_token = client
        .run_local_flow(server, |authorization_url| {
            eprintln!("Authorization URL:\n{authorization_url}");
            if let Err(err) = webbrowser::open(authorization_url) {
                eprintln!("Failed to open browser automatically: {err}");
            }
            Ok(())
        })
        .await?;

    let Some(access_token) = access_token else {
        eprintln!("Token response did not include an access token.");
        std::process::exit(1);
    };

    let account = client.account_data(&access_token).await?;
    let output =
        serde_json::to_string_pretty(&account).map_err(|err| RiotError::ResponseFormat {
            message: err.to_string(),
        })?;

    println!("{output}");
    Ok(())
}
