use clap::{Parser, Subcommand};
use log::{error, info};
use oauth_connect::oauth::token::AccessToken;
use oauth_connect::{CallbackParams, Error, ProviderKind};
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;

/// Log in to a social provider and obtain delegated API credentials.
///
/// OAuth 1.0a providers keep the request token in the session file between
/// `begin` and `complete`, so the two steps can run as separate invocations.
#[derive(Parser)]
#[command(name = "past_connect", version)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Provider to talk to (douban, sina, renren, instagram, qq, twitter)
    provider: ProviderKind,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the URL the user has to open to authorize the application
    Begin,
    /// Trade the callback parameters for an access token
    Complete {
        /// OAuth 2.0 authorization code
        #[arg(long)]
        code: Option<String>,
        /// OAuth 1.0a request token echoed back on the callback
        #[arg(long)]
        oauth_token: Option<String>,
        /// OAuth 1.0a verifier
        #[arg(long)]
        oauth_verifier: Option<String>,
    },
    /// Exchange a refresh token for a new access token
    Refresh {
        #[arg(long)]
        refresh_token: String,
    },
    /// Fetch the normalized profile of the token owner
    Profile {
        #[arg(long)]
        access_token: String,
        /// Access token secret (OAuth 1.0a providers)
        #[arg(long)]
        access_secret: Option<String>,
        /// Provider user id, required by some providers
        #[arg(long)]
        uid: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = Logger::init_logger(&cli.config) {
        eprintln!("Failed to start logger: {e}");
    }

    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let transport = service::init_transport(&cli.config)?;
    let state = AppState::new(cli.config, Arc::new(transport));
    let connector = state.connector(cli.provider)?;

    match cli.command {
        Command::Begin => {
            let url = connector.begin(&state.session()).await?;
            info!("Open the URL below to authorize {}", cli.provider);
            println!("{url}");
        }
        Command::Complete {
            code,
            oauth_token,
            oauth_verifier,
        } => {
            let params = CallbackParams {
                code,
                oauth_token,
                oauth_verifier,
            };
            let token = connector.complete(&state.session(), &params).await?;
            print_json(&token.into_plain())?;
        }
        Command::Refresh { refresh_token } => {
            let token = connector.refresh(&refresh_token).await?;
            print_json(&token.into_plain())?;
        }
        Command::Profile {
            access_token,
            access_secret,
            uid,
        } => {
            let token = AccessToken::new(access_token, access_secret);
            let profile = connector.fetch_profile(&token, uid.as_deref()).await?;
            print_json(&profile)?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
