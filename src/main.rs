use std::sync::Arc;

use authgate::{
    AuthUrls, ConfigError, CookieStore, Credentials, Guard, HasRoleGuard, IsLoggedGuard, SessionConfig, SessionError,
    SessionService, TokenInterceptor, run_guards,
};
use clap::{Args, Parser, Subcommand};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "authgate", about = "Log in against an auth endpoint and exercise session guards")]
struct Cli {
    /// Overrides `AUTH_API_LOGIN_URL`.
    #[arg(long)]
    login_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long, env = "AUTH_USERNAME")]
    username: String,

    #[arg(long, env = "AUTH_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and print the stored profile and the Authorization header.
    Login(LoginArgs),
    /// Log in, then run the logged-in and role guards against each URL.
    Guard {
        #[command(flatten)]
        login: LoginArgs,
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("authgate=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let urls = AuthUrls::from_env_with(cli.login_url)?;
    let config = SessionConfig::from_env_with(urls)?;
    let navigator = |url: &str| {
        tracing::info!(%url, "navigate");
    };
    let session = Arc::new(SessionService::with_http(config, CookieStore::in_memory(), Arc::new(navigator))?);

    match cli.command {
        Command::Login(login) => run_login(&session, login).await,
        Command::Guard { login, urls } => run_guard(&session, login, &urls).await,
    }
}

async fn sign_in(session: &SessionService, login: LoginArgs) -> Result<(), CliError> {
    let credentials = Credentials::new(login.username, login.password);
    session.login(&credentials).await?;
    Ok(())
}

async fn run_login(session: &Arc<SessionService>, login: LoginArgs) -> Result<(), CliError> {
    sign_in(session, login).await?;
    let authorization = TokenInterceptor::new(session.clone())
        .authorization()
        .and_then(|value| value.to_str().ok().map(str::to_owned));
    print_json(&json!({
        "loggedUser": session.logged_user()?,
        "authorization": authorization,
    }))
}

async fn run_guard(session: &Arc<SessionService>, login: LoginArgs, urls: &[String]) -> Result<(), CliError> {
    sign_in(session, login).await?;
    let is_logged = IsLoggedGuard::new(session.clone());
    let has_role = HasRoleGuard::new(session.clone());
    let guards: [&dyn Guard; 2] = [&is_logged, &has_role];

    let results: Vec<_> = urls
        .iter()
        .map(|url| json!({ "url": url, "canActivate": run_guards(&guards, url) }))
        .collect();
    print_json(&serde_json::Value::Array(results))
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
