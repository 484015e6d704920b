#![cfg_attr(test, allow(clippy::expect_used))]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use dashboard_client_core::{
    ApiClient, ClientConfig, HttpMethod, RecordingNavigator, ReqwestTransport, SessionContext,
};
use serde_json::Value;
use tracing::debug;

pub mod session_file;

use session_file::{DEFAULT_SESSION_FILE, FileSessionStore};

#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(about = "Command-line client for the role-based dashboard API")]
pub struct Cli {
    /// API base URL, e.g. http://127.0.0.1:8000/api (overrides DASHBOARD_API_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// File holding the session token
    #[arg(long, global = true, env = "DASHBOARD_SESSION_FILE", default_value = DEFAULT_SESSION_FILE)]
    pub session_file: PathBuf,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the issued token
    Login(LoginArgs),
    /// Forget the stored token
    Logout,
    /// Show the claims carried by the stored token
    Whoami,
    /// Show the dashboard page for the signed-in role
    Home,
    /// Send a request to an API endpoint and print the JSON response
    Request(RequestArgs),
    /// Check API and database health
    Health,
    /// Fetch the dashboard summary for the signed-in role
    Summary,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Email address or user name
    pub username: String,
    /// Read from stdin when omitted
    #[arg(long, env = "DASHBOARD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Endpoint path below the base URL, e.g. /users/
    pub endpoint: String,
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: HttpMethod,
    /// JSON request body
    #[arg(long)]
    pub body: Option<String>,
}

type CliSession = SessionContext<FileSessionStore>;

/// Logs go to stderr so command output stays machine-readable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

pub fn resolve_config(base_url: Option<&str>) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("invalid dashboard environment")?;
    if let Some(base_url) = base_url {
        config.api_base_url = ClientConfig::with_base_url(base_url)
            .context("invalid --base-url")?
            .api_base_url;
    }
    Ok(config)
}

pub async fn execute(cli: Cli, out: &mut impl Write) -> Result<()> {
    let config = resolve_config(cli.base_url.as_deref())?;
    let session = SessionContext::new(FileSessionStore::new(&cli.session_file));
    debug!(
        base_url = %config.api_base_url,
        session_file = %cli.session_file.display(),
        "dashboard command starting"
    );

    match cli.command {
        Commands::Logout => logout(&session, out),
        Commands::Whoami => whoami(&session, out),
        Commands::Home => home(&session, out),
        Commands::Login(args) => {
            let password = match args.password {
                Some(password) => password,
                None => read_password()?,
            };
            let client = http_client(config, session)?;
            client
                .login(&args.username, &password)
                .await
                .context("login failed")?;
            let route = client.session().dashboard_route();
            let user = client.session().current_user();
            let name = user
                .as_ref()
                .and_then(|user| user.name())
                .unwrap_or(args.username.as_str());
            let role = user
                .as_ref()
                .and_then(|user| user.role_claim())
                .unwrap_or("Unknown");
            writeln!(out, "Signed in as {name} ({role})")?;
            writeln!(out, "Dashboard: {route}")?;
            Ok(())
        }
        Commands::Request(args) => {
            let body = args
                .body
                .as_deref()
                .map(serde_json::from_str::<Value>)
                .transpose()
                .context("--body must be valid JSON")?;
            let client = http_client(config, session)?;
            let value = client
                .request(&args.endpoint, args.method, body.as_ref())
                .await?;
            write_json(out, &value)
        }
        Commands::Health => {
            let client = http_client(config, session)?;
            let health = client.health().await?;
            match health.database.as_deref() {
                Some(database) => writeln!(out, "{} (database {database})", health.status)?,
                None => writeln!(out, "{}", health.status)?,
            }
            if let Some(error) = health.error.as_deref() {
                writeln!(out, "error: {error}")?;
            }
            Ok(())
        }
        Commands::Summary => {
            let role = session
                .current_user()
                .and_then(|user| user.role())
                .context("not signed in with a dashboard role; run `dashboard login` first")?;
            let client = http_client(config, session)?;
            let summary = client.dashboard_for(role).await?;
            write_json(out, &serde_json::to_value(&summary)?)
        }
    }
}

fn logout(session: &CliSession, out: &mut impl Write) -> Result<()> {
    let navigator = RecordingNavigator::new();
    session.logout(&navigator);
    if let Some(route) = navigator.last() {
        writeln!(out, "Signed out. Next: {route}")?;
    }
    Ok(())
}

fn whoami(session: &CliSession, out: &mut impl Write) -> Result<()> {
    let Some(user) = session.current_user() else {
        bail!("not signed in");
    };
    if user.is_expired(Utc::now()) {
        writeln!(out, "warning: token has expired; the API will reject it")?;
    }
    write_json(out, &Value::Object(user.into_claims()))
}

fn home(session: &CliSession, out: &mut impl Write) -> Result<()> {
    let navigator = RecordingNavigator::new();
    let route = session.redirect_to_dashboard(&navigator);
    writeln!(out, "{route}")?;
    Ok(())
}

fn http_client(
    config: ClientConfig,
    session: CliSession,
) -> Result<ApiClient<ReqwestTransport, FileSessionStore>> {
    if config.api_base_url.starts_with('/') {
        bail!(
            "API base URL {} is relative; pass --base-url or set DASHBOARD_API_BASE_URL to an http(s) URL",
            config.api_base_url
        );
    }
    Ok(ApiClient::new(config, ReqwestTransport::new(), session))
}

fn read_password() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("password is required");
    }
    Ok(password)
}

fn write_json(out: &mut impl Write, value: &Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
