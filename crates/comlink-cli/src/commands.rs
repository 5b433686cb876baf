//! Command execution.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use comlink_client::{paths, ComlinkClient, JsonObject, RequestBody};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, info};

use crate::cli::{Cli, Command};
use crate::error::CliError;

impl Command {
    /// Gateway path this command posts to.
    pub fn endpoint(&self) -> &str {
        match self {
            Command::Enums => paths::ENUMS,
            Command::Metadata => paths::METADATA,
            Command::GameData { .. } => paths::DATA,
            Command::Localization { .. } => paths::LOCALIZATION,
            Command::Events => paths::GET_EVENTS,
            Command::Player(_) => paths::PLAYER,
            Command::PlayerArena { .. } => paths::PLAYER_ARENA,
            Command::Guild { .. } => paths::GUILD,
            Command::Guilds { .. } => paths::GET_GUILDS,
            Command::GuildLeaderboard { .. } => paths::GET_GUILD_LEADERBOARD,
            Command::Leaderboard { .. } => paths::GET_LEADERBOARD,
            Command::Raw { endpoint, .. } => endpoint,
        }
    }
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    check_flags(&cli)?;
    let client = ComlinkClient::new(cli.settings())?;

    let scope = client.scope().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            scope.cancel();
        }
    });

    let result = execute(&client, &cli).await;
    client.shutdown().await;

    let body = result?;
    write_output(&body, cli.output.as_deref())?;
    Ok(())
}

/// Reject global flags that the chosen command would ignore.
fn check_flags(cli: &Cli) -> Result<(), CliError> {
    if cli.enums && matches!(cli.command, Command::Enums | Command::Raw { .. }) {
        return Err(CliError::Usage(format!(
            "--enums does not apply to {}; it only shapes generated request bodies",
            cli.command.endpoint()
        )));
    }
    Ok(())
}

async fn execute(client: &ComlinkClient, cli: &Cli) -> Result<JsonObject, CliError> {
    let endpoint = cli.command.endpoint();
    debug!(endpoint, "Executing command");

    let body = match &cli.command {
        Command::Enums => return Ok(client.enums().await?),
        Command::Raw { body, .. } => read_body(body.as_deref())?,
        command => command.request_body(cli.enums).unwrap_or_default(),
    };

    Ok(client.post(endpoint, &body).await?)
}

/// Read a [`RequestBody`] from `path`, or from stdin for `-`. No path means an empty body.
fn read_body(path: Option<&Path>) -> Result<RequestBody, CliError> {
    let bytes = match path {
        None => return Ok(RequestBody::default()),
        Some(path) if path == Path::new("-") => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|source| CliError::Input {
                    path: path.to_path_buf(),
                    source,
                })?;
            buffer
        }
        Some(path) => std::fs::read(path).map_err(|source| CliError::Input {
            path: path.to_path_buf(),
            source,
        })?,
    };

    serde_json::from_slice(&bytes).map_err(CliError::Body)
}

/// Pretty-print `body` with four-space indentation.
fn render(body: &JsonObject) -> anyhow::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    body.serialize(&mut serializer)
        .context("failed to render response")?;
    out.push(b'\n');
    Ok(out)
}

fn write_output(body: &JsonObject, path: Option<&Path>) -> anyhow::Result<()> {
    let rendered = render(body)?;
    match path {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = rendered.len(), "Wrote response");
        }
        None => {
            use std::io::Write;
            std::io::stdout()
                .write_all(&rendered)
                .context("failed to write to stdout")?;
        }
    }
    Ok(())
}
