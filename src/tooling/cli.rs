//! CLI Tooling
//!
//! Command-line interface for the Clawsino service. Commands build one request
//! each; the identity work lives in `auth`, `device`, `identity` and `session`.
//! Output is pretty-printed JSON with sorted keys, emitted only on success.

use crate::auth::Authenticator;
use crate::config::{ClawsinoConfig, ConfigLoader};
use crate::credentials::{resolve_credentials_path, CredentialRepository, FileCredentialRepository};
use crate::device::{poll_device_link, start_device_link};
use crate::error::ApiError;
use crate::logging::LogOverrides;
use crate::remote::endpoints::{self, DiceBet};
use crate::remote::{ApiRequest, HttpRemoteClient, RemoteApi};
use crate::session::SessionTokenResolver;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Clawsino CLI - play on the Clawsino service as a human or an agent
#[derive(Parser, Debug)]
#[command(name = "clawsino")]
#[command(about = "Command-line client for the Clawsino gaming service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Service base URL (default from config)
    #[arg(long, global = true)]
    pub base: Option<String>,

    /// Session token; takes precedence over any stored agent session
    #[arg(long, global = true, default_value = "")]
    pub token: String,

    /// Use the stored session of this agent handle when --token is empty
    #[arg(long, global = true)]
    pub agent: Option<String>,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Credential store path (overrides CLAWSINO_CREDENTIALS_FILE and config)
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// The --log-* flags; these beat both the environment and the config file.
    pub fn log_overrides(&self) -> LogOverrides {
        LogOverrides {
            level: self.log_level.clone(),
            format: self.log_format.clone(),
            output: self.log_output.clone(),
            file: self.log_file.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiceMode {
    Under,
    Over,
}

impl DiceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiceMode::Under => "under",
            DiceMode::Over => "over",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PokerAction {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
}

impl PokerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PokerAction::Fold => "fold",
            PokerAction::Check => "check",
            PokerAction::Call => "call",
            PokerAction::Bet => "bet",
            PokerAction::Raise => "raise",
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Service health check
    Healthz,
    /// Show the account behind the session token
    Me,
    /// Show the leaderboard
    Leaderboard {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Start device linking with a persisted pseudo-identity
    DeviceStart {
        #[arg(long, default_value = "openclaw")]
        client_name: String,
        /// Device handle; also the requested display handle
        #[arg(long, default_value = "openclaw-bot")]
        handle: String,
    },
    /// Poll a pending device link
    DevicePoll {
        #[arg(long)]
        device_code: String,
    },
    /// Place a dice bet
    Dice {
        #[arg(long)]
        amount: u64,
        #[arg(long, value_enum)]
        mode: DiceMode,
        #[arg(long)]
        threshold: f64,
        #[arg(long, alias = "edgeBps")]
        edge_bps: Option<u32>,
        #[arg(long, alias = "clientSeed")]
        client_seed: Option<String>,
    },
    /// Spin the slots
    Slots {
        #[arg(long)]
        amount: u64,
    },
    /// List poker tables
    PokerTables,
    /// Join a poker table
    PokerJoin {
        #[arg(long)]
        table: String,
        #[arg(long = "buyin")]
        buy_in: u64,
        /// Seat number; 0 lets the server choose
        #[arg(long, default_value_t = 0)]
        seat: u32,
    },
    /// Show poker table state
    PokerState {
        #[arg(long)]
        table: String,
    },
    /// Act at a poker table
    PokerAct {
        #[arg(long)]
        table: String,
        #[arg(long, value_enum)]
        action: PokerAction,
    },
    /// Leave a poker table
    PokerLeave {
        #[arg(long)]
        table: String,
    },
    /// Show a finished poker hand
    PokerHand {
        #[arg(long)]
        hand: String,
    },
    /// Authenticate an agent handle by challenge-response and store the session
    AgentAuth {
        #[arg(long)]
        handle: String,
    },
    /// Show a stored agent identity (never the private key)
    AgentShow {
        #[arg(long)]
        handle: String,
    },
    /// Print the effective configuration as TOML
    ConfigShow,
}

fn require_token<'t>(token: Option<&'t str>, command: &str) -> Result<&'t str, ApiError> {
    token.ok_or_else(|| ApiError::TokenRequired(command.to_string()))
}

/// Handles are stored trimmed, so every command looks them up the same way.
fn handle_arg(raw: &str) -> Result<&str, ApiError> {
    let handle = raw.trim();
    if handle.is_empty() {
        return Err(ApiError::ConfigError("Handle cannot be empty".to_string()));
    }
    Ok(handle)
}

/// Result of one command before it is printed.
enum CommandOutput {
    Json(Value),
    Toml(String),
}

impl CommandOutput {
    fn render(self) -> Result<String, ApiError> {
        match self {
            CommandOutput::Json(value) => serde_json::to_string_pretty(&value)
                .map_err(|e| ApiError::InvalidResponse(format!("Failed to render output: {}", e))),
            CommandOutput::Toml(text) => Ok(text),
        }
    }
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Healthz => "healthz",
            Commands::Me => "me",
            Commands::Leaderboard { .. } => "leaderboard",
            Commands::DeviceStart { .. } => "device-start",
            Commands::DevicePoll { .. } => "device-poll",
            Commands::Dice { .. } => "dice",
            Commands::Slots { .. } => "slots",
            Commands::PokerTables => "poker-tables",
            Commands::PokerJoin { .. } => "poker-join",
            Commands::PokerState { .. } => "poker-state",
            Commands::PokerAct { .. } => "poker-act",
            Commands::PokerLeave { .. } => "poker-leave",
            Commands::PokerHand { .. } => "poker-hand",
            Commands::AgentAuth { .. } => "agent-auth",
            Commands::AgentShow { .. } => "agent-show",
            Commands::ConfigShow => "config-show",
        }
    }

    /// Commands that take part in session token resolution.
    fn uses_session(&self) -> bool {
        !matches!(
            self,
            Commands::AgentAuth { .. } | Commands::AgentShow { .. } | Commands::ConfigShow
        )
    }

    /// Commands whose output gets the best-effort `"as": <handle>` member.
    fn shows_handle(&self) -> bool {
        self.uses_session() && !matches!(self, Commands::Me | Commands::DevicePoll { .. })
    }
}

/// Everything a command needs: config, credential store and remote client.
pub struct CliContext {
    config: ClawsinoConfig,
    log_overrides: LogOverrides,
    repository: Arc<dyn CredentialRepository>,
    remote: Arc<dyn RemoteApi>,
    explicit_token: String,
    agent: Option<String>,
}

impl CliContext {
    /// Build the context from parsed arguments: config, store path and HTTP client.
    pub fn new(cli: &Cli) -> Result<Self, ApiError> {
        let config = ConfigLoader::load_optional(cli.config.as_deref())?;
        let base_url = cli
            .base
            .clone()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| config.base_url.clone());
        let credentials_path =
            resolve_credentials_path(cli.credentials.clone(), config.credentials_file.clone())?;
        let remote = HttpRemoteClient::new(&base_url, Duration::from_secs(config.timeout_secs))?;

        let mut config = config;
        config.base_url = base_url;
        config.credentials_file = Some(credentials_path.clone());

        let mut context = Self::with_parts(
            config,
            Arc::new(FileCredentialRepository::new(credentials_path)),
            Arc::new(remote),
        )
        .with_session(cli.token.clone(), cli.agent.clone());
        context.log_overrides = cli.log_overrides();
        Ok(context)
    }

    /// Assemble a context from explicit parts.
    pub fn with_parts(
        config: ClawsinoConfig,
        repository: Arc<dyn CredentialRepository>,
        remote: Arc<dyn RemoteApi>,
    ) -> Self {
        Self {
            config,
            log_overrides: LogOverrides::default(),
            repository,
            remote,
            explicit_token: String::new(),
            agent: None,
        }
    }

    pub fn with_session(
        mut self,
        explicit_token: impl Into<String>,
        agent: Option<String>,
    ) -> Self {
        self.explicit_token = explicit_token.into();
        self.agent = agent;
        self
    }

    pub fn config(&self) -> &ClawsinoConfig {
        &self.config
    }

    pub fn log_overrides(&self) -> &LogOverrides {
        &self.log_overrides
    }

    /// Run one command to completion and return its rendered output.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))?;
        runtime.block_on(self.execute_async(command))?.render()
    }

    async fn execute_async(&self, command: &Commands) -> Result<CommandOutput, ApiError> {
        debug!(command = command.name(), "Executing command");
        let token = if command.uses_session() {
            self.session_token().await?
        } else {
            None
        };

        let mut output = self.run(command, token.as_deref()).await?;

        if let (Some(token), true) = (token.as_deref(), command.shows_handle()) {
            if let Some(handle) = self.current_handle(token).await {
                if let CommandOutput::Json(Value::Object(map)) = &mut output {
                    map.insert("as".to_string(), Value::String(handle));
                }
            }
        }
        Ok(output)
    }

    async fn run(
        &self,
        command: &Commands,
        token: Option<&str>,
    ) -> Result<CommandOutput, ApiError> {
        let request: ApiRequest = match command {
            Commands::Healthz => endpoints::healthz(),
            Commands::Me => endpoints::me(require_token(token, "me")?),
            Commands::Leaderboard { limit } => endpoints::leaderboard(*limit),
            Commands::DeviceStart {
                client_name,
                handle,
            } => {
                let started = start_device_link(
                    self.repository.as_ref(),
                    self.remote.as_ref(),
                    handle_arg(handle)?,
                    client_name,
                )
                .await?;
                return Ok(CommandOutput::Json(started.into_output()));
            }
            Commands::DevicePoll { device_code } => {
                let polled = poll_device_link(self.remote.as_ref(), device_code).await?;
                return Ok(CommandOutput::Json(polled));
            }
            Commands::Dice {
                amount,
                mode,
                threshold,
                edge_bps,
                client_seed,
            } => {
                let bet = DiceBet {
                    amount: *amount,
                    mode: mode.as_str().to_string(),
                    threshold: *threshold,
                    edge_bps: *edge_bps,
                    client_seed: client_seed.clone(),
                };
                endpoints::dice_bet(require_token(token, "dice")?, &bet)
            }
            Commands::Slots { amount } => {
                endpoints::slots_spin(require_token(token, "slots")?, *amount)
            }
            Commands::PokerTables => endpoints::poker_tables(require_token(token, "poker")?),
            Commands::PokerJoin {
                table,
                buy_in,
                seat,
            } => endpoints::poker_join(require_token(token, "poker")?, table, *buy_in, *seat),
            Commands::PokerState { table } => {
                endpoints::poker_state(require_token(token, "poker")?, table)
            }
            Commands::PokerAct { table, action } => {
                endpoints::poker_act(require_token(token, "poker")?, table, action.as_str())
            }
            Commands::PokerLeave { table } => {
                endpoints::poker_leave(require_token(token, "poker")?, table)
            }
            Commands::PokerHand { hand } => {
                endpoints::poker_hand(require_token(token, "poker")?, hand)
            }
            Commands::AgentAuth { handle } => {
                let outcome = self.authenticator().login(handle_arg(handle)?).await?;
                return serde_json::to_value(outcome)
                    .map(CommandOutput::Json)
                    .map_err(|e| ApiError::InvalidResponse(e.to_string()));
            }
            Commands::AgentShow { handle } => {
                return self.agent_show(handle_arg(handle)?).map(CommandOutput::Json);
            }
            Commands::ConfigShow => {
                return toml::to_string_pretty(&self.config)
                    .map(CommandOutput::Toml)
                    .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e)));
            }
        };

        self.remote.call(request).await.map(CommandOutput::Json)
    }

    fn authenticator(&self) -> Authenticator<'_> {
        Authenticator::new(self.repository.as_ref(), self.remote.as_ref())
    }

    /// Resolve the bearer token; re-authenticates an expired agent session when configured to.
    async fn session_token(&self) -> Result<Option<String>, ApiError> {
        let resolver = SessionTokenResolver::new(self.repository.as_ref());
        let resolved = match resolver.resolve(&self.explicit_token, self.agent.as_deref())? {
            Some(resolved) => resolved,
            None => return Ok(None),
        };

        if self.config.reauth_expired && resolved.is_expired_at(Utc::now()) {
            if let Some(handle) = resolved.agent_handle() {
                info!(handle, "Stored session expired, re-authenticating");
                let outcome = self.authenticator().login(handle).await?;
                return Ok(Some(outcome.session.session_token));
            }
        }
        Ok(Some(resolved.token))
    }

    /// Cosmetic lookup; any failure is logged and ignored.
    async fn current_handle(&self, token: &str) -> Option<String> {
        match self.remote.call(endpoints::me(token)).await {
            Ok(me) => me
                .get("handle")
                .and_then(Value::as_str)
                .filter(|h| !h.is_empty())
                .map(str::to_string),
            Err(e) => {
                debug!("Handle lookup failed: {}", e);
                None
            }
        }
    }

    fn agent_show(&self, handle: &str) -> Result<Value, ApiError> {
        let store = self.repository.load()?;
        let identity = store
            .agent(handle)
            .ok_or_else(|| ApiError::UnknownAgent(handle.to_string()))?;

        let expires_at = identity.last_session_expires_at.trim();
        let expired = DateTime::parse_from_rfc3339(expires_at)
            .ok()
            .map(|expiry| expiry.with_timezone(&Utc) <= Utc::now());

        Ok(json!({
            "handle": handle,
            "publicKey": identity.public_key,
            "hasSession": !identity.last_session_token.trim().is_empty(),
            "sessionExpiresAt": (!expires_at.is_empty()).then_some(expires_at),
            "sessionExpired": expired,
            "credentials": self.repository.path().display().to_string(),
        }))
    }
}
