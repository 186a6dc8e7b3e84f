//! Bearer token selection and the "as" decoration through CliContext.

use super::support::{casino_response, http_error, parse_output, ScriptedRemote, Workspace};
use clawsino::config::ClawsinoConfig;
use clawsino::credentials::{AgentIdentity, CredentialRepository, CredentialStore};
use clawsino::error::ApiError;
use clawsino::identity::keys;
use clawsino::tooling::Commands;
use serde_json::json;

fn seed_agent(workspace: &Workspace, handle: &str, token: &str, expires_at: &str) {
    let keypair = keys::generate_keypair().unwrap();
    let mut store = CredentialStore::default();
    store.agents.insert(
        handle.to_string(),
        AgentIdentity {
            public_key: keypair.public_key,
            private_key_pkcs8: keypair.private_key_pkcs8,
            last_session_token: token.to_string(),
            last_session_expires_at: expires_at.to_string(),
        },
    );
    workspace.repository().save(&store).unwrap();
}

#[test]
fn explicit_token_wins_over_stored_agent_session() {
    let workspace = Workspace::new();
    seed_agent(&workspace, "pokerstar", "stored", "2099-01-01T00:00:00Z");
    let remote = ScriptedRemote::casino();

    workspace
        .context(remote.clone())
        .with_session("explicit", Some("pokerstar".to_string()))
        .execute(&Commands::Me)
        .unwrap();

    let me = remote.find("/v1/me");
    assert_eq!(me.len(), 1);
    assert_eq!(me[0].bearer.as_deref(), Some("explicit"));
}

#[test]
fn blank_explicit_token_falls_back_to_agent_session() {
    let workspace = Workspace::new();
    seed_agent(&workspace, "pokerstar", "stored", "2099-01-01T00:00:00Z");
    let remote = ScriptedRemote::casino();

    workspace
        .context(remote.clone())
        .with_session("   ", Some("pokerstar".to_string()))
        .execute(&Commands::Slots { amount: 5 })
        .unwrap();

    let spin = remote.find("/v1/slots/spin");
    assert_eq!(spin[0].bearer.as_deref(), Some("stored"));
    assert_eq!(spin[0].body, Some(json!({ "amount": 5 })));
}

#[test]
fn authenticated_command_without_any_token_fails_before_traffic() {
    let workspace = Workspace::new();
    let remote = ScriptedRemote::casino();

    let err = workspace
        .context(remote.clone())
        .execute(&Commands::Slots { amount: 5 })
        .unwrap_err();
    assert!(matches!(err, ApiError::TokenRequired(_)));
    assert!(remote.requests().is_empty());
}

#[test]
fn unknown_agent_without_token_counts_as_no_token() {
    let workspace = Workspace::new();
    let remote = ScriptedRemote::casino();

    let err = workspace
        .context(remote.clone())
        .with_session("", Some("ghost".to_string()))
        .execute(&Commands::Me)
        .unwrap_err();
    assert!(matches!(err, ApiError::TokenRequired(_)));
    assert!(remote.requests().is_empty());
}

#[test]
fn output_is_decorated_with_current_handle() {
    let workspace = Workspace::new();
    let remote = ScriptedRemote::casino();

    let output = workspace
        .context(remote.clone())
        .with_session("s1", None)
        .execute(&Commands::PokerTables)
        .unwrap();

    let value = parse_output(&output);
    assert_eq!(value["as"], "pokerstar");
    assert_eq!(value["ok"], true);
    assert_eq!(remote.paths(), vec!["/v1/poker/tables", "/v1/me"]);
}

#[test]
fn anonymous_command_skips_handle_lookup() {
    let workspace = Workspace::new();
    let remote = ScriptedRemote::casino();

    let output = workspace
        .context(remote.clone())
        .execute(&Commands::Healthz)
        .unwrap();
    let value = parse_output(&output);
    assert!(value.get("as").is_none());
    assert_eq!(remote.paths(), vec!["/healthz"]);
}

#[test]
fn failed_handle_lookup_is_ignored() {
    let workspace = Workspace::new();
    let remote = ScriptedRemote::new(|request| match request.path.as_str() {
        "/v1/me" => Err(http_error(request, 500, "boom")),
        _ => casino_response(request),
    });

    let output = workspace
        .context(remote)
        .with_session("s1", None)
        .execute(&Commands::Leaderboard { limit: 3 })
        .unwrap();
    let value = parse_output(&output);
    assert_eq!(value["ok"], true);
    assert!(value.get("as").is_none());
}

#[test]
fn expired_session_is_passed_through_by_default() {
    let workspace = Workspace::new();
    seed_agent(&workspace, "pokerstar", "old", "2000-01-01T00:00:00Z");
    let remote = ScriptedRemote::casino();

    workspace
        .context(remote.clone())
        .with_session("", Some("pokerstar".to_string()))
        .execute(&Commands::Me)
        .unwrap();

    assert_eq!(remote.paths(), vec!["/v1/me"]);
    assert_eq!(remote.find("/v1/me")[0].bearer.as_deref(), Some("old"));
}

#[test]
fn expired_session_is_renewed_when_reauth_enabled() {
    let workspace = Workspace::new();
    seed_agent(&workspace, "pokerstar", "old", "2000-01-01T00:00:00Z");
    let before = workspace.repository().load().unwrap();
    let remote = ScriptedRemote::casino();
    let config = ClawsinoConfig {
        reauth_expired: true,
        ..ClawsinoConfig::default()
    };

    workspace
        .context_with_config(config, remote.clone())
        .with_session("", Some("pokerstar".to_string()))
        .execute(&Commands::Me)
        .unwrap();

    assert_eq!(
        remote.paths(),
        vec!["/v1/agent/register", "/v1/agent/verify", "/v1/me"]
    );
    assert_eq!(remote.find("/v1/me")[0].bearer.as_deref(), Some("s1"));

    let after = workspace.repository().load().unwrap();
    let identity = after.agent("pokerstar").unwrap();
    assert_eq!(identity.last_session_token, "s1");
    assert_eq!(identity.public_key, before.agent("pokerstar").unwrap().public_key);
}

#[test]
fn explicit_token_is_never_renewed() {
    let workspace = Workspace::new();
    seed_agent(&workspace, "pokerstar", "old", "2000-01-01T00:00:00Z");
    let remote = ScriptedRemote::casino();
    let config = ClawsinoConfig {
        reauth_expired: true,
        ..ClawsinoConfig::default()
    };

    workspace
        .context_with_config(config, remote.clone())
        .with_session("explicit", Some("pokerstar".to_string()))
        .execute(&Commands::Me)
        .unwrap();

    assert_eq!(remote.paths(), vec!["/v1/me"]);
}

#[test]
fn config_show_renders_toml() {
    let workspace = Workspace::new();
    let remote = ScriptedRemote::casino();

    let output = workspace
        .context(remote.clone())
        .execute(&Commands::ConfigShow)
        .unwrap();
    assert!(output.contains("base_url = \"https://clawsino.anma-services.com\""));
    assert!(output.contains("credentials.json"));
    assert!(remote.requests().is_empty());
}
