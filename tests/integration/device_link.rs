//! Device linking keeps one pseudo public key per device handle.

use super::support::{parse_output, ScriptedRemote, Workspace};
use clawsino::credentials::CredentialRepository;
use clawsino::tooling::Commands;
use serde_json::json;

fn device_start(handle: &str) -> Commands {
    Commands::DeviceStart {
        client_name: "openclaw".to_string(),
        handle: handle.to_string(),
    }
}

#[test]
fn repeated_start_reuses_persisted_key() {
    let workspace = Workspace::new();
    let remote = ScriptedRemote::casino();
    let context = workspace.context(remote.clone());

    let first = parse_output(&context.execute(&device_start("openclaw-bot")).unwrap());
    let second = parse_output(&context.execute(&device_start("openclaw-bot")).unwrap());
    assert_eq!(first["publicKey"], second["publicKey"]);

    let store = workspace.repository().load().unwrap();
    let stored = &store.device("openclaw-bot").unwrap().public_key;
    assert_eq!(first["publicKey"], stored.as_str());

    let starts = remote.find("/v1/device/start");
    assert_eq!(starts.len(), 2);
    assert_eq!(
        starts[0].body,
        Some(json!({
            "publicKey": stored,
            "clientName": "openclaw",
            "requestedHandle": "openclaw-bot",
        }))
    );
    assert_eq!(starts[0].body, starts[1].body);
}

#[test]
fn distinct_device_handles_get_distinct_keys() {
    let workspace = Workspace::new();
    let context = workspace.context(ScriptedRemote::casino());

    context.execute(&device_start("bot-a")).unwrap();
    context.execute(&device_start("bot-b")).unwrap();

    let store = workspace.repository().load().unwrap();
    assert_eq!(store.devices.len(), 2);
    assert_ne!(store.device("bot-a"), store.device("bot-b"));
    assert!(store.agents.is_empty());
}

#[test]
fn device_start_preserves_agent_identities() {
    let workspace = Workspace::new();
    let context = workspace.context(ScriptedRemote::casino());
    context
        .execute(&Commands::AgentAuth {
            handle: "pokerstar".to_string(),
        })
        .unwrap();
    let before = workspace.repository().load().unwrap();

    context.execute(&device_start("openclaw-bot")).unwrap();

    let after = workspace.repository().load().unwrap();
    assert_eq!(before.agents, after.agents);
    assert!(after.device("openclaw-bot").is_some());
}

#[test]
fn device_and_agent_namespaces_are_separate() {
    let workspace = Workspace::new();
    let context = workspace.context(ScriptedRemote::casino());
    context
        .execute(&Commands::AgentAuth {
            handle: "shared".to_string(),
        })
        .unwrap();
    context.execute(&device_start("shared")).unwrap();

    let store = workspace.repository().load().unwrap();
    assert_ne!(
        store.agent("shared").unwrap().public_key,
        store.device("shared").unwrap().public_key
    );
}

#[test]
fn padded_device_handle_reuses_trimmed_key() {
    let workspace = Workspace::new();
    let remote = ScriptedRemote::casino();
    let context = workspace.context(remote.clone());

    let first = parse_output(&context.execute(&device_start("openclaw-bot")).unwrap());
    let padded = parse_output(&context.execute(&device_start("  openclaw-bot ")).unwrap());
    assert_eq!(first["publicKey"], padded["publicKey"]);

    let store = workspace.repository().load().unwrap();
    assert_eq!(store.devices.len(), 1);
    assert_eq!(
        remote.find("/v1/device/start")[1].body.as_ref().unwrap()["requestedHandle"],
        "openclaw-bot"
    );
}

#[test]
fn device_poll_forwards_code_without_touching_store() {
    let workspace = Workspace::new();
    let remote = ScriptedRemote::new(|_| Ok(json!({ "status": "pending" })));

    let output = workspace
        .context(remote.clone())
        .execute(&Commands::DevicePoll {
            device_code: "d1".to_string(),
        })
        .unwrap();

    assert_eq!(parse_output(&output), json!({ "status": "pending" }));
    assert_eq!(
        remote.find("/v1/device/poll")[0].body,
        Some(json!({ "deviceCode": "d1" }))
    );
    assert!(!workspace.credentials_path().exists());
}
