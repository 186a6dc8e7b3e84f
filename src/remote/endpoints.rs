//! Request builders for the service's endpoints.

use super::ApiRequest;
use serde_json::{json, Map, Value};

pub fn healthz() -> ApiRequest {
    ApiRequest::get("/healthz")
}

pub fn me(token: &str) -> ApiRequest {
    ApiRequest::get("/v1/me").with_bearer(token)
}

pub fn leaderboard(limit: u32) -> ApiRequest {
    ApiRequest::get(format!("/v1/leaderboard?limit={}", limit))
}

pub fn agent_register(handle: &str) -> ApiRequest {
    ApiRequest::post("/v1/agent/register", json!({ "handle": handle }))
}

pub fn agent_verify(challenge_id: &str, public_key: &str, signature: &str) -> ApiRequest {
    ApiRequest::post(
        "/v1/agent/verify",
        json!({
            "challengeId": challenge_id,
            "publicKey": public_key,
            "signature": signature,
        }),
    )
}

pub fn device_start(public_key: &str, client_name: &str, requested_handle: &str) -> ApiRequest {
    ApiRequest::post(
        "/v1/device/start",
        json!({
            "publicKey": public_key,
            "clientName": client_name,
            "requestedHandle": requested_handle,
        }),
    )
}

pub fn device_poll(device_code: &str) -> ApiRequest {
    ApiRequest::post("/v1/device/poll", json!({ "deviceCode": device_code }))
}

/// Dice bet parameters; optional members are omitted from the body when unset.
#[derive(Debug, Clone)]
pub struct DiceBet {
    pub amount: u64,
    pub mode: String,
    pub threshold: f64,
    pub edge_bps: Option<u32>,
    pub client_seed: Option<String>,
}

pub fn dice_bet(token: &str, bet: &DiceBet) -> ApiRequest {
    let mut body = Map::new();
    body.insert("amount".to_string(), json!(bet.amount));
    body.insert("mode".to_string(), json!(bet.mode));
    body.insert("threshold".to_string(), json!(bet.threshold));
    if let Some(edge_bps) = bet.edge_bps {
        body.insert("edgeBps".to_string(), json!(edge_bps));
    }
    if let Some(seed) = bet.client_seed.as_deref().filter(|s| !s.is_empty()) {
        body.insert("clientSeed".to_string(), json!(seed));
    }
    ApiRequest::post("/v1/dice/bet", Value::Object(body)).with_bearer(token)
}

pub fn slots_spin(token: &str, amount: u64) -> ApiRequest {
    ApiRequest::post("/v1/slots/spin", json!({ "amount": amount })).with_bearer(token)
}

pub fn poker_tables(token: &str) -> ApiRequest {
    ApiRequest::get("/v1/poker/tables").with_bearer(token)
}

/// Seat 0 means "let the server pick" and is not sent.
pub fn poker_join(token: &str, table: &str, buy_in: u64, seat: u32) -> ApiRequest {
    let mut body = json!({ "buyIn": buy_in });
    if seat != 0 {
        body["seat"] = json!(seat);
    }
    ApiRequest::post(format!("/v1/poker/tables/{}/join", table), body).with_bearer(token)
}

pub fn poker_state(token: &str, table: &str) -> ApiRequest {
    ApiRequest::get(format!("/v1/poker/tables/{}/state", table)).with_bearer(token)
}

pub fn poker_act(token: &str, table: &str, action: &str) -> ApiRequest {
    ApiRequest::post(
        format!("/v1/poker/tables/{}/act", table),
        json!({ "action": action }),
    )
    .with_bearer(token)
}

pub fn poker_leave(token: &str, table: &str) -> ApiRequest {
    ApiRequest::post(format!("/v1/poker/tables/{}/leave", table), json!({})).with_bearer(token)
}

pub fn poker_hand(token: &str, hand: &str) -> ApiRequest {
    ApiRequest::get(format!("/v1/poker/hands/{}", hand)).with_bearer(token)
}
