//! Wallet-utility endpoints.
//!
//! Bodies are read as loose JSON so that a missing field produces the
//! endpoint's own 400 message instead of a generic deserialization error.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};

use crate::blockchain::{verify_message, SigningKey};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::network::NetworkProfile;

pub const MISSING_VERIFY_FIELDS: &str = "Missing fields: address, message, or signature";
pub const MISSING_KEYSTORE_FIELDS: &str = "Missing keystore or password";
pub const MISSING_LOG_FIELDS: &str = "Missing one or more required fields";

const LOG_FIELDS: [&str; 5] = ["tx_hash", "network", "from", "to", "amount"];

pub async fn home() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the multisend wallet API",
        "next_step": "Connect your wallet to begin."
    }))
}

pub async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "API is running" }))
}

pub async fn networks(State(state): State<AppState>) -> Json<Vec<NetworkProfile>> {
    Json(state.catalog.list())
}

pub async fn verify_wallet(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;
    let (Some(address), Some(message), Some(signature)) = (
        non_empty_str(&body, "address"),
        non_empty_str(&body, "message"),
        non_empty_str(&body, "signature"),
    ) else {
        return Err(ApiError::bad_request(MISSING_VERIFY_FIELDS));
    };

    let check = verify_message(address, message, signature)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    tracing::debug!(claimed = %address, recovered = %check.recovered, valid = check.valid, "Signature verified");

    Ok(Json(json!({
        "valid": check.valid,
        "recovered": check.recovered.to_string(),
        "original": address,
    })))
}

pub async fn decrypt_keystore(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(mut body) = payload?;
    let keystore = body
        .get_mut("keystore")
        .map(Value::take)
        .filter(is_truthy);
    let password = non_empty_str(&body, "password").map(str::to_owned);
    let (Some(keystore), Some(password)) = (keystore, password) else {
        return Err(ApiError::bad_request(MISSING_KEYSTORE_FIELDS));
    };

    // Key derivation is CPU-bound.
    let key = tokio::task::spawn_blocking(move || SigningKey::from_keystore_json(&keystore, &password))
        .await
        .map_err(|e| ApiError::Internal(format!("Keystore worker failed: {e}")))?
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    tracing::info!(address = %key.address(), "Keystore decrypted");

    Ok(Json(json!({
        "address": key.address().to_string(),
        "private_key": key.private_key_hex(),
    })))
}

pub async fn log_transaction(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;
    let complete = LOG_FIELDS
        .iter()
        .all(|field| body.get(*field).is_some_and(is_truthy));
    if !complete {
        return Err(ApiError::bad_request(MISSING_LOG_FIELDS));
    }

    tracing::info!(
        tx_hash = %body["tx_hash"],
        network = %body["network"],
        from = %body["from"],
        to = %body["to"],
        amount = %body["amount"],
        "Transaction logged"
    );

    Ok(Json(json!({ "status": "logged", "data": body })))
}

fn non_empty_str<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// JSON truthiness: null, false, zero and empty values are missing.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
