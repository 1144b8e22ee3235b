//! Wallet-utility API over a real socket, driven through the SDK client.

mod common;

use alloy::signers::{local::PrivateKeySigner, Signer};
use multisend_sdk::{DecryptKeystoreRequest, TransactionLog, VerifyWalletRequest, WalletApiClient};
use serde_json::json;

use common::*;

async fn signed(message: &str) -> (String, String) {
    let signer: PrivateKeySigner = SENDER_KEY.parse().unwrap();
    let signature = signer.sign_message(message.as_bytes()).await.unwrap();
    (
        signer.address().to_string(),
        alloy::hex::encode_prefixed(signature.as_bytes()),
    )
}

#[tokio::test]
async fn test_ping_and_home() {
    let (url, shutdown) = start_api().await;
    let client = WalletApiClient::new(&url);

    let pong = client.ping().await.unwrap();
    assert_eq!(pong["status"], "ok");

    let home: serde_json::Value = reqwest::get(format!("{url}/")).await.unwrap().json().await.unwrap();
    assert!(home["message"].is_string());
    assert_eq!(home["next_step"], "Connect your wallet to begin.");

    shutdown.trigger();
}

#[tokio::test]
async fn test_networks_lists_defaults() {
    let (url, shutdown) = start_api().await;

    let networks: serde_json::Value = reqwest::get(format!("{url}/networks"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<_> = networks
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["BNB Chain", "Base", "Ethereum"]);
    assert_eq!(networks[1]["chain_id"], 8453);

    shutdown.trigger();
}

#[tokio::test]
async fn test_verify_wallet() {
    let (url, shutdown) = start_api().await;
    let client = WalletApiClient::new(&url);
    let (address, signature) = signed("Sign in to multisend").await;

    // Address case does not matter.
    let ok = client
        .verify_wallet(&VerifyWalletRequest {
            address: address.to_lowercase(),
            message: "Sign in to multisend".to_string(),
            signature: signature.clone(),
        })
        .await
        .unwrap();
    assert!(ok.valid);
    assert_eq!(ok.recovered, address);
    assert_eq!(ok.original, address.to_lowercase());

    let other = client
        .verify_wallet(&VerifyWalletRequest {
            address: RECIPIENT_B.to_string(),
            message: "Sign in to multisend".to_string(),
            signature: signature.clone(),
        })
        .await
        .unwrap();
    assert!(!other.valid);
    assert_eq!(other.recovered, address);

    let tampered = client
        .verify_wallet(&VerifyWalletRequest {
            address: address.clone(),
            message: "Sign in to something else".to_string(),
            signature,
        })
        .await
        .unwrap();
    assert!(!tampered.valid);

    shutdown.trigger();
}

#[tokio::test]
async fn test_verify_wallet_errors() {
    let (url, shutdown) = start_api().await;
    let client = WalletApiClient::new(&url);

    let err = client
        .post_raw("/verify_wallet", &json!({ "address": RECIPIENT_A, "message": "hi" }))
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("400"), "{err}");
    assert!(err.contains("Missing fields: address, message, or signature"), "{err}");

    let err = client
        .verify_wallet(&VerifyWalletRequest {
            address: RECIPIENT_A.to_string(),
            message: "hi".to_string(),
            signature: "0x1234".to_string(),
        })
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("400"), "{err}");
    assert!(err.contains("error"), "{err}");

    shutdown.trigger();
}

#[tokio::test]
async fn test_decrypt_keystore() {
    let (url, shutdown) = start_api().await;
    let client = WalletApiClient::new(&url);
    let keystore: serde_json::Value = serde_json::from_str(FIXTURE_KEYSTORE).unwrap();

    let decrypted = client
        .decrypt_keystore(&DecryptKeystoreRequest {
            keystore: keystore.clone(),
            password: FIXTURE_PASSWORD.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(decrypted.address, FIXTURE_ADDRESS);
    assert_eq!(decrypted.private_key, FIXTURE_PRIVATE_KEY);

    // A keystore sent as a JSON string works too.
    let as_string = client
        .decrypt_keystore(&DecryptKeystoreRequest {
            keystore: json!(FIXTURE_KEYSTORE),
            password: FIXTURE_PASSWORD.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(as_string.address, FIXTURE_ADDRESS);

    let err = client
        .decrypt_keystore(&DecryptKeystoreRequest {
            keystore,
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("400"), "{err}");

    shutdown.trigger();
}

#[tokio::test]
async fn test_decrypt_keystore_missing_fields() {
    let (url, shutdown) = start_api().await;
    let client = WalletApiClient::new(&url);

    for body in [
        json!({ "password": "pw" }),
        json!({ "keystore": { "version": 3 } }),
        json!({ "keystore": {}, "password": "pw" }),
    ] {
        let err = client
            .post_raw("/decrypt_keystore", &body)
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("Missing keystore or password"), "{body}: {err}");
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_log_transaction() {
    let (url, shutdown) = start_api().await;
    let client = WalletApiClient::new(&url);

    let log = TransactionLog {
        tx_hash: format!("0x{}", "ab".repeat(32)),
        network: "Base".to_string(),
        from: RECIPIENT_A.to_string(),
        to: RECIPIENT_B.to_string(),
        amount: "0.01".to_string(),
    };
    let response = client.log_transaction(&log).await.unwrap();
    assert_eq!(response.status, "logged");
    assert_eq!(response.data["network"], "Base");
    assert_eq!(response.data["amount"], "0.01");

    let err = client
        .post_raw("/log_transaction", &json!({ "tx_hash": "0x01", "network": "Base", "from": "", "to": "0x02", "amount": "1" }))
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("Missing one or more required fields"), "{err}");

    shutdown.trigger();
}

#[tokio::test]
async fn test_cors_and_request_id_headers() {
    let (url, shutdown) = start_api().await;

    let response = reqwest::Client::new()
        .get(format!("{url}/ping"))
        .header("origin", "https://example.com")
        .send()
        .await
        .unwrap();
    assert!(response.headers().contains_key("access-control-allow-origin"));
    assert!(response.headers().contains_key("x-request-id"));

    shutdown.trigger();
}
