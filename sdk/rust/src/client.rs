use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyWalletRequest {
    pub address: String,
    pub message: String,
    pub signature: String, // 0x-prefixed 65-byte hex
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyWalletResponse {
    pub valid: bool,
    pub recovered: String,
    pub original: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecryptKeystoreRequest {
    pub keystore: serde_json::Value,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecryptKeystoreResponse {
    pub address: String,
    pub private_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionLog {
    pub tx_hash: String,
    pub network: String,
    pub from: String,
    pub to: String,
    pub amount: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogResponse {
    pub status: String,
    pub data: serde_json::Value,
}

pub struct WalletApiClient {
    client: Client,
    api_url: String,
}

impl WalletApiClient {
    pub fn new(api_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Check that the service is up.
    pub async fn ping(&self) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let resp = self.client.get(format!("{}/ping", self.api_url)).send().await?;
        read_json(resp).await
    }

    /// Check that `signature` over `message` was produced by `address`.
    pub async fn verify_wallet(
        &self,
        req: &VerifyWalletRequest,
    ) -> Result<VerifyWalletResponse, Box<dyn std::error::Error>> {
        self.post("/verify_wallet", req).await
    }

    /// Decrypt a Web3 Secret Storage keystore on the server.
    pub async fn decrypt_keystore(
        &self,
        req: &DecryptKeystoreRequest,
    ) -> Result<DecryptKeystoreResponse, Box<dyn std::error::Error>> {
        self.post("/decrypt_keystore", req).await
    }

    /// Record a sent transaction.
    pub async fn log_transaction(
        &self,
        log: &TransactionLog,
    ) -> Result<LogResponse, Box<dyn std::error::Error>> {
        self.post("/log_transaction", log).await
    }

    /// POST any JSON body, for requests the typed helpers cannot express.
    pub async fn post_raw(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        self.post(path, body).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .post(format!("{}{}", self.api_url, path))
            .json(body)
            .send()
            .await?;
        read_json(resp).await
    }
}

async fn read_json<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, Box<dyn std::error::Error>> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(format!("API returned error status {}: {}", status, text).into());
    }

    match serde_json::from_str::<T>(&text) {
        Ok(value) => Ok(value),
        Err(e) => Err(e.into()),
    }
}
