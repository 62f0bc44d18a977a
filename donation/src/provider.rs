//! Wallet provider JSON-RPC client
//!
//! Talks JSON-RPC 2.0 over HTTP to a wallet that exposes the EIP-1193
//! method set (e.g. Frame on `http://127.0.0.1:1248`). The wallet holds the
//! keys: account access, signing and broadcast all happen on its side.

use alloy_primitives::{hex, U256};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::address::{parse_address, Address, AddressError};

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// EIP-1193 "User Rejected Request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// JSON-RPC 2.0 request
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// How long to wait for a transaction to be mined.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Transaction handed to the wallet for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    pub from: Address,
    pub to: Address,
    /// Value in wei.
    pub value: U256,
    pub data: Vec<u8>,
}

impl TxRequest {
    fn to_json(&self) -> serde_json::Value {
        let mut tx = serde_json::json!({
            "from": self.from.to_string(),
            "to": self.to.to_string(),
            "data": hex::encode_prefixed(&self.data),
        });
        if !self.value.is_zero() {
            tx["value"] = serde_json::Value::String(to_quantity(self.value));
        }
        tx
    }
}

/// Mined transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub block_number: Option<u64>,
    pub success: bool,
}

#[derive(Debug, Clone)]
pub struct RpcProvider {
    endpoint: String,
    client: Client,
    receipts: ReceiptPolicy,
}

impl RpcProvider {
    pub fn new(endpoint: impl Into<String>, receipts: ReceiptPolicy) -> Result<Self, ProviderError> {
        let endpoint = endpoint.into();
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        log::info!("📡 Wallet provider client initialized: {}", endpoint);

        Ok(Self {
            endpoint,
            client,
            receipts,
        })
    }

    /// Send a JSON-RPC 2.0 request and return the result
    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        log::debug!("→ RPC {}: {}", method, request.params);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::http(response.status().as_u16()));
        }

        let rpc_response: JsonRpcResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse JSON-RPC response: {}", e))
        })?;

        if let Some(error) = rpc_response.error {
            return Err(ProviderError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        // `null` is a legitimate result (pending receipt)
        Ok(rpc_response.result.unwrap_or(serde_json::Value::Null))
    }

    /// Ask the wallet for account access. May prompt the user.
    pub async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let result = self
            .rpc_call("eth_requestAccounts", serde_json::json!([]))
            .await?;
        let accounts = result
            .as_array()
            .ok_or_else(|| ProviderError::InvalidResponse("accounts is not an array".into()))?;

        accounts
            .iter()
            .map(|a| {
                let account = a.as_str().ok_or_else(|| {
                    ProviderError::InvalidResponse("account is not a string".into())
                })?;
                Ok(parse_address(account)?)
            })
            .collect()
    }

    /// Read-only contract call at the latest block.
    pub async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>, ProviderError> {
        let result = self
            .rpc_call(
                "eth_call",
                serde_json::json!([
                    { "to": to.to_string(), "data": hex::encode_prefixed(data) },
                    "latest"
                ]),
            )
            .await?;
        let hex_str = result
            .as_str()
            .ok_or_else(|| ProviderError::InvalidResponse("eth_call result is not a string".into()))?;
        Ok(hex::decode(hex_str)?)
    }

    /// Hand a transaction to the wallet for signing and broadcast.
    /// Returns the transaction hash.
    pub async fn send_transaction(&self, tx: &TxRequest) -> Result<String, ProviderError> {
        let result = self
            .rpc_call("eth_sendTransaction", serde_json::json!([tx.to_json()]))
            .await?;
        let hash = result
            .as_str()
            .ok_or_else(|| ProviderError::InvalidResponse("transaction hash is not a string".into()))?;
        log::info!("📤 Transaction submitted: {}", hash);
        Ok(hash.to_string())
    }

    /// Fetch a receipt; `None` while the transaction is still pending.
    pub async fn get_receipt(&self, tx_hash: &str) -> Result<Option<Receipt>, ProviderError> {
        let result = self
            .rpc_call("eth_getTransactionReceipt", serde_json::json!([tx_hash]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }

        let status = result
            .get("status")
            .and_then(|s| s.as_str())
            .map(parse_quantity)
            .transpose()?
            // Pre-Byzantium receipts carry no status field
            .unwrap_or(1);
        let block_number = result
            .get("blockNumber")
            .and_then(|b| b.as_str())
            .map(parse_quantity)
            .transpose()?;

        Ok(Some(Receipt {
            block_number,
            success: status == 1,
        }))
    }

    /// Poll for a receipt until mined, reverted, or the confirmation
    /// timeout elapses.
    pub async fn wait_for_receipt(&self, tx_hash: &str) -> Result<Receipt, ProviderError> {
        let poll = async {
            loop {
                if let Some(receipt) = self.get_receipt(tx_hash).await? {
                    return Ok::<Receipt, ProviderError>(receipt);
                }
                tokio::time::sleep(self.receipts.poll_interval).await;
            }
        };

        let receipt = tokio::time::timeout(self.receipts.timeout, poll)
            .await
            .map_err(|_| ProviderError::Timeout(self.receipts.timeout.as_secs()))??;

        if !receipt.success {
            return Err(ProviderError::Reverted(tx_hash.to_string()));
        }
        log::info!(
            "✅ Transaction {} confirmed in block {:?}",
            tx_hash,
            receipt.block_number
        );
        Ok(receipt)
    }
}

/// Encode an integer as a JSON-RPC quantity ("0x" + minimal hex).
pub fn to_quantity(v: U256) -> String {
    format!("{:#x}", v)
}

/// Parse a JSON-RPC quantity.
pub fn parse_quantity(s: &str) -> Result<u64, ProviderError> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| ProviderError::InvalidResponse(format!("quantity without 0x: {}", s)))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16)
        .map_err(|_| ProviderError::InvalidResponse(format!("invalid quantity: {}", s)))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid hex data: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Invalid address: {0}")]
    Address(#[from] AddressError),

    #[error("Transaction {0} reverted")]
    Reverted(String),

    #[error("No confirmation after {0}s")]
    Timeout(u64),
}

impl ProviderError {
    pub fn http(status: u16) -> Self {
        let message = match status {
            400 => "Bad Request",
            401 => "Unauthorized",
            404 => "Not Found",
            500 => "Internal Server Error",
            503 => "Service Unavailable",
            _ => "Unknown Error",
        };
        Self::Http(status, message.to_string())
    }

    /// Whether the wallet reports that the user declined the request.
    pub fn is_user_rejection(&self) -> bool {
        match self {
            Self::Rpc { code, message } => {
                let message = message.to_lowercase();
                *code == USER_REJECTED_CODE
                    || message.contains("user rejected")
                    || message.contains("user denied")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ACCOUNT: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

    fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": result,
        }))
    }

    fn rpc_error(code: i64, message: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": code, "message": message },
        }))
    }

    fn fast_receipts() -> ReceiptPolicy {
        ReceiptPolicy {
            poll_interval: Duration::from_millis(10),
            timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn test_quantity_encoding() {
        assert_eq!(to_quantity(U256::ZERO), "0x0");
        assert_eq!(to_quantity(U256::from(255u64)), "0xff");
        assert_eq!(to_quantity(U256::MAX), format!("0x{}", "f".repeat(64)));
        assert_eq!(parse_quantity("0x1").unwrap(), 1);
        assert_eq!(parse_quantity("0x").unwrap(), 0);
        assert!(parse_quantity("12").is_err());
    }

    #[test]
    fn test_tx_request_json_omits_zero_value() {
        let addr = parse_address(ACCOUNT).unwrap();
        let tx = TxRequest {
            from: addr,
            to: addr,
            value: U256::ZERO,
            data: vec![0xab, 0xcd],
        };
        let json = tx.to_json();
        assert_eq!(json["data"], "0xabcd");
        assert!(json.get("value").is_none());

        let paid = TxRequest {
            value: U256::from(16u64),
            ..tx
        };
        assert_eq!(paid.to_json()["value"], "0x10");
    }

    #[test]
    fn test_user_rejection_classification() {
        let rejected = ProviderError::Rpc {
            code: 4001,
            message: "User rejected the request.".into(),
        };
        assert!(rejected.is_user_rejection());

        let denied = ProviderError::Rpc {
            code: -32603,
            message: "MetaMask Tx Signature: User denied transaction signature.".into(),
        };
        assert!(denied.is_user_rejection());

        let other = ProviderError::Rpc {
            code: -32000,
            message: "insufficient funds for gas".into(),
        };
        assert!(!other.is_user_rejection());
        assert!(!ProviderError::Timeout(5).is_user_rejection());
    }

    #[tokio::test]
    async fn test_request_accounts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "method": "eth_requestAccounts" })))
            .respond_with(rpc_result(serde_json::json!([ACCOUNT])))
            .mount(&server)
            .await;

        let provider = RpcProvider::new(server.uri(), fast_receipts()).unwrap();
        let accounts = provider.request_accounts().await.unwrap();
        assert_eq!(accounts, vec![parse_address(ACCOUNT).unwrap()]);
    }

    #[tokio::test]
    async fn test_call_decodes_hex_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "method": "eth_call" })))
            .respond_with(rpc_result(serde_json::json!("0x00ff")))
            .mount(&server)
            .await;

        let provider = RpcProvider::new(server.uri(), fast_receipts()).unwrap();
        let to = parse_address(ACCOUNT).unwrap();
        assert_eq!(provider.call(&to, &[0x01]).await.unwrap(), vec![0x00, 0xff]);
    }

    #[tokio::test]
    async fn test_rpc_error_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(rpc_error(4001, "User rejected the request."))
            .mount(&server)
            .await;

        let provider = RpcProvider::new(server.uri(), fast_receipts()).unwrap();
        let err = provider.request_accounts().await.unwrap_err();
        assert!(err.is_user_rejection());
    }

    #[tokio::test]
    async fn test_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = RpcProvider::new(server.uri(), fast_receipts()).unwrap();
        let err = provider.request_accounts().await.unwrap_err();
        assert!(matches!(err, ProviderError::Http(503, _)));
    }

    #[tokio::test]
    async fn test_wait_for_receipt_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(
                serde_json::json!({ "method": "eth_getTransactionReceipt" }),
            ))
            .respond_with(rpc_result(serde_json::json!({
                "status": "0x1",
                "blockNumber": "0x10",
            })))
            .mount(&server)
            .await;

        let provider = RpcProvider::new(server.uri(), fast_receipts()).unwrap();
        let receipt = provider.wait_for_receipt("0xabc").await.unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.block_number, Some(16));
    }

    #[tokio::test]
    async fn test_wait_for_receipt_reverted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(rpc_result(serde_json::json!({
                "status": "0x0",
                "blockNumber": "0x10",
            })))
            .mount(&server)
            .await;

        let provider = RpcProvider::new(server.uri(), fast_receipts()).unwrap();
        let err = provider.wait_for_receipt("0xabc").await.unwrap_err();
        assert!(matches!(err, ProviderError::Reverted(_)));
    }

    #[tokio::test]
    async fn test_wait_for_receipt_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(rpc_result(serde_json::Value::Null))
            .mount(&server)
            .await;

        let provider = RpcProvider::new(server.uri(), fast_receipts()).unwrap();
        let err = provider.wait_for_receipt("0xabc").await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
    }
}
