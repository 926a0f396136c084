//! Shared fixtures for the cross-module tests: a mocked upstream API and a
//! config pointed at it.

use std::path::PathBuf;
use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::Config;
use crate::crawler::CrawlMode;
use crate::models::Address;

pub const SEED: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const NEIGHBOR: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

pub fn addr(tag: &str) -> Address {
    Address::normalize(tag)
}

pub fn test_config(server: &MockServer) -> Config {
    Config {
        root: PathBuf::from("unused"),
        node_count: 1,
        seed: addr(SEED),
        verbosity: 0,
        // A non-empty key lifts the inter-request pause, keeping tests fast.
        api_key: "test-key".to_string(),
        api_base_url: format!("{}/api", server.uri()),
        request_timeout: Duration::from_secs(5),
        retry_delay: Duration::from_millis(1),
        mode: CrawlMode::Expand,
    }
}

pub fn transfer_row(from: &str, to: &str) -> serde_json::Value {
    serde_json::json!({
        "blockNumber": "4730207",
        "timeStamp": "1513240363",
        "hash": "0xe8c208398bd5ae8e4c237658580db56a2a94dfa0ca382c99b776fa6e7d31d5b4",
        "nonce": "406",
        "blockHash": "0x022c5e6a3d2487a8ccf8946a2ffb74938bf8e5c8a3f6d91b41c56378a96b5c37",
        "from": from,
        "contractAddress": "0xcccccccccccccccccccccccccccccccccccccccc",
        "to": to,
        "value": "5901522149285533025181",
        "tokenName": "Example",
        "tokenSymbol": "EXM",
        "tokenDecimal": "18",
        "transactionIndex": "81",
        "gas": "940000",
        "gasPrice": "32010000000",
        "gasUsed": "77759",
        "cumulativeGasUsed": "2523379",
        "input": "deprecated",
        "confirmations": "7968350"
    })
}

pub async fn mount_token_tx(server: &MockServer, rows: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("action", "tokentx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "1",
            "message": "OK",
            "result": rows,
        })))
        .mount(server)
        .await;
}

pub async fn mount_get_code(server: &MockServer, code: &str) {
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("action", "eth_getCode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": code,
        })))
        .mount(server)
        .await;
}
