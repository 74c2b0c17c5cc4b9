//! Checkout flow demo.
//!
//! Runs both ends of the bridge in one process with a simulated vendor SDK
//! that finishes loading after a short delay, then walks through a typical
//! card checkout.
//!
//! Run with: cargo run --example checkout_flow -- [--debug]

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sdk_bridge::server::{FunctionTable, VendorError, VendorSlot, vendor_fn};
use sdk_bridge::transport::memory::{self, Delivery};
use sdk_bridge::{BridgeClient, BridgeConfig, BridgeServer, ServerConfig};
use serde_json::json;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Simulated Vendor
// ============================================================================

fn simulated_sdk() -> FunctionTable {
    FunctionTable::new()
        .with_function(
            "initialize",
            vendor_fn(|_| async { Ok(json!({"status": "initialized"})) }),
        )
        .with_function(
            "getCards",
            vendor_fn(|_| async {
                Ok(json!([
                    {"srcDigitalCardId": "card-1", "panLastFour": "4242"},
                    {"srcDigitalCardId": "card-2", "panLastFour": "5454"}
                ]))
            }),
        )
        .with_function(
            "validate",
            vendor_fn(|args| async move {
                match args.first().and_then(|otp| otp.as_str()) {
                    Some("123456") => Ok(json!({"idToken": "token-abc"})),
                    _ => Err(VendorError::message("Invalid OTP")),
                }
            }),
        )
        .with_function(
            "checkout",
            vendor_fn(|args| async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(json!({"checkoutActionCode": "COMPLETE", "card": args.first()}))
            }),
        )
}

// ============================================================================
// Main
// ============================================================================

fn init_logging(debug: bool) {
    let filter = if debug {
        "sdk_bridge=trace"
    } else {
        "sdk_bridge=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let debug = std::env::args().any(|arg| arg == "--debug");
    init_logging(debug);

    let (host, embedded) = memory::pair(Delivery::default());

    // Embedded side: the vendor script "loads" after 1.2s.
    let slot = VendorSlot::new();
    let server = BridgeServer::with_config(ServerConfig::new(), slot.clone());
    tokio::spawn(server.run(embedded.into_channel()));
    tokio::spawn({
        let slot = slot.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(1_200)).await;
            slot.install(Arc::new(simulated_sdk()));
        }
    });

    // Host side.
    let config = BridgeConfig::builder()
        .on_sdk_ready(|methods| println!("SDK ready with {} methods: {methods:?}", methods.len()))
        .on_error(|err| eprintln!("bridge error: {err}"))
        .build()?;
    let client = BridgeClient::new(config);
    println!("Mount web view with style: {}", client.surface().style.to_css());
    client.attach(host.into_channel())?;

    client
        .wait_ready()
        .await
        .context("vendor SDK never became ready")?;

    client.call_function("initialize", vec![json!({"dpaId": "demo"})]).await?;
    let cards = client
        .call_function("getCards", vec![])
        .await
        .context("getCards failed")?;
    println!("Cards: {cards}");

    match client.call_function("validate", vec![json!("000000")]).await {
        Ok(_) => println!("Unexpected OTP acceptance"),
        Err(err) => println!("OTP rejected: {err}"),
    }
    let token = client.call_function("validate", vec![json!("123456")]).await?;
    println!("OTP accepted: {token}");

    let result = client
        .call_function("checkout", vec![json!("card-1")])
        .await?;
    println!("Checkout: {result}");

    client.shutdown();
    Ok(())
}
