//! Diagnostic flow: build, sign, and submit one limit order, printing the
//! signature payload, the serialized envelope, and the response for manual
//! inspection.
//!
//! Credentials come from `CRYPTO_COM_API_KEY` / `CRYPTO_COM_SECRET_KEY`;
//! point `CRYPTO_COM_API_HOST` at the UAT sandbox before running this
//! against real keys.

use anyhow::Result;
use chrono::Utc;
use cryptocom_client_sdk::types::{
    ApiResponse, CreateOrderParams, CreateOrderResult, ExecInst, Side, TimeInForce,
};
use cryptocom_client_sdk::{ClientConfig, ExchangeClient, auth};
use rust_decimal_macros::dec;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ClientConfig::from_env()?;
    let client = ExchangeClient::new(config);

    let mut order = CreateOrderParams::limit("BTC_USDT", Side::Buy, dec!(31100.12), dec!(0.0001));
    order.client_oid = Some("my_order_0002".to_owned());
    order.time_in_force = Some(TimeInForce::GoodTillCancel);
    order.exec_inst = Some(ExecInst::PostOnly);

    let id = Utc::now().timestamp_millis();
    let signed = client.sign_request("private/create-order", order.into_params()?, id);

    println!("payload: {}", auth::signature_payload(&signed));
    println!("request: {}", serde_json::to_string_pretty(&signed)?);

    let response: ApiResponse<CreateOrderResult> = client.send(&signed).await?;
    println!("response: {response:?}");

    let result = response.into_result()?;
    println!("order_id: {}", result.order_id);

    Ok(())
}
