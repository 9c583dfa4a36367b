//! Wire types for v2 request and response envelopes.

use std::borrow::Cow;
use std::fmt;

use rust_decimal::Decimal;
use serde::ser::{Error as _, SerializeMap as _};
use serde::{Deserialize, Serialize, Serializer};

use crate::Result;
use crate::error::Error;

/// Scalar parameter value: text or a decimal number.
///
/// Numbers are normalized on construction so that the text the signer
/// consumes is the same text `serde_json` writes on the wire. The server
/// recomputes the tag from the transmitted values, so the two renderings
/// must never diverge.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParamValue {
    Text(String),
    Number(Decimal),
}

impl ParamValue {
    /// The exact text this value contributes to both the canonical
    /// signature string and the transmitted JSON.
    #[must_use]
    pub fn wire_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Number(number) => Cow::Owned(number.to_string()),
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Number(number) => {
                // Emit the signed text verbatim; a float detour would let
                // serde_json re-render small magnitudes as `1e-6` and break
                // server-side verification.
                let exact: serde_json::Number = number.to_string().parse().map_err(|_| {
                    S::Error::custom(format!("number {number} is not representable in JSON"))
                })?;
                exact.serialize(serializer)
            }
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Decimal> for ParamValue {
    fn from(value: Decimal) -> Self {
        // Normalized so equal decimals sign identically regardless of
        // trailing zeros.
        Self::Number(value.normalize())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Number(Decimal::from(value))
    }
}

/// Insertion-ordered parameter list.
///
/// An explicit pair list avoids any dependence on map iteration order; the
/// signer sorts its own copy of the keys.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RequestParams(Vec<(String, ParamValue)>);

impl RequestParams {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.push((key.into(), value.into()));
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl Serialize for RequestParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A v2 call envelope: constructed once, signed once, sent once.
#[derive(Clone, Debug, Serialize)]
pub struct ApiRequest {
    pub id: i64,
    pub method: String,
    pub api_key: String,
    pub params: RequestParams,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
}

impl ApiRequest {
    /// Stamps a new envelope. The v2 API carries both an `id` and a
    /// `nonce`; this crate always sets them to the same millisecond
    /// timestamp, matching the documented private-call flow.
    #[must_use]
    pub fn new(
        method: impl Into<String>,
        api_key: impl Into<String>,
        params: RequestParams,
        id: i64,
    ) -> Self {
        Self {
            id,
            method: method.into(),
            api_key: api_key.into(),
            params,
            nonce: id,
            sig: None,
        }
    }

    /// Attaches a computed tag. The envelope is otherwise immutable after
    /// construction.
    #[must_use]
    pub fn with_signature(mut self, sig: String) -> Self {
        self.sig = Some(sig);
        self
    }
}

/// Order side.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

/// Order type, as named by the exchange.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    Market,
    StopLoss,
    StopLimit,
    TakeProfit,
    TakeProfitLimit,
}

impl OrderType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Limit => "LIMIT",
            Self::Market => "MARKET",
            Self::StopLoss => "STOP_LOSS",
            Self::StopLimit => "STOP_LIMIT",
            Self::TakeProfit => "TAKE_PROFIT",
            Self::TakeProfitLimit => "TAKE_PROFIT_LIMIT",
        }
    }

    /// Whether this order type rests at an explicit price.
    #[must_use]
    pub const fn is_priced(self) -> bool {
        matches!(self, Self::Limit | Self::StopLimit | Self::TakeProfitLimit)
    }
}

/// Time-in-force policy for priced orders.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    GoodTillCancel,
    FillOrKill,
    ImmediateOrCancel,
}

impl TimeInForce {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GoodTillCancel => "GOOD_TILL_CANCEL",
            Self::FillOrKill => "FILL_OR_KILL",
            Self::ImmediateOrCancel => "IMMEDIATE_OR_CANCEL",
        }
    }
}

/// Execution instruction.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecInst {
    PostOnly,
}

impl ExecInst {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PostOnly => "POST_ONLY",
        }
    }
}

macro_rules! impl_param_text {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Text(value.as_str().to_owned())
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

impl_param_text!(Side, OrderType, TimeInForce, ExecInst);

/// Input values for `private/create-order`.
#[derive(Clone, Debug)]
pub struct CreateOrderParams {
    pub instrument_name: String,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub notional: Option<Decimal>,
    pub client_oid: Option<String>,
    pub time_in_force: Option<TimeInForce>,
    pub exec_inst: Option<ExecInst>,
}

impl CreateOrderParams {
    /// A limit order resting at `price` for `quantity`.
    #[must_use]
    pub fn limit(
        instrument_name: impl Into<String>,
        side: Side,
        price: Decimal,
        quantity: Decimal,
    ) -> Self {
        Self {
            instrument_name: instrument_name.into(),
            side,
            order_type: OrderType::Limit,
            price: Some(price),
            quantity: Some(quantity),
            notional: None,
            client_oid: None,
            time_in_force: None,
            exec_inst: None,
        }
    }

    /// A market sell for `quantity` of base currency.
    #[must_use]
    pub fn market_sell(instrument_name: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            instrument_name: instrument_name.into(),
            side: Side::Sell,
            order_type: OrderType::Market,
            price: None,
            quantity: Some(quantity),
            notional: None,
            client_oid: None,
            time_in_force: None,
            exec_inst: None,
        }
    }

    /// A market buy spending `notional` of quote currency.
    #[must_use]
    pub fn market_buy(instrument_name: impl Into<String>, notional: Decimal) -> Self {
        Self {
            instrument_name: instrument_name.into(),
            side: Side::Buy,
            order_type: OrderType::Market,
            price: None,
            quantity: None,
            notional: Some(notional),
            client_oid: None,
            time_in_force: None,
            exec_inst: None,
        }
    }

    /// Validates the order and flattens it into request params.
    pub fn into_params(self) -> Result<RequestParams> {
        if matches!(self.exec_inst, Some(ExecInst::PostOnly))
            && !matches!(self.time_in_force, None | Some(TimeInForce::GoodTillCancel))
        {
            return Err(Error::validation(
                "POST_ONLY is only supported with GOOD_TILL_CANCEL",
            ));
        }

        let mut params = RequestParams::new();
        params.insert("instrument_name", self.instrument_name);
        params.insert("side", self.side);
        params.insert("type", self.order_type);

        if self.order_type.is_priced() {
            let price = self.price.ok_or_else(|| {
                Error::validation(format!("{} orders require a price", self.order_type))
            })?;
            let quantity = self.quantity.ok_or_else(|| {
                Error::validation(format!("{} orders require a quantity", self.order_type))
            })?;
            params.insert("price", positive("price", price)?);
            params.insert("quantity", positive("quantity", quantity)?);
        } else {
            match self.side {
                Side::Buy => {
                    let notional = self.notional.ok_or_else(|| {
                        Error::validation(format!(
                            "{} BUY orders require a notional",
                            self.order_type
                        ))
                    })?;
                    params.insert("notional", positive("notional", notional)?);
                }
                Side::Sell => {
                    let quantity = self.quantity.ok_or_else(|| {
                        Error::validation(format!(
                            "{} SELL orders require a quantity",
                            self.order_type
                        ))
                    })?;
                    params.insert("quantity", positive("quantity", quantity)?);
                }
            }
        }

        if let Some(client_oid) = self.client_oid {
            params.insert("client_oid", client_oid);
        }
        if let Some(time_in_force) = self.time_in_force {
            params.insert("time_in_force", time_in_force);
        }
        if let Some(exec_inst) = self.exec_inst {
            params.insert("exec_inst", exec_inst);
        }

        Ok(params)
    }
}

fn positive(name: &str, value: Decimal) -> Result<Decimal> {
    if value.is_sign_negative() || value.is_zero() {
        return Err(Error::validation(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(value)
}

/// The v2 response envelope.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub id: i64,
    #[serde(default)]
    pub method: Option<String>,
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    pub result: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Converts a non-zero exchange code into an error.
    pub fn ensure_ok(&self) -> Result<()> {
        if self.code != 0 {
            return Err(Error::api(
                self.code,
                self.message.clone().unwrap_or_default(),
            ));
        }
        Ok(())
    }

    /// Unwraps the result payload, surfacing exchange errors first.
    pub fn into_result(self) -> Result<T> {
        self.ensure_ok()?;
        self.result
            .ok_or_else(|| Error::decode("response envelope is missing a result"))
    }
}

/// Result payload of `private/create-order`.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateOrderResult {
    pub order_id: String,
    #[serde(default)]
    pub client_oid: Option<String>,
}

/// Result payload of `private/get-open-orders`.
#[derive(Clone, Debug, Deserialize)]
pub struct OpenOrdersResult {
    pub count: i64,
    #[serde(default)]
    pub order_list: Vec<OrderInfo>,
}

/// A resting order as reported by the exchange.
#[derive(Clone, Debug, Deserialize)]
pub struct OrderInfo {
    pub order_id: String,
    #[serde(default)]
    pub client_oid: Option<String>,
    pub instrument_name: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub status: String,
    pub price: Decimal,
    pub quantity: Decimal,
    #[serde(default)]
    pub cumulative_quantity: Option<Decimal>,
    #[serde(default)]
    pub create_time: Option<i64>,
}
