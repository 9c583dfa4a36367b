//! HMAC-SHA256 request signing for v2 private calls.
//!
//! The exchange authenticates a private call with a keyed hash over a
//! canonical rendering of the envelope:
//!
//! ```text
//! method + id + api_key + canonical_params + nonce
//! ```
//!
//! where `canonical_params` is every key sorted ascending by raw byte
//! order, each immediately followed by its value text, with no delimiters
//! anywhere. The tag is hex-encoded lowercase and attached as `sig`.
//!
//! Everything here is pure; transport lives in [`crate::ExchangeClient`].

use hmac::{Hmac, Mac as _};
use secrecy::{ExposeSecret as _, SecretString};
use sha2::Sha256;

use crate::types::{ApiRequest, RequestParams};

type HmacSha256 = Hmac<Sha256>;

/// Renders `params` into the canonical string the signature covers.
///
/// Sorting happens here, on a copy of the pairs, so the insertion order of
/// the params never affects the result. Values contribute the exact text
/// they serialize to on the wire; the server verifies against the
/// transmitted JSON, so any reformatting between signing and sending would
/// break verification.
#[must_use]
pub fn canonical_params(params: &RequestParams) -> String {
    let mut pairs: Vec<_> = params.iter().collect();
    pairs.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

    let mut out = String::new();
    for (key, value) in pairs {
        out.push_str(key);
        out.push_str(&value.wire_text());
    }
    out
}

/// Builds the full payload the tag is computed over.
#[must_use]
pub fn signature_payload(request: &ApiRequest) -> String {
    format!(
        "{}{}{}{}{}",
        request.method,
        request.id,
        request.api_key,
        canonical_params(&request.params),
        request.nonce
    )
}

/// Computes the lowercase hex HMAC-SHA256 tag for `request`.
///
/// Pure function: identical inputs always yield an identical tag. The
/// caller attaches the tag with [`ApiRequest::with_signature`] and is
/// responsible for transport.
#[must_use]
pub fn sign(request: &ApiRequest, secret: &SecretString) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(signature_payload(request).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    const API_KEY: &str = "NfMdDn3wpZWKL4EJdnW4xg";
    const SECRET: &str = "dnopcDjFWzYVkTZdThSUdt";
    const ID: i64 = 1_700_000_000_000;

    fn secret() -> SecretString {
        SecretString::from(SECRET)
    }

    fn reference_params() -> RequestParams {
        RequestParams::new()
            .with("instrument_name", "BTC_USDT")
            .with("side", "BUY")
            .with("type", "LIMIT")
            .with("price", dec!(31100.12))
            .with("quantity", dec!(0.0001))
            .with("client_oid", "my_order_0002")
            .with("time_in_force", "GOOD_TILL_CANCEL")
            .with("exec_inst", "POST_ONLY")
    }

    fn reference_request() -> ApiRequest {
        ApiRequest::new("private/create-order", API_KEY, reference_params(), ID)
    }

    #[test]
    fn canonical_params_sorts_keys_ascending() {
        assert_eq!(
            canonical_params(&reference_params()),
            "client_oidmy_order_0002exec_instPOST_ONLYinstrument_nameBTC_USDT\
             price31100.12quantity0.0001sideBUYtime_in_forceGOOD_TILL_CANCELtypeLIMIT"
        );
    }

    #[test]
    fn payload_concatenates_without_delimiters() {
        assert_eq!(
            signature_payload(&reference_request()),
            "private/create-order1700000000000NfMdDn3wpZWKL4EJdnW4xg\
             client_oidmy_order_0002exec_instPOST_ONLYinstrument_nameBTC_USDT\
             price31100.12quantity0.0001sideBUYtime_in_forceGOOD_TILL_CANCELtypeLIMIT\
             1700000000000"
        );
    }

    #[test]
    fn reference_vector_reproduces_bit_for_bit() {
        assert_eq!(
            sign(&reference_request(), &secret()),
            "a82ddce40102ac6d937ff6f3fff09fd461ab3f3769d5e71f98d5df476061d233"
        );
    }

    #[test]
    fn insertion_order_does_not_affect_tag() {
        let reversed = RequestParams::new()
            .with("exec_inst", "POST_ONLY")
            .with("time_in_force", "GOOD_TILL_CANCEL")
            .with("client_oid", "my_order_0002")
            .with("quantity", dec!(0.0001))
            .with("price", dec!(31100.12))
            .with("type", "LIMIT")
            .with("side", "BUY")
            .with("instrument_name", "BTC_USDT");
        let shuffled = ApiRequest::new("private/create-order", API_KEY, reversed, ID);

        assert_eq!(
            sign(&shuffled, &secret()),
            sign(&reference_request(), &secret())
        );
    }

    #[test]
    fn signing_is_deterministic() {
        let request = reference_request();
        assert_eq!(sign(&request, &secret()), sign(&request, &secret()));
    }

    #[test]
    fn tag_depends_on_every_secret_byte() {
        let altered = SecretString::from("dnopcDjFWzYVkTZdThSUde");
        assert_ne!(
            sign(&reference_request(), &altered),
            sign(&reference_request(), &secret())
        );
    }

    #[test]
    fn empty_params_contribute_nothing() {
        let request = ApiRequest::new("private/get-open-orders", API_KEY, RequestParams::new(), ID);
        assert_eq!(
            signature_payload(&request),
            "private/get-open-orders1700000000000NfMdDn3wpZWKL4EJdnW4xg1700000000000"
        );
    }

    #[test]
    fn key_ordering_is_byte_wise_not_case_insensitive() {
        // 'Z' (0x5a) sorts before 'a' (0x61) in byte order.
        let params = RequestParams::new().with("alpha", "1").with("Zeta", "2");
        assert_eq!(canonical_params(&params), "Zeta2alpha1");
    }
}
