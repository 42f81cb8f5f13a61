//! OAuth 1.0a Signing Module
//!
//! Produces `Authorization: OAuth ...` header values for NetSuite
//! token-based authentication (HMAC-SHA256 only).

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use rand::RngCore;
use reqwest::Method;
use sha2::Sha256;

use super::params::Params;
use crate::config::Config;
use crate::error::{ProxyError, Result};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_METHOD: &str = "HMAC-SHA256";
pub const OAUTH_VERSION: &str = "1.0";

/// Random bytes per nonce, hex-encoded to twice this length.
const NONCE_BYTES: usize = 16;

// == Credential ==
/// Consumer and token credentials for one NetSuite account.
///
/// Construction fails when any field is empty, so a `Credential` that
/// exists is always usable for signing.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    realm: String,
    consumer_key: String,
    consumer_secret: String,
    token_key: String,
    token_secret: String,
}

impl Credential {
    pub fn new(
        realm: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        token_key: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Result<Self> {
        let credential = Self {
            realm: realm.into(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token_key: token_key.into(),
            token_secret: token_secret.into(),
        };

        let missing: Vec<&str> = [
            ("realm", &credential.realm),
            ("consumer_key", &credential.consumer_key),
            ("consumer_secret", &credential.consumer_secret),
            ("token_key", &credential.token_key),
            ("token_secret", &credential.token_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(ProxyError::Configuration(format!(
                "Missing required NetSuite credentials: {}",
                missing.join(", ")
            )));
        }

        Ok(credential)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.realm.clone(),
            config.consumer_key.clone(),
            config.consumer_secret.clone(),
            config.token_key.clone(),
            config.token_secret.clone(),
        )
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Signing key: `enc(consumer_secret)&enc(token_secret)`.
    pub fn signing_key(&self) -> String {
        format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(&self.token_secret)
        )
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("realm", &self.realm)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("token_key", &self.token_key)
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

// == OAuth Stamp ==
/// The time-dependent part of a signature: timestamp and nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthStamp {
    pub timestamp: String,
    pub nonce: String,
}

impl OAuthStamp {
    /// Current Unix time plus a random 16-byte hex nonce.
    pub fn fresh() -> Self {
        let mut bytes = [0u8; NONCE_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self {
            timestamp: chrono::Utc::now().timestamp().to_string(),
            nonce: hex::encode(bytes),
        }
    }

    pub fn fixed(timestamp: impl Into<String>, nonce: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            nonce: nonce.into(),
        }
    }
}

// == Encoding ==
/// RFC 3986 percent encoding: everything but `A-Z a-z 0-9 - . _ ~` is escaped,
/// space becomes `%20`.
pub fn percent_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// The six protocol parameters, without the signature.
pub fn oauth_params(credential: &Credential, stamp: &OAuthStamp) -> Params {
    Params::new()
        .with("oauth_consumer_key", credential.consumer_key.as_str())
        .with("oauth_token", credential.token_key.as_str())
        .with("oauth_signature_method", SIGNATURE_METHOD)
        .with("oauth_timestamp", stamp.timestamp.as_str())
        .with("oauth_nonce", stamp.nonce.as_str())
        .with("oauth_version", OAUTH_VERSION)
}

/// `METHOD&enc(url)&enc(k=v&k=v...)` over the sorted, encoded parameters.
pub fn signature_base_string(method: &Method, url: &str, params: &Params) -> String {
    let param_string = params
        .sorted()
        .into_iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.as_str().to_ascii_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

/// Base64 of HMAC-SHA256(signing_key, base_string).
pub fn compute_signature(signing_key: &str, base_string: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(signing_key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(base_string.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Builds the full `OAuth realm="..", ...` header value.
///
/// Request parameters and OAuth parameters are signed together; OAuth
/// parameters win if a request parameter reuses one of their names.
pub fn authorization_header(
    method: &Method,
    url: &str,
    params: &Params,
    credential: &Credential,
    stamp: &OAuthStamp,
) -> String {
    let mut header_params = oauth_params(credential, stamp);

    let mut signed = params.clone();
    signed.merge(&header_params);

    let base_string = signature_base_string(method, url, &signed);
    let signature = compute_signature(&credential.signing_key(), &base_string);
    header_params.insert("oauth_signature", signature);

    let mut header = format!("OAuth realm=\"{}\"", credential.realm);
    for (k, v) in header_params.sorted() {
        header.push_str(&format!(", {}=\"{}\"", k, percent_encode(v)));
    }
    header
}

// == Signed Request ==
/// A request whose signature has been computed. Immutable once built.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    method: Method,
    url: String,
    query: Params,
    authorization: String,
    credential: Credential,
}

impl SignedRequest {
    /// Signs with a fresh timestamp and nonce.
    pub fn new(method: Method, url: impl Into<String>, query: Params, credential: &Credential) -> Self {
        Self::with_stamp(method, url, query, credential, &OAuthStamp::fresh())
    }

    pub fn with_stamp(
        method: Method,
        url: impl Into<String>,
        query: Params,
        credential: &Credential,
        stamp: &OAuthStamp,
    ) -> Self {
        let url = url.into();
        let authorization = authorization_header(&method, &url, &query, credential, stamp);
        Self {
            method,
            url,
            query,
            authorization,
            credential: credential.clone(),
        }
    }

    /// Same request signed again with a fresh timestamp and nonce.
    ///
    /// NetSuite rejects a nonce it has already seen, so every retry must be re-signed.
    pub fn resigned(&self) -> Self {
        Self::new(
            self.method.clone(),
            self.url.clone(),
            self.query.clone(),
            &self.credential,
        )
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// URL without query string, as signed.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query(&self) -> &Params {
        &self.query
    }

    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    /// URL with the signed query string appended.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            self.url.clone()
        } else {
            format!("{}?{}", self.url, self.query.to_query_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const URL: &str =
        "https://1234567-sb1.suitetalk.api.netsuite.com/services/rest/record/v1/customer";

    fn credential() -> Credential {
        Credential::new(
            "1234567_SB1",
            "consumer-key",
            "consumer-secret",
            "token-key",
            "token-secret",
        )
        .unwrap()
    }

    fn stamp() -> OAuthStamp {
        OAuthStamp::fixed("1700000000", "0123456789abcdef0123456789abcdef")
    }

    fn list_params() -> Params {
        Params::new().with("limit", "2").with("offset", "0")
    }

    #[test]
    fn test_credential_rejects_missing_fields() {
        let result = Credential::new("realm", "ck", "", "tk", "ts");
        match result {
            Err(ProxyError::Configuration(msg)) => assert!(msg.contains("consumer_secret")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_credential_debug_redacts_secrets() {
        let debug = format!("{:?}", credential());
        assert!(!debug.contains("consumer-secret"));
        assert!(!debug.contains("token-secret"));
    }

    #[test]
    fn test_percent_encode_reserved_characters() {
        assert_eq!(percent_encode("a b"), "a%20b");
        assert_eq!(percent_encode("a&b=c"), "a%26b%3Dc");
        assert_eq!(percent_encode("-._~"), "-._~");
        assert_eq!(percent_encode("é"), "%C3%A9");
        assert_eq!(percent_encode("a+b/c"), "a%2Bb%2Fc");
    }

    #[test]
    fn test_base_string_layout() {
        let mut params = list_params();
        params.merge(&oauth_params(&credential(), &stamp()));

        let base = signature_base_string(&Method::GET, URL, &params);
        assert_eq!(
            base,
            "GET&https%3A%2F%2F1234567-sb1.suitetalk.api.netsuite.com%2Fservices%2Frest%2Frecord%2Fv1%2Fcustomer\
             &limit%3D2%26oauth_consumer_key%3Dconsumer-key%26oauth_nonce%3D0123456789abcdef0123456789abcdef\
             %26oauth_signature_method%3DHMAC-SHA256%26oauth_timestamp%3D1700000000%26oauth_token%3Dtoken-key\
             %26oauth_version%3D1.0%26offset%3D0"
        );
    }

    #[test]
    fn test_signature_known_vector() {
        let mut params = list_params();
        params.merge(&oauth_params(&credential(), &stamp()));
        let base = signature_base_string(&Method::GET, URL, &params);

        let signature = compute_signature(&credential().signing_key(), &base);
        assert_eq!(signature, "PfV38ktFTBEqfUSUClO2IOBQNzDT2Q0TnY7OFjY7XkA=");
    }

    #[test]
    fn test_authorization_header_format() {
        let header = authorization_header(&Method::GET, URL, &list_params(), &credential(), &stamp());
        assert_eq!(
            header,
            "OAuth realm=\"1234567_SB1\", oauth_consumer_key=\"consumer-key\", \
             oauth_nonce=\"0123456789abcdef0123456789abcdef\", \
             oauth_signature=\"PfV38ktFTBEqfUSUClO2IOBQNzDT2Q0TnY7OFjY7XkA%3D\", \
             oauth_signature_method=\"HMAC-SHA256\", oauth_timestamp=\"1700000000\", \
             oauth_token=\"token-key\", oauth_version=\"1.0\""
        );
    }

    #[test]
    fn test_signature_is_deterministic_for_fixed_stamp() {
        let a = authorization_header(&Method::GET, URL, &list_params(), &credential(), &stamp());
        let b = authorization_header(&Method::GET, URL, &list_params(), &credential(), &stamp());
        assert_eq!(a, b);
    }

    #[test]
    fn test_any_input_change_changes_signature() {
        let base = authorization_header(&Method::GET, URL, &list_params(), &credential(), &stamp());

        let other_method =
            authorization_header(&Method::POST, URL, &list_params(), &credential(), &stamp());
        let other_url = authorization_header(
            &Method::GET,
            &format!("{}/42", URL),
            &list_params(),
            &credential(),
            &stamp(),
        );
        let other_param = authorization_header(
            &Method::GET,
            URL,
            &list_params().with("limit", "3"),
            &credential(),
            &stamp(),
        );

        assert_ne!(base, other_method);
        assert_ne!(base, other_url);
        assert_ne!(base, other_param);
    }

    #[test]
    fn test_oauth_params_win_on_collision() {
        let params = list_params().with("oauth_version", "2.0");
        let header = authorization_header(&Method::GET, URL, &params, &credential(), &stamp());
        assert!(header.contains("oauth_version=\"1.0\""));
        assert_eq!(
            header,
            authorization_header(&Method::GET, URL, &list_params(), &credential(), &stamp())
        );
    }

    #[test]
    fn test_fresh_stamps_differ() {
        let a = OAuthStamp::fresh();
        let b = OAuthStamp::fresh();
        assert_eq!(a.nonce.len(), NONCE_BYTES * 2);
        assert!(a.nonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.nonce, b.nonce);
        assert!(a.timestamp.parse::<i64>().is_ok());
    }

    #[test]
    fn test_signed_requests_are_never_identical() {
        let a = SignedRequest::new(Method::GET, URL, list_params(), &credential());
        let b = SignedRequest::new(Method::GET, URL, list_params(), &credential());
        assert_ne!(a.authorization(), b.authorization());
        assert_eq!(a.full_url(), format!("{}?limit=2&offset=0", URL));
    }

    #[test]
    fn test_resigned_request_gets_fresh_nonce() {
        let original =
            SignedRequest::with_stamp(Method::GET, URL, list_params(), &credential(), &stamp());
        let again = original.resigned();

        assert_eq!(again.full_url(), original.full_url());
        assert_eq!(again.method(), original.method());
        assert_ne!(again.authorization(), original.authorization());
        assert!(!again.authorization().contains(&stamp().nonce));
    }

    #[test]
    fn test_special_characters_do_not_leak_into_base_string() {
        let value = "name = 'Müller & Söhne'";
        let params = Params::new().with("q", value);
        let base = signature_base_string(&Method::GET, URL, &params);

        // exactly the two separators between method, url and parameter string
        assert_eq!(base.matches('&').count(), 2);
        assert!(!base.contains('='));
        assert!(!base.contains(' '));
        assert!(base.contains("q%3Dname%2520%253D%2520%2527M%25C3%25BCller%2520%2526%2520S%25C3%25B6hne%2527"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        // Encoded output only ever contains unreserved characters and escapes.
        #[test]
        fn prop_percent_encode_output_alphabet(input in "\\PC{0,32}") {
            let encoded = percent_encode(&input);
            prop_assert!(encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "-._~%".contains(c)));
            prop_assert_eq!(urlencoding::decode(&encoded).unwrap().into_owned(), input);
        }

        #[test]
        fn prop_base_string_has_two_separators(value in "\\PC{0,32}") {
            let params = Params::new().with("q", value);
            let base = signature_base_string(&Method::GET, URL, &params);
            prop_assert_eq!(base.matches('&').count(), 2);
            prop_assert!(!base.contains('='));
        }
    }
}
