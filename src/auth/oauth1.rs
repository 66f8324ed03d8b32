//! auth::oauth1
//!
//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1).
//!
//! # Signing
//!
//! Every request is signed independently; there is no token exchange. The
//! signature base string covers the method, the URL without its query, and
//! the sorted, percent-encoded union of the `oauth_*` protocol parameters and
//! the query parameters. JSON request bodies are not part of the signature.
//!
//! The signing key is `enc(consumer_secret) & enc(token_secret)`, with an
//! empty token secret for two-legged (consumer-only) setups.

use std::fmt;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ring::hmac;
use uuid::Uuid;

use super::errors::AuthError;
use super::{Authenticator, SigningRequest};

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// Consumer and (optional) access token credentials.
#[derive(Clone)]
pub struct OAuth1Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: Option<String>,
    pub token_secret: Option<String>,
}

impl fmt::Debug for OAuth1Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

/// Authenticator that signs requests with OAuth 1.0a.
#[derive(Debug, Clone)]
pub struct OAuth1Signer {
    credentials: OAuth1Credentials,
}

impl OAuth1Signer {
    pub fn new(credentials: OAuth1Credentials) -> Self {
        Self { credentials }
    }

    /// Build the `Authorization` header with a fixed nonce and timestamp.
    pub fn sign_with(&self, request: &SigningRequest<'_>, nonce: &str, timestamp: i64) -> String {
        let mut params = self.protocol_params(nonce, timestamp);
        let base = signature_base_string(request, &params);
        params.push(("oauth_signature", hmac_sha1_base64(&self.signing_key(), &base)));

        let fields = params
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", key, encode(value)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {}", fields)
    }

    fn protocol_params(&self, nonce: &str, timestamp: i64) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("oauth_consumer_key", self.credentials.consumer_key.clone()),
            ("oauth_nonce", nonce.to_string()),
            ("oauth_signature_method", SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp", timestamp.to_string()),
            ("oauth_version", OAUTH_VERSION.to_string()),
        ];
        if let Some(token) = self.credentials.token.as_deref().filter(|t| !t.is_empty()) {
            params.push(("oauth_token", token.to_string()));
        }
        params
    }

    fn signing_key(&self) -> String {
        format!(
            "{}&{}",
            encode(&self.credentials.consumer_secret),
            encode(self.credentials.token_secret.as_deref().unwrap_or(""))
        )
    }
}

#[async_trait]
impl Authenticator for OAuth1Signer {
    fn scheme(&self) -> &'static str {
        "oauth1"
    }

    async fn authorization(&self, request: &SigningRequest<'_>) -> Result<Option<String>, AuthError> {
        if self.credentials.consumer_key.is_empty() {
            return Err(AuthError::MissingCredential("auth_user"));
        }
        let nonce = Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp();
        Ok(Some(self.sign_with(request, &nonce, timestamp)))
    }
}

/// RFC 3986 percent-encoding: everything except unreserved characters.
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn signature_base_string(request: &SigningRequest<'_>, oauth_params: &[(&str, String)]) -> String {
    let mut pairs: Vec<(String, String)> = oauth_params
        .iter()
        .map(|(key, value)| (encode(key), encode(value)))
        .chain(
            request
                .query
                .iter()
                .map(|(key, value)| (encode(key), encode(value))),
        )
        .collect();
    pairs.sort();

    let normalized = pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        request.method.to_uppercase(),
        encode(request.url),
        encode(&normalized)
    )
}

fn hmac_sha1_base64(key: &str, data: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, key.as_bytes());
    STANDARD.encode(hmac::sign(&key, data.as_bytes()).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(token: Option<&str>) -> OAuth1Signer {
        OAuth1Signer::new(OAuth1Credentials {
            consumer_key: "key".to_string(),
            consumer_secret: "secret".to_string(),
            token: token.map(String::from),
            token_secret: token.map(|_| "tsecret".to_string()),
        })
    }

    fn query() -> Vec<(String, String)> {
        vec![("prefix".to_string(), "ab c".to_string())]
    }

    #[test]
    fn base_string_sorts_and_double_encodes() {
        let signer = signer(Some("tok"));
        let query = query();
        let request = SigningRequest::new("get", "http://localhost/v1/keywords", &query);
        let params = signer.protocol_params("n", 1);

        assert_eq!(
            signature_base_string(&request, &params),
            "GET&http%3A%2F%2Flocalhost%2Fv1%2Fkeywords&\
             oauth_consumer_key%3Dkey%26oauth_nonce%3Dn%26oauth_signature_method%3DHMAC-SHA1\
             %26oauth_timestamp%3D1%26oauth_token%3Dtok%26oauth_version%3D1.0%26prefix%3Dab%2520c"
        );
    }

    /// Published example from the Twitter API "Creating a signature" guide.
    #[test]
    fn signs_published_example() {
        let signer = OAuth1Signer::new(OAuth1Credentials {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".to_string(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".to_string(),
            token: Some("370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string()),
            token_secret: Some("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".to_string()),
        });
        let params = vec![
            ("include_entities".to_string(), "true".to_string()),
            (
                "status".to_string(),
                "Hello Ladies + Gentlemen, a signed OAuth request!".to_string(),
            ),
        ];
        let request = SigningRequest::new(
            "POST",
            "https://api.twitter.com/1.1/statuses/update.json",
            &params,
        );
        let nonce = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";

        assert_eq!(
            signature_base_string(&request, &signer.protocol_params(nonce, 1318622958)),
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&\
             include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog\
             %26oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg\
             %26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958\
             %26oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb\
             %26oauth_version%3D1.0\
             %26status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"
        );

        let header = signer.sign_with(&request, nonce, 1318622958);
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
    }

    #[test]
    fn header_lists_protocol_params() {
        let header = signer(Some("tok")).sign_with(
            &SigningRequest::new("POST", "http://localhost/v1/learningobject/create", &[]),
            "abc",
            1700000000,
        );

        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_consumer_key=\"key\""));
        assert!(header.contains("oauth_nonce=\"abc\""));
        assert!(header.contains("oauth_timestamp=\"1700000000\""));
        assert!(header.contains("oauth_token=\"tok\""));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(!header.contains("secret"));
    }

    #[test]
    fn two_legged_omits_token() {
        let header = signer(None).sign_with(
            &SigningRequest::new("GET", "http://localhost/v1/keywords", &[]),
            "abc",
            1,
        );
        assert!(!header.contains("oauth_token="));
    }

    #[test]
    fn signature_depends_on_request() {
        let signer = signer(None);
        let a = signer.sign_with(&SigningRequest::new("GET", "http://localhost/a", &[]), "n", 1);
        let b = signer.sign_with(&SigningRequest::new("GET", "http://localhost/b", &[]), "n", 1);
        let again = signer.sign_with(&SigningRequest::new("GET", "http://localhost/a", &[]), "n", 1);
        assert_ne!(a, b);
        assert_eq!(a, again);
    }

    #[tokio::test]
    async fn authorization_uses_fresh_nonce() {
        let signer = signer(None);
        let request = SigningRequest::new("GET", "http://localhost/v1/keywords", &[]);
        let first = signer.authorization(&request).await.unwrap().unwrap();
        let second = signer.authorization(&request).await.unwrap().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn debug_redacts_secrets() {
        let debug = format!("{:?}", signer(Some("tok")));
        assert!(!debug.contains("secret\""));
        assert!(!debug.contains("tsecret"));
    }
}
