//! Slack request signature verification.
//!
//! Slack signs every Events API and slash-command delivery with
//! `v0=hex(HMAC-SHA256(signing_secret, "v0:{timestamp}:{raw body}"))`. The
//! verifier recomputes the MAC over the raw bytes before any parsing and
//! rejects deliveries whose timestamp is more than five minutes away from the
//! server clock, which bounds replay of captured requests.

use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use hmac::{Hmac, Mac};
use mockable::Clock;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::domain::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "X-Slack-Signature";
/// Header carrying the Unix timestamp the signature covers.
pub const TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";

const SIGNATURE_VERSION: &str = "v0";
const MAX_CLOCK_SKEW_SECS: i64 = 5 * 60;

/// Reasons a delivery failed verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// A signing header was absent.
    #[error("missing {0} header")]
    MissingHeader(&'static str),
    /// A signing header was not ASCII or not in the expected format.
    #[error("malformed {0} header")]
    MalformedHeader(&'static str),
    /// The request timestamp is too far from the server clock.
    #[error("request timestamp is outside the accepted window")]
    Stale,
    /// The computed signature differs from the supplied one.
    #[error("request signature does not match")]
    Mismatch,
}

impl From<SignatureError> for Error {
    fn from(value: SignatureError) -> Self {
        match value {
            SignatureError::MissingHeader(_) | SignatureError::MalformedHeader(_) => {
                Error::invalid_request(value.to_string())
            }
            SignatureError::Stale | SignatureError::Mismatch => {
                Error::unauthorized(value.to_string())
            }
        }
    }
}

fn mac_for(
    secret: &[u8],
    timestamp: &str,
    body: &[u8],
) -> Result<HmacSha256, hmac::digest::InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret)?;
    mac.update(SIGNATURE_VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

/// Compute the `X-Slack-Signature` value for a delivery.
///
/// # Examples
/// ```
/// use moneysaver::inbound::http::signature::signature_for;
///
/// let signature = signature_for("secret", "1700000000", b"token=x").expect("hmac key");
/// assert!(signature.starts_with("v0="));
/// assert_eq!(signature.len(), 3 + 64);
/// ```
pub fn signature_for(
    secret: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<String, hmac::digest::InvalidLength> {
    let digest = mac_for(secret.as_bytes(), timestamp, body)?
        .finalize()
        .into_bytes();
    Ok(format!("{SIGNATURE_VERSION}={}", hex::encode(digest)))
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, SignatureError> {
    headers
        .get(name)
        .ok_or(SignatureError::MissingHeader(name))?
        .to_str()
        .map_err(|_| SignatureError::MalformedHeader(name))
}

/// Verifies Slack request signatures against the configured signing secret.
///
/// With no secret configured every request is accepted; this is intended for
/// local development only and is announced at start-up.
pub struct SignatureVerifier {
    secret: Option<Zeroizing<String>>,
    clock: Arc<dyn Clock>,
}

impl SignatureVerifier {
    /// Create a verifier for `secret` using `clock` for the replay window.
    pub fn new(secret: Option<Zeroizing<String>>, clock: Arc<dyn Clock>) -> Self {
        Self { secret, clock }
    }

    /// A verifier that accepts every request.
    pub fn disabled() -> Self {
        Self::new(None, Arc::new(mockable::DefaultClock))
    }

    /// Whether a signing secret is configured.
    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Check the signature headers against the raw request body.
    pub fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), SignatureError> {
        let Some(secret) = self.secret.as_ref() else {
            return Ok(());
        };

        let timestamp = header(headers, TIMESTAMP_HEADER)?;
        let signature = header(headers, SIGNATURE_HEADER)?;

        let issued_at: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| SignatureError::MalformedHeader(TIMESTAMP_HEADER))?;
        let now = self.clock.utc().timestamp();
        if now.abs_diff(issued_at) > MAX_CLOCK_SKEW_SECS.unsigned_abs() {
            return Err(SignatureError::Stale);
        }

        let provided = signature
            .strip_prefix("v0=")
            .and_then(|digest| hex::decode(digest).ok())
            .ok_or(SignatureError::MalformedHeader(SIGNATURE_HEADER))?;

        mac_for(secret.as_bytes(), timestamp, body)
            .map_err(|_| SignatureError::Mismatch)?
            .verify_slice(&provided)
            .map_err(|_| SignatureError::Mismatch)
    }
}
