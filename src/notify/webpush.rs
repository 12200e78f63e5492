//! # Web Push Transport
//!
//! Delivers a payload straight to a browser push service:
//!
//! - the payload is encrypted for the subscription with the `aes128gcm` content coding
//!   (RFC 8291): ECDH P-256 with a one-off key, HKDF-SHA256, AES-128-GCM
//! - the request is authenticated with a VAPID token (RFC 8292): an ES256 JWT whose
//!   audience is the push service origin
//!
//! All cryptography comes from `ring`; HTTP from `reqwest`.

use super::{DeliveryOutcome, PushTransport};
use crate::model::PushSubscription;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use reqwest::{StatusCode, Url};
use ring::aead::{self, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::agreement::{self, EphemeralPrivateKey, UnparsedPublicKey};
use ring::hkdf;
use ring::rand::{SecureRandom, SystemRandom};
use ring::signature::{EcdsaKeyPair, ECDSA_P256_SHA256_FIXED_SIGNING};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Record size advertised in the content-coding header.
pub const RECORD_SIZE: u32 = 4096;
const SALT_LEN: usize = 16;
const PUBLIC_KEY_LEN: usize = 65;
const AUTH_SECRET_LEN: usize = 16;
const TAG_LEN: usize = 16;
/// Header bytes before the ciphertext: salt, record size, key id length, key id.
pub const HEADER_LEN: usize = SALT_LEN + 4 + 1 + PUBLIC_KEY_LEN;
const TOKEN_LIFETIME_SECS: i64 = 12 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Invalid VAPID key: {0}")]
    InvalidVapidKey(String),

    #[error("Invalid subscription keys: {0}")]
    InvalidSubscriptionKeys(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Crypto failure: {0}")]
    Crypto(&'static str),

    #[error("Push request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Decodes base64url with or without padding.
pub fn decode_b64(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(value.trim().trim_end_matches('='))
}

// =============================================================================
// VAPID
// =============================================================================

#[derive(Serialize)]
struct Claims<'a> {
    aud: &'a str,
    exp: i64,
    sub: &'a str,
}

/// Signs VAPID tokens with the application server key pair.
pub struct VapidSigner {
    key_pair: EcdsaKeyPair,
    public_key_b64: String,
    subject: String,
    rng: SystemRandom,
}

impl VapidSigner {
    /// Builds a signer from base64url encoded keys: the raw 32-byte private scalar and
    /// the 65-byte uncompressed public point.
    pub fn new(public_key: &str, private_key: &str, subject: &str) -> Result<Self, PushError> {
        let public = decode_b64(public_key).map_err(|e| PushError::InvalidVapidKey(e.to_string()))?;
        let private = decode_b64(private_key).map_err(|e| PushError::InvalidVapidKey(e.to_string()))?;
        let rng = SystemRandom::new();
        let key_pair = EcdsaKeyPair::from_private_key_and_public_key(
            &ECDSA_P256_SHA256_FIXED_SIGNING,
            &private,
            &public,
            &rng,
        )
        .map_err(|e| PushError::InvalidVapidKey(e.to_string()))?;

        Ok(Self {
            key_pair,
            public_key_b64: URL_SAFE_NO_PAD.encode(&public),
            subject: subject.to_string(),
            rng,
        })
    }

    /// Compact ES256 JWT for `audience`, valid until `expires_at` (unix seconds).
    pub fn token(&self, audience: &str, expires_at: i64) -> Result<String, PushError> {
        let header = URL_SAFE_NO_PAD.encode(br#"{"typ":"JWT","alg":"ES256"}"#);
        let claims = serde_json::to_vec(&Claims {
            aud: audience,
            exp: expires_at,
            sub: &self.subject,
        })
        .map_err(|_| PushError::Crypto("claims encoding"))?;
        let signing_input = format!("{header}.{}", URL_SAFE_NO_PAD.encode(claims));
        let signature = self
            .key_pair
            .sign(&self.rng, signing_input.as_bytes())
            .map_err(|_| PushError::Crypto("signing"))?;
        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature.as_ref())
        ))
    }

    /// `Authorization` header value for a request to `endpoint`.
    pub fn authorization(&self, endpoint: &Url) -> Result<String, PushError> {
        let audience = endpoint.origin().ascii_serialization();
        let token = self.token(&audience, Utc::now().timestamp() + TOKEN_LIFETIME_SECS)?;
        Ok(format!("vapid t={token}, k={}", self.public_key_b64))
    }
}

// =============================================================================
// PAYLOAD ENCRYPTION
// =============================================================================

struct OkmLen(usize);

impl hkdf::KeyType for OkmLen {
    fn len(&self) -> usize {
        self.0
    }
}

fn hkdf_expand(salt: &[u8], ikm: &[u8], info: &[u8], out: &mut [u8]) -> Result<(), PushError> {
    hkdf::Salt::new(hkdf::HKDF_SHA256, salt)
        .extract(ikm)
        .expand(&[info], OkmLen(out.len()))
        .and_then(|okm| okm.fill(out))
        .map_err(|_| PushError::Crypto("hkdf"))
}

/// Derives the content encryption key and nonce for one message.
///
/// `ua_public` is the subscription's `p256dh`, `as_public` the sender's one-off key,
/// `shared` their ECDH secret.
pub fn derive_content_keys(
    shared: &[u8],
    auth_secret: &[u8],
    ua_public: &[u8],
    as_public: &[u8],
    salt: &[u8],
) -> Result<([u8; 16], [u8; 12]), PushError> {
    let mut key_info = Vec::with_capacity(14 + ua_public.len() + as_public.len());
    key_info.extend_from_slice(b"WebPush: info\0");
    key_info.extend_from_slice(ua_public);
    key_info.extend_from_slice(as_public);

    let mut ikm = [0u8; 32];
    hkdf_expand(auth_secret, shared, &key_info, &mut ikm)?;

    let mut cek = [0u8; 16];
    hkdf_expand(salt, &ikm, b"Content-Encoding: aes128gcm\0", &mut cek)?;
    let mut nonce = [0u8; 12];
    hkdf_expand(salt, &ikm, b"Content-Encoding: nonce\0", &mut nonce)?;
    Ok((cek, nonce))
}

/// Encrypts `plaintext` as a single `aes128gcm` record addressed to the subscription keys.
pub fn encrypt(
    ua_public: &[u8],
    auth_secret: &[u8],
    plaintext: &[u8],
    rng: &dyn SecureRandom,
) -> Result<Vec<u8>, PushError> {
    if ua_public.len() != PUBLIC_KEY_LEN {
        return Err(PushError::InvalidSubscriptionKeys(format!(
            "p256dh must be {PUBLIC_KEY_LEN} bytes, got {}",
            ua_public.len()
        )));
    }
    if auth_secret.len() != AUTH_SECRET_LEN {
        return Err(PushError::InvalidSubscriptionKeys(format!(
            "auth must be {AUTH_SECRET_LEN} bytes, got {}",
            auth_secret.len()
        )));
    }
    // one record: plaintext, the 0x02 delimiter, the tag
    if plaintext.len() + 1 + TAG_LEN > RECORD_SIZE as usize {
        return Err(PushError::PayloadTooLarge(plaintext.len()));
    }

    let ephemeral =
        EphemeralPrivateKey::generate(&agreement::ECDH_P256, rng).map_err(|_| PushError::Crypto("keygen"))?;
    let as_public = ephemeral
        .compute_public_key()
        .map_err(|_| PushError::Crypto("public key"))?;
    let peer = UnparsedPublicKey::new(&agreement::ECDH_P256, ua_public);
    let shared = agreement::agree_ephemeral(ephemeral, &peer, |secret| secret.to_vec())
        .map_err(|_| PushError::InvalidSubscriptionKeys("p256dh is not a P-256 point".into()))?;

    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt).map_err(|_| PushError::Crypto("salt"))?;

    let (cek, nonce) = derive_content_keys(&shared, auth_secret, ua_public, as_public.as_ref(), &salt)?;
    let key = LessSafeKey::new(
        UnboundKey::new(&aead::AES_128_GCM, &cek).map_err(|_| PushError::Crypto("cek"))?,
    );

    let mut record = Vec::with_capacity(plaintext.len() + 1 + TAG_LEN);
    record.extend_from_slice(plaintext);
    record.push(0x02);
    key.seal_in_place_append_tag(Nonce::assume_unique_for_key(nonce), Aad::empty(), &mut record)
        .map_err(|_| PushError::Crypto("seal"))?;

    let mut body = Vec::with_capacity(HEADER_LEN + record.len());
    body.extend_from_slice(&salt);
    body.extend_from_slice(&RECORD_SIZE.to_be_bytes());
    body.push(PUBLIC_KEY_LEN as u8);
    body.extend_from_slice(as_public.as_ref());
    body.extend_from_slice(&record);
    Ok(body)
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Maps a push service response status to a delivery outcome.
pub fn classify(status: StatusCode) -> DeliveryOutcome {
    if status.is_success() {
        DeliveryOutcome::Delivered
    } else if status == StatusCode::GONE || status == StatusCode::NOT_FOUND {
        DeliveryOutcome::Expired
    } else {
        DeliveryOutcome::Failed
    }
}

pub struct WebPushTransport {
    http: reqwest::Client,
    signer: VapidSigner,
    ttl_secs: u64,
    rng: SystemRandom,
}

impl WebPushTransport {
    pub fn new(signer: VapidSigner, timeout: Duration, ttl_secs: u64) -> Result<Self, PushError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            signer,
            ttl_secs,
            rng: SystemRandom::new(),
        })
    }

    async fn post(&self, subscription: &PushSubscription, payload: &[u8]) -> Result<StatusCode, PushError> {
        let endpoint = Url::parse(&subscription.endpoint)
            .map_err(|e| PushError::InvalidEndpoint(e.to_string()))?;
        let ua_public = decode_b64(&subscription.keys.p256dh)
            .map_err(|e| PushError::InvalidSubscriptionKeys(e.to_string()))?;
        let auth_secret = decode_b64(&subscription.keys.auth)
            .map_err(|e| PushError::InvalidSubscriptionKeys(e.to_string()))?;

        let body = encrypt(&ua_public, &auth_secret, payload, &self.rng)?;
        let authorization = self.signer.authorization(&endpoint)?;

        let response = self
            .http
            .post(endpoint)
            .header("Authorization", authorization)
            .header("TTL", self.ttl_secs.to_string())
            .header("Content-Encoding", "aes128gcm")
            .header("Content-Type", "application/octet-stream")
            .body(body)
            .send()
            .await?;
        Ok(response.status())
    }
}

#[async_trait]
impl PushTransport for WebPushTransport {
    async fn deliver(&self, subscription: &PushSubscription, payload: &[u8]) -> DeliveryOutcome {
        match self.post(subscription, payload).await {
            Ok(status) => {
                let outcome = classify(status);
                debug!(endpoint = %subscription.endpoint, %status, ?outcome, "Push service answered");
                outcome
            }
            Err(e) => {
                warn!(endpoint = %subscription.endpoint, error = %e, "Push request failed");
                DeliveryOutcome::Failed
            }
        }
    }
}
