//! Image encryption and vendor request signing.
//!
//! Images are sealed with AES-256-GCM (`nonce || ciphertext`). Face images share a
//! configured key; each photo ID gets a fresh key. Keys handed to the vendor are
//! wrapped with its RSA public key (OAEP, SHA-256) and base64 encoded.
//!
//! Requests are signed with HMAC-SHA256 over
//! `METHOD\ncontent-type\ndate\n` followed by `key:value\n` for every body field in
//! key order, and carried as `Authorization: SSI <access_key>:<base64 mac>`.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use anyhow::{Context as _, anyhow, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use rsa::pkcs8::DecodePublicKey;
use rsa::{Oaep, RsaPublicKey};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 12;

pub const AUTHORIZATION_SCHEME: &str = "SSI";

/// Keys used to seal uploaded images for the vendor.
pub struct ImageCipher {
    face_key: [u8; 32],
    vendor_key: RsaPublicKey,
}

/// An encrypted photo ID together with its wrapped per-image key.
pub struct SealedPhotoId {
    pub ciphertext: Vec<u8>,
    /// Base64 of the AES key, RSA-wrapped for the vendor.
    pub wrapped_key: String,
}

impl ImageCipher {
    pub fn new(face_key_hex: &str, vendor_public_key_pem: &str) -> anyhow::Result<Self> {
        let bytes = hex::decode(face_key_hex.trim()).context("face image key is not hex")?;
        let face_key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| anyhow!("face image key must be 32 bytes"))?;
        let vendor_key = RsaPublicKey::from_public_key_pem(vendor_public_key_pem.trim())
            .context("parse vendor RSA public key")?;
        Ok(Self {
            face_key,
            vendor_key,
        })
    }

    pub fn seal_face_image(&self, image: &[u8]) -> anyhow::Result<Vec<u8>> {
        aes_encrypt(&self.face_key, image)
    }

    pub fn seal_photo_id(&self, image: &[u8]) -> anyhow::Result<SealedPhotoId> {
        let key = Aes256Gcm::generate_key(OsRng);
        let ciphertext = aes_encrypt(key.as_slice(), image)?;
        let wrapped_key = self.wrap_key(key.as_slice())?;
        Ok(SealedPhotoId {
            ciphertext,
            wrapped_key,
        })
    }

    /// The face image key wrapped for the vendor (`UserPhotoKey`).
    pub fn wrapped_face_key(&self) -> anyhow::Result<String> {
        self.wrap_key(&self.face_key)
    }

    fn wrap_key(&self, key: &[u8]) -> anyhow::Result<String> {
        let wrapped = self
            .vendor_key
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), key)
            .context("wrap key for vendor")?;
        Ok(STANDARD.encode(wrapped))
    }
}

pub fn aes_encrypt(key: &[u8], plaintext: &[u8]) -> anyhow::Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| anyhow!("invalid AES key length"))?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| anyhow!("AES-GCM encryption failed"))?;
    let mut sealed = nonce.to_vec();
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

pub fn aes_decrypt(key: &[u8], sealed: &[u8]) -> anyhow::Result<Vec<u8>> {
    if sealed.len() < NONCE_LEN {
        bail!("ciphertext shorter than nonce");
    }
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| anyhow!("invalid AES key length"))?;
    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| anyhow!("AES-GCM decryption failed"))
}

/// Canonical string covered by the request signature.
pub fn signing_message(
    method: &str,
    content_type: &str,
    date: &str,
    body: &serde_json::Map<String, serde_json::Value>,
) -> String {
    let mut message = format!("{method}\n{content_type}\n{date}\n");
    let mut keys: Vec<&String> = body.keys().collect();
    keys.sort();
    for key in keys {
        let value = match &body[key] {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        message.push_str(key);
        message.push(':');
        message.push_str(&value);
        message.push('\n');
    }
    message
}

fn mac_for(secret_key: &str, message: &str) -> anyhow::Result<HmacSha256> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret_key.as_bytes())
        .map_err(|_| anyhow!("invalid HMAC key"))?;
    mac.update(message.as_bytes());
    Ok(mac)
}

/// `Authorization` header value for `message`.
pub fn authorization_header(
    access_key: &str,
    secret_key: &str,
    message: &str,
) -> anyhow::Result<String> {
    let signature = STANDARD.encode(mac_for(secret_key, message)?.finalize().into_bytes());
    Ok(format!("{AUTHORIZATION_SCHEME} {access_key}:{signature}"))
}

/// Check an incoming `Authorization` header against `message`. Constant-time in the MAC.
pub fn verify_authorization(
    header: &str,
    access_key: &str,
    secret_key: &str,
    message: &str,
) -> bool {
    let Some(credentials) = header
        .strip_prefix(AUTHORIZATION_SCHEME)
        .and_then(|rest| rest.strip_prefix(' '))
    else {
        return false;
    };
    let Some((presented_key, signature)) = credentials.split_once(':') else {
        return false;
    };
    if presented_key != access_key {
        return false;
    }
    let Ok(signature) = STANDARD.decode(signature) else {
        return false;
    };
    match mac_for(secret_key, message) {
        Ok(mac) => mac.verify_slice(&signature).is_ok(),
        Err(_) => false,
    }
}
