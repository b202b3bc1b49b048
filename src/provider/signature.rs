use base64::{engine::general_purpose, Engine};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::{error::Error, helpers::decode_address};

/// Domain separation prefix for signed arbitrary bytes.
const MESSAGE_PREFIX: &[u8] = b"MX";

/// Proof that the caller controls an address: the configured auth note
/// signed with the address key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    pub address: String,
    /// Base64 of the signed message.
    pub message: String,
    /// Base64 of the 64 byte ed25519 signature.
    pub signature: String,
}

pub trait SignatureVerifier: Send + Sync {
    /// Ok when `auth` proves control of `address`.
    fn verify(&self, address: &str, auth: &AuthRequest) -> Result<(), Error>;
}

#[derive(Debug)]
pub struct Ed25519Verifier {
    note: String,
}

impl Ed25519Verifier {
    pub fn new(note: String) -> Self {
        Ed25519Verifier { note }
    }
}

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, address: &str, auth: &AuthRequest) -> Result<(), Error> {
        if auth.address != address {
            return Err(Error::Unauthorized(format!(
                "signature is for {}, not {}",
                auth.address, address
            )));
        }

        let message = general_purpose::STANDARD.decode(&auth.message)?;
        if message != self.note.as_bytes() {
            return Err(Error::Unauthorized(String::from(
                "signed message does not match",
            )));
        }

        let public_key = decode_address(address)?;
        let key = VerifyingKey::from_bytes(&public_key).map_err(|_| {
            Error::Unauthorized(format!("invalid public key for {}", address))
        })?;

        let signature = general_purpose::STANDARD.decode(&auth.signature)?;
        let signature = Signature::from_slice(&signature).map_err(|_| {
            Error::Unauthorized(String::from("malformed signature"))
        })?;

        let mut payload = Vec::with_capacity(MESSAGE_PREFIX.len() + message.len());
        payload.extend_from_slice(MESSAGE_PREFIX);
        payload.extend_from_slice(&message);

        key.verify(&payload, &signature).map_err(|_| {
            Error::Unauthorized(String::from("signature verification failed"))
        })
    }
}
