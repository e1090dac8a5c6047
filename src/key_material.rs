//! A data-shape-only helper for validating and constructing AES symmetric key material before it
//! is handed to [`crate::builders::register_aes_key`].
//!
//! The decoded byte length must be one of 16, 24 or 32 (128, 192 or 256 bits); anything else is
//! rejected.
use crate::error::{ErrorKind, Result};

/// Raw AES key bytes known to be one of the three valid AES key sizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymmetricKeyMaterial(Vec<u8>);

impl SymmetricKeyMaterial {
    /// Builds from raw bytes, rejecting any length other than 16, 24 or 32 bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        match bytes.len() {
            16 | 24 | 32 => Ok(SymmetricKeyMaterial(bytes)),
            other => Err(ErrorKind::ArgInvalid(format!(
                "AES key must be 16, 24 or 32 bytes, got {}",
                other
            ))
            .into()),
        }
    }

    /// Builds from a hex-encoded string, decoding then applying the same length check as
    /// [`Self::from_bytes`].
    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = hex::decode(hex)
            .map_err(|e| ErrorKind::ArgInvalid(format!("invalid hex key material: {}", e)))?;
        Self::from_bytes(bytes)
    }

    /// The key length in bits (128, 192 or 256).
    pub fn bit_length(&self) -> i32 {
        (self.0.len() as i32) * 8
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exactly_the_three_aes_key_sizes() {
        assert!(SymmetricKeyMaterial::from_bytes(vec![0u8; 16]).is_ok());
        assert!(SymmetricKeyMaterial::from_bytes(vec![0u8; 24]).is_ok());
        assert!(SymmetricKeyMaterial::from_bytes(vec![0u8; 32]).is_ok());
    }

    #[test]
    fn rejects_any_other_length() {
        assert!(SymmetricKeyMaterial::from_bytes(vec![0u8; 15]).is_err());
        assert!(SymmetricKeyMaterial::from_bytes(vec![0u8; 33]).is_err());
        assert!(SymmetricKeyMaterial::from_bytes(Vec::new()).is_err());
    }

    #[test]
    fn from_hex_decodes_then_validates_length() {
        let hex = "00".repeat(16);
        let material = SymmetricKeyMaterial::from_hex(&hex).unwrap();
        assert_eq!(material.bit_length(), 128);

        let short_hex = "00".repeat(15);
        assert!(SymmetricKeyMaterial::from_hex(&short_hex).is_err());
    }

    #[test]
    fn from_hex_rejects_malformed_hex() {
        assert!(SymmetricKeyMaterial::from_hex("not hex").is_err());
    }
}
