//! Snapshots of a resolved key block for callers outside the OpenPGP layer.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use derive_builder::Builder;
use serde::Serializer;

use crate::composed::signed_key::{KeyFamily, TransferableKey};
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::errors::{Error, Result};
use crate::types::{Fingerprint, KeyDetails, KeyId, KeyKind, KeyUsage};

/// Provider id used when none is configured.
pub const DEFAULT_PROVIDER_ID: &str = "software";

#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(build_fn(error = "Error"))]
pub struct ExportOptions {
    /// Leave [`KeyObject::serialized`] empty.
    #[builder(default)]
    pub skip_serialize: bool,
    /// Tag identifying who holds the key material.
    #[builder(setter(into), default = "DEFAULT_PROVIDER_ID.to_string()")]
    pub provider_id: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            skip_serialize: false,
            provider_id: DEFAULT_PROVIDER_ID.to_string(),
        }
    }
}

/// Public facts about a single key.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct KeyMetadata {
    #[serde(serialize_with = "hex_bytes")]
    pub key_id: KeyId,
    #[serde(serialize_with = "hex_bytes")]
    pub fingerprint: Fingerprint,
    #[serde(serialize_with = "display")]
    pub algorithm: PublicKeyAlgorithm,
    #[serde(serialize_with = "rfc3339")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "display")]
    pub kind: KeyKind,
    pub can_sign: bool,
    pub can_encrypt: bool,
}

impl KeyMetadata {
    pub fn from_key(key: &impl KeyDetails) -> Self {
        KeyMetadata {
            key_id: key.key_id(),
            fingerprint: key.fingerprint(),
            algorithm: key.algorithm(),
            created_at: *key.created_at(),
            kind: key.kind(),
            can_sign: key.algorithm().can_sign(),
            can_encrypt: key.algorithm().can_encrypt(),
        }
    }
}

/// An immutable export of a key block.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct KeyObject {
    pub primary_key: KeyMetadata,
    /// Verified subkeys only.
    pub subkeys: Vec<KeyMetadata>,
    /// Verified user ids only.
    pub user_ids: Vec<String>,
    pub provider_id: String,
    #[serde(serialize_with = "hex_bytes_opt")]
    pub signing_key_id: Option<KeyId>,
    #[serde(serialize_with = "display_opt")]
    pub signing_algorithm: Option<PublicKeyAlgorithm>,
    #[serde(serialize_with = "hex_bytes_opt")]
    pub decryption_key_id: Option<KeyId>,
    #[serde(serialize_with = "display_opt")]
    pub decryption_algorithm: Option<PublicKeyAlgorithm>,
    /// Output of [`TransferableKey::serialize`].
    #[serde(serialize_with = "hex_bytes_opt")]
    pub serialized: Option<Vec<u8>>,
}

impl<F: KeyFamily> TransferableKey<F> {
    /// Exports the verified view of this block.
    ///
    /// Signing and decryption keys are only looked up for secret keys.
    /// Fails like [`select_key_for`](Self::select_key_for) on blocks that
    /// were not resolved.
    pub fn to_key_object(&self, options: &ExportOptions) -> Result<KeyObject> {
        let (signing, decryption) = match F::KIND {
            KeyKind::Secret => (
                self.select_key_for(KeyUsage::Sign, KeyKind::Secret)?,
                self.select_key_for(KeyUsage::Decrypt, KeyKind::Secret)?,
            ),
            KeyKind::Public => (None, None),
        };

        let serialized = if options.skip_serialize {
            None
        } else {
            Some(self.serialize()?)
        };

        Ok(KeyObject {
            primary_key: KeyMetadata::from_key(&self.primary_key),
            subkeys: self
                .verified_subkeys
                .iter()
                .map(|subkey| KeyMetadata::from_key(&subkey.key))
                .collect(),
            user_ids: self.user_ids().into_iter().map(String::from).collect(),
            provider_id: options.provider_id.clone(),
            signing_key_id: signing.map(|k| k.key_id()),
            signing_algorithm: signing.map(|k| k.algorithm()),
            decryption_key_id: decryption.map(|k| k.key_id()),
            decryption_algorithm: decryption.map(|k| k.algorithm()),
            serialized,
        })
    }
}

fn hex_bytes<S: Serializer>(value: &impl AsRef<[u8]>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(value))
}

fn hex_bytes_opt<S: Serializer, T: AsRef<[u8]>>(
    value: &Option<T>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => s.serialize_some(&hex::encode(value)),
        None => s.serialize_none(),
    }
}

fn display<S: Serializer>(value: &impl fmt::Display, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

fn display_opt<S: Serializer, T: fmt::Display>(value: &Option<T>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => s.serialize_some(&value.to_string()),
        None => s.serialize_none(),
    }
}

fn rfc3339<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_options() {
        let options = ExportOptionsBuilder::default()
            .skip_serialize(true)
            .build()
            .unwrap();
        assert!(options.skip_serialize);
        assert_eq!(options.provider_id, DEFAULT_PROVIDER_ID);

        let options = ExportOptionsBuilder::default()
            .provider_id("token-7")
            .build()
            .unwrap();
        assert_eq!(options.provider_id, "token-7");
        assert!(!options.skip_serialize);
        assert_eq!(ExportOptions::default().provider_id, DEFAULT_PROVIDER_ID);
    }
}
