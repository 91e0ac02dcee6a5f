//! # pgp-keyblock
//!
//! OpenPGP transferable key blocks, as described in
//! [RFC 4880 section 11.1](https://tools.ietf.org/html/rfc4880.html#section-11.1).
//!
//! A key block is parsed from a packet stream into a [`TransferableKey`]
//! holding everything that was found, verified or not. Calling
//! [`resolve`](TransferableKey::resolve) with a [`Verifier`](crypto::Verifier)
//! checks every certification and binding concurrently. Only material that
//! survives resolution is used when selecting a key for an operation or when
//! exporting a [`KeyObject`].
//!
//! ```no_run
//! # async fn run(bytes: Vec<u8>) -> pgp_keyblock::errors::Result<()> {
//! use pgp_keyblock::crypto::SoftwareVerifier;
//! use pgp_keyblock::types::{KeyKind, KeyUsage};
//! use pgp_keyblock::{ExportOptions, SignedSecretKey};
//!
//! let mut key = SignedSecretKey::from_bytes(bytes)?;
//! key.resolve(&SoftwareVerifier).await?;
//!
//! let signing_key = key.select_key_for(KeyUsage::Sign, KeyKind::Secret)?;
//! let object = key.to_key_object(&ExportOptions::default())?;
//! # let _ = (signing_key, object);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub(crate) mod util;

pub mod composed;
pub mod crypto;
pub mod diagnostics;
pub mod errors;
pub mod packet;
pub mod parsing;
pub mod ser;
pub mod types;

pub use self::composed::{
    ExportOptions, KeyBlockParser, KeyObject, KeyRef, SignedPublicKey, SignedSecretKey,
    TransferableKey,
};
pub use self::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
pub use self::packet::{PacketParser, Signature};
