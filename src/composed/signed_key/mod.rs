//! Transferable keys: a primary key bound to its identities and subkeys.
//!
//! A block goes through three stages. Parsing groups packets according to
//! the transferable key grammar and yields unverified material. Resolution
//! checks every signature against the primary key and keeps what verified.
//! Selection then hands out the most recently certified key for a usage.
//!
//! ```rust
//! # use pgp_keyblock::errors::Result;
//! use pgp_keyblock::composed::SignedPublicKey;
//! use pgp_keyblock::crypto::SoftwareVerifier;
//!
//! async fn encryption_key_id(raw: Vec<u8>) -> Result<Option<String>> {
//!     let mut key = SignedPublicKey::from_bytes(raw)?;
//!     key.resolve(&SoftwareVerifier).await?;
//!
//!     let id = key.encryption_key()?.map(|k| {
//!         use pgp_keyblock::types::KeyDetails;
//!         format!("{:x}", k.key_id())
//!     });
//!     Ok(id)
//! }
//! ```

mod family;
mod identity;
mod key_parser;
mod public;
mod resolve;
mod secret;
mod select;
mod shared;
mod subkey;

pub use self::family::*;
pub use self::identity::*;
pub use self::key_parser::KeyBlockParser;
pub use self::public::*;
pub use self::secret::*;
pub use self::select::*;
pub use self::shared::TransferableKey;
pub use self::subkey::*;
