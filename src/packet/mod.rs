//! # Packet module
//!
//! The packets that make up a transferable key, their framing and a
//! streaming [`PacketParser`] that turns raw bytes into [`Packet`]s.
//!
//! ```rust
//! use pgp_keyblock::packet::{Packet, PacketParser, PacketTrait, UserId};
//! use pgp_keyblock::types::PacketHeaderVersion;
//!
//! let mut raw = Vec::new();
//! UserId::from_str(PacketHeaderVersion::New, "Alice <alice@example.org>")
//!     .to_writer_with_header(&mut raw)?;
//!
//! let packets = PacketParser::new(raw).collect::<pgp_keyblock::errors::Result<Vec<_>>>()?;
//! assert!(matches!(&packets[0], Packet::UserId(id) if id.id() == "Alice <alice@example.org>"));
//! # Ok::<(), pgp_keyblock::errors::Error>(())
//! ```

mod header;
mod key;
mod many;
mod packet_sum;
mod packet_trait;
mod signature;
mod trust;
mod user_attribute;
mod user_id;

pub use self::header::*;
pub use self::key::*;
pub use self::many::*;
pub use self::packet_sum::*;
pub use self::packet_trait::*;
pub use self::signature::*;
pub use self::trust::*;
pub use self::user_attribute::*;
pub use self::user_id::*;
