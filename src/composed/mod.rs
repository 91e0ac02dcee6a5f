//! Handle OpenPGP objects that are composed of multiple packets, such as
//! [Transferable Public Key]s and their exports.
//!
//! [Transferable Public Key]: https://tools.ietf.org/html/rfc4880.html#section-11.1

mod export;
mod signed_key;

pub use self::export::*;
pub use self::signed_key::*;
