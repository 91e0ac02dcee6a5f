//! Non-fatal findings while resolving and querying a key block.
//!
//! Nothing reported here fails an operation. Blocks forward their findings to
//! a [`DiagnosticSink`], by default the [`LogSink`].

use log::warn;

use crate::packet::SignatureType;
use crate::types::{KeyId, KeyKind, KeyUsage};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Diagnostic {
    /// A revocation on the primary key that did not verify and was ignored.
    #[display("ignoring unverifiable {typ:?} on {key_id:?}: {reason}")]
    UnverifiedRevocation {
        key_id: KeyId,
        typ: SignatureType,
        reason: String,
    },
    /// A user id without a valid certification, or with a valid revocation.
    #[display("dropping user id {id:?} of {key_id:?}")]
    UserIdRejected { key_id: KeyId, id: String },
    /// Key selection found no key for the requested usage.
    #[display("no {kind} key of {key_id:?} is certified to {usage}")]
    NoKeyForUsage {
        key_id: KeyId,
        usage: KeyUsage,
        kind: KeyKind,
    },
}

/// Receives the diagnostics of a key block.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade, at warning level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::NoKeyForUsage {
            key_id: KeyId::from([0xAB; 8]),
            usage: KeyUsage::Encrypt,
            kind: KeyKind::Public,
        };
        assert_eq!(
            diagnostic.to_string(),
            "no public key of KeyId(abababababababab) is certified to encrypt"
        );

        let diagnostic = Diagnostic::UserIdRejected {
            key_id: KeyId::from([1; 8]),
            id: "mallory".to_string(),
        };
        assert_eq!(
            diagnostic.to_string(),
            "dropping user id \"mallory\" of KeyId(0101010101010101)"
        );
    }
}
