use std::fmt;

/// The cryptographic operations a key can be selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyUsage {
    /// Encrypt to the key, needs only public material.
    Encrypt,
    /// Decrypt with the key, needs secret material.
    Decrypt,
    /// Sign with the key, needs secret material.
    Sign,
}

impl fmt::Display for KeyUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyUsage::Encrypt => f.write_str("encrypt"),
            KeyUsage::Decrypt => f.write_str("decrypt"),
            KeyUsage::Sign => f.write_str("sign"),
        }
    }
}

/// Whether a key packet carries public or secret material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Public,
    Secret,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Public => f.write_str("public"),
            KeyKind::Secret => f.write_str("secret"),
        }
    }
}
