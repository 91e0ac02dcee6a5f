use num_enum::{FromPrimitive, IntoPrimitive};

/// Public key algorithm ids.
/// Ref: <https://tools.ietf.org/html/rfc4880.html#section-9.1>
#[derive(Debug, PartialEq, Eq, Clone, Copy, FromPrimitive, IntoPrimitive, derive_more::Display)]
#[repr(u8)]
pub enum PublicKeyAlgorithm {
    /// RSA (Encrypt and Sign)
    #[display("RSA")]
    RSA = 1,
    /// DEPRECATED: RSA (Encrypt-Only)
    #[display("RSA-E")]
    RSAEncrypt = 2,
    /// DEPRECATED: RSA (Sign-Only)
    #[display("RSA-S")]
    RSASign = 3,
    /// Elgamal (Encrypt-Only)
    #[display("ElGamal")]
    ElgamalEncrypt = 16,
    /// DSA (Digital Signature Algorithm)
    #[display("DSA")]
    DSA = 17,
    /// Elliptic Curve: RFC-6637
    #[display("ECDH")]
    ECDH = 18,
    /// ECDSA: RFC-6637
    #[display("ECDSA")]
    ECDSA = 19,
    /// DEPRECATED: Elgamal (Encrypt and Sign)
    #[display("ElGamal-ES")]
    Elgamal = 20,
    /// EdDSA, in the format GnuPG uses for curve Ed25519
    #[display("EdDSA")]
    EdDSA = 22,

    #[num_enum(catch_all)]
    #[display("Unknown({_0})")]
    Unknown(u8),
}

impl PublicKeyAlgorithm {
    /// Can keys of this algorithm issue signatures?
    pub fn can_sign(self) -> bool {
        matches!(
            self,
            Self::RSA | Self::RSASign | Self::DSA | Self::ECDSA | Self::EdDSA | Self::Elgamal
        )
    }

    /// Can keys of this algorithm be encrypted to?
    pub fn can_encrypt(self) -> bool {
        matches!(
            self,
            Self::RSA | Self::RSAEncrypt | Self::ElgamalEncrypt | Self::Elgamal | Self::ECDH
        )
    }
}
