//! EdDSA over Curve25519, in the legacy framing of algorithm id 22.
//!
//! The public point is stored as an MPI with a `0x40` prefix octet, the
//! secret as the 32 byte seed, and signatures as the two MPIs `r` and `s`.

use ed25519_dalek::{Signer as _, Verifier as _};
use rand::{CryptoRng, Rng};
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::crypto::hash::HashAlgorithm;
use crate::crypto::Signer;
use crate::errors::{bail, ensure, ensure_eq, Result};
use crate::parsing::BufParsing;
use crate::types::{plain_secret_data, Mpi, PublicParams, SecretParams, ED25519_OID};

const MIN_HASH_LEN_BITS: usize = 256;

/// Secret key for EdDSA with Curve25519, the only combination we currently support.
#[derive(Clone, PartialEq, Eq, ZeroizeOnDrop, derive_more::Debug)]
pub struct SecretKey {
    #[debug("..")]
    secret: ed25519_dalek::SigningKey,
}

impl SecretKey {
    /// Generate an EdDSA `SecretKey`.
    pub fn generate<R: Rng + CryptoRng>(mut rng: R) -> Self {
        let mut bytes = Zeroizing::new([0u8; ed25519_dalek::SECRET_KEY_LENGTH]);
        rng.fill_bytes(&mut *bytes);
        let secret = ed25519_dalek::SigningKey::from_bytes(&bytes);

        SecretKey { secret }
    }

    /// Reads the key from unprotected secret key material.
    pub fn from_secret_params(params: &SecretParams) -> Result<Self> {
        ensure!(
            !params.is_encrypted(),
            "cannot use protected secret key material (s2k usage {})",
            params.s2k_usage()
        );
        let mut data = params.data();
        let mpi = Mpi::from_buf(&mut data)?;
        let checksum = data.read_be_u16()?;

        let mut expected = Vec::new();
        crate::ser::Serialize::to_writer(&mpi, &mut expected)?;
        ensure_eq!(
            crate::types::checksum_simple(&expected),
            checksum,
            "invalid secret key checksum"
        );

        let seed = Zeroizing::new(mpi.to_padded::<{ ed25519_dalek::SECRET_KEY_LENGTH }>()?);
        Ok(SecretKey {
            secret: ed25519_dalek::SigningKey::from_bytes(&seed),
        })
    }

    /// The public parameters matching this key.
    pub fn public_params(&self) -> PublicParams {
        let mut q = Vec::with_capacity(33);
        q.push(0x40);
        q.extend_from_slice(self.secret.verifying_key().as_bytes());

        PublicParams::EdDSALegacy {
            oid: ED25519_OID.into(),
            q: Mpi::from_slice(&q),
        }
    }

    /// Unprotected secret key material, as stored in a secret key packet.
    pub fn secret_params(&self) -> Result<SecretParams> {
        let seed = Mpi::from_slice(self.secret.as_bytes());
        Ok(SecretParams::new(0, plain_secret_data(&[seed])?))
    }
}

impl Signer for SecretKey {
    fn sign(&self, hash: HashAlgorithm, digest: &[u8]) -> Result<Vec<Mpi>> {
        let Some(digest_size) = hash.digest_size() else {
            bail!("EdDSA signature: invalid hash algorithm: {:?}", hash);
        };
        ensure_eq!(
            digest.len(),
            digest_size,
            "Unexpected digest length {} for hash algorithm {:?}",
            digest.len(),
            hash,
        );
        ensure!(
            digest_size * 8 >= MIN_HASH_LEN_BITS,
            "EdDSA signature: hash algorithm {:?} is too weak for Ed25519",
            hash,
        );

        let signature = self.secret.sign(digest);
        let bytes = signature.to_bytes();

        Ok(vec![
            Mpi::from_slice(&bytes[..32]),
            Mpi::from_slice(&bytes[32..]),
        ])
    }
}

/// Verify an EdDSA signature.
pub fn verify(oid: &[u8], q: &Mpi, hash: HashAlgorithm, hashed: &[u8], sig: &[Mpi]) -> Result<()> {
    ensure!(oid == ED25519_OID, "unsupported EdDSA curve {}", hex::encode(oid));
    let Some(digest_size) = hash.digest_size() else {
        bail!("EdDSA signature: invalid hash algorithm: {:?}", hash);
    };
    ensure!(
        digest_size * 8 >= MIN_HASH_LEN_BITS,
        "EdDSA signature: hash algorithm {:?} is too weak for Ed25519",
        hash,
    );
    ensure_eq!(sig.len(), 2, "EdDSA signature: expected r and s");

    let q = q.as_ref();
    ensure!(
        q.len() == 33 && q[0] == 0x40,
        "EdDSA signature: invalid public point encoding"
    );
    let mut point = [0u8; 32];
    point.copy_from_slice(&q[1..]);
    let key = ed25519_dalek::VerifyingKey::from_bytes(&point)?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&sig[0].to_padded::<32>()?);
    sig_bytes[32..].copy_from_slice(&sig[1].to_padded::<32>()?);
    let sig = ed25519_dalek::Signature::from_bytes(&sig_bytes);

    Ok(key.verify(hashed, &sig)?)
}
