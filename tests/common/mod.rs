#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use pgp_keyblock::crypto::eddsa;
use pgp_keyblock::crypto::public_key::PublicKeyAlgorithm;
use pgp_keyblock::diagnostics::{Diagnostic, DiagnosticSink};
use pgp_keyblock::errors::Result;
use pgp_keyblock::packet::{
    KeyFlags, Packet, PublicKey, PublicSubkey, SecretKey, SecretSubkey, Signature,
    SignatureConfig, SignatureType, Subpacket, UserAttribute, UserId,
};
use pgp_keyblock::ser::Serialize;
use pgp_keyblock::types::{KeyDetails, Mpi, PacketHeaderVersion, PublicParams, SecretParams, Tag};

pub const ALICE: &str = "Alice <alice@example.org>";
pub const BOB: &str = "Bob <bob@example.org>";

/// OID of Curve25519 for ECDH.
const CV25519_OID: &[u8] = &[0x2B, 0x06, 0x01, 0x04, 0x01, 0x97, 0x55, 0x01, 0x05, 0x01];

pub fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// An EdDSA primary key, both halves.
pub struct TestKey {
    pub public: PublicKey,
    pub secret: SecretKey,
}

impl TestKey {
    pub fn new(seed: u64) -> Self {
        let signing = eddsa::SecretKey::generate(ChaCha8Rng::seed_from_u64(seed));
        let public = PublicKey::new(
            PacketHeaderVersion::Old,
            PublicKeyAlgorithm::EdDSA,
            ts(1_500_000_000),
            signing.public_params(),
        )
        .unwrap();
        let secret = SecretKey::new(public.clone(), signing.secret_params().unwrap());

        TestKey { public, secret }
    }

    /// Positive certification of `id`, optionally restricted by key flags.
    pub fn certify(
        &self,
        id: &UserId,
        created: DateTime<Utc>,
        flags: Option<KeyFlags>,
    ) -> Result<Signature> {
        self.certify_as(SignatureType::CertPositive, id, created, flags)
    }

    pub fn certify_as(
        &self,
        typ: SignatureType,
        id: &UserId,
        created: DateTime<Utc>,
        flags: Option<KeyFlags>,
    ) -> Result<Signature> {
        config(typ, &self.public, created, flags).sign_certification(
            &self.secret,
            &self.public,
            Tag::UserId,
            id,
        )
    }

    pub fn certify_attribute(
        &self,
        attr: &UserAttribute,
        created: DateTime<Utc>,
    ) -> Result<Signature> {
        config(SignatureType::CertGeneric, &self.public, created, None).sign_certification(
            &self.secret,
            &self.public,
            Tag::UserAttribute,
            attr,
        )
    }

    pub fn bind(
        &self,
        subkey: &impl KeyDetails,
        created: DateTime<Utc>,
        flags: Option<KeyFlags>,
    ) -> Result<Signature> {
        config(SignatureType::SubkeyBinding, &self.public, created, flags).sign_key_binding(
            &self.secret,
            &self.public,
            subkey,
        )
    }

    pub fn revoke_subkey(
        &self,
        subkey: &impl KeyDetails,
        created: DateTime<Utc>,
    ) -> Result<Signature> {
        config(SignatureType::SubkeyRevocation, &self.public, created, None).sign_key_binding(
            &self.secret,
            &self.public,
            subkey,
        )
    }

    pub fn revoke(&self, created: DateTime<Utc>) -> Result<Signature> {
        config(SignatureType::KeyRevocation, &self.public, created, None)
            .sign_key(&self.secret, &self.public)
    }
}

fn config(
    typ: SignatureType,
    key: &PublicKey,
    created: DateTime<Utc>,
    flags: Option<KeyFlags>,
) -> SignatureConfig {
    let mut config = SignatureConfig::for_key(typ, key, created);
    if let Some(flags) = flags {
        config.hashed_subpackets.push(Subpacket::regular(flags.into()));
    }
    config
}

pub fn sign_flags() -> KeyFlags {
    let mut flags = KeyFlags::default();
    flags.set_certify(true);
    flags.set_sign(true);
    flags
}

pub fn encrypt_flags() -> KeyFlags {
    let mut flags = KeyFlags::default();
    flags.set_encrypt_comms(true);
    flags.set_encrypt_storage(true);
    flags
}

pub fn user(id: &str) -> UserId {
    UserId::from_str(PacketHeaderVersion::New, id)
}

pub fn trust() -> Packet {
    let raw = Bytes::from_static(&[0, 0]);
    pgp_keyblock::packet::Trust::from_buf(PacketHeaderVersion::Old, raw).into()
}

/// An ECDH subkey. The point is made up, which is fine as nothing is
/// ever encrypted to it.
pub fn ecdh_subkey(n: u8, created: DateTime<Utc>) -> PublicSubkey {
    let mut p = vec![0x40];
    p.extend_from_slice(&[n; 32]);

    PublicSubkey::new(
        PacketHeaderVersion::New,
        PublicKeyAlgorithm::ECDH,
        created,
        PublicParams::ECDH {
            oid: Bytes::from_static(CV25519_OID),
            p: Mpi::from_slice(&p),
            kdf: Bytes::from_static(&[0x01, 0x08, 0x07]),
        },
    )
    .unwrap()
}

pub fn secret_ecdh_subkey(n: u8, created: DateTime<Utc>) -> SecretSubkey {
    let mut data = vec![0x00, 0xFF];
    data.extend_from_slice(&[n; 32]);
    SecretSubkey::new(ecdh_subkey(n, created), SecretParams::new(0, data))
}

/// A public block: Alice, certified to sign, and one ECDH subkey bound for encryption.
pub fn public_block(key: &TestKey) -> Vec<Packet> {
    let alice = user(ALICE);
    let subkey = ecdh_subkey(1, ts(1_550_000_000));

    vec![
        key.public.clone().into(),
        alice.clone().into(),
        key.certify(&alice, ts(1_600_000_000), Some(sign_flags()))
            .unwrap()
            .into(),
        subkey.clone().into(),
        key.bind(&subkey, ts(1_600_000_100), Some(encrypt_flags()))
            .unwrap()
            .into(),
    ]
}

/// The secret counterpart of [`public_block`], with a secret and a public ECDH subkey.
pub fn secret_block(key: &TestKey) -> Vec<Packet> {
    let alice = user(ALICE);
    let secret_subkey = secret_ecdh_subkey(2, ts(1_550_000_000));
    let public_subkey = ecdh_subkey(3, ts(1_550_000_000));

    vec![
        key.secret.clone().into(),
        alice.clone().into(),
        key.certify(&alice, ts(1_600_000_000), Some(sign_flags()))
            .unwrap()
            .into(),
        secret_subkey.clone().into(),
        key.bind(&secret_subkey, ts(1_600_000_100), Some(encrypt_flags()))
            .unwrap()
            .into(),
        public_subkey.clone().into(),
        key.bind(&public_subkey, ts(1_600_000_200), Some(encrypt_flags()))
            .unwrap()
            .into(),
    ]
}

/// Writes packets the way they would appear in a file.
pub fn to_bytes(packets: &[Packet]) -> Vec<u8> {
    let mut buf = Vec::new();
    for packet in packets {
        packet.to_writer(&mut buf).unwrap();
    }
    buf
}

/// Keeps every diagnostic it receives.
#[derive(Debug, Default)]
pub struct CollectingSink(Mutex<Vec<Diagnostic>>);

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.0.lock().unwrap().push(diagnostic);
    }
}
