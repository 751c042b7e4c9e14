use crate::certificate::Certificate;
use rsa::RsaPrivateKey;
use std::sync::OnceLock;

static TEST_KEY: OnceLock<RsaPrivateKey> = OnceLock::new();

/// RSA-2048 key shared by every unit test
pub(crate) fn test_private_key() -> &'static RsaPrivateKey {
    TEST_KEY.get_or_init(|| {
        RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("RSA test key generation")
    })
}

pub(crate) fn certificate_for(material: &str) -> Certificate {
    Certificate::new(
        "test-fingerprint",
        material,
        "2020-01-01",
        "2030-12-31",
        3600,
    )
}
