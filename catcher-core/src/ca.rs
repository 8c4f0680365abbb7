use crate::error::CatcherError;
use crate::Result;
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
    KeyUsagePurpose, PKCS_ECDSA_P256_SHA256,
};
use std::fs;
use std::path::Path;
use time::{Duration, OffsetDateTime};

const CA_COMMON_NAME: &str = "StreamCatcher Local CA";
const CA_ORGANIZATION: &str = "StreamCatcher";

/// Root certificate the browser must trust so HTTPS media requests can be
/// inspected.
///
/// Kept on disk as `ca.pem` / `ca.key` (plus a `ca.crt` copy for browsers
/// that want that extension) and reused across runs.
pub struct CertificateAuthority {
    ca_cert: Certificate,
}

fn ca_params() -> CertificateParams {
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, CA_COMMON_NAME);
    dn.push(DnType::OrganizationName, CA_ORGANIZATION);
    params.distinguished_name = dn;
    params.is_ca = IsCa::Ca(BasicConstraints::Constrained(0));
    params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
    params
}

fn cert_error(context: &str, e: rcgen::Error) -> CatcherError {
    CatcherError::Certificate(format!("{}: {}", context, e))
}

impl CertificateAuthority {
    /// Load the CA from `ca_dir`, generating and saving a new one if absent.
    pub fn load_or_create(ca_dir: &Path) -> Result<Self> {
        let cert_path = ca_dir.join("ca.pem");
        let key_path = ca_dir.join("ca.key");

        if cert_path.exists() && key_path.exists() {
            let key_pem = fs::read_to_string(&key_path)?;
            return Self::from_key_pem(&key_pem);
        }

        fs::create_dir_all(ca_dir)?;
        let ca = Self::generate()?;
        let cert_pem = ca.cert_pem()?;
        fs::write(&cert_path, &cert_pem)?;
        fs::write(&key_path, ca.key_pem())?;
        fs::write(cert_path.with_extension("crt"), &cert_pem)?;
        Ok(ca)
    }

    /// Rebuild the CA around an existing key. rcgen cannot load a signed
    /// certificate, so the subject is recreated with the same key; leaf
    /// certificates still chain to the stored `ca.pem`.
    pub fn from_key_pem(key_pem: &str) -> Result<Self> {
        let key_pair = KeyPair::from_pem(key_pem).map_err(|e| cert_error("Failed to parse CA key", e))?;
        let mut params = ca_params();
        params.key_pair = Some(key_pair);
        let ca_cert =
            Certificate::from_params(params).map_err(|e| cert_error("Failed to rebuild CA cert", e))?;
        Ok(Self { ca_cert })
    }

    fn generate() -> Result<Self> {
        let mut params = ca_params();
        let not_before = OffsetDateTime::now_utc();
        params.not_before = not_before;
        params.not_after = not_before + Duration::days(365 * 10);
        params.key_pair = Some(
            KeyPair::generate(&PKCS_ECDSA_P256_SHA256)
                .map_err(|e| cert_error("Failed to generate CA key", e))?,
        );
        let ca_cert =
            Certificate::from_params(params).map_err(|e| cert_error("Failed to generate CA cert", e))?;
        Ok(Self { ca_cert })
    }

    pub fn cert_pem(&self) -> Result<String> {
        self.ca_cert
            .serialize_pem()
            .map_err(|e| cert_error("Failed to serialize CA cert", e))
    }

    pub fn key_pem(&self) -> String {
        self.ca_cert.serialize_private_key_pem()
    }

    /// DER certificate for rustls/hudsucker.
    pub fn cert_der(&self) -> Result<Vec<u8>> {
        self.ca_cert
            .serialize_der()
            .map_err(|e| cert_error("Failed to serialize CA cert DER", e))
    }

    /// DER private key for rustls/hudsucker.
    pub fn key_der(&self) -> Vec<u8> {
        self.ca_cert.serialize_private_key_der()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ca_created_then_reused() {
        let dir = tempdir().unwrap();
        let ca = CertificateAuthority::load_or_create(dir.path()).expect("Failed to create CA");
        assert!(dir.path().join("ca.pem").exists());
        assert!(dir.path().join("ca.key").exists());
        assert!(dir.path().join("ca.crt").exists());

        let stored_key = fs::read_to_string(dir.path().join("ca.key")).unwrap();
        let reloaded = CertificateAuthority::load_or_create(dir.path()).expect("Failed to load CA");
        assert_eq!(reloaded.key_pem(), stored_key);
        assert_eq!(ca.key_der(), reloaded.key_der());
    }

    #[test]
    fn test_pem_output() {
        let dir = tempdir().unwrap();
        let ca = CertificateAuthority::load_or_create(dir.path()).unwrap();
        assert!(ca.cert_pem().unwrap().contains("BEGIN CERTIFICATE"));
        assert!(ca.key_pem().contains("BEGIN PRIVATE KEY"));
        assert!(!ca.cert_der().unwrap().is_empty());
    }
}
