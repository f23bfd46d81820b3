//! TLS material for the login server, loaded from a single PEM bundle.

use std::fs;
use std::path::Path;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use tiny_http::SslConfig;

use crate::error::{ServerError, ServerResult};

/// Read one PEM file carrying the certificate chain and the private key.
///
/// The bundle is checked with rustls before it is handed to the HTTP server,
/// so a broken file is reported as [`ServerError::Certificate`] or
/// [`ServerError::Tls`] instead of failing inside the listener.
pub fn load_ssl_config(path: &Path) -> ServerResult<SslConfig> {
    let pem = fs::read(path).map_err(|e| certificate_error(path, e.to_string()))?;
    let (certs, key) = parse_pem_bundle(path, &pem)?;
    ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)?;

    // Both halves live in the same file; the server picks each item out by type.
    Ok(SslConfig { certificate: pem.clone(), private_key: pem })
}

fn certificate_error(path: &Path, reason: String) -> ServerError {
    ServerError::Certificate { path: path.display().to_string(), reason }
}

fn parse_pem_bundle(
    path: &Path,
    pem: &[u8],
) -> ServerResult<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>)> {
    let mut reader = pem;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| certificate_error(path, e.to_string()))?;
    if certs.is_empty() {
        return Err(certificate_error(path, "no certificate found".to_string()));
    }

    let mut reader = pem;
    let key = rustls_pemfile::private_key(&mut reader)
        .map_err(|e| certificate_error(path, e.to_string()))?
        .ok_or_else(|| certificate_error(path, "no private key found".to_string()))?;
    // The listener only reads PKCS#8 and PKCS#1 keys.
    if matches!(key, PrivateKeyDer::Sec1(_)) {
        return Err(certificate_error(path, "EC private key must be in PKCS#8 form".to_string()));
    }

    Ok((certs, key))
}
