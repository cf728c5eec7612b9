//! HTTP client construction
//!
//! One `reqwest::Client` is built per input and shared by every pipeline.
//! It owns the connection pool, so endpoints polled on every pass reuse
//! their connections. TLS problems surface here, before any request is made.

use reqwest::{Certificate, Client, Identity};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::TlsConfig;
use crate::error::{CollectError, Result};

const USER_AGENT: &str = concat!("dwmon-dropwizard/", env!("CARGO_PKG_VERSION"));

/// Build the shared client from TLS material and the overall timeout
pub fn build_client(tls: &TlsConfig, timeout: Duration) -> Result<Client> {
    let mut builder = Client::builder()
        .use_rustls_tls()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90));

    if let Some(ca_path) = &tls.ssl_ca {
        for cert in load_ca_bundle(ca_path)? {
            builder = builder.add_root_certificate(cert);
        }
    }

    match (&tls.ssl_cert, &tls.ssl_key) {
        (Some(cert_path), Some(key_path)) => {
            builder = builder.identity(load_identity(cert_path, key_path)?);
        }
        (Some(_), None) => {
            return Err(CollectError::Configuration(
                "ssl_cert is set but ssl_key is missing".to_string(),
            ))
        }
        (None, Some(_)) => {
            return Err(CollectError::Configuration(
                "ssl_key is set but ssl_cert is missing".to_string(),
            ))
        }
        (None, None) => {}
    }

    if tls.insecure_skip_verify {
        warn!("TLS certificate verification disabled for Dropwizard endpoints");
        // covers hostname checks too under rustls
        builder = builder.danger_accept_invalid_certs(true);
    }

    let client = builder
        .build()
        .map_err(|e| CollectError::Configuration(format!("building HTTP client: {}", e)))?;

    debug!(timeout = ?timeout, "HTTP client ready");
    Ok(client)
}

fn read_pem(path: &Path, what: &str) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        CollectError::Configuration(format!("reading {} {}: {}", what, path.display(), e))
    })
}

fn load_ca_bundle(path: &Path) -> Result<Vec<Certificate>> {
    let pem = read_pem(path, "ssl_ca")?;
    let certs = Certificate::from_pem_bundle(&pem).map_err(|e| {
        CollectError::Configuration(format!("parsing ssl_ca {}: {}", path.display(), e))
    })?;

    if certs.is_empty() {
        return Err(CollectError::Configuration(format!(
            "ssl_ca {} contains no certificates",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_identity(cert_path: &Path, key_path: &Path) -> Result<Identity> {
    let mut pem = read_pem(cert_path, "ssl_cert")?;
    pem.push(b'\n');
    pem.extend(read_pem(key_path, "ssl_key")?);

    Identity::from_pem(&pem).map_err(|e| {
        CollectError::Configuration(format!(
            "loading client identity from {} and {}: {}",
            cert_path.display(),
            key_path.display(),
            e
        ))
    })
}
