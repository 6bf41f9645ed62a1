// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

use rcgen::{CertificateParams, KeyPair};
use rustls::pki_types::PrivateKeyDer;
use rustls::ServerConfig;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

fn self_signed_pair() -> (String, String) {
    let params = CertificateParams::new(vec!["localhost".to_string()]).unwrap();
    let key_pair = KeyPair::generate().unwrap();
    let cert = params.self_signed(&key_pair).unwrap();
    (cert.pem(), key_pair.serialize_pem())
}

fn acceptor_from_pem(cert_pem: &str, key_pem: &str) -> TlsAcceptor {
    let certs = rustls_pemfile::certs(&mut cert_pem.as_bytes()).collect::<Result<Vec<_>, _>>().unwrap();
    let key: PrivateKeyDer<'static> = rustls_pemfile::private_key(&mut key_pem.as_bytes()).unwrap().unwrap();
    let config = ServerConfig::builder().with_no_client_auth().with_single_cert(certs, key).unwrap();
    TlsAcceptor::from(Arc::new(config))
}

/// Runs a minimal TLS-only server loop (no version hello, no auth) that
/// just accepts the TLS handshake. Used to exercise [`TofuVerifier`] and
/// fingerprint pinning in isolation from the rest of the handshake.
async fn spawn_bare_tls_server(cert_pem: String, key_pem: String) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let acceptor = acceptor_from_pem(&cert_pem, &key_pem);

    let task = tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            let _ = acceptor.accept(stream).await;
        }
    });

    (addr, task)
}

#[tokio::test]
async fn first_connection_trusts_and_pins_certificate() {
    let (cert_pem, key_pem) = self_signed_pair();
    let (addr, server) = spawn_bare_tls_server(cert_pem.clone(), key_pem).await;

    let config_dir = tempfile::tempdir().unwrap();
    let connector = TlsConnector::from(Arc::new(tofu_client_config()));
    let tcp = TcpStream::connect(addr).await.unwrap();
    let server_name = ServerName::try_from("localhost".to_string()).unwrap();
    let tls_stream = connector.connect(server_name, tcp).await.unwrap();

    let peer_cert = tls_stream.get_ref().1.peer_certificates().and_then(|c| c.first()).cloned().unwrap();
    let fingerprint = hex::encode(Sha256::digest(peer_cert.as_ref()));

    trust_store::verify_tofu(config_dir.path(), "localhost", addr.port(), &fingerprint).unwrap();

    let store = trust_store::load(config_dir.path()).unwrap();
    let record = store.get(&format!("localhost:{}", addr.port())).unwrap();
    assert_eq!(record.fingerprint, fingerprint);

    server.await.unwrap();
}

#[tokio::test]
async fn mismatched_fingerprint_is_rejected_without_mutating_store() {
    let config_dir = tempfile::tempdir().unwrap();
    let host_key = "localhost:9999";
    trust_store::save(
        config_dir.path(),
        host_key,
        &zfdash_core::trust::TrustedCertificate {
            fingerprint: "feedface".to_string(),
            first_seen_epoch_ms: 1,
            last_verified_epoch_ms: 1,
        },
    )
    .unwrap();

    let err = trust_store::verify_tofu(config_dir.path(), "localhost", 9999, "deadbeef").unwrap_err();
    assert!(matches!(err, ClientError::CertificateMismatch { .. }));

    let store = trust_store::load(config_dir.path()).unwrap();
    assert_eq!(store.get(host_key).unwrap().fingerprint, "feedface");
}
