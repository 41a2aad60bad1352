//! Client behavior without a live server: request composition observed
//! through recorder hooks, error classification, and configuration.

use rwbem_client::{
    ClientError, ConnectionConfig, OperationRecord, OperationRecorder, WbemConnection,
};
use std::sync::{Arc, Mutex};

type Recorded = Arc<Mutex<Vec<(String, Vec<u8>, bool)>>>;

/// Captures every exchange the connection records
struct Capture {
    requests: Recorded,
}

impl OperationRecorder for Capture {
    fn record(&self, record: &OperationRecord<'_>) {
        self.requests.lock().unwrap().push((
            record.operation.to_string(),
            record.request.to_vec(),
            record.outcome.is_ok(),
        ));
    }
}

/// A connection to a closed local port: requests fail at connect time,
/// but the recorder still observes the exact bytes that would go out.
fn offline_connection() -> (WbemConnection, Recorded) {
    let mut config = ConnectionConfig::new("http://127.0.0.1:9");
    config.max_retries = 0;
    config.timeout_ms = 2_000;
    let conn = WbemConnection::new(config).unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    conn.add_recorder(Box::new(Capture {
        requests: requests.clone(),
    }));
    (conn, requests)
}

#[test]
fn delete_qualifier_composes_the_canonical_envelope() {
    let (conn, requests) = offline_connection();
    let err = conn
        .delete_qualifier("FooQualDecl", Some("root/cimv2"))
        .unwrap_err();
    assert!(
        matches!(err, ClientError::Connection(_) | ClientError::Timeout(_)),
        "got {err:?}"
    );

    let recorded = requests.lock().unwrap();
    let (operation, body, ok) = &recorded[0];
    assert_eq!(operation, "DeleteQualifier");
    assert!(!ok);
    let body = String::from_utf8(body.clone()).unwrap();
    assert_eq!(
        body,
        "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\
         <CIM CIMVERSION=\"2.0\" DTDVERSION=\"2.0\">\
         <MESSAGE ID=\"1001\" PROTOCOLVERSION=\"1.0\">\
         <SIMPLEREQ>\
         <IMETHODCALL NAME=\"DeleteQualifier\">\
         <LOCALNAMESPACEPATH><NAMESPACE NAME=\"root\"/><NAMESPACE NAME=\"cimv2\"/></LOCALNAMESPACEPATH>\
         <IPARAMVALUE NAME=\"QualifierName\"><VALUE>FooQualDecl</VALUE></IPARAMVALUE>\
         </IMETHODCALL>\
         </SIMPLEREQ>\
         </MESSAGE>\
         </CIM>"
    );
}

#[test]
fn sloppy_namespaces_are_normalized_on_the_wire() {
    let (conn, requests) = offline_connection();
    let _ = conn.delete_qualifier("FooQualDecl", Some("//root/mycim//"));
    let recorded = requests.lock().unwrap();
    let body = String::from_utf8(recorded[0].1.clone()).unwrap();
    assert!(body.contains(
        "<LOCALNAMESPACEPATH><NAMESPACE NAME=\"root\"/><NAMESPACE NAME=\"mycim\"/></LOCALNAMESPACEPATH>"
    ));
}

#[test]
fn message_ids_increase_per_connection_starting_at_1001() {
    let (conn, requests) = offline_connection();
    let _ = conn.delete_qualifier("A", None);
    let _ = conn.delete_qualifier("B", None);
    let recorded = requests.lock().unwrap();
    let first = String::from_utf8(recorded[0].1.clone()).unwrap();
    let second = String::from_utf8(recorded[1].1.clone()).unwrap();
    assert!(first.contains("<MESSAGE ID=\"1001\""));
    assert!(second.contains("<MESSAGE ID=\"1002\""));
}

#[test]
fn default_namespace_fills_unscoped_operations() {
    let (conn, requests) = offline_connection();
    let _ = conn.delete_qualifier("Q", None);
    let recorded = requests.lock().unwrap();
    let body = String::from_utf8(recorded[0].1.clone()).unwrap();
    // root/cimv2 is the configured default
    assert!(body.contains("<NAMESPACE NAME=\"root\"/><NAMESPACE NAME=\"cimv2\"/>"));
}

#[test]
fn connection_failures_classify_as_connection_errors() {
    let (conn, _) = offline_connection();
    let err = conn
        .get_qualifier("Anything", Some("root/cimv2"))
        .unwrap_err();
    assert!(
        matches!(err, ClientError::Connection(_) | ClientError::Timeout(_)),
        "got {err:?}"
    );
}

#[test]
fn env_overrides_win_over_file_values() {
    let mut config = ConnectionConfig::new("http://file-server:5988");
    std::env::set_var("RWBEM_URL", "https://env-server:5989");
    std::env::set_var("RWBEM_TIMEOUT_MS", "1234");
    config.apply_env_overrides();
    std::env::remove_var("RWBEM_URL");
    std::env::remove_var("RWBEM_TIMEOUT_MS");
    assert_eq!(config.url, "https://env-server:5989");
    assert_eq!(config.timeout_ms, 1234);
}
