use std::path::Path;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use qrzsync::SyncError;
use qrzsync::config::LookupCredentials;
use qrzsync::module::http::build_client;
use qrzsync::module::logbook::{LogbookApi, QrzLogbookClient};
use qrzsync::module::xml_lookup::{LocatorLookup, QrzXmlClient};

const SESSION_OK: &str =
    "<QRZDatabase><Session><Key>OLDKEY</Key><Count>12</Count></Session></QRZDatabase>";
const LOGIN_OK: &str =
    "<QRZDatabase><Session><Key>NEWKEY</Key><Count>12</Count></Session></QRZDatabase>";
const CALLSIGN_OK: &str = "<QRZDatabase><Callsign><call>DL1ABC</call><grid>JN58td</grid></Callsign>\
<Session><Key>KEY</Key></Session></QRZDatabase>";

fn session_error(error: &str) -> String {
    format!("<QRZDatabase><Session><Error>{}</Error></Session></QRZDatabase>", error)
}

/// Serve one canned reply per connection, in order; collects request bodies.
async fn serve(replies: Vec<(u16, String)>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();

    tokio::spawn(async move {
        for (status, body) in replies {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request_body(&mut stream).await;
            seen.lock().unwrap().push(request);

            let reason = if status == 200 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        }
    });

    (url, requests)
}

async fn read_request_body(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                return String::from_utf8_lossy(&buf[end + 4..end + 4 + content_length]).to_string();
            }
        }
    }

    String::new()
}

fn ok(body: &str) -> (u16, String) {
    (200, body.to_string())
}

fn credentials(session_key: Option<&str>) -> LookupCredentials {
    LookupCredentials {
        username: "DM2VV".to_string(),
        password: "secret".to_string(),
        session_key: session_key.map(str::to_string),
    }
}

fn xml_client(url: &str, session_key: Option<&str>, key_file: &Path) -> QrzXmlClient {
    let client = build_client("qrzsync-test", 5).unwrap();
    QrzXmlClient::new(client, url, "qrzsync-test", credentials(session_key), key_file)
}

#[tokio::test]
async fn valid_cached_key_is_reused() {
    let tmp = TempDir::new().unwrap();
    let key_file = tmp.path().join(".session_key");
    std::fs::write(&key_file, "OLDKEY\n").unwrap();
    let (url, requests) = serve(vec![ok(SESSION_OK)]).await;

    let mut xml = xml_client(&url, None, &key_file);
    assert_eq!(xml.get_or_refresh_session().await.unwrap(), "OLDKEY");

    let requests = requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].contains("s=OLDKEY"));
    assert!(requests[0].contains("dxcc=291"));
}

#[tokio::test]
async fn rejected_cached_key_triggers_login() {
    for error in ["Session Timeout", "Invalid session key"] {
        let tmp = TempDir::new().unwrap();
        let key_file = tmp.path().join(".session_key");
        std::fs::write(&key_file, "OLDKEY").unwrap();
        let (url, requests) = serve(vec![ok(&session_error(error)), ok(LOGIN_OK)]).await;

        let mut xml = xml_client(&url, None, &key_file);
        assert_eq!(xml.get_or_refresh_session().await.unwrap(), "NEWKEY");
        assert_eq!(std::fs::read_to_string(&key_file).unwrap(), "NEWKEY");

        let requests = requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].contains("username=DM2VV"));
        assert!(requests[1].contains("password=secret"));
        assert!(requests[1].contains("agent=qrzsync-test"));
    }
}

#[tokio::test]
async fn missing_key_file_logs_in_and_saves_key() {
    let tmp = TempDir::new().unwrap();
    let key_file = tmp.path().join(".session_key");
    let (url, requests) = serve(vec![ok(LOGIN_OK)]).await;

    let mut xml = xml_client(&url, None, &key_file);
    assert_eq!(xml.get_or_refresh_session().await.unwrap(), "NEWKEY");
    assert_eq!(std::fs::read_to_string(&key_file).unwrap(), "NEWKEY");
    assert_eq!(requests.lock().unwrap().len(), 1);

    // held for the rest of the run, no further requests
    assert_eq!(xml.get_or_refresh_session().await.unwrap(), "NEWKEY");
}

#[tokio::test]
async fn login_error_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let key_file = tmp.path().join(".session_key");
    let (url, _) = serve(vec![ok(&session_error("Username/password incorrect"))]).await;

    let mut xml = xml_client(&url, None, &key_file);
    let err = xml.get_or_refresh_session().await.unwrap_err();
    assert!(matches!(err, SyncError::Lookup(ref msg) if msg.contains("Username/password incorrect")));
    assert!(!key_file.exists());
}

#[tokio::test]
async fn login_without_key_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let key_file = tmp.path().join(".session_key");
    let (url, _) = serve(vec![ok(
        "<QRZDatabase><Session><Count>12</Count></Session></QRZDatabase>",
    )])
    .await;

    let mut xml = xml_client(&url, None, &key_file);
    let err = xml.get_or_refresh_session().await.unwrap_err();
    assert!(matches!(err, SyncError::Lookup(_)));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn unwritable_key_file_is_fatal() {
    let tmp = TempDir::new().unwrap();
    // a directory can be neither read nor written as the key file
    let key_file = tmp.path().to_path_buf();
    let (url, _) = serve(vec![ok(LOGIN_OK)]).await;

    let mut xml = xml_client(&url, None, &key_file);
    let err = xml.get_or_refresh_session().await.unwrap_err();
    assert!(matches!(err, SyncError::SessionCache { .. }));
}

#[tokio::test]
async fn provided_key_needs_no_request() {
    let tmp = TempDir::new().unwrap();
    let (url, requests) = serve(Vec::new()).await;

    let mut xml = xml_client(&url, Some("GIVENKEY"), &tmp.path().join(".session_key"));
    assert_eq!(xml.get_or_refresh_session().await.unwrap(), "GIVENKEY");
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn fetch_locator_outcomes() {
    let tmp = TempDir::new().unwrap();
    let (url, requests) = serve(vec![
        ok(CALLSIGN_OK),
        ok(&session_error("Not found: XX1XX")),
        ok(&session_error("Session Timeout")),
        ok("<QRZDatabase><Session><Key>KEY</Key></Session></QRZDatabase>"),
    ])
    .await;

    let mut xml = xml_client(&url, Some("KEY"), &tmp.path().join(".session_key"));
    xml.get_or_refresh_session().await.unwrap();

    assert_eq!(
        xml.fetch_locator("dl1abc").await.unwrap().as_deref(),
        Some("JN58td")
    );
    assert_eq!(xml.fetch_locator("XX1XX").await.unwrap(), None);

    let err = xml.fetch_locator("K1ABC").await.unwrap_err();
    assert!(matches!(err, SyncError::Lookup(ref msg) if msg.contains("Session Timeout")));

    let err = xml.fetch_locator("K1ABC").await.unwrap_err();
    assert!(matches!(err, SyncError::Lookup(ref msg) if msg.contains("userdata")));

    let requests = requests.lock().unwrap().clone();
    assert!(requests[0].contains("s=KEY"));
    assert!(requests[0].contains("callsign=DL1ABC"));
}

#[tokio::test]
async fn fetch_without_session_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let (url, requests) = serve(Vec::new()).await;

    let xml = xml_client(&url, None, &tmp.path().join(".session_key"));
    let err = xml.fetch_locator("K1ABC").await.unwrap_err();
    assert!(matches!(err, SyncError::Lookup(_)));
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn xml_non_200_is_http_status() {
    let tmp = TempDir::new().unwrap();
    let (url, _) = serve(vec![(503, "busy".to_string())]).await;

    let mut xml = xml_client(&url, None, &tmp.path().join(".session_key"));
    let err = xml.get_or_refresh_session().await.unwrap_err();
    assert!(matches!(err, SyncError::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn logbook_insert_posts_record() {
    let (url, requests) = serve(vec![ok("RESULT=OK&LOGID=42&COUNT=1")]).await;
    let logbook = QrzLogbookClient::new(build_client("qrzsync-test", 5).unwrap(), &url, "TEST-KEY");

    let body = logbook.insert("<call:5>K1ABC <eor>").await.unwrap();
    assert_eq!(body, "RESULT=OK&LOGID=42&COUNT=1");

    let requests = requests.lock().unwrap().clone();
    assert!(requests[0].contains("KEY=TEST-KEY"));
    assert!(requests[0].contains("ACTION=INSERT"));
    assert!(requests[0].contains("ADIF="));
}

#[tokio::test]
async fn logbook_non_200_is_http_status() {
    let (url, _) = serve(vec![(503, "Service Unavailable".to_string())]).await;
    let logbook = QrzLogbookClient::new(build_client("qrzsync-test", 5).unwrap(), &url, "TEST-KEY");

    let err = logbook.insert("<call:5>K1ABC <eor>").await.unwrap_err();
    assert!(matches!(err, SyncError::HttpStatus { status: 503, .. }));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn logbook_unreachable_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let logbook = QrzLogbookClient::new(build_client("qrzsync-test", 5).unwrap(), &url, "TEST-KEY");
    let err = logbook.insert("<call:5>K1ABC <eor>").await.unwrap_err();
    assert!(matches!(err, SyncError::Transport { .. }));
}
