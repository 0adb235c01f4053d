//! Integration tests: asset download against a local HTTP server.
//!
//! Covers redirect following, the hop cap, and status failures leaving an
//! empty destination behind.

mod common;

use common::mock_server::{self, Route};
use hubfetch_core::config::DownloadConfig;
use hubfetch_core::download::{AssetDownloader, CurlDownloader, DownloadError};
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn downloader(max_redirects: u32) -> CurlDownloader {
    CurlDownloader::new(DownloadConfig {
        connect_timeout_secs: 5,
        stall_timeout_secs: 5,
        timeout_secs: Some(20),
        max_redirects,
    })
}

#[test]
fn follows_302_and_writes_final_body() {
    let body: Vec<u8> = (0u8..=255).cycle().take(64 * 1024).collect();
    let server = mock_server::start(vec![
        ("/start", Route::redirect(302, "/file.bin")),
        ("/file.bin", Route::ok(body.clone())),
    ]);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("speaker_embeddings.bin");

    let t = downloader(5).download(&server.url("/start"), &dest).unwrap();

    assert_eq!(t.bytes, body.len() as u64);
    assert_eq!(t.redirects, 1);
    assert_eq!(t.final_url, server.url("/file.bin"));
    assert_eq!(std::fs::read(&dest).unwrap(), body, "only the 200 body is kept");
    assert_eq!(server.hits(), vec!["/start", "/file.bin"]);
}

#[test]
fn follows_301_with_absolute_location() {
    let server = mock_server::start(vec![("/final", Route::ok(b"abc".to_vec()))]);
    let first = mock_server::start(vec![("/old", Route::redirect(301, &server.url("/final")))]);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.bin");

    let t = downloader(5).download(&first.url("/old"), &dest).unwrap();

    assert_eq!(t.redirects, 1);
    assert_eq!(std::fs::read(&dest).unwrap(), b"abc");
}

#[test]
fn not_found_reports_status_and_leaves_empty_file() {
    let server = mock_server::start(vec![]);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.bin");

    let err = downloader(5).download(&server.url("/missing.bin"), &dest).unwrap_err();

    assert!(matches!(err, DownloadError::Http(404)), "{err}");
    assert_eq!(err.status(), Some(404));
    assert!(dest.exists());
    assert_eq!(std::fs::read(&dest).unwrap().len(), 0);
    assert_eq!(server.hit_count("/missing.bin"), 1, "no retry");
}

#[test]
fn error_after_redirect_carries_final_status() {
    let server = mock_server::start(vec![
        ("/a", Route::redirect(302, "/b")),
        ("/b", Route::status(503, "Service Unavailable")),
    ]);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.bin");

    let err = downloader(5).download(&server.url("/a"), &dest).unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(std::fs::read(&dest).unwrap().len(), 0);
}

#[test]
fn redirect_cycle_hits_the_cap() {
    let server = mock_server::start(vec![
        ("/ping", Route::redirect(302, "/pong")),
        ("/pong", Route::redirect(302, "/ping")),
    ]);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.bin");

    let err = downloader(3).download(&server.url("/ping"), &dest).unwrap_err();

    match err {
        DownloadError::TooManyRedirects { limit, .. } => assert_eq!(limit, 3),
        other => panic!("expected TooManyRedirects, got {other}"),
    }
    // Three hops followed, the fourth redirect is refused.
    assert_eq!(server.hits().len(), 4);
}

#[test]
fn chain_of_exactly_the_cap_succeeds() {
    let server = mock_server::start(vec![
        ("/1", Route::redirect(302, "/2")),
        ("/2", Route::redirect(301, "/3")),
        ("/3", Route::ok(b"done".to_vec())),
    ]);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.bin");

    let t = downloader(2).download(&server.url("/1"), &dest).unwrap();

    assert_eq!(t.redirects, 2);
    assert_eq!(std::fs::read(&dest).unwrap(), b"done");
}

#[test]
fn redirect_without_location_fails() {
    let server = mock_server::start(vec![("/x", Route::status(302, "Found"))]);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.bin");

    let err = downloader(5).download(&server.url("/x"), &dest).unwrap_err();

    assert!(matches!(err, DownloadError::MissingLocation(302)), "{err}");
}

#[test]
fn other_redirect_codes_are_failures() {
    let mut route = Route::redirect(302, "/y");
    route.status = 307;
    route.reason = "Temporary Redirect";
    let server = mock_server::start(vec![("/x", route), ("/y", Route::ok(b"y".to_vec()))]);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.bin");

    let err = downloader(5).download(&server.url("/x"), &dest).unwrap_err();

    assert_eq!(err.status(), Some(307));
    assert_eq!(server.hit_count("/y"), 0);
}

#[test]
fn connection_refused_is_transport_error() {
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.bin");

    let err = downloader(5)
        .download(&format!("http://127.0.0.1:{}/file", port), &dest)
        .unwrap_err();

    assert!(matches!(err, DownloadError::Curl(_)), "{err}");
    assert!(dest.exists(), "destination is opened before the request");
}

#[test]
fn stalled_response_is_aborted() {
    let base = mock_server::start_silent(Duration::from_secs(30));
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.bin");
    let d = CurlDownloader::new(DownloadConfig {
        connect_timeout_secs: 5,
        stall_timeout_secs: 1,
        timeout_secs: None,
        max_redirects: 5,
    });

    let started = Instant::now();
    let err = d.download(&format!("{}/hang", base), &dest).unwrap_err();

    assert!(matches!(err, DownloadError::Curl(ref e) if e.is_operation_timedout()), "{err}");
    assert!(started.elapsed() < Duration::from_secs(15), "{:?}", started.elapsed());
    assert_eq!(std::fs::read(&dest).unwrap().len(), 0);
}

#[test]
fn overall_timeout_bounds_a_silent_server() {
    let base = mock_server::start_silent(Duration::from_secs(30));
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.bin");
    let d = CurlDownloader::new(DownloadConfig {
        connect_timeout_secs: 5,
        stall_timeout_secs: 60,
        timeout_secs: Some(1),
        max_redirects: 5,
    });

    let started = Instant::now();
    let err = d.download(&format!("{}/hang", base), &dest).unwrap_err();

    assert!(matches!(err, DownloadError::Curl(ref e) if e.is_operation_timedout()), "{err}");
    assert!(started.elapsed() < Duration::from_secs(15), "{:?}", started.elapsed());
}
