//! Gemini client and session against a local tiny_http stand-in
#![cfg(feature = "gemini")]

use poster_studio::{
    BatchMode, Credentials, Error, GeminiClient, ImageAsset, MemoryStorage, Session, Slot,
    StudioConfig,
};
use std::io::Read;
use std::sync::mpsc;
use tiny_http::{Response, Server};

struct Seen {
    url: String,
    body: serde_json::Value,
}

/// Serve a single answer and report what the client sent.
fn serve_once(status: u16, body: &'static str) -> (String, mpsc::Receiver<Seen>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        if let Ok(mut request) = server.recv() {
            let mut raw = String::new();
            let _ = request.as_reader().read_to_string(&mut raw);
            let url = request.url().to_string();
            let resp = Response::from_string(body)
                .with_status_code(status)
                .with_header("Content-Type: application/json".parse::<tiny_http::Header>().unwrap());
            let _ = request.respond(resp);
            let _ = tx.send(Seen {
                url,
                body: serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null),
            });
        }
    });

    (format!("http://127.0.0.1:{}/v1beta", port), rx)
}

fn config(api_base: String) -> StudioConfig {
    StudioConfig {
        api_base,
        timeout_ms: 5000,
        ticker_interval_ms: 0,
        batch_mode: BatchMode::History,
        ..Default::default()
    }
}

fn session(api_base: String) -> Session<GeminiClient, MemoryStorage> {
    let cfg = config(api_base);
    let client = GeminiClient::new(&cfg, Credentials::new("test-key")).expect("client");
    let mut s = Session::new(cfg, client, MemoryStorage::new());
    s.assets_mut().set_presenter(ImageAsset::new(b"JPEG".to_vec(), "image/jpeg"));
    s
}

const TWO_IMAGES: &str = r#"{"candidates":[{"content":{"parts":[
    {"text":"here you go"},
    {"inlineData":{"mimeType":"image/png","data":"VEFMTA=="}},
    {"inlineData":{"mimeType":"image/png","data":"U1FVQVJF"}}
]}}]}"#;

const ONE_IMAGE: &str = r#"{"candidates":[{"content":{"parts":[
    {"inlineData":{"mimeType":"image/png","data":"T05F"}}
]}}]}"#;

#[test]
fn two_images_fill_tall_then_square() {
    let (base, rx) = serve_once(200, TWO_IMAGES);
    let mut s = session(base);

    let batch = s.generate().expect("generate");
    assert_eq!(batch.tall[0].data_url, "data:image/png;base64,VEFMTA==");
    assert_eq!(batch.square[0].data_url, "data:image/png;base64,U1FVQVJF");
    assert!(!batch.slots_verified);
    assert!(!batch.duplicated);

    let seen = rx.recv().unwrap();
    assert!(seen.url.starts_with("/v1beta/models/gemini-2.5-flash-image:generateContent"));
    assert!(seen.url.contains("key=test-key"));

    let parts = seen.body["contents"]["parts"].as_array().unwrap();
    assert!(parts[0]["text"].as_str().unwrap().contains("YOYO SANCHEZ"));
    assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
    assert_eq!(parts[1]["inlineData"]["data"], "SlBFRw==");
    assert_eq!(seen.body["generationConfig"]["responseModalities"][0], "IMAGE");
}

#[test]
fn single_image_is_duplicated() {
    let (base, _rx) = serve_once(200, ONE_IMAGE);
    let mut s = session(base);

    let batch = s.generate().expect("generate");
    assert!(batch.duplicated);
    assert_eq!(batch.tall[0].data_url, batch.square[0].data_url);
    assert_eq!(batch.square[0].slot, Slot::Square);
}

#[test]
fn not_found_is_reported_as_credentials_problem() {
    let (base, _rx) = serve_once(
        404,
        r#"{"error":{"code":404,"message":"Requested entity was not found."}}"#,
    );
    let mut s = session(base);

    let err = s.generate().unwrap_err();
    assert!(matches!(err, Error::AuthError(_)), "got {:?}", err);
    assert!(s.batches().is_empty());
    assert!(s.last_error().unwrap().contains("API key"));
}

#[test]
fn server_error_is_remote() {
    let (base, _rx) = serve_once(500, r#"{"error":{"message":"backend unavailable"}}"#);
    let mut s = session(base);

    match s.generate() {
        Err(Error::RemoteError { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "backend unavailable");
        }
        other => panic!("unexpected {:?}", other.map(|b| b.id)),
    }
}

#[test]
fn empty_candidates() {
    let (base, _rx) = serve_once(200, r#"{"candidates":[]}"#);
    let mut s = session(base);
    assert!(matches!(s.generate(), Err(Error::NoCandidates)));
}

#[test]
fn text_only_answer_has_no_images() {
    let (base, _rx) = serve_once(200, r#"{"candidates":[{"content":{"parts":[{"text":"sorry"}]}}]}"#);
    let mut s = session(base);
    assert!(matches!(s.generate(), Err(Error::NoImagesGenerated)));
}

#[test]
fn edit_sends_the_poster_and_new_text() {
    let (base, rx) = serve_once(200, ONE_IMAGE);
    let cfg = config(base);
    let client = GeminiClient::new(&cfg, Credentials::new("k")).unwrap();

    let edited =
        poster_studio::edit::edit_text(&client, "data:image/png;base64,T0xE", "- Date: Saturday").unwrap();
    assert_eq!(edited, "data:image/png;base64,T05F");

    let seen = rx.recv().unwrap();
    let parts = seen.body["contents"]["parts"].as_array().unwrap();
    assert!(parts[0]["text"].as_str().unwrap().contains("- Date: Saturday"));
    assert_eq!(parts[1]["inlineData"]["data"], "T0xE");
}
