//! Generate one poster batch through `Session` (feature: `gemini`)
//!
//! With `GEMINI_API_KEY` set this talks to the real endpoint. Without it a
//! tiny_http stand-in answers with two canned images so the flow can be
//! followed offline:
//!
//! cargo run --example generate_poster -- path/to/presenter.jpg

use poster_studio::export::export_output;
use poster_studio::{
    BackgroundTheme, Credentials, GeminiClient, ImageAsset, MemoryStorage, Platform, Session,
    SocialLink, StudioConfig,
};

const CANNED: &str = r#"{"candidates":[{"content":{"parts":[
    {"inlineData":{"mimeType":"image/png","data":"VEFMTA=="}},
    {"inlineData":{"mimeType":"image/png","data":"U1FVQVJF"}}
]}}]}"#;

fn stand_in() -> Result<String, Box<dyn std::error::Error>> {
    let server = tiny_http::Server::http("127.0.0.1:0").map_err(|e| e.to_string())?;
    let port = server.server_addr().to_ip().map(|a| a.port()).unwrap_or_default();
    std::thread::spawn(move || {
        if let Ok(req) = server.recv() {
            let _ = req.respond(tiny_http::Response::from_string(CANNED));
        }
    });
    Ok(format!("http://127.0.0.1:{}/v1beta", port))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Poster Studio - single batch example\n");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = StudioConfig::from_env()?;
    let credentials = match Credentials::from_env() {
        Some(c) => c,
        None => {
            println!("GEMINI_API_KEY not set, using a local stand-in");
            config.api_base = stand_in()?;
            Credentials::new("demo")
        }
    };

    let presenter = match std::env::args().nth(1) {
        Some(path) => ImageAsset::from_path(path)?,
        None => ImageAsset::new(b"not really a jpeg".to_vec(), "image/jpeg"),
    };

    let model = GeminiClient::new(&config, credentials)?;
    let mut session = Session::new(config, model, MemoryStorage::new());
    session.on_progress(|msg| println!("  .. {}", msg));
    session.assets_mut().set_presenter(presenter);
    session.set_person_name("Jane Doe");
    session.set_info_text("- Salsa Night\n- Date: Friday 21:00\n- Venue: Studio 5");
    session.style_mut().apply_preset("Cinematic")?;
    session.style_mut().set_background(BackgroundTheme::NeonGlow);
    *session.social_mut() = SocialLink::new(Platform::Instagram, "yevolatin");

    let batch = session.generate()?;
    println!("\nbatch {} (slots verified: {})", batch.id, batch.slots_verified);

    let out = std::env::temp_dir().join("poster-studio-demo");
    let brand = session.config().branding.watermark.clone();
    for output in session.batches()[0].outputs() {
        let path = export_output(&out, &brand, 0, output)?;
        println!("  {} {} -> {}", output.slot, output.slot.aspect_ratio(), path.display());
    }

    Ok(())
}
