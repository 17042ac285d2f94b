use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use remixgen::{
    build_request, GeminiClient, GeminiConfig, GenerationExecutor, GenerationOutcome,
    ImageClient, Mode, RawInputs, ReferenceImage,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    remixgen::logger::init_with_config(
        remixgen::logger::LoggerConfig::development()
            .with_level(remixgen::logger::LogLevel::Debug),
    )?;

    let args: Vec<String> = env::args().skip(1).collect();
    let (mode, inputs) = match parse_args(&args) {
        Some(parsed) => parsed,
        None => {
            print_usage();
            return Ok(());
        }
    };

    let config = GeminiConfig::from_env();
    remixgen::logger::log_config_info(&config);

    log::info!("🖼️  Available image generation models:");
    for (id, name, provider) in ImageClient::supported_models() {
        log::info!("  {} - {} ({})", id, name, provider);
    }

    let request = match build_request(mode, &inputs) {
        Ok(request) => request,
        Err(e) => {
            log::error!("❌ {}", e);
            return Err(e.into());
        }
    };
    log::info!(
        "🧾 Request composed: model {}, {} attachment(s)",
        request.model.as_str(),
        request.attachments.len()
    );

    let client = GeminiClient::new(config);
    let executor = GenerationExecutor::new(Arc::new(client.image().clone()));

    let outcome = {
        let _timer = remixgen::logger::timer("generation");
        executor.run(request).await
    };

    match outcome {
        GenerationOutcome::Success { image } => {
            log::info!("✅ Image generated!");
            let filename = format!("remixgen_{}.png", chrono::Utc::now().timestamp());
            save_data_uri(&image, &filename)?;
            log::info!("💾 Image saved to: {}", filename);
        }
        GenerationOutcome::Failure { class, message } => {
            log::error!("❌ Generation failed ({:?}): {}", class, message);
        }
    }

    Ok(())
}

fn parse_args(args: &[String]) -> Option<(Mode, RawInputs)> {
    let mode = match args.first().map(String::as_str) {
        Some("remix") => Mode::StyleRemix,
        Some("faceswap") => Mode::FaceSwap,
        Some("edit") => Mode::Edit,
        Some("generate") => Mode::Generate,
        _ => return None,
    };

    let mut inputs = RawInputs::new();
    let mut rest = args[1..].iter();

    match mode {
        Mode::StyleRemix | Mode::FaceSwap => {
            inputs = inputs
                .with_reference_one(load_image(rest.next()?).ok()?)
                .with_reference_two(load_image(rest.next()?).ok()?);
        }
        Mode::Edit => {
            inputs = inputs.with_reference_one(load_image(rest.next()?).ok()?);
        }
        Mode::Generate => {}
    }

    let prompt: Vec<&str> = rest.map(String::as_str).collect();
    if !prompt.is_empty() {
        inputs = inputs.with_prompt(prompt.join(" "));
    }

    Some((mode, inputs))
}

fn load_image(path: &str) -> std::io::Result<ReferenceImage> {
    let bytes = fs::read(path)?;
    Ok(ReferenceImage::new(bytes, mime_from_path(path)))
}

fn mime_from_path(path: &str) -> &'static str {
    match Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

fn save_data_uri(data_uri: &str, filename: &str) -> Result<(), Box<dyn std::error::Error>> {
    let encoded = data_uri
        .split_once("base64,")
        .map(|(_, data)| data)
        .unwrap_or(data_uri);
    let bytes = BASE64.decode(encoded)?;
    fs::write(filename, bytes)?;
    Ok(())
}

fn print_usage() {
    println!("Usage:");
    println!("  remixgen remix <style.png> <subject.png> [pose/action text]");
    println!("  remixgen faceswap <face.png> <target.png> [adjustment text]");
    println!("  remixgen edit <image.png> <edit text>");
    println!("  remixgen generate <prompt text>");
}
