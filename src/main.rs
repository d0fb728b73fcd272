use medical_report_service::create_app;
use medical_report_service::extract::set_tesseract_path;
use tokio::net::TcpListener;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Check required environment variables
    if std::env::var("OPENROUTER_API_KEY").is_err() {
        eprintln!("Error: OPENROUTER_API_KEY environment variable is required");
        std::process::exit(1);
    }

    // One-time OCR executable configuration; defaults to /usr/bin/tesseract
    if let Ok(path) = std::env::var("TESSERACT_PATH") {
        set_tesseract_path(path);
    }

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .unwrap_or(8080);

    let app = create_app()?;
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    let addr = listener.local_addr()?;

    info!("Medical Report Analysis Service starting on {}", addr);
    info!("Health check endpoint: http://{}/health", addr);
    info!("Upload endpoint: POST http://{}/upload", addr);
    info!("Chat endpoint: POST http://{}/chat", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
