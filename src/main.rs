use anyhow::{Context, Result};
use clap::Parser;
use mantra_jaap::session::{CounterSession, LogFeedback};
use mantra_jaap::store::{FileStore, KvStore, NullStore};
use mantra_jaap::voice::{HttpCountingEndpoint, MicrophoneCapture, VoiceCounter};
use mantra_jaap::{create_router, AppState, Config};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "mantra-jaap", about = "Mantra counting service with voice counting")]
struct Cli {
    /// Config file (without extension)
    #[arg(long, default_value = "config/mantra-jaap")]
    config: String,

    /// Run without the microphone / voice counting
    #[arg(long)]
    no_voice: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v0.1.0", cfg.service.name);

    let store: Arc<dyn KvStore> = match FileStore::open(&cfg.store.path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(
                "Persistent store unavailable ({:#}); state will not survive restarts",
                e
            );
            Arc::new(NullStore)
        }
    };

    let counter = Arc::new(CounterSession::new(store, Arc::new(LogFeedback)));

    let voice = if cli.no_voice {
        info!("Voice counting disabled");
        None
    } else {
        let capture = Box::new(MicrophoneCapture::new(cfg.audio.clone()));
        let endpoint = Arc::new(HttpCountingEndpoint::new(cfg.voice.clone()));
        Some(Arc::new(VoiceCounter::new(capture, endpoint)))
    };

    let state = AppState::new(counter, voice);
    let router = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
