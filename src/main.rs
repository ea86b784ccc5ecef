use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use master_agent::api::{AgentApi, HttpApi};
use master_agent::cli::Cli;
use master_agent::config::ClientConfig;
use master_agent::dashboard::Dashboard;
use master_agent::voice::VoiceRecorder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env().context("Failed to read configuration")?;

    // Held for the life of the process so buffered file logs get flushed.
    let _log_guard = init_tracing(&config);

    eprintln!("🤖 Master Agent v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.api_base_url);
    eprintln!("   User: {}", config.user_id);

    let api: Arc<dyn AgentApi> = Arc::new(HttpApi::from_config(&config));
    let dashboard = Arc::new(Dashboard::from_config(api, &config));

    let recorder = build_recorder(&config);
    match &recorder {
        Some(_) => eprintln!("   Voice notes: enabled"),
        None => eprintln!("   Voice notes: disabled (set MASTER_AGENT_VOICE_FILE)"),
    }
    eprintln!("   Type a message and press Enter. /help for commands, /quit to exit.\n");

    dashboard.load_all().await;

    Cli::new(dashboard, recorder).run().await;
    Ok(())
}

fn init_tracing(config: &ClientConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "master-agent.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

#[cfg(feature = "microphone")]
fn build_recorder(config: &ClientConfig) -> Option<VoiceRecorder> {
    use master_agent::voice::{AudioSource, FileAudioSource, MicrophoneSource};

    let source: Box<dyn AudioSource> = match &config.voice_clip_path {
        Some(path) => Box::new(FileAudioSource::new(path)),
        None => Box::new(MicrophoneSource::new()),
    };
    Some(VoiceRecorder::new(source))
}

#[cfg(not(feature = "microphone"))]
fn build_recorder(config: &ClientConfig) -> Option<VoiceRecorder> {
    config.voice_clip_path.as_ref().map(|path| {
        VoiceRecorder::new(Box::new(master_agent::voice::FileAudioSource::new(path)))
    })
}
