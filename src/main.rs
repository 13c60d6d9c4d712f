use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;
use std::time::Duration;
use voxlamp::actuate::client::HttpActuationClient;
use voxlamp::actuate::dispatcher::ActionDispatcher;
use voxlamp::audio::capture::{AudioCapture, list_devices, suppress_audio_warnings};
use voxlamp::cli::{Cli, Commands};
use voxlamp::command::matcher::CommandMatcher;
use voxlamp::config::Config;
use voxlamp::pipeline::frame_queue::frame_queue;
use voxlamp::pipeline::runner::{Pipeline, PipelineConfig, PipelineHandle};
use voxlamp::stt::vosk::VoskDecoder;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Devices) => {
            suppress_audio_warnings();
            for device in list_devices()? {
                println!("{}", device);
            }
            Ok(())
        }
        Some(Commands::Config) => {
            let config = resolve_config(&cli)?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        None => run(cli).await,
    }
}

/// Merge configuration sources: file, then environment, then CLI flags.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(Config::default_path);

    let mut config = if cli.config.is_some() {
        // An explicitly named file must exist.
        Config::load(&path)?
    } else {
        Config::load_or_default(&path)?
    }
    .with_env_overrides();

    if let Some(device) = &cli.device {
        config.audio.device = Some(device.clone());
    }
    if let Some(model) = &cli.model {
        config.stt.model_path = model.clone();
    }
    if let Some(url) = &cli.bridge_url {
        config.actuation.base_url = url.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    suppress_audio_warnings();

    let config = resolve_config(&cli)?;
    let quiet = cli.quiet;

    let matcher = CommandMatcher::new(config.command_table()?);
    // The blocking HTTP client must not be constructed on a runtime thread.
    let http_config = config.http_client_config();
    let client = tokio::task::spawn_blocking(move || HttpActuationClient::new(http_config))
        .await
        .map_err(|e| anyhow::anyhow!("actuation client setup failed: {}", e))??;
    let dispatcher = ActionDispatcher::new(client, config.dispatch_config());

    if !quiet {
        eprintln!(
            "Loading model '{}'...",
            config.stt.model_path.display()
        );
    }
    let decoder = VoskDecoder::new(&config.vosk_config())?;
    if !quiet {
        eprintln!("Model '{}' loaded.", decoder.model_name());
    }

    let (producer, consumer) = frame_queue(config.audio.queue_capacity);
    let mut capture = AudioCapture::new(config.capture_config())?;
    let capture_status = capture.status();

    let pipeline_config = PipelineConfig {
        quiet,
        verbose: cli.verbose >= 1,
        ..PipelineConfig::default()
    };
    let handle =
        Pipeline::new(pipeline_config, decoder, matcher, dispatcher).start(consumer, capture_status);

    capture.start(producer)?;
    if !quiet {
        eprintln!("{} Say a command.", "Listening…".green());
    }

    wait_for_shutdown(&handle, quiet).await;

    // Stop the loop first; releasing the stream drops the producer.
    let result = handle.stop();
    let _ = capture.stop();
    result?;

    if !quiet {
        eprintln!("Stopped.");
    }
    Ok(())
}

/// Wait until an interrupt arrives or the pipeline ends on its own
/// (a fatal capture or recognition error).
async fn wait_for_shutdown(handle: &PipelineHandle, quiet: bool) {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let sigterm = wait_for_sigterm();
    tokio::pin!(sigterm);
    let mut ticker = tokio::time::interval(Duration::from_millis(100));

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                if !quiet {
                    eprintln!("\nReceived SIGINT, shutting down...");
                }
                return;
            }
            _ = &mut sigterm => {
                if !quiet {
                    eprintln!("\nReceived SIGTERM, shutting down...");
                }
                return;
            }
            _ = ticker.tick() => {
                if handle.is_finished() {
                    return;
                }
            }
        }
    }
}

/// Wait for SIGTERM (used by systemd).
#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            eprintln!("voxlamp: failed to register SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    // On non-Unix, Ctrl+C is the only interrupt.
    std::future::pending::<()>().await
}
