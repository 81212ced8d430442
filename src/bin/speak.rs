use anyhow::Result;
use clap::Parser;
use speech_session::{
    app_config::get_configuration,
    console::{self, Command},
    logging::setup_tracing,
    speech::{
        AudioSink, CachingSynthesizer, PlaybackController, PollySynthesizer, SpeechSynthesizer,
    },
};
use std::{io::Write, path::PathBuf, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::*;

/// Speak text messages with Amazon Polly
#[derive(Parser)]
#[command(author, version)]
struct Args {
    /// application configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Sets the level of verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn prompt() {
    print!("> ");
    _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = Args::parse();
    setup_tracing(args.verbose)?;
    info!("Started speech session");

    let app_config = get_configuration(args.config)?;

    let polly = PollySynthesizer::new(&app_config.polly).await;
    let synthesizer: Arc<dyn SpeechSynthesizer> = match &app_config.cache_dir_path {
        Some(path) => Arc::new(CachingSynthesizer::new(polly, path)?),
        None => Arc::new(polly),
    };
    let sink = Arc::new(AudioSink::new(app_config.player.volume)?);
    let controller = PlaybackController::new(
        synthesizer,
        sink,
        app_config.voice_catalog(),
        &app_config.voices.default_voice,
        app_config.synthesis_options(),
    )?;
    let messages = app_config.messages;

    println!("{}", console::HELP);
    print!("{}", console::render_messages(&messages, &controller.session().await));
    prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Received ctrl-c");
                None
            }
        };
        let Some(line) = line else {
            break;
        };

        match Command::parse(&line) {
            Command::Empty => (),
            Command::Help => println!("{}", console::HELP),
            Command::ListMessages | Command::Status => {
                print!("{}", console::render_messages(&messages, &controller.session().await))
            }
            Command::ListVoices => print!(
                "{}",
                console::render_voices(controller.voices(), &controller.selected_voice().await)
            ),
            Command::SelectVoice(name) => match controller.select_voice(&name).await {
                Ok(voice) => println!("Voice set to {}", voice),
                Err(e) => println!("{}", e),
            },
            Command::Toggle(id) => match console::find_message(&messages, &id) {
                Some(message) => {
                    let controller = controller.clone();
                    let message = message.clone();
                    tokio::spawn(async move {
                        let outcome = controller.toggle(&message).await;
                        println!("{}", console::describe_outcome(&outcome));
                        prompt();
                    });
                    // the outcome line brings its own prompt
                    continue;
                }
                None => println!("No message with id {}", id),
            },
            Command::Pause => match controller.pause().await {
                Ok(true) => (),
                Ok(false) => println!("Nothing is playing"),
                Err(e) => error!("Failed to pause playback: {}", e),
            },
            Command::Resume => match controller.resume().await {
                Ok(true) => (),
                Ok(false) => println!("Nothing is playing"),
                Err(e) => error!("Failed to resume playback: {}", e),
            },
            Command::Stop => controller.stop().await,
            Command::Quit => break,
            Command::Unknown(line) => println!("Unknown command {:?}, type help", line),
        }
        prompt();
    }

    controller.stop().await;
    info!("Speech session ended");
    Ok(())
}
