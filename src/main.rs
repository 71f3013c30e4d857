use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use droid_voice::{Config, Daemon, command};

/// Droid - voice commands for the ambient display
#[derive(Parser)]
#[command(name = "droid", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Start with the voice pipeline disabled
    #[arg(long, env = "DROID_DISABLE_VOICE")]
    disable_voice: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the voice service (default)
    Run,
    /// Parse an utterance and print the command as JSON
    Parse {
        /// Utterance text, wake phrase optional
        #[arg(required = true, num_args = 1..)]
        utterance: Vec<String>,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,droid_voice=info",
        1 => "info,droid_voice=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("fatal: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let code = match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    };

    // The console's stdin read blocks a runtime thread until the next line
    runtime.shutdown_timeout(Duration::from_millis(200));
    code
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            tracing::info!(disable_voice = cli.disable_voice, "starting droid");

            let config = Config::load_with_options(cli.disable_voice)?;
            tracing::debug!(
                keyword = %config.wake_word.keyword,
                language = %config.capture.language,
                access_key = config.wake_word.access_key.is_some(),
                "loaded configuration"
            );

            Daemon::new(config).run().await?;
        }
        Command::Parse { utterance } => {
            let config = Config::load_with_options(cli.disable_voice)?;
            let phrases = config.wake_word.wake_phrases()?;

            let text = phrases.strip(&utterance.join(" "));
            let parsed = command::parse(&text);
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Command::Config => {
            let config = Config::load_with_options(cli.disable_voice)?;
            let path = droid_voice::config::file::config_file_path();
            println!(
                "# config file: {}",
                path.map_or_else(|| "<none>".to_string(), |p| p.display().to_string())
            );
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
