// Entrypoint for the `gyazo` command.
// - Parses arguments and resolves settings once.
// - Runs exactly one upload and maps its result to the exit code here.

use clap::Parser;
use gyazo_cli::api::ApiClient;
use gyazo_cli::capture::ScreenCapturer;
use gyazo_cli::config::Settings;
use gyazo_cli::identity::IdentityStore;
use gyazo_cli::pipeline::{UploadOutcome, UploadPipeline};
use gyazo_cli::platform::Capabilities;
use gyazo_cli::ui;
use gyazo_cli::UploadError;
use std::path::PathBuf;
use std::process::ExitCode;

/// Gyazo command-line uploader
#[derive(Parser)]
#[command(name = "gyazo", version, about = "Gyazo command-line uploader")]
struct Cli {
    /// Image to upload. A screenshot is taken when omitted.
    image: Option<PathBuf>,

    #[arg(long, help = "Do not open the uploaded image in a browser")]
    no_open: bool,

    #[arg(short, long, help = "Enable verbose logging")]
    verbose: bool,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = ui::setup_logging(cli.verbose) {
        eprintln!("{e}");
    }

    let caps = Capabilities::detect();
    match upload(&cli, &caps) {
        Ok(outcome) => {
            if let Err(e) = ui::print_url(&mut std::io::stdout().lock(), &outcome.url) {
                eprintln!("Failed to write URL: {e}");
                return ExitCode::FAILURE;
            }
            if !cli.no_open {
                ui::open_in_browser(caps.opener.as_ref(), &outcome.url);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn upload(cli: &Cli, caps: &Capabilities) -> Result<UploadOutcome, UploadError> {
    let settings = Settings::from_env();
    let client = ApiClient::new(settings.endpoint())?;
    let pipeline = UploadPipeline::new(
        ScreenCapturer::new(caps),
        ui::Spinning(client),
        IdentityStore::new(caps.identity_path.clone()),
        &settings,
    );
    pipeline.run(cli.image.clone())
}
