//! Resume viewer - Entry point
//!
//! Shows a resume PDF in the terminal and answers questions about it.

use clap::Parser;
use resume_qa::pdf::Zoom;
use resume_qa::viewer::{DEFAULT_CHAT_ENDPOINT, DEFAULT_RESUME};
use resume_qa::{run_viewer, Language, Profile, ViewerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "resume-qa", version, about = "Ask questions about a resume PDF")]
struct Args {
    /// Resume shown on startup (file path or http(s) URL).
    /// Relative paths, including the default, are resolved against the working directory.
    #[arg(long, default_value = DEFAULT_RESUME)]
    resume: String,

    /// Start on the upload prompt instead of the bundled resume
    #[arg(long, conflicts_with = "resume")]
    no_default: bool,

    /// Chat-completion endpoint
    #[arg(long, default_value = DEFAULT_CHAT_ENDPOINT)]
    endpoint: String,

    /// Display language: zh or en
    #[arg(long, default_value = "zh")]
    lang: Language,

    /// Initial page zoom, 0.5 to 2.0
    #[arg(long, default_value_t = 0.9)]
    zoom: f32,

    /// Name shown as the designer in the header
    #[arg(long, default_value = "")]
    designer: String,

    /// Contact email shown in the header
    #[arg(long, default_value = "")]
    email: String,

    /// Contact phone shown in the header
    #[arg(long, default_value = "")]
    phone: String,
}

impl Args {
    fn into_config(self) -> ViewerConfig {
        ViewerConfig {
            default_resume: (!self.no_default).then_some(self.resume),
            chat_endpoint: self.endpoint,
            language: self.lang,
            zoom: Zoom::from_scale(self.zoom),
            profile: Profile {
                designer: self.designer,
                email: self.email,
                phone: self.phone,
                ..Profile::default()
            },
            ..ViewerConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout belongs to the viewer
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resume_qa=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting resume viewer");

    run_viewer(args.into_config()).await
}
