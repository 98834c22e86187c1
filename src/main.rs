use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use keyboard_teleop::config::Args;

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug). Logs go to stderr so the banner stays readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // The terminal is already restored by the time run() returns.
    // Exit explicitly: stdin's blocking reader thread would otherwise hold up runtime shutdown.
    match keyboard_teleop::teleop::run(args).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Teleop error: {}", e);
            std::process::exit(1);
        }
    }
}
