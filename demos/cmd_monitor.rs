// Command monitor: prints every velocity command seen on the teleop topic
//
// Usage: cargo run --example cmd_monitor -- [topic]
// Run keyboard-teleop in another terminal and press keys.

use keyboard_teleop::config::TOPIC_CMD_VEL;
use keyboard_teleop::messages::{Twist, VelocityCommand};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let topic = std::env::args()
        .nth(1)
        .unwrap_or_else(|| TOPIC_CMD_VEL.to_string());

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let subscriber = session.declare_subscriber(topic.clone()).await?;
    info!("Subscribed to: {}", topic);

    while let Ok(sample) = subscriber.recv_async().await {
        let payload = sample.payload().to_bytes();
        match serde_json::from_slice::<Twist>(&payload) {
            Ok(twist) => {
                let cmd = VelocityCommand::from(&twist);
                info!("linear={:+.2} angular={:+.2}", cmd.linear, cmd.angular);
            }
            Err(e) => {
                warn!("Failed to parse command: {}", e);
            }
        }
    }

    Ok(())
}
