// Key loop: read one byte, decode it, publish a command if it was a bound key
// Nothing is remembered between keys. Releasing a key does not stop the robot; only SPACE does.

use crossterm::style::Stylize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};

// local imports
use crate::config::{Args, ScaleConfig};
use crate::error::{Result, TeleopError};
use crate::keymap::{self, Effect, KEY_BINDINGS};
use crate::messages::{Twist, VelocityCommand};
use crate::shutdown::Shutdown;
use crate::terminal::TerminalSession;

/// Where commands go. The zenoh publisher in production, a Vec in tests.
#[allow(async_fn_in_trait)]
pub trait CommandSink {
    async fn send(&mut self, cmd: &VelocityCommand) -> Result<()>;
}

impl CommandSink for zenoh::pubsub::Publisher<'_> {
    async fn send(&mut self, cmd: &VelocityCommand) -> Result<()> {
        let twist_json = serde_json::to_string(&Twist::from(cmd))?;
        self.put(twist_json).await.map_err(TeleopError::Channel)
    }
}

pub struct Controller {
    scales: ScaleConfig,
}

impl Controller {
    pub fn new(scales: ScaleConfig) -> Self {
        Self { scales }
    }

    pub fn scales(&self) -> &ScaleConfig {
        &self.scales
    }

    /// Block until one byte arrives
    pub async fn read_next_key<R: AsyncRead + Unpin>(input: &mut R) -> Result<u8> {
        input.read_u8().await.map_err(TeleopError::InputReadError)
    }

    /// Command for a key, if the key is bound
    pub fn command_for(&self, key: u8) -> Option<VelocityCommand> {
        let effect = keymap::decode(key)?;
        if effect == Effect::EmergencyStop {
            info!("Emergency stop activated!");
        }
        Some(VelocityCommand::from_effect(effect, &self.scales))
    }

    /// One iteration: read, decode, publish. Returns what was published.
    pub async fn step<R, S>(&self, input: &mut R, sink: &mut S) -> Result<Option<VelocityCommand>>
    where
        R: AsyncRead + Unpin,
        S: CommandSink,
    {
        let key = Self::read_next_key(input).await?;
        debug!("value: 0x{:02X}", key);

        let Some(cmd) = self.command_for(key) else {
            return Ok(None);
        };
        sink.send(&cmd).await?;
        debug!("Published {:?}", cmd);
        Ok(Some(cmd))
    }

    /// Step until shutdown is requested or something fails
    pub async fn run<R, S>(&self, input: &mut R, sink: &mut S, shutdown: &Shutdown) -> Result<()>
    where
        R: AsyncRead + Unpin,
        S: CommandSink,
    {
        while !shutdown.is_requested() {
            self.step(input, sink).await?;
        }
        info!("Shutdown requested, leaving key loop");
        Ok(())
    }
}

fn print_banner() {
    println!("{}", "Reading from keyboard".bold());
    println!("---------------------------");
    for binding in KEY_BINDINGS {
        println!(
            "  {:<6} {}",
            keymap::key_name(binding.key).cyan(),
            binding.label
        );
    }
    println!("Press SPACE for emergency stop, Ctrl-C to quit");
}

pub async fn run(args: Args) -> Result<()> {
    let scales = ScaleConfig::resolve(&args)?;

    info!("Opening Zenoh session...");
    let zenoh_config = match &args.zenoh_config {
        Some(path) => zenoh::Config::from_file(path).map_err(TeleopError::Channel)?,
        None => zenoh::Config::default(),
    };
    let session = zenoh::open(zenoh_config)
        .await
        .map_err(TeleopError::Channel)?;
    let mut publisher = session
        .declare_publisher(args.topic.clone())
        .await
        .map_err(TeleopError::Channel)?;
    info!("Publishing to: {}", args.topic);

    let controller = Controller::new(scales);

    // Handler goes in first so Ctrl-C can never leave the console raw
    let shutdown = Shutdown::new();
    shutdown.install_ctrl_c()?;

    // get the console in raw mode
    let terminal = TerminalSession::acquire()?;
    shutdown.attach_restore(terminal.restorer());

    print_banner();

    let mut stdin = tokio::io::stdin();
    let result = controller.run(&mut stdin, &mut publisher, &shutdown).await;

    terminal.release();
    result
}
