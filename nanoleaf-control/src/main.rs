use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use palette::{FromColor, Hsv, Srgb};
use serde::Serialize;

use nanoleaf_control_lib::control_interface::{DeviceClient, StateUpdate};
use nanoleaf_control_lib::util::config::{ConnectionConfig, Protocol, DEFAULT_PORT};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    handle_cli(cli).await
}

/// This struct defines the command line interface of the application
#[derive(Parser)]
#[clap(
    name = "nanoleaf_control",
    about = "Controls Nanoleaf LED panels over the local network",
    version
)]
pub struct Cli {
    #[clap(flatten)]
    pub connection: ConnectionArgs,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Where to find the device. Every flag can also come from the environment.
#[derive(Args)]
pub struct ConnectionArgs {
    /// Host name or IP address of the device
    #[clap(long, env = "NANOLEAF_HOST")]
    pub host: String,

    /// API port of the device
    #[clap(long, env = "NANOLEAF_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Protocol used to reach the device
    #[clap(long, env = "NANOLEAF_PROTOCOL", value_enum, default_value_t = Protocol::Http)]
    pub protocol: Protocol,

    /// Auth token issued by the device
    #[clap(long, env = "NANOLEAF_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in milliseconds
    #[clap(short = 't', long = "timeout", env = "NANOLEAF_TIMEOUT_MS", default_value_t = 2000)]
    pub timeout: u64,
}

impl From<ConnectionArgs> for ConnectionConfig {
    fn from(args: ConnectionArgs) -> Self {
        ConnectionConfig::new(&args.host)
            .with_port(args.port)
            .with_protocol(args.protocol)
            .with_token(args.token)
            .with_timeout(Duration::from_millis(args.timeout))
    }
}

/// Supported output formats for read commands.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Plain text format.
    Plaintext,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PowerState {
    On,
    Off,
}

/// Named colors that can be shown without picking hue and saturation by hand.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliColors {
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Purple,
    Cyan,
    Magenta,
    Pink,
    Teal,
    Lavender,
    Mint,
}

impl CliColors {
    fn rgb(self) -> (u8, u8, u8) {
        match self {
            CliColors::Red => (255, 0, 0),
            CliColors::Green => (0, 255, 0),
            CliColors::Blue => (0, 0, 255),
            CliColors::Yellow => (255, 255, 0),
            CliColors::Orange => (255, 165, 0),
            CliColors::Purple => (128, 0, 128),
            CliColors::Cyan => (0, 255, 255),
            CliColors::Magenta => (255, 0, 255),
            CliColors::Pink => (255, 192, 203),
            CliColors::Teal => (0, 128, 128),
            CliColors::Lavender => (230, 230, 250),
            CliColors::Mint => (189, 252, 201),
        }
    }

    /// Hue in degrees (0..360) and saturation in percent (0..100), the units the device uses.
    fn hue_saturation(self) -> (i32, i32) {
        let (red, green, blue) = self.rgb();
        let rgb = Srgb::new(red, green, blue).into_format::<f32>();
        let hsv: Hsv = Hsv::from_color(rgb);
        let hue = hsv.hue.into_positive_degrees().round() as i32 % 360;
        let saturation = (hsv.saturation * 100.0).round() as i32;
        (hue, saturation)
    }
}

/// Subcommands available for the CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Prints general device information.
    #[clap(name = "info")]
    Info {
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Plaintext)]
        output: OutputFormat,
    },
    /// Prints the current device state.
    #[clap(name = "state")]
    State {
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Plaintext)]
        output: OutputFormat,
    },
    /// Lists the effects stored on the device.
    #[clap(name = "effects")]
    Effects {
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Plaintext)]
        output: OutputFormat,
    },
    /// Prints the active effect, if any.
    #[clap(name = "effect")]
    Effect,
    /// Turns the panels on or off.
    #[clap(name = "power")]
    Power {
        #[clap(value_enum)]
        state: PowerState,
    },
    /// Sets the brightness.
    #[clap(name = "brightness")]
    Brightness {
        value: i32,

        /// Fade to the new value over this many seconds
        #[clap(long)]
        duration: Option<u32>,
    },
    /// Sets the hue.
    #[clap(name = "hue")]
    Hue { value: i32 },
    /// Sets the saturation.
    #[clap(name = "saturation")]
    Saturation { value: i32 },
    /// Sets the color temperature in Kelvin.
    #[clap(name = "color-temperature")]
    ColorTemperature { value: i32 },
    /// Shows a named color.
    #[clap(name = "color")]
    Color {
        #[clap(value_enum)]
        color: CliColors,
    },
    /// Selects an effect by name.
    #[clap(name = "select-effect")]
    SelectEffect { name: String },
    /// Requests a new token. Hold the on/off button for 5-7 seconds first.
    #[clap(name = "request-token")]
    RequestToken,
    /// Deletes the token passed with --token on the device.
    #[clap(name = "revoke-token")]
    RevokeToken,
    /// Checks whether the device answers. Exits with status 1 if it does not.
    #[clap(name = "available")]
    Available,
}

fn print_output<T, F>(value: &T, output: OutputFormat, plaintext: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T),
{
    match output {
        OutputFormat::Plaintext => plaintext(value),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(value)?;
            println!("{}", yaml);
        }
    }
    Ok(())
}

async fn handle_cli(cli: Cli) -> Result<()> {
    let config: ConnectionConfig = cli.connection.into();
    let mut client = DeviceClient::new(config).context("Failed to create device client")?;

    match cli.command {
        Commands::Info { output } => {
            let info = client.get_info().await?;
            print_output(&info, output, |info| {
                println!("Name: {}", info.name);
                println!("Model: {}", info.model);
                println!("Serial number: {}", info.serial_no);
                println!("Manufacturer: {}", info.manufacturer);
                println!("Firmware version: {}", info.firmware_version);
                println!("Hardware version: {}", info.hardware_version);
                println!(
                    "Selected effect: {}",
                    info.selected_effect.as_deref().unwrap_or("none")
                );
            })?;
        }
        Commands::State { output } => {
            let state = client.get_state().await?;
            print_output(&state, output, |state| {
                println!("On: {}", state.on.value);
                for (label, field) in [
                    ("Brightness", &state.brightness),
                    ("Hue", &state.hue),
                    ("Saturation", &state.saturation),
                    ("Color temperature", &state.color_temperature),
                ] {
                    println!("{}: {} ({}..{})", label, field.value, field.min, field.max);
                }
                println!("Color mode: {}", state.color_mode);
            })?;
        }
        Commands::Effects { output } => {
            let effects = client.get_effects_list().await?;
            print_output(&effects, output, |effects| {
                for effect in effects {
                    println!("{}", effect);
                }
            })?;
        }
        Commands::Effect => match client.get_effect().await? {
            Some(effect) => println!("Current effect: {}", effect),
            None => println!("No effect selected"),
        },
        Commands::Power { state } => {
            client.set_power(state == PowerState::On).await?;
            println!("Power set to {:?}", state);
        }
        Commands::Brightness { value, duration } => {
            client.set_brightness(value, duration).await?;
            println!("Brightness set to {}", value);
        }
        Commands::Hue { value } => {
            client.set_hue(value).await?;
            println!("Hue set to {}", value);
        }
        Commands::Saturation { value } => {
            client.set_saturation(value).await?;
            println!("Saturation set to {}", value);
        }
        Commands::ColorTemperature { value } => {
            client.set_color_temperature(value).await?;
            println!("Color temperature set to {}", value);
        }
        Commands::Color { color } => {
            let (hue, saturation) = color.hue_saturation();
            client
                .set_state(&StateUpdate::new().power(true).hue(hue).saturation(saturation))
                .await?;
            println!(
                "Displayed color: {:?} (hue {}, saturation {})",
                color, hue, saturation
            );
        }
        Commands::SelectEffect { name } => {
            client.set_effect(&name).await?;
            println!("Effect set to {}", name);
        }
        Commands::RequestToken => {
            let token = client.request_token().await?;
            println!("{}", token);
        }
        Commands::RevokeToken => {
            client
                .revoke_token()
                .await
                .context("Failed to revoke token")?;
            println!("Token revoked.");
        }
        Commands::Available => {
            if client.is_available().await {
                println!("{} is available", client.host());
            } else {
                println!("{} is not available", client.host());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
