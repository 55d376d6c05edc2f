//! Corsair Commander Pro Control CLI
//!
//! Command-line interface for monitoring and controlling Corsair Commander Pro
//! and Lighting Node devices.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::ffi::CString;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use commander_rust_devices::config::AppConfig;
use commander_rust_devices::device::CommanderPro;
use commander_rust_devices::protocol::{Direction, EffectOptions, LedSpeed, StatusEntry};
use commander_rust_devices::utils::parsing::{
    UNSAFE_HIGH_TEMPERATURE, clamp_duty, parse_hex_color, parse_profile, parse_unsafe_features,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Corsair Commander Pro Control Tool
#[derive(Parser, Debug)]
#[command(name = "commander-pro-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log device operations
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log every frame sent to the device
    #[arg(long, global = true)]
    debug: bool,

    /// HID path of the device to use (see `list`)
    #[arg(short, long, global = true)]
    device: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List connected supported devices
    List,

    /// Initialize the device and detect fans and temperature probes
    Initialize,

    /// Show current device status
    Status,

    /// Continuously monitor device status
    Monitor {
        /// Update interval in seconds
        #[arg(short, long, default_value = "1")]
        interval: u64,
    },

    /// Set a fixed fan duty
    SetSpeed {
        /// Fan channel: fan1..fan6 or sync
        channel: String,

        /// Duty cycle percentage, clamped to 0-100
        #[arg(allow_negative_numbers = true)]
        duty: i64,
    },

    /// Make fans follow a temperature profile
    SetProfile {
        /// Fan channel: fan1..fan6 or sync
        channel: String,

        /// Profile points as TEMP:VALUE pairs, e.g. "25:800,40:1500"
        #[arg(required_unless_present = "preset", conflicts_with = "preset")]
        points: Option<String>,

        /// Named profile from the config file, or silent/performance
        #[arg(short, long)]
        preset: Option<String>,

        /// Temperature probe to follow, 1-indexed
        #[arg(short, long)]
        sensor: Option<u8>,

        /// Comma-separated unsafe features, e.g. high_temperature
        #[arg(long = "unsafe")]
        unsafe_features: Option<String>,
    },

    /// Save a named fan profile to the config file
    SaveProfile {
        /// Profile name, matched without case by `set-profile --preset`
        name: String,

        /// Profile points as TEMP:VALUE pairs, e.g. "25:800,40:1500"
        points: String,
    },

    /// Set the lighting effect of an LED channel
    SetColor {
        /// LED channel: led, led1, led2 or sync
        channel: String,

        /// Mode: off, fixed, color_shift, color_pulse, color_wave, visor,
        /// blink, marquee, sequential, rainbow, rainbow2 or clear
        mode: String,

        /// Colors as hex, e.g. ff0000 00ff00
        colors: Vec<String>,

        /// Animation speed: slow, medium or fast
        #[arg(long, default_value = "medium")]
        speed: String,

        /// Animation direction: forward or backward
        #[arg(long, default_value = "forward")]
        direction: String,

        /// First LED, 1-indexed
        #[arg(long, default_value = "1")]
        start_led: u16,

        /// Number of LEDs the effect covers
        #[arg(long, default_value = "1")]
        maximum_leds: u16,
    },
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let config = AppConfig::load().context("Failed to load configuration")?;

    match &args.command {
        Command::List => cmd_list(),
        Command::Initialize => cmd_initialize(&args, &config),
        Command::Status => cmd_status(&args, &config),
        Command::Monitor { interval } => cmd_monitor(&args, &config, *interval),
        Command::SetSpeed { channel, duty } => {
            cmd_set_speed(&args, &config, channel, clamp_duty(*duty))
        }
        Command::SaveProfile { name, points } => cmd_save_profile(config, name, points),
        Command::SetProfile {
            channel,
            points,
            preset,
            sensor,
            unsafe_features,
        } => cmd_set_profile(
            &args,
            &config,
            channel,
            points.as_deref(),
            preset.as_deref(),
            *sensor,
            unsafe_features.as_deref(),
        ),
        Command::SetColor {
            channel,
            mode,
            colors,
            speed,
            direction,
            start_led,
            maximum_leds,
        } => {
            let options = EffectOptions {
                direction: direction
                    .parse::<Direction>()
                    .context("Invalid --direction")?,
                speed: LedSpeed::from_name(speed),
                start_led: *start_led,
                maximum_leds: *maximum_leds,
            };
            cmd_set_color(&args, &config, channel, mode, colors, &options)
        }
    }
}

fn init_logging(args: &Args) {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("commander_rust_devices={}", level).into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_device(args: &Args, config: &AppConfig) -> Result<CommanderPro> {
    let path = args
        .device
        .as_deref()
        .map(CString::new)
        .transpose()
        .context("Invalid device path")?;

    CommanderPro::open_device(path.as_deref(), config.storage_dir.as_deref())
        .context("Failed to open Corsair device")
}

fn print_status(status: &[StatusEntry]) {
    for entry in status {
        println!("  {}", entry);
    }
}

// =============================================================================
// Commands
// =============================================================================

fn cmd_list() -> Result<()> {
    let devices = CommanderPro::list_devices().context("Failed to enumerate devices")?;

    if devices.is_empty() {
        println!("❌ No supported Corsair devices found.");
        return Ok(());
    }

    println!("🔍 Found {} device(s):\n", devices.len());
    for (i, device) in devices.iter().enumerate() {
        let serial = device.serial.as_deref().unwrap_or("unknown");
        println!("  {}. {} (serial: {})", i + 1, device.variant.name, serial);
        println!("     Path: {}", device.path);
    }

    Ok(())
}

fn cmd_initialize(args: &Args, config: &AppConfig) -> Result<()> {
    let mut commander = open_device(args, config)?;
    let status = commander
        .initialize()
        .context("Failed to initialize device")?;

    println!("✅ {} initialized", commander.variant().name);
    print_status(&status);
    Ok(())
}

fn cmd_status(args: &Args, config: &AppConfig) -> Result<()> {
    let mut commander = open_device(args, config)?;
    let status = commander.get_status().context("Failed to read status")?;

    if status.is_empty() {
        println!("{} has no status to report.", commander.variant().name);
        return Ok(());
    }

    print_status(&status);
    Ok(())
}

fn cmd_monitor(args: &Args, config: &AppConfig, interval_secs: u64) -> Result<()> {
    let mut commander = open_device(args, config)?;
    if !commander.variant().has_telemetry() {
        bail!("{} has no status to monitor", commander.variant().name);
    }

    // Setup Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    println!(
        "🌡️  Monitoring {} (Ctrl+C to stop)...\n",
        commander.variant().name
    );

    while running.load(Ordering::SeqCst) {
        match commander.get_status() {
            Ok(status) => {
                // Clear screen and move cursor to top
                print!("\x1B[2J\x1B[1;1H");
                print_status(&status);
            }
            Err(e) => {
                eprintln!("⚠️  Read error: {}", e);
            }
        }

        std::thread::sleep(Duration::from_secs(interval_secs));
    }

    println!("\n👋 Monitoring stopped.");
    Ok(())
}

fn cmd_set_speed(args: &Args, config: &AppConfig, channel: &str, duty: u8) -> Result<()> {
    let mut commander = open_device(args, config)?;
    commander
        .set_fixed_speed(channel, duty)
        .with_context(|| format!("Failed to set {} duty", channel))?;

    println!("✅ {} set to {}%", channel, duty);
    Ok(())
}

fn cmd_set_profile(
    args: &Args,
    config: &AppConfig,
    channel: &str,
    points: Option<&str>,
    preset: Option<&str>,
    sensor: Option<u8>,
    unsafe_features: Option<&str>,
) -> Result<()> {
    let profile = match (points, preset) {
        (Some(points), _) => parse_profile(points).context("Invalid profile")?,
        (None, Some(name)) => config.profile(name)?,
        (None, None) => bail!("Either profile points or --preset is required"),
    };

    let high_temperature = unsafe_features
        .map(parse_unsafe_features)
        .unwrap_or_default()
        .iter()
        .any(|f| f == UNSAFE_HIGH_TEMPERATURE);
    let sensor = sensor.unwrap_or(config.temperature_sensor);

    let mut commander = open_device(args, config)?;
    commander
        .set_speed_profile(channel, &profile, sensor, high_temperature)
        .with_context(|| format!("Failed to set {} profile", channel))?;

    println!(
        "✅ {} following temperature sensor {} ({} points)",
        channel,
        sensor,
        profile.len()
    );
    Ok(())
}

fn cmd_save_profile(mut config: AppConfig, name: &str, points: &str) -> Result<()> {
    let profile = parse_profile(points).context("Invalid profile")?;
    let count = profile.len();

    config.insert_profile(name, profile);
    config.save().context("Failed to save configuration")?;

    println!("✅ Profile '{}' saved ({} points)", name.to_lowercase(), count);
    Ok(())
}

fn cmd_set_color(
    args: &Args,
    config: &AppConfig,
    channel: &str,
    mode: &str,
    colors: &[String],
    options: &EffectOptions,
) -> Result<()> {
    let colors = colors
        .iter()
        .map(|c| parse_hex_color(c))
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid color")?;

    let mut commander = open_device(args, config)?;
    commander
        .set_color(channel, mode, &colors, options)
        .with_context(|| format!("Failed to set {} to {}", channel, mode))?;

    println!("✅ {} set to {}", channel, mode);
    Ok(())
}
