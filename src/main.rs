//! wiimouse — bridge a Wii Remote to a pointer consumer.
//!
//! Connects a datagram socket to `<connection-dir>/interrupt`, opens the
//! remote's evdev interfaces, and runs the report scheduler until the device
//! goes away. Exit codes are stable per failure class; see the README.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{error, info};

use wiimouse::backends::WiimoteSession;
use wiimouse::config::Tuning;
use wiimouse::error::Error;
use wiimouse::scheduler::{Scheduler, REQUESTED_CAPABILITIES};
use wiimouse::session::DeviceSession;
use wiimouse::transport::ReportLink;

/// Exit code for argument and profile errors.
const EXIT_USAGE: i32 = 0x01;

#[derive(Parser, Debug)]
#[command(name = "wiimouse", version, about)]
struct Args {
    /// Connection directory; reports are sent to `<dir>/interrupt`.
    connection_dir: PathBuf,

    /// Report interval in milliseconds (overrides the profile).
    interval_ms: Option<u64>,

    /// Optional TOML tuning profile.
    #[arg(long)]
    tuning: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            process::exit(if err.use_stderr() { EXIT_USAGE } else { 0 });
        }
    };

    if let Err(err) = run(args) {
        error!("{err}");
        process::exit(err.exit_code());
    }
}

fn run(args: Args) -> Result<(), Error> {
    let mut tuning = match &args.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    if let Some(interval_ms) = args.interval_ms {
        tuning.interval_ms = interval_ms;
    }

    let mut link = ReportLink::connect(&args.connection_dir).map_err(Error::Connect)?;

    let mut session = WiimoteSession::open()?;
    info!("interfaces available: {:#010x}", session.available().bits());
    let opened = session.open_capabilities(REQUESTED_CAPABILITIES)?;
    info!("interfaces opened: {:#010x}", opened.bits());

    info!("reading events");
    Scheduler::new(session, tuning).run(&mut link)
}
