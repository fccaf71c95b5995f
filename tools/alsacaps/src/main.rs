use std::{
    error::Error,
    fs::File,
    io::{self, BufWriter, ErrorKind},
    path::PathBuf,
    time::Duration,
};

use alsaprobe::{
    config::InspectorConfig,
    error::InspectError,
    host::hostname,
    inspector::SystemInspector,
    listing::list_playback_devices,
    report::write_report,
    selection::{InterfaceKind, Selection},
};
use clap::Parser;
use log::{debug, LevelFilter};

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Display the details of alsa audio output interfaces on the host running this program."
)]
struct Args {
    #[arg(short = 'o', long, help = "Write the output to the file specified")]
    output: Option<PathBuf>,
    #[arg(
        short = 'l',
        long,
        value_parser = valid_limit,
        help = "Limit the output to interfaces of this type; a = analog, u = usb or uac, d = digital (including usb/uac)"
    )]
    limit: Option<InterfaceKind>,
    #[arg(
        short = 'i',
        long,
        help = "Limit the output to the interface with this hardware address, eg. `hw:x,y'"
    )]
    interface: Option<String>,
    #[arg(
        short = 'f',
        long,
        help = "Limit the output to interfaces whose label contains this exact string"
    )]
    filter: Option<String>,
    #[arg(
        short = 'c',
        long,
        help = "Limit the output to interfaces whose label matches this regular expression"
    )]
    regex: Option<String>,
    #[arg(
        short = 't',
        long,
        default_value = "5000",
        help = "Give up on a device's playback probe after this many milliseconds"
    )]
    timeout: u64,
    #[arg(short = 'd', long, help = "Print status messages to stderr")]
    debug: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.debug);
    debug!("started with options: {args:?}");

    let selection = build_selection(&args)?;
    let config = InspectorConfig {
        playback_timeout: Duration::from_millis(args.timeout),
        ..Default::default()
    };
    let listing = match list_playback_devices(&config.aplay) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("error listing audio devices: {e}");
            std::process::exit(1);
        }
    };

    let inspector = SystemInspector::from_config(&config, hostname());
    let records = inspector.inspect_listing(&listing, &selection);
    debug!("{} interfaces selected", records.len());

    let result = match &args.output {
        Some(path) => write_report(&mut BufWriter::new(File::create(path)?), &records),
        None => write_report(&mut io::stdout().lock(), &records),
    };
    if let Err(e) = result {
        // Output piped into something like `head` that stopped reading
        if e.kind() != ErrorKind::BrokenPipe {
            return Err(e.into());
        }
    }
    Ok(())
}

fn build_selection(args: &Args) -> Result<Selection, InspectError> {
    let selection = Selection::new(args.limit, args.interface.clone(), args.filter.clone());
    match &args.regex {
        Some(pattern) => selection.with_pattern(pattern),
        None => Ok(selection),
    }
}

fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if debug {
        raise_workspace_logging(&mut builder);
    }
    builder.init();
}

/// `--debug` only affects our own crates, not the libraries underneath them.
fn raise_workspace_logging(builder: &mut env_logger::Builder) {
    for module in ["alsacaps", "alsaprobe", "alsacore"] {
        builder.filter_module(module, LevelFilter::Debug);
    }
}

fn valid_limit(l: &str) -> Result<InterfaceKind, String> {
    l.parse()
}
