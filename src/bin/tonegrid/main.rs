//! tonegrid - nine-octave tone keyboard in the terminal
//!
//! Run with: cargo run -- [--a4 <hz>] [--gain <0..2>] [--wave sine|triangle|square|saw] [-v]

mod app;
mod ui;

use std::{fs::File, path::PathBuf, str::FromStr};

use app::Tonegrid;
use color_eyre::eyre::{bail, eyre, Result as EyreResult, WrapErr};
use tonegrid::dsp::Waveform;

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let log_path = init_logging(verbose)?;

    let mut app = Tonegrid::new();
    if let Some(hz) = flag_value::<f64>(&args, "--a4")? {
        app = app.reference_pitch(hz);
    }
    if let Some(gain) = flag_value::<f32>(&args, "--gain")? {
        app = app.gain(gain);
    }
    if let Some(name) = flag_value::<String>(&args, "--wave")? {
        app = app.waveform(parse_waveform(&name)?);
    }

    app.run()
        .wrap_err_with(|| format!("tonegrid failed, see {}", log_path.display()))
}

/// Value following `flag`, parsed. `None` if the flag is absent.
fn flag_value<T>(args: &[String], flag: &str) -> EyreResult<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Some(i) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    let value = args
        .get(i + 1)
        .ok_or_else(|| eyre!("{flag} expects a value"))?;
    value
        .parse()
        .map(Some)
        .wrap_err_with(|| format!("invalid value for {flag}: {value:?}"))
}

fn parse_waveform(name: &str) -> EyreResult<Waveform> {
    Ok(match name {
        "sine" => Waveform::Sine,
        "triangle" => Waveform::Triangle,
        "square" => Waveform::Square,
        "saw" | "sawtooth" => Waveform::Sawtooth,
        other => bail!("unknown waveform {other:?} (sine, triangle, square, saw)"),
    })
}

/// The TUI owns the terminal, so logs go to a file.
fn init_logging(verbose: bool) -> EyreResult<PathBuf> {
    use simplelog::{Config, LevelFilter, WriteLogger};

    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_path = std::env::temp_dir().join("tonegrid.log");
    let log_file = File::create(&log_path)
        .wrap_err_with(|| format!("cannot create log file {}", log_path.display()))?;

    WriteLogger::init(log_level, Config::default(), log_file)
        .wrap_err("failed to initialize logger")?;

    log::info!("tonegrid starting (log level: {log_level:?})");
    Ok(log_path)
}
