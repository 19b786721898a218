//! Console logging for hosts that don't bring their own `log` backend.

use std::io::Write;

use env_logger::{Builder, WriteStyle};
use log::LevelFilter;

/// A logger builder with the crate's line format. `RUST_LOG` is applied on top of `level`.
#[must_use]
pub fn builder(level: LevelFilter) -> Builder {
    let mut builder = Builder::new();
    builder
        .format(|buf, record| writeln!(buf, "[VSIM | {}] {}", record.level(), record.args()))
        .write_style(WriteStyle::Always)
        .filter_level(level)
        .parse_default_env();
    builder
}

/// Installs the console logger at `Info`. Safe to call more than once, later calls just report the error.
pub fn try_init() -> Result<(), log::SetLoggerError> {
    builder(LevelFilter::Info).try_init()
}
