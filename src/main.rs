//! tegra-eeprom-tool - Inspect and edit Tegra identification EEPROMs
//!
//! Works on the module EEPROM of a running Jetson, on carrier-board
//! EEPROMs by I2C address, on sysfs `eeprom` nodes and on image files.
//!
//! With a command on the command line the tool runs it and exits; without
//! one it starts an interactive shell. Either way, changes made with `set`
//! are written to the device when the tool finishes.

mod cli;
mod commands;
mod device;
mod shell;

use clap::Parser;
use cli::{Cli, Commands};
use device::OpenDevice;
use embedded_io::{Read, Seek, Write};
use tegra_eeprom_core::{EepromHandle, Session};
use tegra_eeprom_linux::LinuxConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (warn)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let config = LinuxConfig::default();
    match device::open_device(cli.device.as_deref(), cli.cvm, &config)? {
        OpenDevice::Linux(handle) => run_tool(handle, cli.command.as_ref()),
        OpenDevice::Dummy(handle) => run_tool(handle, cli.command.as_ref()),
    }
}

/// Run one command, or the shell, then write any pending changes
///
/// Changes are discarded if the command fails.
fn run_tool<T: Read + Write + Seek>(
    handle: EepromHandle<T>,
    command: Option<&Commands>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(handle);

    let result = match command {
        Some(command) => commands::run(&mut session, command),
        None => shell::run_shell(&mut session),
    };

    match result {
        Ok(()) => {
            if session.is_modified() {
                log::info!("Writing pending changes");
            }
            session.finish()?;
            Ok(())
        }
        Err(e) => {
            if session.is_modified() {
                log::warn!("Discarding unwritten changes");
            }
            Err(e)
        }
    }
}
