//! tegra-boardspec - Print the boardspec string of the running system
//!
//! The boardspec identifies the module by board id, fab, SKU and revision
//! from the module EEPROM part number, plus the fuse production mode and
//! chip revision:
//!
//! ```text
//! 3668-301-0001-B.0-1-2
//! ```

use clap::Parser;
use tegra_eeprom_linux::{prod_mode, read_module_record, BoardSpec, LinuxConfig};

#[allow(dead_code)]
#[path = "../cli.rs"]
mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::BoardspecCli::parse();
    match args.verbose {
        0 => {}
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let config = LinuxConfig::default();
    let prod_mode = prod_mode(&config).unwrap_or_else(|e| {
        log::warn!("Cannot read production mode fuse, assuming 0: {}", e);
        0
    });
    let (soc, record) = read_module_record(&config)?;
    log::debug!("Module EEPROM read for {}", soc);

    println!("{}", BoardSpec::from_record(&record, soc, prod_mode)?);
    Ok(())
}
