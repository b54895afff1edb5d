//! CLI command implementations
//!
//! Every command works on a [`Session`] over any transport, so the same
//! code serves files, sysfs nodes, i2c-dev and the dummy EEPROM.

pub mod dump;
pub mod edit;
pub mod export;
pub mod show;

use crate::cli::Commands;
use embedded_io::{Read, Seek, Write};
use tegra_eeprom_core::Session;

/// Result type shared by the commands
pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Run one command against a session
pub fn run<T: Read + Write + Seek>(session: &mut Session<T>, command: &Commands) -> CmdResult {
    match command {
        Commands::Show => show::cmd_show(session),
        Commands::Get { field } => show::cmd_get(session, *field),
        Commands::Set { field, values } => edit::cmd_set(session, *field, values),
        Commands::Verify => edit::cmd_verify(session),
        Commands::Fields => {
            show::cmd_fields(session.handle().class());
            Ok(())
        }
        Commands::Dump { output } => dump::cmd_dump(session, output),
        Commands::Export { output } => export::cmd_export(session, output.as_deref()),
        Commands::Import { input } => export::cmd_import(session, input),
    }
}
