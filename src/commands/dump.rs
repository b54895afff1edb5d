//! Dump command implementation

use super::CmdResult;
use std::path::Path;
use tegra_eeprom_core::Session;

/// Save the raw record read from the device
///
/// This is what was on the device when it was opened (or last written);
/// pending edits are not included.
pub fn cmd_dump<T>(session: &Session<T>, output: &Path) -> CmdResult {
    let raw = session.handle().raw();
    if session.is_modified() {
        log::warn!("Pending changes are not included in the dump");
    }
    std::fs::write(output, raw.as_bytes())?;
    println!("Wrote {} bytes to {:?}", raw.as_bytes().len(), output);
    Ok(())
}
