//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tegra_eeprom_core::FieldId;

/// Parse a field name, ignoring case
pub fn parse_field(s: &str) -> Result<FieldId, String> {
    FieldId::from_name(s).ok_or_else(|| format!("unrecognized field name: {}", s))
}

#[derive(Parser)]
#[command(name = "tegra-eeprom-tool")]
#[command(author, version, about = "Tegra identification EEPROM tool", long_about = None)]
pub struct Cli {
    /// EEPROM device: a file or sysfs eeprom node, an I2C address as
    /// <bus>-<hexaddr>, or 'dummy' for an in-memory blank EEPROM.
    /// Defaults to the module EEPROM of the running system
    #[arg(short, long)]
    pub device: Option<String>,

    /// Treat the EEPROM as a module (CVM) EEPROM
    #[arg(short, long)]
    pub cvm: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Command to run; starts an interactive shell if omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Show all EEPROM fields
    Show,

    /// Print the value of one field
    Get {
        /// Field name (see 'fields')
        #[arg(value_parser = parse_field)]
        field: FieldId,
    },

    /// Set the value of one field
    ///
    /// The part number takes a kind (vendor or customer) before the value.
    Set {
        /// Field name (see 'fields')
        #[arg(value_parser = parse_field)]
        field: FieldId,

        /// [<kind>] <value>
        #[arg(required = true, num_args = 1..=2, allow_hyphen_values = true)]
        values: Vec<String>,
    },

    /// Check that the EEPROM contents are valid
    Verify,

    /// List field names
    Fields,

    /// Save the raw EEPROM contents to a file
    Dump {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Export the fields as TOML
    Export {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Set fields from a TOML file and write them
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Arguments of the `tegra-boardspec` binary
#[allow(dead_code)]
#[derive(Parser)]
#[command(name = "tegra-boardspec")]
#[command(author, version, about = "Print the Tegra boardspec of this system", long_about = None)]
pub struct BoardspecCli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
