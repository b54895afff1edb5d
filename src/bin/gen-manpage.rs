//! Man page generator for tegra-eeprom-tool and tegra-boardspec
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::CommandFactory;
use std::fs;
use std::path::{Path, PathBuf};

#[allow(dead_code)]
#[path = "../cli.rs"]
mod cli;

/// Write `<name>.1` for `cmd` into `output_dir`
fn render(cmd: clap::Command, output_dir: &Path) -> std::io::Result<PathBuf> {
    let path = output_dir.join(format!("{}.1", cmd.get_name()));
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd).render(&mut buffer)?;
    fs::write(&path, buffer)?;
    Ok(path)
}

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    fs::create_dir_all(&output_dir)?;

    for cmd in [cli::Cli::command(), cli::BoardspecCli::command()] {
        let path = render(cmd, &output_dir)?;
        println!("Generated {}", path.display());
    }
    Ok(())
}
