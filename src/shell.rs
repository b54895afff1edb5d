//! Interactive shell
//!
//! Runs the tool commands one line at a time against a single open
//! session, so several fields can be changed and written together. Lines
//! are split like a shell would (quotes and backslash escapes) and parsed
//! with the same clap definitions as the command line.

use crate::cli::Commands;
use crate::commands;
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use directories::ProjectDirs;
use embedded_io::{Read, Seek, Write};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::path::PathBuf;
use tegra_eeprom_core::{FieldId, Session};

/// One line of shell input
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
enum ShellCommand {
    #[command(flatten)]
    Tool(Commands),

    /// Write pending changes to the EEPROM
    Write,

    /// Leave the shell, writing pending changes
    #[command(alias = "exit")]
    Quit,
}

/// Split a line into words
///
/// Single quotes keep everything literally, double quotes allow backslash
/// escapes, and outside quotes a backslash escapes the next character.
pub fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => word.push(c),
                        None => return Err("unterminated single quote".to_string()),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c) => word.push(c),
                            None => return Err("unterminated double quote".to_string()),
                        },
                        Some(c) => word.push(c),
                        None => return Err("unterminated double quote".to_string()),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(c) = chars.next() {
                    word.push(c);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                word.push(c);
            }
        }
    }
    if in_word {
        words.push(word);
    }
    Ok(words)
}

/// Completion for command and field names
#[derive(Helper, Hinter, Validator, Highlighter)]
struct ShellHelper {
    commands: Vec<String>,
}

impl ShellHelper {
    fn new() -> Self {
        let commands = ShellLine::command()
            .get_subcommands()
            .flat_map(|cmd| {
                std::iter::once(cmd.get_name().to_string())
                    .chain(cmd.get_all_aliases().map(str::to_string))
            })
            .collect();
        Self { commands }
    }

    fn candidates(&self, previous: &[&str]) -> Vec<String> {
        match previous {
            [] => self.commands.clone(),
            ["get" | "set"] => FieldId::ALL.iter().map(|f| f.name().to_string()).collect(),
            ["set", field] if field.eq_ignore_ascii_case("partnumber") => {
                vec!["vendor".to_string(), "customer".to_string()]
            }
            _ => Vec::new(),
        }
    }
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let before = &line[..pos];
        let start = before
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);
        let prefix = &before[start..];
        let previous: Vec<&str> = before[..start].split_whitespace().collect();

        let completions = self
            .candidates(&previous)
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .map(|c| Pair {
                display: c.clone(),
                replacement: c,
            })
            .collect();
        Ok((start, completions))
    }
}

fn get_history_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "tegra-eeprom-tool") {
        let mut path = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&path).ok();
        path.push("shell_history");
        path
    } else {
        PathBuf::from(".tegra_eeprom_history")
    }
}

/// What the shell loop should do after a line
#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

fn run_line<T: Read + Write + Seek>(
    session: &mut Session<T>,
    line: &str,
) -> Result<Flow, Box<dyn std::error::Error>> {
    let words = split_line(line)?;
    if words.is_empty() {
        return Ok(Flow::Continue);
    }
    let parsed = match ShellLine::try_parse_from(&words) {
        Ok(parsed) => parsed,
        Err(e) => {
            // Also covers `help`, which clap reports as an error
            e.print()?;
            return Ok(Flow::Continue);
        }
    };
    match parsed.command {
        ShellCommand::Tool(command) => commands::run(session, &command)?,
        ShellCommand::Write => commands::edit::cmd_write(session)?,
        ShellCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Run the shell until `quit` or end of input
///
/// Pending changes are left in the session for the caller to write.
pub fn run_shell<T: Read + Write + Seek>(
    session: &mut Session<T>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut rl = Editor::<ShellHelper, FileHistory>::new()?;
    rl.set_helper(Some(ShellHelper::new()));

    let history_path = get_history_path();
    if rl.load_history(&history_path).is_err() {
        log::debug!("No shell history at {:?}", history_path);
    }

    let handle = session.handle();
    println!(
        "{} EEPROM{}. Type {} for commands, {} to exit.",
        handle.class().to_string().bright_cyan(),
        if handle.is_readonly() { " (read-only)" } else { "" },
        "help".bright_cyan(),
        "quit".bright_cyan()
    );
    if !session.has_data() {
        println!(
            "{}: no valid contents on the device",
            "Warning".bright_yellow()
        );
    }

    let prompt = format!("{} ", "eeprom>".bright_green().bold());

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match run_line(session, &line) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => eprintln!("{}: {}", "Error".bright_red().bold(), e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}: {:?}", "Error".bright_red().bold(), err);
                break;
            }
        }
    }

    if let Err(e) = rl.save_history(&history_path) {
        eprintln!(
            "{}: Failed to save history: {}",
            "Warning".bright_yellow(),
            e
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tegra_eeprom_core::{DeviceClass, EepromHandle, Error};
    use tegra_eeprom_dummy::DummyEeprom;

    fn session(readonly: bool) -> Session<DummyEeprom> {
        Session::new(
            EepromHandle::open(DummyEeprom::new_default(), DeviceClass::Module, readonly)
                .unwrap(),
        )
    }

    #[test]
    fn test_split_line() {
        assert_eq!(
            split_line("  set asset-id  A1 ").unwrap(),
            vec!["set", "asset-id", "A1"]
        );
        assert_eq!(
            split_line(r#"set partnumber vendor "699-13668-0001-301 B.0""#).unwrap(),
            vec!["set", "partnumber", "vendor", "699-13668-0001-301 B.0"]
        );
        assert_eq!(split_line(r"a\ b 'c\d' ''").unwrap(), vec!["a b", r"c\d", ""]);
        assert_eq!(split_line(r#""a\"b""#).unwrap(), vec![r#"a"b"#]);
        assert!(split_line("set asset-id 'oops").is_err());
        assert!(split_line("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_shell_commands() {
        let parse = |line: &str| {
            ShellLine::try_parse_from(split_line(line).unwrap())
                .map(|l| l.command)
                .ok()
        };
        assert_eq!(parse("write"), Some(ShellCommand::Write));
        assert_eq!(parse("exit"), Some(ShellCommand::Quit));
        assert_eq!(
            parse("get asset-id"),
            Some(ShellCommand::Tool(Commands::Get {
                field: FieldId::AssetId
            }))
        );
        assert_eq!(parse("get serial"), None);
        assert_eq!(parse("frobnicate"), None);
    }

    #[test]
    fn test_run_lines() {
        let mut session = session(false);
        assert_eq!(
            run_line(&mut session, "set asset-id A1").unwrap(),
            Flow::Continue
        );
        assert!(session.is_modified());
        run_line(&mut session, "write").unwrap();
        assert!(!session.is_modified());
        assert_eq!(
            session.record().unwrap().asset_id().as_str(),
            Some("A1")
        );
        assert_eq!(run_line(&mut session, "quit").unwrap(), Flow::Quit);
    }

    #[test]
    fn test_run_line_errors() {
        let mut session = session(true);
        let err = run_line(&mut session, "set asset-id A1").unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::ReadOnly));
        assert!(run_line(&mut session, "set asset-id 'A1").is_err());
        assert_eq!(run_line(&mut session, "bogus").unwrap(), Flow::Continue);
    }

    #[test]
    fn test_completion_candidates() {
        let helper = ShellHelper::new();
        let commands = helper.candidates(&[]);
        for name in ["show", "get", "set", "write", "quit", "exit"] {
            assert!(commands.iter().any(|c| c == name), "missing {}", name);
        }
        assert!(helper
            .candidates(&["set"])
            .contains(&"vendor-wifi-mac".to_string()));
        assert_eq!(
            helper.candidates(&["set", "partnumber"]),
            vec!["vendor", "customer"]
        );
        assert!(helper.candidates(&["show"]).is_empty());
    }
}
