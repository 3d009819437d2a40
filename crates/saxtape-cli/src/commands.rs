use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use saxtape_digest::DigestReceiver;
use saxtape_receivers::{Inspector, NullReceiver};
use saxtape_store::{Tape, TapeError};
use saxtape_types::{Attributes, Name, ReceiveError, SourceLocation, XmlReceiver};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Inspect(args) => cmd_inspect(&args.file),
        Command::Dump(args) => cmd_dump(&args.file, args.locations),
        Command::Verify(args) => cmd_verify(&args.file),
        Command::Digest(args) => cmd_digest(&args.file),
    }
}

fn load(path: &Path) -> anyhow::Result<Tape> {
    Tape::load_from(path).with_context(|| format!("reading tape {}", path.display()))
}

fn cmd_inspect(path: &Path) -> anyhow::Result<()> {
    let tape = load(path)?;
    println!("{}", path.display().to_string().bold());
    println!("  Events: {}", tape.len().to_string().bold());
    println!("  Attributes: {}", tape.attribute_count());
    println!(
        "  Locations: {}",
        if tape.has_location() {
            "recorded".green().to_string()
        } else {
            "not recorded".dimmed().to_string()
        }
    );
    if let Some(public_id) = tape.public_id() {
        println!("  Public id: {}", public_id.cyan());
    }
    println!("  Approximate size: {} bytes", tape.approximate_size());
    if tape.marks().is_empty() {
        println!("  Marks: none");
    } else {
        println!("  Marks:");
        for mark in tape.marks() {
            println!("    {}", mark.to_string().yellow());
        }
    }
    Ok(())
}

fn cmd_dump(path: &Path, locations: bool) -> anyhow::Result<()> {
    let tape = load(path)?;
    let mut printer = EventPrinter::new(locations);
    tape.replay(&mut printer)
        .with_context(|| format!("replaying tape {}", path.display()))?;
    Ok(())
}

fn cmd_verify(path: &Path) -> anyhow::Result<()> {
    let tape = load(path)?;
    match verify_tape(&tape) {
        Ok(()) => {
            println!(
                "{} {} is well formed ({} events)",
                "✓".green().bold(),
                path.display(),
                tape.len()
            );
            Ok(())
        }
        Err(reason) => {
            println!("{} {}: {}", "✗".red().bold(), path.display(), reason);
            anyhow::bail!("tape is not well formed")
        }
    }
}

/// Replay through the inspector, separating a well-formedness rejection
/// from a structurally broken tape.
pub(crate) fn verify_tape(tape: &Tape) -> Result<(), String> {
    let mut inspector = Inspector::new(NullReceiver);
    match tape.replay(&mut inspector) {
        Ok(()) => Ok(()),
        Err(TapeError::Receiver(ReceiveError::Malformed {
            reason,
            line,
            column,
        })) => Err(format!("{reason} (line {line}, column {column})")),
        Err(other) => Err(other.to_string()),
    }
}

fn cmd_digest(path: &Path) -> anyhow::Result<()> {
    let tape = load(path)?;
    let mut receiver = DigestReceiver::new();
    tape.replay(&mut receiver)
        .with_context(|| format!("replaying tape {}", path.display()))?;
    println!("{}  {}", receiver.finish(), path.display());
    Ok(())
}

/// Prints one line per replayed event, indented by element depth.
struct EventPrinter {
    locations: bool,
    depth: usize,
    position: Option<SourceLocation>,
}

impl EventPrinter {
    fn new(locations: bool) -> Self {
        Self {
            locations,
            depth: 0,
            position: None,
        }
    }

    fn line(&mut self, text: String) {
        let indent = "  ".repeat(self.depth);
        if self.locations {
            let at = self
                .position
                .take()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".into());
            println!("{:>16}  {indent}{text}", at.dimmed());
        } else {
            println!("{indent}{text}");
        }
    }
}

impl XmlReceiver for EventPrinter {
    fn document_locator(&mut self, public_id: Option<&str>) -> Result<(), ReceiveError> {
        if let Some(public_id) = public_id {
            println!("{} {}", "locator".cyan(), public_id);
        }
        Ok(())
    }

    fn location(&mut self, location: &SourceLocation) -> Result<(), ReceiveError> {
        self.position = Some(location.clone());
        Ok(())
    }

    fn start_document(&mut self) -> Result<(), ReceiveError> {
        self.line("start document".cyan().to_string());
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), ReceiveError> {
        self.line("end document".cyan().to_string());
        Ok(())
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<(), ReceiveError> {
        self.line(format!("xmlns:{} = {}", prefix.yellow(), uri));
        Ok(())
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<(), ReceiveError> {
        self.line(format!("end xmlns:{}", prefix.yellow()));
        Ok(())
    }

    fn start_element(&mut self, name: Name<'_>, attributes: &Attributes) -> Result<(), ReceiveError> {
        let attrs: Vec<String> = attributes.iter().map(|a| format!(" {a}")).collect();
        self.line(format!("<{}{}>", name.to_string().green(), attrs.join("")));
        self.depth += 1;
        Ok(())
    }

    fn end_element(&mut self, name: Name<'_>) -> Result<(), ReceiveError> {
        self.depth = self.depth.saturating_sub(1);
        self.line(format!("</{}>", name.to_string().green()));
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.line(format!("{:?}", text));
        Ok(())
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.line(format!("whitespace ({} chars)", text.len()).dimmed().to_string());
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), ReceiveError> {
        self.line(format!("<?{} {}?>", target.magenta(), data));
        Ok(())
    }

    fn skipped_entity(&mut self, name: &str) -> Result<(), ReceiveError> {
        self.line(format!("&{name};").dimmed().to_string());
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.line(format!("<!--{text}-->").dimmed().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saxtape_types::Attribute;

    fn well_formed_tape() -> Tape {
        let mut tape = Tape::new();
        tape.start_document().unwrap();
        let mut attrs = Attributes::new();
        attrs.push(Attribute::cdata("", "id", "id", "1"));
        tape.start_element(Name::local("root"), &attrs).unwrap();
        tape.characters("hello").unwrap();
        tape.end_element(Name::local("root")).unwrap();
        tape.end_document().unwrap();
        tape
    }

    fn saved(tape: &Tape) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.tape");
        tape.save_to(&path).unwrap();
        (dir, path)
    }

    #[test]
    fn inspect_dump_digest_run_on_a_saved_tape() {
        let (_dir, path) = saved(&well_formed_tape());
        cmd_inspect(&path).unwrap();
        cmd_dump(&path, false).unwrap();
        cmd_dump(&path, true).unwrap();
        cmd_digest(&path).unwrap();
    }

    #[test]
    fn verify_accepts_a_well_formed_tape() {
        let tape = well_formed_tape();
        assert!(verify_tape(&tape).is_ok());

        let (_dir, path) = saved(&tape);
        cmd_verify(&path).unwrap();
    }

    #[test]
    fn verify_rejects_an_unbalanced_tape() {
        let mut tape = Tape::new();
        tape.start_document().unwrap();
        tape.start_element(Name::local("open"), &Attributes::new()).unwrap();
        tape.end_document().unwrap();

        let reason = verify_tape(&tape).unwrap_err();
        assert!(reason.contains("open element"));

        let (_dir, path) = saved(&tape);
        assert!(cmd_verify(&path).is_err());
    }

    #[test]
    fn commands_fail_cleanly_on_a_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.tape");
        assert!(cmd_inspect(&path).is_err());
        assert!(cmd_digest(&path).is_err());
    }
}
