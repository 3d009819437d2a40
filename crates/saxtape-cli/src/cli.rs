use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "saxtape",
    about = "Inspect, dump, verify, and digest serialized event tapes",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show a tape's header, counts, and marks
    Inspect(InspectArgs),
    /// Replay a tape as one line per event
    Dump(DumpArgs),
    /// Replay a tape through the well-formedness inspector
    Verify(VerifyArgs),
    /// Compute a tape's infoset digest
    Digest(DigestArgs),
}

#[derive(Args)]
pub struct InspectArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct DumpArgs {
    pub file: PathBuf,
    /// Prefix each event with its recorded source position
    #[arg(long)]
    pub locations: bool,
}

#[derive(Args)]
pub struct VerifyArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct DigestArgs {
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_inspect() {
        let cli = Cli::try_parse_from(["saxtape", "inspect", "doc.tape"]).unwrap();
        if let Command::Inspect(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("doc.tape"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_dump_with_locations() {
        let cli = Cli::try_parse_from(["saxtape", "dump", "--locations", "doc.tape"]).unwrap();
        if let Command::Dump(args) = cli.command {
            assert!(args.locations);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verify() {
        let cli = Cli::try_parse_from(["saxtape", "verify", "doc.tape"]).unwrap();
        assert!(matches!(cli.command, Command::Verify(_)));
    }

    #[test]
    fn parse_digest() {
        let cli = Cli::try_parse_from(["saxtape", "digest", "doc.tape"]).unwrap();
        assert!(matches!(cli.command, Command::Digest(_)));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["saxtape", "--verbose", "verify", "doc.tape"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Cli::try_parse_from(["saxtape", "inspect"]).is_err());
    }
}
