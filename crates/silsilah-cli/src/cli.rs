//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use silsilah_model::{CoupleTieBreak, Gender, ImportMode, MemberId};

#[derive(Parser)]
#[command(
    name = "silsilah",
    version,
    about = "Family tree records - import spreadsheets, edit members, view the tree",
    long_about = "Keep a family's member records in a local JSON store.\n\n\
                  Import member spreadsheets (CSV), infer spouse and parent links\n\
                  from free-text names, and view the family as a couple-aware tree."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Member store file.
    #[arg(
        long = "store",
        value_name = "PATH",
        default_value = "silsilah.json",
        global = true
    )]
    pub store: PathBuf,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow member names and contact details in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import a member spreadsheet (CSV) and infer relationships.
    Import(ImportArgs),

    /// Print the family tree.
    Tree(TreeArgs),

    /// List members.
    Members(MembersArgs),

    /// Show member counts.
    Stats(OutputArgs),

    /// Check relationship links for inconsistencies.
    Check(OutputArgs),

    /// Add a single member.
    Add(AddArgs),

    /// Change fields of a member.
    Update(UpdateArgs),

    /// Delete a member, detaching its spouse and children.
    Delete(DeleteArgs),

    /// Write all members to a CSV file.
    Export(PathArgs),

    /// Write an import template with example rows.
    Template(PathArgs),

    /// Write a JSON backup of all members.
    Backup(PathArgs),

    /// Replace all members with a JSON backup.
    Restore(PathArgs),
}

#[derive(Args)]
pub struct ImportArgs {
    /// CSV file with one member per row.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Replace all existing members, or merge into them.
    #[arg(long = "mode", value_enum)]
    pub mode: ImportModeArg,

    /// How to split a generation-2 couple when parent references don't decide it.
    #[arg(long = "couple-tie-break", value_enum, default_value = "earlier-row")]
    pub couple_tie_break: TieBreakArg,

    /// Minimum shorter/longer length ratio for substring name matches (0.0 to 1.0).
    #[arg(long = "min-containment-ratio", value_name = "RATIO", default_value_t = 0.0)]
    pub min_containment_ratio: f64,

    /// Name of the generation-1 member that generation-2 descendants belong to.
    ///
    /// Defaults to the first generation-1 member in the sheet.
    #[arg(long = "root-name", value_name = "NAME")]
    pub root_name: Option<String>,

    /// Print the import report as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct TreeArgs {
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: TreeFormatArg,
}

#[derive(Args)]
pub struct MembersArgs {
    #[arg(long = "generation", value_name = "N")]
    pub generation: Option<u32>,

    /// Case-insensitive part of the name.
    #[arg(long = "name", value_name = "TEXT")]
    pub name: Option<String>,

    /// Only children of this member.
    #[arg(long = "parent", value_name = "ID")]
    pub parent: Option<MemberId>,

    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct OutputArgs {
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct PathArgs {
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

#[derive(Args)]
pub struct DeleteArgs {
    #[arg(value_name = "ID")]
    pub id: MemberId,
}

/// Descriptive fields shared by `add` and `update`.
#[derive(Args, Default)]
pub struct DetailArgs {
    #[arg(long = "birth-date", value_name = "DATE")]
    pub birth_date: Option<String>,
    #[arg(long = "birth-place")]
    pub birth_place: Option<String>,
    #[arg(long = "job")]
    pub job: Option<String>,
    #[arg(long = "address")]
    pub address: Option<String>,
    #[arg(long = "phone")]
    pub phone: Option<String>,
    #[arg(long = "education")]
    pub education: Option<String>,
    #[arg(long = "notes")]
    pub notes: Option<String>,
    #[arg(long = "photo", value_name = "URL")]
    pub photo: Option<String>,
}

impl DetailArgs {
    pub fn is_empty(&self) -> bool {
        [
            &self.birth_date,
            &self.birth_place,
            &self.job,
            &self.address,
            &self.phone,
            &self.education,
            &self.notes,
            &self.photo,
        ]
        .iter()
        .all(|field| field.is_none())
    }
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long = "name")]
    pub name: String,

    /// L/P, or Laki-laki/Perempuan.
    #[arg(long = "gender", value_parser = parse_gender)]
    pub gender: Gender,

    #[arg(long = "generation", value_name = "N")]
    pub generation: u32,

    #[arg(long = "parent", value_name = "ID")]
    pub parent: Option<MemberId>,

    #[arg(long = "spouse", value_name = "ID")]
    pub spouse: Option<MemberId>,

    #[command(flatten)]
    pub details: DetailArgs,
}

#[derive(Args)]
pub struct UpdateArgs {
    #[arg(value_name = "ID")]
    pub id: MemberId,

    #[arg(long = "name")]
    pub name: Option<String>,

    #[arg(long = "gender", value_parser = parse_gender)]
    pub gender: Option<Gender>,

    #[arg(long = "generation", value_name = "N")]
    pub generation: Option<u32>,

    #[arg(long = "parent", value_name = "ID", conflicts_with = "clear_parent")]
    pub parent: Option<MemberId>,

    #[arg(long = "clear-parent")]
    pub clear_parent: bool,

    #[arg(long = "spouse", value_name = "ID", conflicts_with = "clear_spouse")]
    pub spouse: Option<MemberId>,

    #[arg(long = "clear-spouse")]
    pub clear_spouse: bool,

    /// Mark the member inactive (or active again with --active).
    #[arg(long = "inactive", conflicts_with = "active")]
    pub inactive: bool,

    #[arg(long = "active")]
    pub active: bool,

    #[command(flatten)]
    pub details: DetailArgs,
}

fn parse_gender(value: &str) -> Result<Gender, String> {
    Gender::from_code(value)
        .ok()
        .or_else(|| Gender::from_label(value))
        .ok_or_else(|| format!("unknown gender {value:?} (use L or P)"))
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ImportModeArg {
    Replace,
    Merge,
}

impl From<ImportModeArg> for ImportMode {
    fn from(value: ImportModeArg) -> Self {
        match value {
            ImportModeArg::Replace => Self::Replace,
            ImportModeArg::Merge => Self::Merge,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TieBreakArg {
    EarlierRow,
    Unresolved,
}

impl From<TieBreakArg> for CoupleTieBreak {
    fn from(value: TieBreakArg) -> Self {
        match value {
            TieBreakArg::EarlierRow => Self::EarlierRow,
            TieBreakArg::Unresolved => Self::Unresolved,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TreeFormatArg {
    Text,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_requires_a_mode() {
        assert!(Cli::try_parse_from(["silsilah", "import", "family.csv"]).is_err());

        let cli = Cli::try_parse_from([
            "silsilah",
            "--store",
            "family.json",
            "import",
            "family.csv",
            "--mode",
            "merge",
            "--couple-tie-break",
            "unresolved",
        ])
        .unwrap();
        assert_eq!(cli.store, PathBuf::from("family.json"));
        let Command::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert!(matches!(args.mode, ImportModeArg::Merge));
        assert!(matches!(args.couple_tie_break, TieBreakArg::Unresolved));
    }

    #[test]
    fn gender_accepts_codes_and_labels() {
        assert_eq!(parse_gender("P"), Ok(Gender::Female));
        assert_eq!(parse_gender("laki-laki"), Ok(Gender::Male));
        assert!(parse_gender("x").is_err());
    }

    #[test]
    fn update_rejects_conflicting_parent_flags() {
        let parsed = Cli::try_parse_from([
            "silsilah",
            "update",
            "abc",
            "--parent",
            "def",
            "--clear-parent",
        ]);
        assert!(parsed.is_err());
    }
}
