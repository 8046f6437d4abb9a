use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::chapters::Language;

#[derive(Parser, Debug)]
#[command(
    name = "chapter-split",
    version,
    about = "Split converted documents into per-chapter fragments using their table of contents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inventory(InventoryArgs),
    Split(SplitArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long)]
    pub input_dir: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputMode {
    /// One fragment file per chapter.
    Combine,
    /// A single labelled document.
    Whole,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Combine => "combine",
            Self::Whole => "whole",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    #[arg(long)]
    pub input_dir: PathBuf,

    #[arg(long)]
    pub out_dir: PathBuf,

    #[arg(long, default_value_t = 24)]
    pub chapter_num: usize,

    #[arg(long, value_enum, default_value_t = Language::Ideograph)]
    pub language: Language,

    /// JSON object mapping chapter titles to whether they should be kept.
    #[arg(long)]
    pub chapters: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputMode::Combine)]
    pub output: OutputMode,

    /// JSON match profile overriding the built-in matching data.
    #[arg(long)]
    pub profile: Option<PathBuf>,

    #[arg(long, default_value_t = 20)]
    pub min_text_chars: usize,

    #[arg(long)]
    pub split_manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long)]
    pub out_dir: PathBuf,
}
