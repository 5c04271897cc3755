//! Command line argument definitions.

use std::path::PathBuf;

use brand_yml::BrandConfig;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "brand",
    version,
    about = "Validate, resolve and locate brand.yml files",
    long_about = "Validate, resolve and locate brand.yml files.\n\n\
                  Without a path, commands search the current directory and its \
                  parents for _brand.yml, then brand.yml."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check brand files against the schema and resolve every reference.
    Validate(ValidateArgs),

    /// Print the fully resolved brand.
    Resolve(ResolveArgs),

    /// Print the path of the brand file that applies to a directory.
    Find(FindArgs),

    /// Print stylesheet import URLs for hosted fonts.
    Fonts(FontsArgs),
}

/// Options shared by every command that builds a brand.
#[derive(Debug, Clone, Default, Args)]
pub struct LoadArgs {
    /// Treat unknown sections as errors instead of warnings.
    #[arg(long)]
    pub strict: bool,

    /// Directory that bounds discovery and local file references.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

impl LoadArgs {
    pub fn brand_config(&self) -> BrandConfig {
        let mut config = BrandConfig::new();
        if self.strict {
            config = config.strict();
        }
        if let Some(root) = &self.root {
            config = config.root(root);
        }
        config
    }
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Brand files to check. Defaults to the discovered brand file.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub load: LoadArgs,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Brand file, or directory to search from.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "yaml")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub load: LoadArgs,
}

#[derive(Debug, Args)]
pub struct FindArgs {
    /// Directory to search from. Defaults to the current directory.
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Never search above this directory.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct FontsArgs {
    /// Brand file, or directory to search from.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    #[command(flatten)]
    pub load: LoadArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}
