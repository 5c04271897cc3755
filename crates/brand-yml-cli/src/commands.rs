//! Command implementations. Each command writes its report to `out` and
//! returns whether it succeeded.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use brand_yml::{
    resolve_all, BatchOutcome, BrandLoader, CancellationToken, Discovery, Loaded,
};
use console::style;

use crate::cli::{
    Command, FindArgs, FontsArgs, LoadArgs, OutputFormat, ResolveArgs, ValidateArgs,
};

pub fn run(command: &Command, out: &mut dyn Write) -> Result<bool> {
    match command {
        Command::Validate(args) => run_validate(args, out),
        Command::Resolve(args) => run_resolve(args, out),
        Command::Find(args) => run_find(args, out),
        Command::Fonts(args) => run_fonts(args, out),
    }
}

pub fn run_validate(args: &ValidateArgs, out: &mut dyn Write) -> Result<bool> {
    let files = if args.files.is_empty() {
        vec![locate(None, args.load.root.as_deref())?]
    } else {
        args.files.clone()
    };

    let loader = BrandLoader::with_config(args.load.brand_config());
    let entries = resolve_all(&loader, &files, &CancellationToken::new());

    let mut failed = 0usize;
    for entry in &entries {
        let path = entry.path.display();
        match &entry.outcome {
            BatchOutcome::Loaded(loaded) => {
                let warnings = loaded.warnings.len();
                if warnings == 0 {
                    writeln!(out, "{} {}", style("ok").green().bold(), path)?;
                } else {
                    writeln!(
                        out,
                        "{} {} ({} warning{})",
                        style("ok").green().bold(),
                        path,
                        warnings,
                        if warnings == 1 { "" } else { "s" }
                    )?;
                }
            }
            BatchOutcome::Failed(error) => {
                failed += 1;
                writeln!(out, "{} {}", style("error").red().bold(), path)?;
                for line in error.to_string().lines() {
                    writeln!(out, "  {}", line.trim_start())?;
                }
            }
            BatchOutcome::Cancelled => {
                failed += 1;
                writeln!(out, "{} {}", style("skipped").yellow(), path)?;
            }
        }
    }

    tracing::info!(files = entries.len(), failed, "validation finished");
    Ok(failed == 0)
}

pub fn run_resolve(args: &ResolveArgs, out: &mut dyn Write) -> Result<bool> {
    let loaded = load(args.path.as_deref(), &args.load)?;
    let text = match args.format {
        OutputFormat::Yaml => loaded.brand.to_yaml_string()?,
        OutputFormat::Json => {
            let mut text = serde_json::to_string_pretty(&loaded.brand)
                .context("failed to render brand as JSON")?;
            text.push('\n');
            text
        }
    };
    out.write_all(text.as_bytes())?;
    Ok(true)
}

pub fn run_find(args: &FindArgs, out: &mut dyn Write) -> Result<bool> {
    let path = locate(args.dir.as_deref(), args.root.as_deref())?;
    writeln!(out, "{}", path.display())?;
    Ok(true)
}

pub fn run_fonts(args: &FontsArgs, out: &mut dyn Write) -> Result<bool> {
    let loaded = load(args.path.as_deref(), &args.load)?;
    let typography = loaded.brand.typography();
    for font in &typography.fonts {
        if let Some(url) = font.import_url() {
            writeln!(out, "{}", url)?;
        } else {
            tracing::debug!(family = %font.family, source = font.source.kind(), "no import URL");
        }
    }
    Ok(true)
}

/// Loads the brand at `path`, discovering it when `path` is a directory or
/// absent.
fn load(path: Option<&Path>, args: &LoadArgs) -> Result<Loaded> {
    let file = locate(path, args.root.as_deref())?;
    let loader = BrandLoader::with_config(args.brand_config());
    loader
        .load_file(&file)
        .with_context(|| format!("failed to load {}", file.display()))
}

/// A file path is used as is; a directory (or the current directory) is
/// searched upwards for a brand file.
fn locate(path: Option<&Path>, root: Option<&Path>) -> Result<PathBuf> {
    let start = match path {
        Some(path) if path.is_file() => return Ok(path.to_path_buf()),
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("failed to read the current directory")?,
    };
    let mut discovery = Discovery::new();
    if let Some(root) = root {
        discovery = discovery.root(root);
    }
    Ok(discovery.find(&start)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const BRAND: &str = r##"
meta:
  name: Acme
color:
  palette:
    blue: "#0085c3"
  primary: blue
typography:
  fonts:
    - family: Open Sans
      source: google
    - family: Menlo
      source: system
  base: Open Sans
"##;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_brand.yml"), BRAND).unwrap();
        fs::create_dir_all(dir.path().join("docs/guide")).unwrap();
        dir
    }

    fn output(result: Result<bool>, out: Vec<u8>) -> (bool, String) {
        (result.unwrap(), String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_validate_reports_each_file() {
        let dir = project();
        let bad = dir.path().join("bad.yml");
        fs::write(&bad, "color:\n  primary: nowhere\n").unwrap();

        let args = ValidateArgs {
            files: vec![dir.path().join("_brand.yml"), bad.clone()],
            load: LoadArgs::default(),
        };
        let mut out = Vec::new();
        let (ok, text) = output(run_validate(&args, &mut out), out);

        assert!(!ok);
        assert!(text.contains(&dir.path().join("_brand.yml").display().to_string()));
        assert!(text.contains("unresolved color reference 'nowhere'"), "{text}");
    }

    #[test]
    fn test_validate_counts_warnings() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("brand.yml");
        fs::write(&file, "meta:\n  name: Acme\nmotion: {}\n").unwrap();

        let args = ValidateArgs {
            files: vec![file],
            load: LoadArgs::default(),
        };
        let mut out = Vec::new();
        let (ok, text) = output(run_validate(&args, &mut out), out);
        assert!(ok);
        assert!(text.contains("(1 warning)"), "{text}");

        let args = ValidateArgs {
            load: LoadArgs {
                strict: true,
                root: None,
            },
            ..args
        };
        let mut out = Vec::new();
        let (ok, _) = output(run_validate(&args, &mut out), out);
        assert!(!ok);
    }

    #[test]
    fn test_resolve_json_from_directory() {
        let dir = project();
        let args = ResolveArgs {
            path: Some(dir.path().join("docs/guide")),
            format: OutputFormat::Json,
            load: LoadArgs::default(),
        };
        let mut out = Vec::new();
        let (ok, text) = output(run_resolve(&args, &mut out), out);
        assert!(ok);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["color"]["primary"], "#0085c3");
        assert_eq!(value["typography"]["headings"]["family"], "Open Sans");
    }

    #[test]
    fn test_resolve_yaml_loads_back() {
        let dir = project();
        let args = ResolveArgs {
            path: Some(dir.path().join("_brand.yml")),
            format: OutputFormat::Yaml,
            load: LoadArgs::default(),
        };
        let mut out = Vec::new();
        let (_, text) = output(run_resolve(&args, &mut out), out);

        let original = brand_yml::Brand::from_file(dir.path().join("_brand.yml")).unwrap();
        assert_eq!(brand_yml::Brand::from_yaml_str(&text).unwrap(), original);
    }

    #[test]
    fn test_find_prints_discovered_path() {
        let dir = project();
        let root = dir.path().canonicalize().unwrap();
        let args = FindArgs {
            dir: Some(root.join("docs/guide")),
            root: Some(root.clone()),
        };
        let mut out = Vec::new();
        let (_, text) = output(run_find(&args, &mut out), out);
        assert_eq!(text.trim_end(), root.join("_brand.yml").display().to_string());
    }

    #[test]
    fn test_find_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let args = FindArgs {
            dir: Some(root.clone()),
            root: Some(root),
        };
        assert!(run_find(&args, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_fonts_lists_hosted_families_only() {
        let dir = project();
        let args = FontsArgs {
            path: Some(dir.path().to_path_buf()),
            load: LoadArgs::default(),
        };
        let mut out = Vec::new();
        let (_, text) = output(run_fonts(&args, &mut out), out);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("https://fonts.googleapis.com/css2?family=Open+Sans"));
    }
}
