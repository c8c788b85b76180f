//! `skiff render` command implementation.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use skiff_config::{CliSettings, Config};
use skiff_markdown::Converter;

use crate::error::CliError;
use crate::output::Output;

/// Path that stands for standard input.
const STDIN_PATH: &str = "-";

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to the post body, or `-` to read from stdin.
    input: PathBuf,

    /// Path to the post lead (excerpt), rendered before the body.
    #[arg(short, long)]
    lead: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover skiff.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Nesting limit for lists and blockquotes (overrides config).
    #[arg(long)]
    max_depth: Option<usize>,

    /// Largest accepted input in bytes, lead and body together (overrides config).
    #[arg(long)]
    max_input_bytes: Option<usize>,

    /// Write HTML to stdout even when an output directory is configured.
    #[arg(long, conflicts_with = "output_dir")]
    stdout: bool,

    /// Enable verbose output (debug logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            output_dir: self.output_dir.clone(),
            max_depth: self.max_depth,
            max_input_bytes: self.max_input_bytes,
        }
    }

    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, an input cannot be read or is
    /// too large, or the output cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        if let Some(path) = &config.config_path {
            tracing::debug!(path = %path.display(), "Loaded configuration");
        }

        let limit = config.render.max_input_bytes;
        let lead = match &self.lead {
            Some(path) => read_source(path, limit)?,
            None => String::new(),
        };
        let body = read_source(&self.input, limit - lead.len())?;

        let html = Converter::new()
            .with_max_depth(config.render.max_depth)
            .render_post(&lead, &body);
        tracing::info!(
            input = %self.input.display(),
            input_bytes = lead.len() + body.len(),
            output_bytes = html.len(),
            "Rendered post"
        );

        let target = if self.stdout {
            None
        } else if is_stdin(&self.input) {
            if config.output_resolved.dir.is_some() {
                output.warning("Reading from stdin, writing HTML to stdout");
            }
            None
        } else {
            config.output_resolved.target_for(&self.input)
        };

        write_html(target.as_deref(), &html)?;
        if let Some(path) = &target {
            output.success(&format!(
                "Rendered {} -> {}",
                self.input.display(),
                path.display()
            ));
        }

        Ok(())
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_PATH
}

/// Read a UTF-8 source file (or stdin) of at most `limit` bytes.
fn read_source(path: &Path, limit: usize) -> Result<String, CliError> {
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    if is_stdin(path) {
        std::io::stdin().lock().take(cap).read_to_end(&mut bytes)?;
    } else {
        File::open(path)?.take(cap).read_to_end(&mut bytes)?;
    }

    if bytes.len() > limit {
        return Err(CliError::Validation(format!(
            "{} exceeds the input limit of {limit} bytes",
            path.display()
        )));
    }

    String::from_utf8(bytes)
        .map_err(|_| CliError::Validation(format!("{} is not valid UTF-8", path.display())))
}

/// Write `html` to `target`, creating parent directories, or to stdout.
fn write_html(target: Option<&Path>, html: &str) -> Result<(), CliError> {
    match target {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, html)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: RenderArgs,
    }

    fn parse(argv: &[&str]) -> RenderArgs {
        TestCli::try_parse_from(std::iter::once("skiff").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_cli_settings_from_flags() {
        let args = parse(&["post.md", "--max-depth", "4", "--max-input-bytes", "2048"]);
        let settings = args.cli_settings();

        assert_eq!(settings.output_dir, None);
        assert_eq!(settings.max_depth, Some(4));
        assert_eq!(settings.max_input_bytes, Some(2048));
    }

    #[test]
    fn test_max_input_bytes_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("skiff.toml");
        std::fs::write(&config_path, "[render]\nmax_input_bytes = 1024\n").unwrap();
        let post = dir.path().join("post.md");
        std::fs::write(&post, "0123456789").unwrap();

        let args = parse(&[
            post.to_str().unwrap(),
            "--config",
            config_path.to_str().unwrap(),
            "--max-input-bytes",
            "4",
            "--stdout",
        ]);
        let err = args.execute().unwrap_err();

        assert!(matches!(err, CliError::Validation(_)));
        assert!(err.to_string().contains("input limit of 4 bytes"));
    }

    #[test]
    fn test_is_stdin() {
        assert!(is_stdin(Path::new("-")));
        assert!(!is_stdin(Path::new("post.md")));
        assert!(!is_stdin(Path::new("./-")));
    }

    #[test]
    fn test_read_source_within_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.md");
        std::fs::write(&path, "Hello *world*\n").unwrap();

        assert_eq!(read_source(&path, 14).unwrap(), "Hello *world*\n");
    }

    #[test]
    fn test_read_source_over_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.md");
        std::fs::write(&path, "0123456789").unwrap();

        let err = read_source(&path, 9).unwrap_err();

        assert!(matches!(err, CliError::Validation(_)));
        assert!(err.to_string().contains("input limit of 9 bytes"));
    }

    #[test]
    fn test_read_source_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.md");
        std::fs::write(&path, [0x66, 0xff, 0x6f]).unwrap();

        let err = read_source(&path, 100).unwrap_err();

        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn test_read_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(&dir.path().join("missing.md"), 100).unwrap_err();

        assert!(matches!(err, CliError::Io(_)));
    }

    #[test]
    fn test_write_html_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public/posts/hello.html");

        write_html(Some(path.as_path()), "<p>Hello</p>\n\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>Hello</p>\n\n");
    }
}
