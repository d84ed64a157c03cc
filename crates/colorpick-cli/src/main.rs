//! The `colorpick` command-line tool.
//!
//! It reads a color corpus, groups the colors into clusters, chooses one
//! color per cluster, prints the chosen colors, and optionally writes them
//! to a palette file.

mod cli;
mod env;
mod logger;
mod report;

use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use colorpick::pipeline::{format_palette, run};
use colorpick::Corpus;

use cli::CommandLineArguments;
use env::{use_color, Env};

/// An error with the offending path as context.
#[derive(Debug)]
struct PathError {
    action: &'static str,
    path: PathBuf,
    source: Box<dyn Error + Send + Sync>,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not {} {}", self.action, self.path.display())
    }
}

impl Error for PathError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.source)
    }
}

fn read_corpus(path: &Path) -> Result<Corpus, Box<dyn Error + Send + Sync>> {
    let file = File::open(path)?;
    Ok(Corpus::from_reader(BufReader::new(file))?)
}

fn execute(args: &CommandLineArguments) -> Result<(), Box<dyn Error>> {
    let options = args.options()?;

    let corpus = read_corpus(&args.color_corpus).map_err(|source| PathError {
        action: "read color corpus",
        path: args.color_corpus.clone(),
        source,
    })?;
    log::info!(
        "loaded {} colors from corpus {}",
        corpus.len(),
        args.color_corpus_name
    );

    let outcome = run(&corpus, &options, &options.kmeans())?;

    let mut stdout = std::io::stdout().lock();
    report::write_settings(&mut stdout, args, &options)?;
    report::write_table(&mut stdout, outcome.exemplars(), use_color(&Env::default()))?;
    stdout.flush()?;

    if let Some(path) = &args.output_color_palette {
        std::fs::write(path, format_palette(outcome.exemplars())).map_err(|err| PathError {
            action: "write color palette",
            path: path.clone(),
            source: err.into(),
        })?;
        log::info!("wrote {} colors to {}", outcome.exemplars().len(), path.display());
    }

    Ok(())
}

fn write_error<W: Write>(out: &mut W, error: &dyn Error) -> std::io::Result<()> {
    writeln!(out, "error: {}", error)?;

    let mut source = error.source();
    while let Some(cause) = source {
        writeln!(out, "    caused by: {}", cause)?;
        source = cause.source();
    }
    Ok(())
}

fn report_error(error: &dyn Error) {
    // Nothing left to do if stderr fails, too.
    let _ = write_error(&mut std::io::stderr().lock(), error);
}

fn main() -> ExitCode {
    let args = CommandLineArguments::parse();
    if let Err(err) = logger::init(args.volume()) {
        report_error(&err);
    }

    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&*err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod test {
    use super::{execute, write_error};
    use crate::cli::CommandLineArguments;
    use clap::Parser;
    use std::error::Error;
    use tempfile::tempdir;

    #[test]
    fn test_execute() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let corpus = dir.path().join("colors.txt");
        let palette = dir.path().join("palette.txt");
        std::fs::write(
            &corpus,
            "white: \"#FFFFFF\"\n// primaries\nred: \"#ff0000\"\n000000\n",
        )?;

        let args = CommandLineArguments::try_parse_from([
            "colorpick",
            "-i",
            corpus.to_str().ok_or("corpus path should be UTF-8")?,
            "-n",
            "3",
            "-o",
            palette.to_str().ok_or("palette path should be UTF-8")?,
        ])?;
        execute(&args)?;

        assert_eq!(
            std::fs::read_to_string(&palette)?,
            "000000: \"#000000\"\nred: \"#ff0000\"\nwhite: \"#ffffff\"\n"
        );
        Ok(())
    }

    #[test]
    fn test_missing_corpus() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let corpus = dir.path().join("missing.txt");
        let args = CommandLineArguments::try_parse_from([
            "colorpick",
            "-i",
            corpus.to_str().ok_or("corpus path should be UTF-8")?,
        ])?;

        let Err(error) = execute(&args) else {
            panic!("reading a missing corpus should fail");
        };

        let mut buffer = Vec::new();
        write_error(&mut buffer, &*error)?;
        let text = String::from_utf8(buffer)?;
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("error: could not read color corpus"));
        assert!(lines[0].ends_with("missing.txt"));
        assert!(lines[1].starts_with("    caused by: "));
        Ok(())
    }

    #[test]
    fn test_malformed_corpus() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let corpus = dir.path().join("colors.txt");
        std::fs::write(&corpus, "red: \"#ff0000\"\nblue: \"#00f\"\n")?;
        let args = CommandLineArguments::try_parse_from([
            "colorpick",
            "-i",
            corpus.to_str().ok_or("corpus path should be UTF-8")?,
        ])?;

        let Err(error) = execute(&args) else {
            panic!("reading a malformed corpus should fail");
        };

        let mut buffer = Vec::new();
        write_error(&mut buffer, &*error)?;
        let text = String::from_utf8(buffer)?;
        assert!(text.contains("caused by: line 2"), "error chain should name the line: {}", text);
        Ok(())
    }
}
