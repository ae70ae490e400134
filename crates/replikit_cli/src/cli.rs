//! Argument parsing and interactive resolution of missing inputs.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use replikit_io_fs::EnumCopyTotalCountMode;
use replikit_log::{C_LOG_FILE_DEFAULT, C_LOG_LEVEL_DEFAULT, SpecLogOptions};

const C_PROMPT_SOURCE: &str = "Enter the source directory: ";
const C_PROMPT_DESTINATION: &str = "Enter the destination directory: ";
const C_PROMPT_EXCLUDE: &str =
    "Enter file extensions to exclude (comma-separated, e.g., 'exe,sys,tmp'): ";

/// Progress denominator policy as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnumArgCountMode {
    /// Skip hidden subdirectories while counting.
    Pruned,
    /// Count every file below the source.
    Unpruned,
}

impl From<EnumArgCountMode> for EnumCopyTotalCountMode {
    fn from(value: EnumArgCountMode) -> Self {
        match value {
            EnumArgCountMode::Pruned => Self::Pruned,
            EnumArgCountMode::Unpruned => Self::Unpruned,
        }
    }
}

/// Replicate a directory tree, skipping hidden entries and excluded file types.
#[derive(Debug, Parser)]
#[command(name = "replikit", version)]
pub struct Cli {
    /// Source directory. Prompted for when omitted.
    pub source: Option<PathBuf>,

    /// Destination directory. Prompted for when omitted.
    pub destination: Option<PathBuf>,

    /// Comma-separated file extensions to skip, e.g. `exe,sys,tmp`.
    #[arg(short = 'e', long = "exclude", value_name = "EXT", value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Log file receiving one record per file.
    #[arg(long, value_name = "PATH", default_value = C_LOG_FILE_DEFAULT)]
    pub log_file: PathBuf,

    /// Do not write a log file.
    #[arg(long)]
    pub no_log: bool,

    /// Log filter directive used when `RUST_LOG` is unset.
    #[arg(long, value_name = "LEVEL", default_value = C_LOG_LEVEL_DEFAULT)]
    pub log_level: String,

    /// How the progress total is computed.
    #[arg(long, value_enum, default_value_t = EnumArgCountMode::Pruned)]
    pub count_mode: EnumArgCountMode,

    /// Do not draw a progress bar.
    #[arg(long)]
    pub no_progress: bool,
}

/// Source and destination as given or prompted for.
#[derive(Debug, Clone)]
pub struct SpecRunPaths {
    pub path_dir_src: PathBuf,
    pub path_dir_dst: PathBuf,
    /// At least one path came from a prompt.
    pub if_prompted: bool,
}

/// Fully resolved inputs for one run.
#[derive(Debug, Clone)]
pub struct SpecRunConfig {
    pub path_dir_src: PathBuf,
    pub path_dir_dst: PathBuf,
    pub l_exclusions: Vec<String>,
    pub spec_log: Option<SpecLogOptions>,
    pub rule_total_count: EnumCopyTotalCountMode,
    pub if_progress: bool,
}

fn prompt_line<R, W>(reader: &mut R, writer: &mut W, prompt: &str) -> io::Result<String>
where
    R: BufRead,
    W: Write,
{
    write!(writer, "{prompt}")?;
    writer.flush()?;
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Split a raw comma-separated list; blanks are dropped.
pub fn split_exclusions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Cli {
    /// Fill in missing source/destination paths from `reader`.
    pub fn resolve_paths<R, W>(&self, reader: &mut R, writer: &mut W) -> io::Result<SpecRunPaths>
    where
        R: BufRead,
        W: Write,
    {
        let mut if_prompted = false;
        let path_dir_src = match &self.source {
            Some(v) => v.clone(),
            None => {
                if_prompted = true;
                PathBuf::from(prompt_line(reader, writer, C_PROMPT_SOURCE)?)
            }
        };
        let path_dir_dst = match &self.destination {
            Some(v) => v.clone(),
            None => {
                if_prompted = true;
                PathBuf::from(prompt_line(reader, writer, C_PROMPT_DESTINATION)?)
            }
        };
        Ok(SpecRunPaths {
            path_dir_src,
            path_dir_dst,
            if_prompted,
        })
    }

    /// Complete the run inputs; exclusions are prompted for only when a
    /// path was.
    pub fn resolve<R, W>(
        self,
        spec_paths: SpecRunPaths,
        reader: &mut R,
        writer: &mut W,
    ) -> io::Result<SpecRunConfig>
    where
        R: BufRead,
        W: Write,
    {
        let l_exclusions = match self.exclude {
            Some(l_raw) => l_raw
                .iter()
                .flat_map(|raw| split_exclusions(raw))
                .collect(),
            None if spec_paths.if_prompted => {
                split_exclusions(&prompt_line(reader, writer, C_PROMPT_EXCLUDE)?)
            }
            None => Vec::new(),
        };

        let spec_log = (!self.no_log).then(|| SpecLogOptions {
            path_log_file: self.log_file,
            level: self.log_level,
        });

        Ok(SpecRunConfig {
            path_dir_src: spec_paths.path_dir_src,
            path_dir_dst: spec_paths.path_dir_dst,
            l_exclusions,
            spec_log,
            rule_total_count: self.count_mode.into(),
            if_progress: !self.no_progress,
        })
    }
}
