//! vyr - VYTR archiver
//!
//! Thin command-line front end over the `vyr` library: reads files from disk,
//! decides member names, and writes archives or extracted files back out.

use anyhow::{bail, Context};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;
use tempfile::NamedTempFile;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::EnvFilter;
use vyr::{decode, encode_to, ArchiveReader, Entry, Registry};

/// Environment variable holding a tracing filter, overriding `--log-level`
const LOG_ENV: &str = "VYR_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "vyr",
    about = "vyr - vyt archiver",
    version,
    arg_required_else_help = true
)]
struct Cli {
    /// Set the logging level
    #[arg(short, long, value_enum, global = true, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack files into a new archive
    Pack {
        /// Archive to create
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Files to add, optionally renamed inside the archive
        #[arg(value_name = "FILEPATH[=ARCNAME]")]
        members: Vec<String>,
    },

    /// Extract every entry of an archive
    Unpack {
        /// Archive to read
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Directory to extract into
        #[arg(short = 'C', long, default_value = ".")]
        directory: PathBuf,
    },

    /// Remove entries from an archive in place
    Delete {
        /// Archive to modify
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Member names to remove
        #[arg(value_name = "ARCNAME")]
        names: Vec<String>,
    },

    /// List entries without reading their content
    List {
        /// Archive to read
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Extract a single entry
    Extract {
        /// Archive to read
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Member name to extract
        #[arg(value_name = "ARCNAME")]
        name: String,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// One `FILEPATH[=ARCNAME]` argument
#[derive(Debug, PartialEq, Eq)]
struct MemberSpec {
    path: PathBuf,
    name: String,
}

impl MemberSpec {
    /// Split on the first `=`; without one the path doubles as the name
    fn parse(item: &str) -> Self {
        match item.split_once('=') {
            Some((path, name)) => Self {
                path: PathBuf::from(path),
                name: name.to_string(),
            },
            None => Self {
                path: PathBuf::from(item),
                name: normalize_name(item),
            },
        }
    }
}

/// Normalize path separators to forward slashes
fn normalize_name(path: &str) -> String {
    path.replace('\\', "/")
}

#[derive(Debug, Serialize)]
struct ListedEntry {
    name: String,
    size: u32,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Nothing left to report to if stderr itself fails
            err.print().ok();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    init_tracing(cli.log_level);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level.into()).into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Pack { output, members } => pack(&output, &members),
        Commands::Unpack { input, directory } => unpack(&input, &directory),
        Commands::Delete { input, names } => delete(&input, &names),
        Commands::List { input, json } => list(&input, json),
        Commands::Extract {
            input,
            name,
            output,
        } => extract(&input, &name, output.as_deref()),
    }
}

fn pack(output: &Path, members: &[String]) -> anyhow::Result<()> {
    let mut registry = Registry::create()?;

    for item in members {
        let member = MemberSpec::parse(item);
        println!("{}: {}", member.name, member.path.display());

        let data = fs::read(&member.path)
            .with_context(|| format!("failed to load file: {}", member.path.display()))?;
        let entry = Entry::new(member.name.into_bytes(), data)
            .with_context(|| format!("cannot archive {}", member.path.display()))?;
        registry.add(entry)?;
    }

    let written = write_archive(output, &registry)?;
    info!(entries = registry.len(), bytes = written, "pack done");
    Ok(())
}

fn unpack(input: &Path, directory: &Path) -> anyhow::Result<()> {
    let registry = load_archive(input)?;

    // Validate every destination before touching the filesystem
    let targets = registry
        .iter()
        .map(|entry| Ok((member_path(directory, entry)?, entry)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    for (path, entry) in targets {
        println!("{}", String::from_utf8_lossy(entry.name()));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        fs::write(&path, entry.content())
            .with_context(|| format!("failed to open output stream: {}", path.display()))?;
    }

    info!(entries = registry.len(), "unpack done");
    Ok(())
}

fn delete(input: &Path, names: &[String]) -> anyhow::Result<()> {
    let mut registry = load_archive(input)?;

    for name in names {
        match registry.remove(name) {
            Some(_) => println!("deleted: {}", name),
            None => warn!(name = %name, "not in archive"),
        }
    }

    let written = write_archive(input, &registry)?;
    info!(entries = registry.len(), bytes = written, "delete done");
    Ok(())
}

fn list(input: &Path, json: bool) -> anyhow::Result<()> {
    let mut reader = open_reader(input)?;
    let entries: Vec<ListedEntry> = reader
        .list_entries()
        .with_context(|| format!("failed to parse archive: {}", input.display()))?
        .into_iter()
        .map(|(name, size)| ListedEntry {
            name: String::from_utf8_lossy(&name).into_owned(),
            size,
        })
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &entries)?;
        writeln!(out)?;
    } else {
        for entry in &entries {
            writeln!(out, "{:>10}  {}", entry.size, entry.name)?;
        }
    }
    Ok(())
}

fn extract(input: &Path, name: &str, output: Option<&Path>) -> anyhow::Result<()> {
    let mut reader = open_reader(input)?;
    let entry = reader
        .read_entry(name)
        .with_context(|| format!("failed to extract from {}", input.display()))?;
    debug!(name, size = entry.size(), "extracted entry");

    match output {
        Some(path) => fs::write(path, entry.content())
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            out.write_all(entry.content())?;
            out.flush()?;
        }
    }
    Ok(())
}

// Unbuffered: lookups seek past every skipped record, which would discard a
// `BufReader`'s buffer each time
fn open_reader(input: &Path) -> anyhow::Result<ArchiveReader<File>> {
    let file =
        File::open(input).with_context(|| format!("failed to load file: {}", input.display()))?;
    Ok(ArchiveReader::new(file))
}

fn load_archive(input: &Path) -> anyhow::Result<Registry> {
    let bytes =
        fs::read(input).with_context(|| format!("failed to load file: {}", input.display()))?;
    decode(&bytes).with_context(|| format!("failed to parse archive: {}", input.display()))
}

/// Encode into a temp file beside `output`, then move it into place
fn write_archive(output: &Path, registry: &Registry) -> anyhow::Result<u64> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = temp_archive(dir, output)?;
    let mut writer = BufWriter::new(temp);
    let written = encode_to(registry, &mut writer)?;
    writer.flush()?;

    let temp = writer.into_inner().map_err(|e| e.into_error())?;
    temp.persist(output)
        .with_context(|| format!("failed to write archive: {}", output.display()))?;
    Ok(written)
}

/// Temp file in `dir` carrying the mode `output` has (or would get, if new)
fn temp_archive(dir: &Path, output: &Path) -> anyhow::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    // Umask still applies, as for a plain create
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let temp = builder
        .tempfile_in(dir)
        .with_context(|| format!("failed to open output file in {}", dir.display()))?;

    match fs::metadata(output) {
        Ok(existing) => temp
            .as_file()
            .set_permissions(existing.permissions())
            .with_context(|| format!("failed to copy permissions of {}", output.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to stat {}", output.display()))
        }
    }
    Ok(temp)
}

/// Destination for `entry` under `root`, refusing names that escape it
fn member_path(root: &Path, entry: &Entry) -> anyhow::Result<PathBuf> {
    let Some(name) = entry.name_str() else {
        bail!(
            "entry name is not valid UTF-8: {}",
            String::from_utf8_lossy(entry.name())
        );
    };

    let relative = Path::new(name);
    let mut has_file = false;
    for component in relative.components() {
        match component {
            Component::Normal(_) => has_file = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                bail!("refusing to extract outside the target directory: {}", name)
            }
        }
    }
    if !has_file {
        bail!("entry has no usable file name: {:?}", name);
    }

    Ok(root.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_spec_parse() {
        assert_eq!(
            MemberSpec::parse("src/main.c=main.c"),
            MemberSpec {
                path: PathBuf::from("src/main.c"),
                name: "main.c".to_string(),
            }
        );
        assert_eq!(
            MemberSpec::parse("docs\\readme.md"),
            MemberSpec {
                path: PathBuf::from("docs\\readme.md"),
                name: "docs/readme.md".to_string(),
            }
        );
        // Only the first '=' splits
        assert_eq!(MemberSpec::parse("a=b=c").name, "b=c");
    }

    #[test]
    fn test_member_path_accepts_nested() {
        let entry = Entry::new("dir/sub/file.txt", b"x".to_vec()).unwrap();
        let path = member_path(Path::new("out"), &entry).unwrap();
        assert_eq!(path, Path::new("out/dir/sub/file.txt"));
    }

    #[test]
    fn test_member_path_rejects_traversal() {
        for name in ["../../etc/passwd", "/etc/passwd", "a/../../b", "", "."] {
            let entry = Entry::new(name, Vec::new()).unwrap();
            assert!(
                member_path(Path::new("out"), &entry).is_err(),
                "accepted {:?}",
                name
            );
        }
    }

    #[test]
    fn test_member_path_rejects_non_utf8() {
        let entry = Entry::new(vec![0xFFu8, 0xFE], Vec::new()).unwrap();
        assert!(member_path(Path::new("out"), &entry).is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["vyr", "pack", "out.vyr", "a.txt", "b.txt=c.txt"]).unwrap();
        match cli.command {
            Commands::Pack { output, members } => {
                assert_eq!(output, PathBuf::from("out.vyr"));
                assert_eq!(members, vec!["a.txt", "b.txt=c.txt"]);
            }
            other => panic!("Expected Pack, got: {:?}", other),
        }
    }
}
