use std::fmt::Write as _;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::{error, info, Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;
use ymdl::config::{DEFAULT_COVER_ID3_SIZE, DEFAULT_COVER_SIZE, DEFAULT_VOLUME_PREFIX};
use ymdl::{naming, DownloadConfig, Endpoints, Ymdl};

/// Exit code after Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "ymdl", version, disable_version_flag = true)]
#[command(about = "Yandex.Music downloader", long_about = None)]
#[command(after_long_help = naming::HELP)]
struct Cli {
    /// Track, album, artist or playlist URLs
    urls: Vec<String>,

    /// Don't show progress and info messages
    #[arg(short, long)]
    quiet: bool,

    /// File with URLs, one per line ("-" for stdin)
    #[arg(short, long = "batch_file", alias = "batch-file")]
    batch_file: Option<String>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Track name format (see --help)
    #[arg(short, long = "track_name", alias = "track-name")]
    track_name: Option<String>,

    /// Album directory name format (see --help)
    #[arg(short, long = "album_name", alias = "album-name")]
    album_name: Option<String>,

    /// Prefix of album volume directories
    #[arg(short = 'V', long = "volume_prefix", alias = "volume-prefix", default_value = DEFAULT_VOLUME_PREFIX)]
    volume_prefix: String,

    /// Cover size saved to the album directory, 0 to disable
    #[arg(short = 'c', long = "cover", default_value_t = DEFAULT_COVER_SIZE, allow_negative_numbers = true)]
    cover_size: i64,

    /// Cover size embedded into tags, 0 to disable
    #[arg(short = 'C', long = "cover_id3", alias = "cover-id3", default_value_t = DEFAULT_COVER_ID3_SIZE, allow_negative_numbers = true)]
    cover_id3_size: i64,

    /// Download albums the artist only appears on instead of their own
    #[arg(long)]
    also: bool,

    /// Write the genre tag
    #[arg(long)]
    genre: bool,

    /// Write play.m3u8 next to downloaded tracks
    #[arg(long)]
    m3u: bool,

    /// Don't check free disk space before downloading
    #[arg(long = "no-space-check")]
    no_space_check: bool,

    /// Print version
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: Option<bool>,
}

impl Cli {
    fn download_config(&self) -> DownloadConfig {
        DownloadConfig {
            output_dir: self.out.clone(),
            quiet: self.quiet,
            track_name: self.track_name.clone(),
            album_name: self.album_name.clone(),
            volume_prefix: self.volume_prefix.clone(),
            cover_size: self.cover_size,
            cover_id3_size: self.cover_id3_size,
            also: self.also,
            genre: self.genre,
            m3u: self.m3u,
            check_disk_space: !self.no_space_check,
        }
    }
}

/// Formats events as `LEVEL: message`.
struct LevelPrefix;

impl<S, N> FormatEvent<S, N> for LevelPrefix
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        write!(writer, "{}: ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn init_logging(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(LevelPrefix)
        .with_writer(io::stderr)
        .init();
}

/// Non-empty, trimmed lines of a batch file.
fn parse_batch(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn read_batch(source: &str) -> io::Result<Vec<String>> {
    let text = if source == "-" {
        io::read_to_string(io::stdin())?
    } else {
        std::fs::read_to_string(source)?
    };
    Ok(parse_batch(&text))
}

/// Download every URL in turn; returns how many failed.
async fn run(ymdl: &Ymdl, urls: &[String]) -> usize {
    let mut failed = 0;
    for url in urls {
        match ymdl.download_url(url).await {
            Ok(report) => {
                if !report.all_successful() {
                    info!(
                        "{}: {} of {} tracks failed",
                        url,
                        report.failed.len(),
                        report.total()
                    );
                }
            }
            Err(e) => {
                error!("{}: {}", url, e);
                failed += 1;
            }
        }
    }
    failed
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let mut urls = cli.urls.clone();
    if let Some(batch) = &cli.batch_file {
        match read_batch(batch) {
            Ok(more) => urls.extend(more),
            Err(e) => {
                error!("Can't read batch file {}: {}", batch, e);
                return ExitCode::FAILURE;
            }
        }
    }
    if urls.is_empty() {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "You must provide at least one URL.",
            )
            .exit();
    }

    let ymdl = match Ymdl::new(cli.download_config(), Endpoints::default()) {
        Ok(ymdl) => ymdl,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    tokio::select! {
        failed = run(&ymdl, &urls) => {
            if failed == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        _ = tokio::signal::ctrl_c() => {
            error!("Interrupted, partial downloads are kept for resume");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch() {
        let urls = parse_batch("  https://a\n\n\thttps://b  \r\n   \n");
        assert_eq!(urls, vec!["https://a", "https://b"]);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "ymdl",
            "-q",
            "-o",
            "music",
            "-c",
            "0",
            "-C",
            "-1",
            "--m3u",
            "--no-space-check",
            "https://music.yandex.ru/album/1",
        ]);
        let config = cli.download_config();
        assert!(config.quiet);
        assert!(config.m3u);
        assert!(!config.check_disk_space);
        assert_eq!(config.cover_size, 0);
        assert_eq!(config.cover_id3_size, -1);
        assert_eq!(config.output_dir, PathBuf::from("music"));
        assert_eq!(cli.urls.len(), 1);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["ymdl", "--track_name", "%t", "https://x"]);
        let config = cli.download_config();
        assert_eq!(config.volume_prefix, "CD");
        assert_eq!(config.cover_size, 700);
        assert_eq!(config.cover_id3_size, 300);
        assert_eq!(config.track_name.as_deref(), Some("%t"));
        assert!(config.check_disk_space);
    }

    #[test]
    fn test_version_flag() {
        for flag in ["-v", "--version"] {
            let err = Cli::try_parse_from(["ymdl", flag]).err().unwrap();
            assert_eq!(err.kind(), ErrorKind::DisplayVersion);
        }
        assert_eq!(Cli::command().get_version(), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
