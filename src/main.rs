use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fcpx_autocut::captions::{add_captions_to_project, generate_project_from_srt};
use fcpx_autocut::gifs::GiphyClient;
use fcpx_autocut::srt::{SrtFile, TranscriptSegment};
use fcpx_autocut::{Config, RecutPipeline};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging, RUST_LOG overrides the default filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "fcpx_autocut=info,warn".into()),
        )
        .init();

    let matches = Command::new("FCPX Autocut")
        .version("0.1.0")
        .about("Silence-aware recutting and captioning for Final Cut Pro timelines")
        .subcommand_required(true)
        .subcommand(
            Command::new("recut")
                .about("Re-segment a project's spine along speech/silence boundaries")
                .arg(project_arg())
                .arg(
                    Arg::new("audio")
                        .short('a')
                        .long("audio")
                        .value_name("FILE")
                        .help("Audio file to analyze")
                        .required(true),
                )
                .arg(output_arg())
                .arg(
                    Arg::new("srt")
                        .short('s')
                        .long("srt")
                        .value_name("FILE")
                        .help("Also inject captions from this SRT file"),
                )
                .arg(
                    Arg::new("min-silence")
                        .long("min-silence")
                        .value_name("MS")
                        .help("Minimum silence length in milliseconds"),
                )
                .arg(
                    Arg::new("threshold")
                        .long("threshold")
                        .value_name("DB")
                        .help("Silence threshold in dB"),
                )
                .arg(
                    Arg::new("seek-step")
                        .long("seek-step")
                        .value_name("MS")
                        .help("Detection step size in milliseconds"),
                )
                .arg(
                    Arg::new("padding")
                        .long("padding")
                        .value_name("MS")
                        .help("Padding around detected speech in milliseconds"),
                )
                .arg(
                    Arg::new("max-gap")
                        .long("max-gap")
                        .value_name("SECONDS")
                        .help("Maximum gap between speech segments to merge"),
                ),
        )
        .subcommand(
            Command::new("caption")
                .about("Inject SRT subtitles into a project as titles")
                .arg(
                    Arg::new("srt")
                        .short('s')
                        .long("srt")
                        .value_name("FILE")
                        .help("SRT subtitle file")
                        .required(true),
                )
                .arg(project_arg())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate a standalone project from an SRT file")
                .arg(
                    Arg::new("srt")
                        .short('s')
                        .long("srt")
                        .value_name("FILE")
                        .help("SRT subtitle file")
                        .required(true),
                )
                .arg(output_arg())
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .value_name("NAME")
                        .help("Project name")
                        .default_value("autocut"),
                ),
        )
        .subcommand(
            Command::new("srt")
                .about("Format transcription segments (JSON) as an SRT file")
                .arg(
                    Arg::new("segments")
                        .short('t')
                        .long("segments")
                        .value_name("FILE")
                        .help("JSON file with [{start, end, text}] segments")
                        .required(true),
                )
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("gif-search")
                .about("Fetch GIF URLs from Giphy for a query")
                .arg(
                    Arg::new("query")
                        .short('q')
                        .long("query")
                        .value_name("TEXT")
                        .help("Search query")
                        .required(true),
                )
                .arg(
                    Arg::new("limit")
                        .short('l')
                        .long("limit")
                        .value_name("NUM")
                        .help("Number of results"),
                )
                .arg(
                    Arg::new("download-dir")
                        .short('d')
                        .long("download-dir")
                        .value_name("DIR")
                        .help("Download results into this directory"),
                ),
        )
        .get_matches();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    match matches.subcommand() {
        Some(("recut", sub)) => run_recut(config, sub).await,
        Some(("caption", sub)) => run_caption(sub).await,
        Some(("generate", sub)) => run_generate(sub).await,
        Some(("srt", sub)) => run_srt(sub).await,
        Some(("gif-search", sub)) => run_gif_search(config, sub).await,
        _ => unreachable!("subcommand is required"),
    }
}

fn project_arg() -> Arg {
    Arg::new("project")
        .short('p')
        .long("project")
        .value_name("FILE")
        .help("Input FCPXML project")
        .required(true)
}

fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .help("Output file")
        .required(true)
}

fn path_of(matches: &ArgMatches, id: &str) -> PathBuf {
    PathBuf::from(matches.get_one::<String>(id).expect("required arg"))
}

async fn run_recut(mut config: Config, matches: &ArgMatches) -> Result<()> {
    if let Some(ms) = matches.get_one::<String>("min-silence") {
        config.silence.min_silence_len_ms = ms.parse()?;
    }
    if let Some(db) = matches.get_one::<String>("threshold") {
        config.silence.silence_thresh_db = db.parse()?;
    }
    if let Some(ms) = matches.get_one::<String>("seek-step") {
        config.silence.seek_step_ms = ms.parse()?;
    }
    if let Some(ms) = matches.get_one::<String>("padding") {
        config.silence.padding_ms = ms.parse()?;
    }
    if let Some(gap) = matches.get_one::<String>("max-gap") {
        config.merge.max_gap_seconds = gap.parse()?;
    }

    let project = path_of(matches, "project");
    let audio = path_of(matches, "audio");
    let output = path_of(matches, "output");

    let pipeline = RecutPipeline::new(config);
    let report = match matches.get_one::<String>("srt") {
        Some(srt) => {
            pipeline
                .recut_and_caption(&project, &audio, &PathBuf::from(srt), &output)
                .await?
        }
        None => pipeline.recut(&project, &audio, &output).await?,
    };

    info!(
        "🎉 Done: {} clips written, {} segments dropped",
        report.clips_written, report.dropped_segments
    );
    Ok(())
}

async fn run_caption(matches: &ArgMatches) -> Result<()> {
    let injected = add_captions_to_project(
        &path_of(matches, "srt"),
        &path_of(matches, "project"),
        &path_of(matches, "output"),
    )
    .await?;
    info!("🎉 Done: {} captions injected", injected);
    Ok(())
}

async fn run_generate(matches: &ArgMatches) -> Result<()> {
    let name = matches.get_one::<String>("name").expect("has default");
    let clips = generate_project_from_srt(
        &path_of(matches, "srt"),
        &path_of(matches, "output"),
        name,
    )
    .await?;
    info!("🎉 Done: {} subtitle clips generated", clips);
    Ok(())
}

async fn run_srt(matches: &ArgMatches) -> Result<()> {
    let segments_path = path_of(matches, "segments");
    let json = tokio::fs::read_to_string(&segments_path).await?;
    let segments: Vec<TranscriptSegment> = serde_json::from_str(&json)?;

    let mut srt = SrtFile::from_segments(&segments);
    srt.sort_entries();
    srt.save_to_file(path_of(matches, "output")).await?;

    info!("🎉 Done: {} subtitles written", srt.len());
    Ok(())
}

async fn run_gif_search(config: Config, matches: &ArgMatches) -> Result<()> {
    let query = matches.get_one::<String>("query").expect("required arg");
    let limit = match matches.get_one::<String>("limit") {
        Some(raw) => raw.parse()?,
        None => config.giphy.limit,
    };

    let client = GiphyClient::new(&config.giphy)?;
    let urls = client.search(query, limit).await?;

    for url in &urls {
        println!("{}", url);
    }

    if let Some(dir) = matches.get_one::<String>("download-dir") {
        let dir = PathBuf::from(dir);
        for (i, url) in urls.iter().enumerate() {
            client.download(url, &dir, i).await?;
        }
    }

    info!("🎉 Done: {} GIFs found", urls.len());
    Ok(())
}
