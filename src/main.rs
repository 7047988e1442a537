use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tagtidy::filename::filename_from_tags;
use tagtidy::models::{group_library, Artist, BatchReport, TagChange, Track};
use tagtidy::normalize::{normalize_apostrophes, split_extension};
use tagtidy::progress::{format_duration, set_log_only, BatchProgress};
use tagtidy::settings::{RuleSet, Settings};
use tagtidy::suffix::{extract_suffixes, reconstruct_title};
use tagtidy::tagio::{load_track, save_changes, LoftyStore};
use tagtidy::tools::{self, FolderContext};
use tagtidy::validation::{describe, validate_album};

#[derive(Parser)]
#[command(name = "tagtidy")]
#[command(about = "Normalize music filenames and title tags")]
struct Args {
    /// Settings JSON file; built-in defaults are used when it does not exist
    #[arg(long, global = true, default_value = "tagtidy.json")]
    settings: PathBuf,

    /// Hide progress bars and log periodic progress lines instead
    #[arg(long, global = true)]
    log_only: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the clean title and suffix tags of a title
    Clean {
        title: String,

        /// Artist name removed from the title
        #[arg(long, default_value = "")]
        artist: String,
    },
    /// Show what a tool would change, without writing anything
    Preview(ProcessArgs),
    /// Apply a tool and save tags and filenames
    Apply(ProcessArgs),
    /// Remove every tag that is not a visible column
    ClearHidden {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Tag keys to keep (comma-separated); defaults to the visible columns
        #[arg(long, value_delimiter = ',')]
        keep: Vec<String>,
    },
    /// Write the default settings file
    InitSettings {
        output: PathBuf,

        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Args)]
struct ProcessArgs {
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = Tool::FilenameFromTags)]
    tool: Tool,

    /// Text to find (find-replace tool)
    #[arg(long, default_value = "")]
    find: String,

    /// Replacement text (find-replace tool)
    #[arg(long, default_value = "")]
    replace: String,

    /// Propose artist and album tags from `<artist>/<album>/<file>` folders
    #[arg(long)]
    folder_tags: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Tool {
    FilenameFromTags,
    CamelCase,
    FindReplace,
    NameToTitle,
    TagsFromFilename,
}

const PROGRESS_INTERVAL: u64 = 100;

/// Keep supported audio files outside excluded folders.
fn select_audio_files(paths: &[PathBuf], settings: &Settings) -> Vec<PathBuf> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let (_, extension) = split_extension(&name);
        if !path.is_file() || !settings.is_supported_format(extension) {
            log::warn!("Skipping {}: not a supported audio file", path.display());
        } else if settings.is_excluded(path) {
            log::debug!("Skipping {}: excluded folder", path.display());
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn load_tracks(files: &[PathBuf], folder_tags: bool, rules: &RuleSet) -> Vec<Track> {
    let mut progress = BatchProgress::new("Reading tags", files.len() as u64, PROGRESS_INTERVAL);
    let mut tracks = Vec::with_capacity(files.len());

    for path in files {
        let mut track = load_track(path, &LoftyStore);
        let folder = if folder_tags {
            FolderContext::from_track_path(path)
        } else {
            FolderContext::default()
        };
        tools::prepare_track(&mut track, &folder, rules);
        tracks.push(track);
        progress.tick();
    }

    progress.finish();
    tracks
}

fn run_tool(tracks: &mut [Track], args: &ProcessArgs, rules: &RuleSet) -> Result<()> {
    match args.tool {
        Tool::FilenameFromTags => {
            filename_from_tags(tracks, rules);
        }
        Tool::CamelCase => tools::camel_case(tracks, rules),
        Tool::FindReplace => {
            if args.find.is_empty() {
                bail!("--find is required for the find-replace tool");
            }
            let changed = tools::find_replace_in_title(tracks, &args.find, &args.replace, rules);
            log::info!("Replaced text in {} title(s)", changed);
        }
        Tool::NameToTitle => tools::name_to_title(tracks, rules),
        Tool::TagsFromFilename => tools::tags_from_filename(tracks),
    }
    Ok(())
}

fn print_changes(library: &[Artist]) {
    for artist in library {
        for album in &artist.albums {
            println!("{}/{}", artist.name, album.name);
            for track in &album.tracks {
                let marker = if track.has_duplicate { "!" } else { " " };
                if track.target_filename() == track.filename {
                    println!("{} {}", marker, track.filename);
                } else {
                    println!("{} {} → {}", marker, track.filename, track.target_filename());
                }

                for (key, change) in track.proposed_tags.iter() {
                    let old = track.tags.get(key).unwrap_or_default();
                    match change {
                        TagChange::SetTo(value) if key == "title" => println!(
                            "      {}: {:?} → {:?}",
                            key,
                            old,
                            reconstruct_title(value, &track.suffixes)
                        ),
                        TagChange::SetTo(value) => {
                            println!("      {}: {:?} → {:?}", key, old, value)
                        }
                        TagChange::Delete => println!("      {}: {:?} (deleted)", key, old),
                        TagChange::Keep => {}
                    }
                }
            }
        }
    }
}

fn process(args: &ProcessArgs, settings: &Settings, apply: bool) -> Result<()> {
    let rules = RuleSet::from_settings(settings);
    let files = select_audio_files(&args.paths, settings);
    if files.is_empty() {
        bail!("No supported audio files given");
    }

    let mut tracks = load_tracks(&files, args.folder_tags, &rules);
    run_tool(&mut tracks, args, &rules)?;

    let mut library = group_library(tracks);
    let mut problems = Vec::new();
    for artist in &mut library {
        let root = artist.path.parent().map(Path::to_path_buf).unwrap_or_default();
        for album in &mut artist.albums {
            problems.extend(describe(&validate_album(album), &root));
        }
    }

    print_changes(&library);
    for problem in &problems {
        println!("! {}", problem);
    }
    if !apply {
        return Ok(());
    }
    if !problems.is_empty() {
        bail!("{} problem(s) must be fixed before saving", problems.len());
    }

    let mut tracks: Vec<Track> = library
        .into_iter()
        .flat_map(|artist| artist.albums)
        .flat_map(|album| album.tracks)
        .filter(|track| track.has_pending_changes())
        .collect();

    let start = Instant::now();
    let mut progress = BatchProgress::new("Saving", tracks.len() as u64, PROGRESS_INTERVAL);
    let mut report = BatchReport::default();
    for track in tracks.iter_mut() {
        report.merge(save_changes(std::slice::from_mut(track), &LoftyStore));
        progress.tick();
    }
    progress.finish();

    println!(
        "Saved {} file(s) in {}",
        report.success_count,
        format_duration(start.elapsed())
    );
    for error in &report.errors {
        println!("! {}", error);
    }
    if !report.is_clean() {
        bail!("{} file(s) could not be saved", report.errors.len());
    }
    Ok(())
}

fn clear_hidden(paths: &[PathBuf], keep: Vec<String>, settings: &Settings) -> Result<()> {
    let files = select_audio_files(paths, settings);
    let keep = if keep.is_empty() {
        settings.tags_to_keep()
    } else {
        keep
    };
    log::info!("Keeping tags: {}", keep.join(", "));

    let mut tracks: Vec<Track> = files.iter().map(|path| load_track(path, &LoftyStore)).collect();
    let report = tools::clear_hidden_tags(&mut tracks, &keep, &LoftyStore);

    println!("Cleared {} tag(s) from {} file(s)", report.success_count, tracks.len());
    for error in &report.errors {
        println!("! {}", error);
    }
    if !report.is_clean() {
        bail!("{} file(s) could not be cleared", report.errors.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    set_log_only(args.log_only);

    if let Command::InitSettings { output, force } = &args.command {
        if output.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", output.display());
        }
        Settings::default().save(output)?;
        println!("Wrote default settings to {}", output.display());
        return Ok(());
    }

    let settings = Settings::load(&args.settings)
        .with_context(|| format!("Failed to load settings from {}", args.settings.display()))?;

    match &args.command {
        Command::Clean { title, artist } => {
            let rules = RuleSet::from_settings(&settings);
            let (clean, suffixes) =
                extract_suffixes(&normalize_apostrophes(title), &normalize_apostrophes(artist), &rules);
            println!("Title:    {}", clean);
            println!("Suffixes: {}", suffixes.join(" "));
        }
        Command::Preview(process_args) => process(process_args, &settings, false)?,
        Command::Apply(process_args) => process(process_args, &settings, true)?,
        Command::ClearHidden { paths, keep } => clear_hidden(paths, keep.clone(), &settings)?,
        Command::InitSettings { .. } => {}
    }

    Ok(())
}
