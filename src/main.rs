use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use release_keeper::config::{self, Config, Credentials};
use release_keeper::coverage;
use release_keeper::domain::{ChangelogDocument, PackageManifest, ReleaseDescriptor, ReleaseType};
use release_keeper::git::{self, Git2Repository};
use release_keeper::note::{ReleaseNotePublisher, SlackClient};
use release_keeper::release::ReleaseCreator;
use release_keeper::tracker::StatusReconciler;
use release_keeper::ui;

#[derive(Parser)]
#[command(
    name = "release-keeper",
    version,
    about = "Release bookkeeping: versions, changelog, git flow, Slack notes and ClickUp status"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, global = true, help = "Enable debug logging")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the release header, commit, merge and tag, then post the note
    Release {
        #[arg(
            value_name = "TYPE",
            default_value = "patch",
            allow_hyphen_values = true,
            help = "major, minor, patch, premajor, preminor, prepatch or prerelease"
        )]
        release_type: String,

        #[arg(
            value_name = "PRERELEASE_TAG",
            allow_hyphen_values = true,
            help = "Prerelease identifier, releases in place on the current branch"
        )]
        prerelease_tag: Option<String>,

        #[arg(long, help = "Bump the version in the package manifest and tag it")]
        with_version: bool,

        #[arg(long, env = "PROJECT_ICON", help = "Icon shown in the release note title")]
        icon: Option<String>,

        #[arg(long, help = "Slack channel to post the release note to")]
        channel: Option<String>,

        #[arg(long, help = "Skip the release note")]
        no_note: bool,
    },

    /// Post the latest changelog release to Slack
    Note {
        #[arg(long, env = "PROJECT_ICON", help = "Icon shown in the release note title")]
        icon: Option<String>,

        #[arg(long, help = "Slack channel to post the release note to")]
        channel: Option<String>,

        #[arg(long, help = "Prefix the note with the package name and version")]
        with_version: bool,
    },

    /// Advance ClickUp tickets from a GitHub webhook event
    SyncStatus {
        #[arg(long, help = "Event payload, defaults to $GITHUB_EVENT_PATH")]
        event: Option<PathBuf>,
    },

    /// Refresh the README coverage badge from the LCOV report
    CoverageBadge,
}

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("release_keeper")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    initialize_logger(args.debug)?;

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Failed to load configuration")?;
    let credentials = Credentials::from_env();
    let cwd = std::env::current_dir().context("Cannot determine the working directory")?;
    let root = git::project_root(&cwd);

    match args.command {
        Command::Release {
            release_type,
            prerelease_tag,
            with_version,
            icon,
            channel,
            no_note,
        } => {
            let release_type: ReleaseType = release_type.parse()?;
            let descriptor =
                ReleaseDescriptor::new(release_type, prerelease_tag.as_deref(), with_version);

            // Token and icon are checked before the repository is touched.
            let publisher = if no_note {
                None
            } else {
                Some(ReleaseNotePublisher::slack(
                    &credentials,
                    &config,
                    icon.as_deref(),
                    channel.as_deref(),
                    with_version,
                )?)
            };

            release(&config, &root, &descriptor)?;

            if let Some(publisher) = publisher {
                publish_note(&publisher, &config, &root, with_version)?;
            }
        }
        Command::Note {
            icon,
            channel,
            with_version,
        } => {
            let publisher = ReleaseNotePublisher::slack(
                &credentials,
                &config,
                icon.as_deref(),
                channel.as_deref(),
                with_version,
            )?;
            publish_note(&publisher, &config, &root, with_version)?;
        }
        Command::SyncStatus { event } => {
            let event_path = event.or(credentials.event_path.clone()).context(
                "No event payload: pass --event or set GITHUB_EVENT_PATH",
            )?;
            let reconciler = StatusReconciler::clickup(&credentials, &config)?;

            ui::display_status(&format!("Reading event from {}", event_path.display()));
            let outcomes = reconciler.handle_event_file(&event_path)?;
            ui::display_sync_outcomes(&outcomes);
        }
        Command::CoverageBadge => {
            let badge = coverage::refresh_badge(
                &root.join(&config.files.coverage_report),
                &root.join(&config.files.readme),
            )
            .context("Failed to update the coverage badge")?;
            ui::display_success(&format!("Coverage badge set to {}", badge));
        }
    }

    Ok(())
}

fn release(config: &Config, root: &Path, descriptor: &ReleaseDescriptor) -> Result<()> {
    let repo = Git2Repository::open(root, config.branches.remote.clone())
        .context("Not inside a git repository")?;

    ui::display_status(&format!("Preparing {} release...", descriptor.release_type));
    let outcome = ReleaseCreator::new(&repo, config, root).perform(descriptor)?;

    ui::display_release_outcome(&outcome);
    ui::display_success("Release created");
    Ok(())
}

fn publish_note(
    publisher: &ReleaseNotePublisher<SlackClient>,
    config: &Config,
    root: &Path,
    with_version: bool,
) -> Result<()> {
    let changelog = ChangelogDocument::load(&root.join(&config.files.changelog))?;
    let manifest = if with_version {
        Some(PackageManifest::load(&root.join(&config.files.manifest))?)
    } else {
        None
    };

    let note = publisher.publish(&changelog, manifest.as_ref())?;
    ui::display_success(&format!("Release note '{}' posted", note.title));
    Ok(())
}
