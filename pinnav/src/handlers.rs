use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;
use colored::Colorize;
use pinnav_core::config::DEFAULT_CONTAINERS;
use pinnav_core::load::load_document;
use pinnav_core::report::{
    NavigationStats, TreeAnalysis, analyze_tree, generate_analysis_report,
    generate_summary_report, save_report,
};
use pinnav_core::stamp::{local_now, stamp_version};
use pinnav_core::template::{HostPage, Placement, write_page};
use pinnav_core::{
    BucketKeying, FlattenOptions, FlattenStatus, Flattened, RemoteIcons, RootSelection,
    flatten_file,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Expand a leading `~` in a path argument
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Root selection strategies described by the CLI flags, or `None` when no
/// flag was given and the configured strategies should stay.
pub fn selection_from_flags(
    containers: &[String],
    no_container: bool,
    single_root: bool,
) -> Option<Vec<RootSelection>> {
    if containers.is_empty() && !no_container && !single_root {
        return None;
    }

    let mut selection = Vec::new();
    if !no_container {
        if containers.is_empty() {
            selection.push(RootSelection::container(&DEFAULT_CONTAINERS));
        } else {
            selection.push(RootSelection::container(containers));
        }
    }
    if single_root {
        selection.push(RootSelection::SingleRoot);
    }
    selection.push(RootSelection::AllTopLevel);
    Some(selection)
}

/// Flatten options from `--config` and the selection flags
pub fn build_options(args: &ArgMatches) -> Result<FlattenOptions> {
    let mut options = match args.get_one::<String>("config") {
        Some(raw) => {
            let path = expand_path(raw);
            FlattenOptions::from_file(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))?
        }
        None => FlattenOptions::default(),
    };

    let containers: Vec<String> = args
        .get_many::<String>("container")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    if let Some(selection) = selection_from_flags(
        &containers,
        args.get_flag("no-container"),
        args.get_flag("single-root"),
    ) {
        options.selection = selection;
    }

    if let Some(keying) = args.get_one::<String>("keying") {
        options.keying = BucketKeying::from_str(keying)
            .ok_or_else(|| anyhow!("Unknown keying mode '{}'", keying))?;
    }
    if args.get_flag("resolve-remote-icons") {
        options.remote_icons = RemoteIcons::Resolve;
    }

    Ok(options)
}

/// Load and flatten a bookmark export
pub fn run_convert(input: &Path, options: &FlattenOptions) -> Result<Flattened> {
    Ok(flatten_file(input, options)?)
}

pub struct StampSettings {
    pub label: String,
    pub version: String,
}

pub struct UpdateSettings {
    pub input: PathBuf,
    pub html: PathBuf,
    pub output: Option<PathBuf>,
    pub options: FlattenOptions,
    pub slot: String,
    pub stamp: Option<StampSettings>,
    pub allow_degraded: bool,
    pub dry_run: bool,
}

pub struct UpdateReport {
    pub flattened: Flattened,
    pub page: String,
    pub placement: Placement,
    pub stamped: usize,
    /// `None` on dry runs
    pub written: Option<PathBuf>,
}

/// Flatten the export, fill the page's data slot, stamp it and write it out.
/// Refuses to write when the export held no links, or when only the
/// fallback scan found some and `allow_degraded` is off.
pub fn run_update(settings: &UpdateSettings) -> Result<UpdateReport> {
    let flattened = run_convert(&settings.input, &settings.options)?;

    match flattened.status {
        FlattenStatus::Complete => {}
        FlattenStatus::NoData => bail!(
            "No bookmark links found in {}; page left untouched",
            settings.input.display()
        ),
        FlattenStatus::Degraded if !settings.allow_degraded => bail!(
            "Only the fallback scan found links in {}; pass --allow-degraded to write them anyway",
            settings.input.display()
        ),
        FlattenStatus::Degraded => warn!("writing degraded navigation data"),
    }

    let source = fs::read_to_string(&settings.html)
        .with_context(|| format!("Failed to read host page {}", settings.html.display()))?;
    let host = HostPage::parse(&source, &settings.slot)?;
    let placement = host.placement();

    // The stamp only touches the page around the slot, never the bookmark data
    let mut stamped = 0;
    let page = match settings.stamp {
        Some(ref stamp) => {
            let at = local_now();
            host.render_with(&flattened.map, |text| {
                let (out, count) = stamp_version(text, &stamp.label, &stamp.version, at);
                stamped += count;
                out
            })?
        }
        None => host.render(&flattened.map)?,
    };

    let written = if settings.dry_run {
        None
    } else {
        let target = settings.output.clone().unwrap_or_else(|| settings.html.clone());
        write_page(&target, &page)?;
        info!(path = %target.display(), "wrote navigation page");
        Some(target)
    };

    Ok(UpdateReport {
        flattened,
        page,
        placement,
        stamped,
        written,
    })
}

pub fn run_analyze(input: &Path, max_hosts: usize) -> Result<TreeAnalysis> {
    let document = load_document(input)?;
    Ok(analyze_tree(&document, max_hosts))
}

fn print_stats(flattened: &Flattened) {
    let stats = NavigationStats::from_flattened(flattened);
    let status = match stats.status {
        FlattenStatus::Complete => stats.status.as_str().green().bold(),
        FlattenStatus::Degraded => stats.status.as_str().yellow().bold(),
        FlattenStatus::NoData => stats.status.as_str().red().bold(),
    };
    println!(
        "{} {} categories, {} subcategories, {} links ({})",
        "→".blue(),
        stats.categories.to_string().bright_white(),
        stats.subcategories.to_string().bright_white(),
        stats.links.to_string().bright_white(),
        status
    );
}

pub fn handle_update(args: &ArgMatches, quiet: bool) -> Result<()> {
    let stamp = if args.get_flag("no-stamp") {
        None
    } else {
        Some(StampSettings {
            label: required(args, "stamp-label")?.clone(),
            version: required(args, "stamp-version")?.clone(),
        })
    };

    let settings = UpdateSettings {
        input: expand_path(required(args, "input")?),
        html: expand_path(required(args, "html")?),
        output: args.get_one::<String>("output").map(|raw| expand_path(raw)),
        options: build_options(args)?,
        slot: required(args, "slot")?.clone(),
        stamp,
        allow_degraded: args.get_flag("allow-degraded"),
        dry_run: args.get_flag("dry-run"),
    };

    let report = run_update(&settings)?;

    if settings.dry_run {
        print!("{}", report.page);
        return Ok(());
    }
    if quiet {
        return Ok(());
    }

    print_stats(&report.flattened);
    let placement = match report.placement {
        Placement::Declaration(declaration) => {
            format!("replaced existing '{}' declaration", declaration.keyword())
        }
        Placement::AfterScriptTag => "inserted after <script>".to_string(),
        Placement::BeforeBodyEnd => "inserted before </body>".to_string(),
    };
    println!("{} Data slot {}", "→".blue(), placement);
    if settings.stamp.is_some() {
        if report.stamped > 0 {
            println!("{} Version stamp updated", "✓".green().bold());
        } else {
            println!("{} No version stamp found in page", "ℹ".blue());
        }
    }
    if let Some(path) = report.written {
        println!(
            "{} Updated {}",
            "✓".green().bold(),
            path.display().to_string().bright_white()
        );
    }

    Ok(())
}

pub fn handle_convert(args: &ArgMatches, quiet: bool) -> Result<()> {
    let input = expand_path(required(args, "input")?);
    let options = build_options(args)?;
    let flattened = run_convert(&input, &options)?;
    let json = flattened.map.to_json_pretty()?;

    match args.get_one::<String>("output") {
        Some(raw) => {
            let path = expand_path(raw);
            save_report(&json, &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !quiet {
                print!("{}", generate_summary_report(&flattened));
                println!(
                    "{} Saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        None => println!("{}", json),
    }

    Ok(())
}

pub fn handle_analyze(args: &ArgMatches) -> Result<()> {
    let input = expand_path(required(args, "input")?);
    let max_hosts = args.get_one::<usize>("hosts").copied().unwrap_or(10);
    let analysis = run_analyze(&input, max_hosts)?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", generate_analysis_report(&analysis, args.get_flag("tree")));
    }

    Ok(())
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a String> {
    args.get_one::<String>(name)
        .ok_or_else(|| anyhow!("Missing argument --{}", name))
}
