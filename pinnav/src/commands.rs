use crate::CLAP_STYLING;
use clap::{arg, command};
use pinnav_core::stamp::{DEFAULT_LABEL, DEFAULT_VERSION};
use pinnav_core::template::DEFAULT_SLOT;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("pinnav")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("pinnav")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Log traversal decisions and skipped nodes")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            selection_args(
                command!("update")
                    .about(
                        "Flatten a pintree export and write it into the navigation page's \
                    data slot.",
                    )
                    .arg(input_arg())
                    .arg(
                        arg!(-H --"html" <PATH>)
                            .required(false)
                            .help("The host page holding the navigation data")
                            .default_value("static_navigation_standalone.html"),
                    )
                    .arg(
                        arg!(-o --"output" <PATH>)
                            .required(false)
                            .help("Write the page here instead of overwriting --html"),
                    )
                    .arg(
                        arg!(--"slot" <NAME>)
                            .required(false)
                            .help("Name of the script variable holding the data")
                            .default_value(DEFAULT_SLOT),
                    )
                    .arg(
                        arg!(--"no-stamp")
                            .required(false)
                            .help("Leave the version/update-time footer alone")
                            .action(clap::ArgAction::SetTrue),
                    )
                    .arg(
                        arg!(--"stamp-label" <LABEL>)
                            .required(false)
                            .help("Footer text preceding the version number")
                            .default_value(DEFAULT_LABEL),
                    )
                    .arg(
                        arg!(--"stamp-version" <VERSION>)
                            .required(false)
                            .help("Version written into the footer")
                            .default_value(DEFAULT_VERSION),
                    )
                    .arg(
                        arg!(--"allow-degraded")
                            .required(false)
                            .help("Write the page even when only the fallback scan found links")
                            .action(clap::ArgAction::SetTrue),
                    )
                    .arg(
                        arg!(--"dry-run")
                            .required(false)
                            .help("Print the rendered page instead of writing it")
                            .action(clap::ArgAction::SetTrue),
                    ),
            ),
        )
        .subcommand(
            selection_args(
                command!("convert")
                    .about("Flatten a pintree export and emit the navigation data as JSON")
                    .arg(input_arg())
                    .arg(
                        arg!(-o --"output" <PATH>)
                            .required(false)
                            .help("Save the JSON to a file (default: print to screen)"),
                    ),
            ),
        )
        .subcommand(
            command!("analyze")
                .about("Show the folder structure and statistics of a pintree export")
                .arg(input_arg())
                .arg(
                    arg!(--"tree")
                        .required(false)
                        .help("Include the folder outline")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Emit the analysis as JSON")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"hosts" <NUM>)
                        .required(false)
                        .help("How many of the most linked hosts to list")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                ),
        )
}

fn input_arg() -> clap::Arg {
    arg!(-i --"input" <PATH>)
        .required(false)
        .help("The pintree bookmark export")
        .default_value("pintree.json")
}

fn selection_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-c --"config" <PATH>)
            .required(false)
            .help("JSON file with flatten options (category names, strategies, ...)"),
    )
    .arg(
        arg!(--"container" <NAME>)
            .required(false)
            .help("Title of a top-level folder whose children become the categories (repeatable)")
            .action(clap::ArgAction::Append)
            .conflicts_with("no-container"),
    )
    .arg(
        arg!(--"no-container")
            .required(false)
            .help("Never unwrap a container folder")
            .action(clap::ArgAction::SetTrue),
    )
    .arg(
        arg!(--"single-root")
            .required(false)
            .help("Unwrap the only top-level folder when there is exactly one")
            .action(clap::ArgAction::SetTrue),
    )
    .arg(
        arg!(--"keying" <MODE>)
            .required(false)
            .help("Bucket links by their top subfolder or by their nearest folder")
            .value_parser(["subfolder", "nearest"]),
    )
    .arg(
        arg!(--"resolve-remote-icons")
            .required(false)
            .help("Replace http(s) favicon URLs with keyword icons")
            .action(clap::ArgAction::SetTrue),
    )
}
