use clap::{Arg, ArgAction, Command};

pub fn status_command() -> Command {
    Command::new("status")
        .about("Show per-category freshness of the shared cache")
        .arg(
            Arg::new("json")
                .long("json")
                .help("Output in JSON format")
                .action(ArgAction::SetTrue),
        )
}

pub fn events_command() -> Command {
    Command::new("events")
        .about("Show recent account failover events")
        .arg(
            Arg::new("limit")
                .long("limit")
                .short('n')
                .help("Maximum number of events to show")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .default_value("10"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Output in JSON format")
                .action(ArgAction::SetTrue),
        )
}
