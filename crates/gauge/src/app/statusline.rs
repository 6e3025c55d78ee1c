use clap::{Arg, ArgAction, Command};

pub fn statusline_command() -> Command {
    Command::new("statusline")
        .about("Render the statusline from the assistant's stdin payload")
        .long_about(
            "Reads the assistant's JSON payload from stdin, registers the session, \
             runs one refresh cycle against the shared cache, and prints the \
             rendered line to stdout. Designed to be called as the statusline \
             command from the assistant's settings; missing or malformed stdin is \
             tolerated and data problems never produce a non-zero exit.",
        )
        .arg(
            Arg::new("no-refresh")
                .long("no-refresh")
                .help("Render from the cache as-is without running a refresh cycle")
                .action(ArgAction::SetTrue),
        )
}
