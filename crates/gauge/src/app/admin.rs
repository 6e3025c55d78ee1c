use clap::{Arg, ArgAction, Command};

pub fn cache_command() -> Command {
    Command::new("cache")
        .about("Inspect or reset the shared cache document")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("show").about("Print the cache document as pretty JSON"))
        .subcommand(Command::new("clear").about("Reset the cache to an empty document"))
}

pub fn lock_command() -> Command {
    Command::new("lock")
        .about("Inspect fetch locks and recover from crashed holders")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("status").about("List lock files and their holders").arg(
                Arg::new("json")
                    .long("json")
                    .help("Output as JSON")
                    .action(ArgAction::SetTrue),
            ),
        )
        .subcommand(
            Command::new("force-release")
                .about("Remove a lock file regardless of holder liveness")
                .arg(
                    Arg::new("name")
                        .help("Lock name (the source id, e.g. 'billing')")
                        .required(true)
                        .index(1),
                ),
        )
}
