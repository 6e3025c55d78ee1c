use clap::{Arg, ArgAction, Command};

pub fn root_command() -> Command {
    Command::new("gauge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Freshness-aware statusline data broker for AI assistant sessions")
        .long_about(
            "GAUGE renders a statusline for AI assistant sessions from a shared \
             on-disk cache. Expensive upstream data (billing, quota, account state) \
             is fetched by whichever invocation gets there first and shared across \
             all concurrent sessions; the render path itself never blocks on the \
             network.",
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
}
