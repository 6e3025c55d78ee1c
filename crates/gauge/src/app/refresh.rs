use clap::{Arg, Command};

/// Categories an operator can request by name.
const CATEGORY_NAMES: [&str; 9] = [
    "billing_oauth",
    "billing_ccusage",
    "quota_hotswap",
    "quota_subscription",
    "weekly_quota",
    "git_status",
    "transcript",
    "model",
    "context",
];

pub fn refresh_command() -> Command {
    Command::new("refresh")
        .about("Signal that fresh data is wanted (next cycle fetches eagerly)")
        .arg(
            Arg::new("category")
                .help("Category to refresh; all metered categories when omitted")
                .index(1)
                .value_parser(CATEGORY_NAMES),
        )
}

pub fn fetch_command() -> Command {
    Command::new("fetch")
        .about("Run one refresh cycle outside the render path")
        .arg(
            Arg::new("session")
                .long("session")
                .help("Registered session id to fetch for (defaults to a standalone session)")
                .value_name("ID"),
        )
}
