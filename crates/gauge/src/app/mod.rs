mod admin;
mod global;
mod misc;
mod query;
mod refresh;
mod statusline;

#[cfg(test)]
mod tests;

use clap::Command;

pub fn build_cli() -> Command {
    global::root_command()
        .subcommand(statusline::statusline_command())
        .subcommand(query::status_command())
        .subcommand(refresh::refresh_command())
        .subcommand(refresh::fetch_command())
        .subcommand(admin::cache_command())
        .subcommand(admin::lock_command())
        .subcommand(query::events_command())
        .subcommand(misc::completions_command())
}
