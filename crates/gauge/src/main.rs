use gauge_core::init_logging;

mod app;
pub(crate) mod color;
mod commands;
mod payload;
mod render;
mod table;

fn main() {
    let app = app::build_cli();
    let matches = app.get_matches();

    // Handle --no-color before any output
    if matches.get_flag("no-color") {
        color::set_no_color();
    }

    let verbose = matches.get_flag("verbose");
    let config = commands::load_config_with_warning();
    if let Ok(paths) = commands::resolve_paths(&config) {
        init_logging(&paths, verbose);
    }

    if let Err(e) = commands::run_command(&matches, &config) {
        // Error already printed to user via eprintln! in command handlers.
        // In verbose mode, JSON logs were also emitted.
        // Exit with non-zero code without printing Rust's Debug representation.
        drop(e);
        std::process::exit(1);
    }
}
