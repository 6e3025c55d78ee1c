use clap::ArgMatches;
use tracing::{error, info, warn};

use gauge_config::GaugeConfig;
use gauge_core::broker::{Broker, SourceId, StepAction};
use gauge_core::cache::{CacheDocument, CacheStore};
use gauge_core::freshness::{self, Category, CooldownStore, IndicatorContext};
use gauge_core::{clock, events, intent, lock};
use gauge_paths::{GaugePaths, PathError};

use crate::color;
use crate::payload;
use crate::render;
use crate::table::{FreshnessRow, TableFormatter};

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via:
/// - stderr message for immediate visibility
/// - structured log event `cli.config.load_failed` for debugging
pub fn load_config_with_warning() -> GaugeConfig {
    match GaugeConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.gauge/config.toml and ./.gauge/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            GaugeConfig::default()
        }
    }
}

/// Resolve the state directory, honoring the `[paths] base_dir` override.
pub fn resolve_paths(config: &GaugeConfig) -> Result<GaugePaths, PathError> {
    match &config.paths.base_dir {
        Some(dir) => Ok(GaugePaths::from_dir(dir.clone())),
        None => GaugePaths::resolve(),
    }
}

/// Resolve paths for an operator command, reporting failure on stderr.
fn resolve_paths_or_report(config: &GaugeConfig) -> Result<GaugePaths, Box<dyn std::error::Error>> {
    match resolve_paths(config) {
        Ok(paths) => Ok(paths),
        Err(e) => {
            eprintln!(
                "{}",
                color::error(&format!("Cannot locate the gauge state directory: {}", e))
            );
            eprintln!(
                "  {}",
                color::hint("Hint: ensure HOME is set, or set [paths] base_dir in ./.gauge/config.toml")
            );
            error!(event = "cli.paths_resolve_failed", error = %e);
            Err(e.into())
        }
    }
}

/// Where the external account switcher appends its failover events.
fn hotswap_events_path(config: &GaugeConfig) -> Result<std::path::PathBuf, PathError> {
    match &config.hotswap.events_path {
        Some(path) => Ok(path.clone()),
        None => GaugePaths::default_hotswap_events(),
    }
}

pub fn run_command(
    matches: &ArgMatches,
    config: &GaugeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("statusline", sub_matches)) => handle_statusline_command(sub_matches, config),
        Some(("status", sub_matches)) => handle_status_command(sub_matches, config),
        Some(("refresh", sub_matches)) => handle_refresh_command(sub_matches, config),
        Some(("fetch", sub_matches)) => handle_fetch_command(sub_matches, config),
        Some(("cache", sub_matches)) => handle_cache_command(sub_matches, config),
        Some(("lock", sub_matches)) => handle_lock_command(sub_matches, config),
        Some(("events", sub_matches)) => handle_events_command(sub_matches, config),
        Some(("completions", sub_matches)) => handle_completions_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}

fn handle_statusline_command(
    matches: &ArgMatches,
    config: &GaugeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let no_refresh = matches.get_flag("no-refresh");
    let now_ms = clock::now_ms();
    let payload = payload::read_stdin_payload();
    let session = payload.session_record(now_ms);

    info!(
        event = "cli.statusline_started",
        session_id = %session.session_id,
        no_refresh = no_refresh
    );

    // The host swallows stderr and re-invokes on every turn, so any problem
    // below degrades to the loading placeholder and a zero exit rather than
    // an error the user would never see.
    let Ok(paths) = resolve_paths(config) else {
        warn!(event = "cli.statusline.paths_unavailable");
        println!("{}", render::LOADING_PLACEHOLDER);
        return Ok(());
    };

    let broker = Broker::new(config.clone(), paths.clone());
    if let Err(e) = broker.register_session(&session) {
        warn!(event = "cli.statusline.register_failed", error = %e);
    }
    if let Err(e) = broker.push_data_at(now_ms, &session, payload.push_items()) {
        warn!(event = "cli.statusline.push_failed", error = %e);
    }
    if !no_refresh {
        broker.refresh_cycle_at(now_ms, &session);
    }

    let doc = CacheStore::open(&paths).load();
    let mut snapshot = render::Snapshot::from_document(&doc, &session);

    let cooldowns = CooldownStore::load(&paths);
    snapshot.billing_context = IndicatorContext {
        intent_age_ms: intent::intent_age_ms(&paths, Category::BillingCcusage),
        cooldown_active: cooldowns.cooldown_active_at(now_ms, Category::BillingCcusage),
    };
    snapshot.quota_context = IndicatorContext {
        intent_age_ms: intent::intent_age_ms(&paths, Category::QuotaSubscription),
        cooldown_active: cooldowns.cooldown_active_at(now_ms, Category::QuotaSubscription),
    };
    snapshot.notification = recent_swap_notification(now_ms, config);

    println!("{}", render::render_line(config, &snapshot, now_ms));

    info!(
        event = "cli.statusline_completed",
        session_id = %session.session_id
    );
    Ok(())
}

/// Failover notice for the statusline tail, when the event log is readable
/// and the latest swap is recent.
fn recent_swap_notification(now_ms: u64, config: &GaugeConfig) -> Option<String> {
    let path = hotswap_events_path(config).ok()?;
    let log = events::read_events(&path);
    events::swap_notification_at(now_ms, &log)
}

fn handle_status_command(
    matches: &ArgMatches,
    config: &GaugeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");

    info!(event = "cli.status_started", json_output = json_output);

    let paths = resolve_paths_or_report(config)?;
    let now_ms = clock::now_ms();
    let doc = CacheStore::open(&paths).load();

    if json_output {
        let report = freshness::report_at(now_ms, category_timestamps(&doc));
        println!("{}", serde_json::to_string_pretty(&report)?);
        info!(event = "cli.status_completed", fields = report.fields.len());
        return Ok(());
    }

    let cooldowns = CooldownStore::load(&paths);
    let rows = freshness_rows(now_ms, &doc, &cooldowns);
    let formatter = TableFormatter::new(&rows);
    formatter.print_table(&rows);

    info!(event = "cli.status_completed", fields = rows.len());
    Ok(())
}

/// Pair every category with the fetch timestamp of its backing cache entry.
fn category_timestamps(doc: &CacheDocument) -> Vec<(&'static str, Option<u64>)> {
    Category::ALL
        .iter()
        .map(|category| {
            let source = SourceId::for_category(*category);
            (
                category.as_str(),
                doc.source(source.as_str()).map(|entry| entry.fetched_at),
            )
        })
        .collect()
}

/// Build the `status` table rows: classification per category plus the
/// remaining cooldown, newest data regardless of which session wrote it.
fn freshness_rows(now_ms: u64, doc: &CacheDocument, cooldowns: &CooldownStore) -> Vec<FreshnessRow> {
    let report = freshness::report_at(now_ms, category_timestamps(doc));
    Category::ALL
        .iter()
        .filter_map(|category| {
            let field = report.fields.get(category.as_str())?;
            Some(FreshnessRow {
                category: category.as_str().to_string(),
                status: field.status.as_str().to_string(),
                age: field
                    .age_ms
                    .map(events::format_elapsed)
                    .unwrap_or_else(|| "-".to_string()),
                cooldown: cooldowns
                    .remaining_ms_at(now_ms, *category)
                    .map(events::format_elapsed)
                    .unwrap_or_else(|| "-".to_string()),
                indicator: field.indicator.clone(),
            })
        })
        .collect()
}

fn handle_refresh_command(
    matches: &ArgMatches,
    config: &GaugeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = resolve_paths_or_report(config)?;

    if let Some(name) = matches.get_one::<String>("category") {
        let category = Category::parse(name).ok_or("Unknown category")?;

        info!(event = "cli.refresh_started", category = name);

        match intent::signal_refresh_needed(&paths, category) {
            Ok(()) => {
                println!("✅ Refresh signaled for '{}'", category.as_str());
                println!("   The next statusline render fetches it eagerly.");
                info!(event = "cli.refresh_completed", category = name);
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ Failed to signal refresh for '{}': {}", name, e);
                error!(event = "cli.refresh_failed", category = name, error = %e);
                Err(e.into())
            }
        }
    } else {
        info!(event = "cli.refresh_all_started");

        let mut signaled = 0usize;
        for category in Category::ALL {
            // Free local categories refetch on every cycle anyway
            if !category.is_metered() {
                continue;
            }
            match intent::signal_refresh_needed(&paths, category) {
                Ok(()) => signaled += 1,
                Err(e) => {
                    eprintln!(
                        "❌ Failed to signal refresh for '{}': {}",
                        category.as_str(),
                        e
                    );
                    error!(
                        event = "cli.refresh_failed",
                        category = category.as_str(),
                        error = %e
                    );
                    return Err(e.into());
                }
            }
        }

        println!("✅ Refresh signaled for {} metered categories", signaled);
        println!("   The next statusline render fetches them eagerly.");
        info!(event = "cli.refresh_all_completed", signaled = signaled);
        Ok(())
    }
}

fn handle_fetch_command(
    matches: &ArgMatches,
    config: &GaugeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = resolve_paths_or_report(config)?;
    let broker = Broker::new(config.clone(), paths);
    let now_ms = clock::now_ms();

    let outcome = match matches.get_one::<String>("session") {
        Some(session_id) => {
            info!(event = "cli.fetch_started", session_id = %session_id);

            match broker.refresh_by_id(session_id) {
                Ok(outcome) => outcome,
                Err(e) => {
                    eprintln!("❌ Failed to fetch for session '{}': {}", session_id, e);
                    eprintln!("   Hint: 'gauge statusline' registers sessions; check the id.");
                    error!(event = "cli.fetch_failed", session_id = %session_id, error = %e);
                    return Err(e.into());
                }
            }
        }
        None => {
            info!(event = "cli.fetch_started", session_id = "default");

            // No registered session: fetch under the same standalone identity
            // the statusline uses when the payload carries no session id.
            let session = payload::StatuslinePayload::default().session_record(now_ms);
            if let Err(e) = broker.register_session(&session) {
                warn!(event = "cli.fetch.register_failed", error = %e);
            }
            broker.refresh_cycle_at(now_ms, &session)
        }
    };

    println!(
        "✅ Refresh cycle complete: {} fetched, {} failed",
        outcome.fetched(),
        outcome.failed()
    );
    for step in &outcome.steps {
        let action = match &step.action {
            StepAction::Failed { error } => format!("failed: {}", error),
            other => other.as_str().to_string(),
        };
        println!("   {}: {}", step.source.as_str(), action);
    }

    info!(
        event = "cli.fetch_completed",
        cycle_id = %outcome.cycle_id,
        fetched = outcome.fetched(),
        failed = outcome.failed()
    );
    Ok(())
}

fn handle_cache_command(
    matches: &ArgMatches,
    config: &GaugeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("show", _)) => handle_cache_show(config),
        Some(("clear", _)) => handle_cache_clear(config),
        _ => {
            error!(event = "cli.cache_unknown_subcommand");
            Err("Unknown cache subcommand".into())
        }
    }
}

fn handle_cache_show(config: &GaugeConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.cache_show_started");

    let paths = resolve_paths_or_report(config)?;
    let doc = CacheStore::open(&paths).load();
    println!("{}", serde_json::to_string_pretty(&doc)?);

    info!(event = "cli.cache_show_completed", sources = doc.sources.len());
    Ok(())
}

fn handle_cache_clear(config: &GaugeConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.cache_clear_started");

    let paths = resolve_paths_or_report(config)?;
    match CacheStore::open(&paths).clear() {
        Ok(_) => {
            println!("✅ Cache cleared");
            info!(event = "cli.cache_clear_completed");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Failed to clear cache: {}", e);
            error!(event = "cli.cache_clear_failed", error = %e);
            Err(e.into())
        }
    }
}

fn handle_lock_command(
    matches: &ArgMatches,
    config: &GaugeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("status", sub_matches)) => handle_lock_status(sub_matches, config),
        Some(("force-release", sub_matches)) => handle_lock_force_release(sub_matches, config),
        _ => {
            error!(event = "cli.lock_unknown_subcommand");
            Err("Unknown lock subcommand".into())
        }
    }
}

fn handle_lock_status(
    matches: &ArgMatches,
    config: &GaugeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");

    info!(event = "cli.lock_status_started", json_output = json_output);

    let paths = resolve_paths_or_report(config)?;
    let now_ms = clock::now_ms();
    let statuses = lock::list(&paths);

    if json_output {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct LockStatusJson<'a> {
            name: &'a str,
            pid: Option<u32>,
            acquired_at: Option<u64>,
            holder_alive: Option<bool>,
        }

        let rows: Vec<LockStatusJson> = statuses
            .iter()
            .map(|status| LockStatusJson {
                name: &status.name,
                pid: status.holder.as_ref().map(|holder| holder.pid),
                acquired_at: status.holder.as_ref().map(|holder| holder.acquired_at),
                holder_alive: status.holder_alive,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        info!(event = "cli.lock_status_completed", count = statuses.len());
        return Ok(());
    }

    if statuses.is_empty() {
        println!("No locks held.");
        info!(event = "cli.lock_status_completed", count = 0);
        return Ok(());
    }

    for status in &statuses {
        match (&status.holder, status.holder_alive) {
            (Some(holder), Some(true)) => println!(
                "🔒 {} — pid {} (alive), held for {}",
                color::ice(&status.name),
                holder.pid,
                events::format_elapsed(now_ms.saturating_sub(holder.acquired_at))
            ),
            (Some(holder), _) => println!(
                "🔒 {} — pid {} (dead), held for {}. Run 'gauge lock force-release {}' to clear.",
                color::ice(&status.name),
                holder.pid,
                events::format_elapsed(now_ms.saturating_sub(holder.acquired_at)),
                status.name
            ),
            (None, _) => println!(
                "🔒 {} — unreadable holder. Run 'gauge lock force-release {}' to clear.",
                color::ice(&status.name),
                status.name
            ),
        }
    }

    info!(event = "cli.lock_status_completed", count = statuses.len());
    Ok(())
}

fn handle_lock_force_release(
    matches: &ArgMatches,
    config: &GaugeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = matches
        .get_one::<String>("name")
        .ok_or("Lock name is required")?;

    info!(event = "cli.lock_force_release_started", name = %name);

    let paths = resolve_paths_or_report(config)?;
    match lock::force_release(&paths, name) {
        Ok(true) => {
            println!("✅ Lock '{}' released", name);
            info!(event = "cli.lock_force_release_completed", name = %name, released = true);
            Ok(())
        }
        Ok(false) => {
            println!("No lock named '{}' was held.", name);
            info!(event = "cli.lock_force_release_completed", name = %name, released = false);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Failed to release lock '{}': {}", name, e);
            error!(event = "cli.lock_force_release_failed", name = %name, error = %e);
            Err(e.into())
        }
    }
}

fn handle_events_command(
    matches: &ArgMatches,
    config: &GaugeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let limit = *matches.get_one::<usize>("limit").unwrap_or(&10);
    let json_output = matches.get_flag("json");

    info!(
        event = "cli.events_started",
        limit = limit,
        json_output = json_output
    );

    let path = match hotswap_events_path(config) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("❌ Cannot locate the failover event log: {}", e);
            eprintln!("   Hint: set [hotswap] events_path in ~/.gauge/config.toml");
            error!(event = "cli.events_failed", error = %e);
            return Err(e.into());
        }
    };

    let log = events::read_events(&path);
    let tail = &log[log.len().saturating_sub(limit)..];

    if json_output {
        println!("{}", serde_json::to_string_pretty(&tail)?);
        info!(event = "cli.events_completed", count = tail.len());
        return Ok(());
    }

    if tail.is_empty() {
        println!("No failover events recorded.");
        println!("{}", color::muted(&format!("   ({})", path.display())));
        info!(event = "cli.events_completed", count = 0);
        return Ok(());
    }

    for entry in tail {
        let transition = match entry.from_email.as_deref().or(entry.from_slot.as_deref()) {
            Some(from) => format!("{} → {}", from, entry.target()),
            None => format!("→ {}", entry.target()),
        };
        let reason = entry
            .reason
            .as_deref()
            .map(|reason| color::muted(&format!(" ({})", reason)))
            .unwrap_or_default();
        println!(
            "{}  {}  {}{}",
            color::muted(&format_event_time(entry.timestamp)),
            color::ice(&format!("{:<8}", entry.event_type)),
            transition,
            reason
        );
    }

    info!(event = "cli.events_completed", count = tail.len());
    Ok(())
}

/// Wall-clock display for an event timestamp in epoch milliseconds.
fn format_event_time(timestamp_ms: u64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

fn handle_completions_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let shell = *matches
        .get_one::<clap_complete::Shell>("shell")
        .ok_or("Shell argument is required")?;

    let mut app = crate::app::build_cli();
    let name = app.get_name().to_string();
    clap_complete::generate(shell, &mut app, name, &mut std::io::stdout());

    info!(event = "cli.completions_generated", shell = %shell);
    Ok(())
}
