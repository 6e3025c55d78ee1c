use super::*;

#[test]
fn test_cli_build() {
    let app = build_cli();
    assert_eq!(app.get_name(), "gauge");
}

#[test]
fn test_cli_requires_subcommand() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge"]);
    assert!(matches.is_err());
}

// --- statusline command tests ---

#[test]
fn test_cli_statusline_command() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "statusline"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let sub = matches.subcommand_matches("statusline").unwrap();
    assert!(!sub.get_flag("no-refresh"));
}

#[test]
fn test_cli_statusline_no_refresh_flag() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "statusline", "--no-refresh"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let sub = matches.subcommand_matches("statusline").unwrap();
    assert!(sub.get_flag("no-refresh"));
}

// --- status command tests ---

#[test]
fn test_cli_status_command() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "status"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let sub = matches.subcommand_matches("status").unwrap();
    assert!(!sub.get_flag("json"));
}

#[test]
fn test_cli_status_json_flag() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "status", "--json"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let sub = matches.subcommand_matches("status").unwrap();
    assert!(sub.get_flag("json"));
}

// --- refresh command tests ---

#[test]
fn test_cli_refresh_without_category() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "refresh"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let sub = matches.subcommand_matches("refresh").unwrap();
    assert!(sub.get_one::<String>("category").is_none());
}

#[test]
fn test_cli_refresh_with_category() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "refresh", "billing_ccusage"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let sub = matches.subcommand_matches("refresh").unwrap();
    assert_eq!(
        sub.get_one::<String>("category").unwrap(),
        "billing_ccusage"
    );
}

#[test]
fn test_cli_refresh_rejects_unknown_category() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "refresh", "bogus"]);
    assert!(matches.is_err());
}

// --- fetch command tests ---

#[test]
fn test_cli_fetch_command() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "fetch"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let sub = matches.subcommand_matches("fetch").unwrap();
    assert!(sub.get_one::<String>("session").is_none());
}

#[test]
fn test_cli_fetch_with_session() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "fetch", "--session", "abc-123"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let sub = matches.subcommand_matches("fetch").unwrap();
    assert_eq!(sub.get_one::<String>("session").unwrap(), "abc-123");
}

// --- cache command tests ---

#[test]
fn test_cli_cache_show() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "cache", "show"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let cache_matches = matches.subcommand_matches("cache").unwrap();
    assert!(cache_matches.subcommand_matches("show").is_some());
}

#[test]
fn test_cli_cache_clear() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "cache", "clear"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let cache_matches = matches.subcommand_matches("cache").unwrap();
    assert!(cache_matches.subcommand_matches("clear").is_some());
}

#[test]
fn test_cli_cache_requires_subcommand() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "cache"]);
    assert!(matches.is_err());
}

// --- lock command tests ---

#[test]
fn test_cli_lock_status() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "lock", "status"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let lock_matches = matches.subcommand_matches("lock").unwrap();
    let status_matches = lock_matches.subcommand_matches("status").unwrap();
    assert!(!status_matches.get_flag("json"));
}

#[test]
fn test_cli_lock_status_json() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "lock", "status", "--json"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let lock_matches = matches.subcommand_matches("lock").unwrap();
    let status_matches = lock_matches.subcommand_matches("status").unwrap();
    assert!(status_matches.get_flag("json"));
}

#[test]
fn test_cli_lock_force_release() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "lock", "force-release", "billing"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let lock_matches = matches.subcommand_matches("lock").unwrap();
    let release_matches = lock_matches.subcommand_matches("force-release").unwrap();
    assert_eq!(release_matches.get_one::<String>("name").unwrap(), "billing");
}

#[test]
fn test_cli_lock_force_release_requires_name() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "lock", "force-release"]);
    assert!(matches.is_err());
}

#[test]
fn test_cli_lock_requires_subcommand() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "lock"]);
    assert!(matches.is_err());
}

// --- events command tests ---

#[test]
fn test_cli_events_default_limit() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "events"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let sub = matches.subcommand_matches("events").unwrap();
    assert_eq!(*sub.get_one::<usize>("limit").unwrap(), 10);
}

#[test]
fn test_cli_events_with_limit_long() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "events", "--limit", "5"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let sub = matches.subcommand_matches("events").unwrap();
    assert_eq!(*sub.get_one::<usize>("limit").unwrap(), 5);
}

#[test]
fn test_cli_events_with_limit_short() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "events", "-n", "3"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let sub = matches.subcommand_matches("events").unwrap();
    assert_eq!(*sub.get_one::<usize>("limit").unwrap(), 3);
}

#[test]
fn test_cli_events_json_flag() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "events", "--json"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    let sub = matches.subcommand_matches("events").unwrap();
    assert!(sub.get_flag("json"));
}

// --- completions command tests ---

#[test]
fn test_cli_completions_command() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "completions", "bash"]);
    assert!(matches.is_ok());
}

#[test]
fn test_cli_completions_requires_shell() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "completions"]);
    assert!(matches.is_err());
}

#[test]
fn test_cli_completions_rejects_invalid_shell() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "completions", "invalid"]);
    assert!(matches.is_err());
}

// --- global flag tests ---

#[test]
fn test_cli_verbose_flag_short() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "-v", "status"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    assert!(matches.get_flag("verbose"));
}

#[test]
fn test_cli_verbose_flag_long() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "--verbose", "status"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    assert!(matches.get_flag("verbose"));
}

#[test]
fn test_cli_verbose_flag_after_subcommand() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "statusline", "-v"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    assert!(matches.get_flag("verbose"));
}

#[test]
fn test_cli_verbose_flag_default_false() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "status"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    assert!(!matches.get_flag("verbose"));
}

#[test]
fn test_cli_no_color_flag() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "--no-color", "status"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    assert!(matches.get_flag("no-color"));
}

#[test]
fn test_cli_no_color_flag_after_subcommand() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "events", "--no-color"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    assert!(matches.get_flag("no-color"));
}

#[test]
fn test_cli_no_color_default_false() {
    let app = build_cli();
    let matches = app.try_get_matches_from(vec!["gauge", "status"]);
    assert!(matches.is_ok());

    let matches = matches.unwrap();
    assert!(!matches.get_flag("no-color"));
}
