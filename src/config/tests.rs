use clap::Parser;

use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_resolve_without_any_source() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");
    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert_eq!(settings.sessions.ttl, Duration::from_secs(7 * 24 * 3600));
    assert!(settings.push.relay_url.is_none());
    assert_eq!(settings.push.timeout, Duration::from_secs(10));
    assert!(settings.database.url.is_none());
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn blank_database_url_is_treated_as_missing() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".into());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
}

#[test]
fn push_relay_must_be_http() {
    let mut raw = RawSettings::default();
    raw.push.relay_url = Some("ftp://relay.example".into());
    let err = Settings::from_raw(raw).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "push.relay_url",
            ..
        }
    ));
}

#[test]
fn zero_session_ttl_is_rejected() {
    let mut raw = RawSettings::default();
    raw.sessions.ttl_hours = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["carpas"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_set_role_arguments() {
    let args = CliArgs::parse_from([
        "carpas",
        "users",
        "set-role",
        "--database-url",
        "postgres://example",
        "--email",
        "jefa@carpas.cl",
        "--role",
        "SUPER_ADMIN",
    ]);

    match args.command.expect("users command") {
        Command::Users(users) => match users.command {
            UsersCommand::SetRole(set_role) => {
                assert_eq!(
                    set_role.database.database_url.as_deref(),
                    Some("postgres://example")
                );
                assert_eq!(set_role.email, "jefa@carpas.cl");
                assert_eq!(set_role.role, "SUPER_ADMIN");
            }
        },
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_prune_arguments() {
    let args = CliArgs::parse_from(["carpas", "notifications", "prune", "--include-unread"]);

    match args.command.expect("notifications command") {
        Command::Notifications(notifications) => match notifications.command {
            NotificationsCommand::Prune(prune) => {
                assert_eq!(prune.days, 30);
                assert!(prune.include_unread);
            }
        },
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "carpas",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--push-relay-url",
        "https://relay.example/send",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.push_relay_url.as_deref(),
                Some("https://relay.example/send")
            );
        }
        _ => panic!("wrong command parsed"),
    }
}
