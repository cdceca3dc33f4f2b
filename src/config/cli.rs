use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the Carpas binary.
#[derive(Debug, Parser)]
#[command(
    name = "carpas",
    version,
    about = "Tent and event rental management backend"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "CARPAS_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP API.
    Serve(Box<ServeArgs>),
    /// User account maintenance.
    Users(UsersArgs),
    /// Notification maintenance.
    Notifications(NotificationsArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Override the session lifetime.
    #[arg(long = "sessions-ttl-hours", value_name = "HOURS")]
    pub sessions_ttl_hours: Option<u64>,

    /// Override the push relay endpoint.
    #[arg(long = "push-relay-url", value_name = "URL")]
    pub push_relay_url: Option<String>,

    /// Override the push relay request timeout.
    #[arg(long = "push-timeout-seconds", value_name = "SECONDS")]
    pub push_timeout_seconds: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum UsersCommand {
    /// Assign a role to the account with the given email.
    #[command(name = "set-role")]
    SetRole(SetRoleArgs),
}

#[derive(Debug, Args, Clone)]
pub struct SetRoleArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Email of the account to update.
    #[arg(long, value_name = "EMAIL")]
    pub email: String,

    /// Role to assign (SUPER_ADMIN, ADMIN, MANAGER, TECHNICIAN, SALES, WORKER).
    #[arg(long, value_name = "ROLE")]
    pub role: String,
}

#[derive(Debug, Args, Clone)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub command: NotificationsCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum NotificationsCommand {
    /// Delete notifications older than the given number of days.
    #[command(name = "prune")]
    Prune(PruneArgs),
}

#[derive(Debug, Args, Clone)]
pub struct PruneArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Minimum age in days.
    #[arg(long, default_value_t = 30)]
    pub days: i64,

    /// Also delete unread notifications.
    #[arg(long = "include-unread", action = clap::ArgAction::SetTrue)]
    pub include_unread: bool,
}
