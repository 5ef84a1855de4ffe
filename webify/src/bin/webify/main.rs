mod commands;
mod context;
mod examples;
mod output;
mod theme;

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand};
use colored::{Color, Colorize, control::ShouldColorize};

use commands::{
    leaderboard::{LeaderboardCommands, handle_leaderboard_commands},
    stats::handle_stats,
    users::{UsersCommands, handle_users_commands},
};
use context::SessionOptions;
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ICONS, THEME, help_styles};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("REDIS_URL", "Redis connection URL substituted into webify.toml"),
    ("WEBIFY_ADMIN", "Email of the admin account commands act as"),
    ("RUST_LOG", "Log filter for library diagnostics (e.g. webify=debug)"),
];

#[derive(Parser)]
#[command(name = "webify")]
#[command(author = "Webify Team")]
#[command(version = "0.1.0")]
#[command(
    about = "Admin console for the Webify platform",
    long_about = r#"Admin console for the Webify platform that provides:

• Platform-wide totals for users, content and reviews
• User listing, role changes and account removal
• Activity and collaborator rankings

Commands:
  stats        Show global platform statistics
  users        Inspect and administer user accounts
  leaderboard  Rank users by activity or collaborator performance
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Path to the configuration file (defaults to ./webify.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Email of the admin to act as
    #[arg(long = "as", env = "WEBIFY_ADMIN", global = true)]
    admin: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parses the command line with themed help and per-command examples.
    fn parse_styled() -> Self {
        let matches = build_cli_command().get_matches();
        Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
    }
}

fn build_cli_command() -> Command {
    let use_color = ShouldColorize::from_env().should_colorize();
    let mut command = Cli::command()
        .styles(help_styles())
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never })
        .after_long_help(render_environment(use_color));
    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            *subcommand = subcommand
                .clone()
                .after_long_help(render_examples(example.groups, use_color));
        }
    }
    command
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{}", heading("Examples:", THEME.highlight, use_color));
    for group in groups {
        let _ = writeln!(buffer, "  {}", heading(group.title, THEME.primary, use_color));
        for command in group.commands {
            let _ = writeln!(buffer, "    {} {command}", ICONS.arrow);
        }
    }
    buffer
}

fn render_environment(use_color: bool) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{}", heading("Environment Variables:", THEME.highlight, use_color));
    for (key, description) in ENVIRONMENT_VARIABLES {
        let _ = writeln!(buffer, "  {key:<13} {description}");
    }
    let _ = write!(buffer, "\nUse 'webify <command> --help' to view examples for each command.\n");
    buffer
}

fn heading(text: &str, color: Color, use_color: bool) -> String {
    if use_color {
        text.color(color).bold().to_string()
    } else {
        text.to_string()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show global platform statistics
    Stats,

    /// Inspect and administer user accounts
    #[command(subcommand)]
    Users(UsersCommands),

    /// Rank users by activity or collaborator performance
    #[command(subcommand)]
    Leaderboard(LeaderboardCommands),
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse_styled();
    let no_color = cli.no_color;

    if let Err(err) = execute(cli).await {
        let output = OutputManager::new(GlobalOptions {
            no_color,
            ..Default::default()
        });
        output.error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let global_options = GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };
    let output = OutputManager::new(global_options);

    let session = SessionOptions {
        config_path: cli.config,
        admin_email: cli.admin,
    };

    match cli.command {
        Commands::Stats => handle_stats(&session, &output).await?,
        Commands::Users(users_cmd) => handle_users_commands(users_cmd, &session, &output).await?,
        Commands::Leaderboard(board_cmd) => handle_leaderboard_commands(board_cmd, &session, &output).await?,
    }

    Ok(())
}
