use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Table};
use serde::Serialize;
use webify::{ActiveUser, TopCollaborator};

use crate::context::{AdminSession, SessionOptions};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Rankings",
    commands: &[
        "webify leaderboard active --as admin@example.com               # Top 10 most active users",
        "webify leaderboard collaborators --limit 5 --as admin@example.com",
    ],
}];

const DEFAULT_LIMIT: usize = 10;

#[derive(Subcommand)]
pub enum LeaderboardCommands {
    /// Users ranked by activity score
    #[command(name = "active")]
    Active {
        /// Number of entries to show
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Collaborators ranked by engagement and rating
    #[command(name = "collaborators")]
    Collaborators {
        /// Number of entries to show
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },
}

fn rank_label(index: usize) -> String {
    if index == 0 {
        format!("{} 1", ICONS.star)
    } else {
        (index + 1).to_string()
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct ActiveBoard(Vec<ActiveUser>);

impl TableDisplay for ActiveBoard {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["#", "Name", "Email", "Role", "Score"]);
        for (index, entry) in self.0.iter().enumerate() {
            table.add_row(vec![
                Cell::new(rank_label(index)),
                Cell::new(&entry.user.name),
                Cell::new(&entry.user.email),
                Cell::new(entry.user.role),
                Cell::new(entry.activity_score),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0
            .iter()
            .map(|entry| format!("{}={}", entry.user.email, entry.activity_score))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct CollaboratorBoard(Vec<TopCollaborator>);

impl TableDisplay for CollaboratorBoard {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(
            &mut table,
            &["#", "Name", "Posts", "Projects", "Blogs", "Reviews", "Rating", "Score"],
        );
        for (index, entry) in self.0.iter().enumerate() {
            table.add_row(vec![
                Cell::new(rank_label(index)),
                Cell::new(&entry.user.name),
                Cell::new(entry.posts),
                Cell::new(entry.projects),
                Cell::new(entry.blogs),
                Cell::new(entry.reviews),
                Cell::new(format!("{:.2}", entry.average_rating)),
                Cell::new(format!("{:.1}", entry.performance_score)),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0
            .iter()
            .map(|entry| format!("{}={:.1}", entry.user.email, entry.performance_score))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub async fn handle_leaderboard_commands(
    command: LeaderboardCommands,
    session: &SessionOptions,
    output: &OutputManager,
) -> Result<()> {
    let session = AdminSession::open(session, output).await?;
    let reports = session.webify.reports();

    match command {
        LeaderboardCommands::Active { limit } => {
            output.heading("Most Active Users");
            let ranked = reports
                .most_active_users(&session.admin.id, Some(limit))
                .await
                .context("Failed to rank users")?;
            if ranked.is_empty() {
                output.info("No users yet");
                return Ok(());
            }
            output.display(&ActiveBoard(ranked))
        }
        LeaderboardCommands::Collaborators { limit } => {
            output.heading("Top Collaborators");
            let ranked = reports
                .top_collaborators(&session.admin.id, Some(limit))
                .await
                .context("Failed to rank collaborators")?;
            if ranked.is_empty() {
                output.info("No collaborators yet");
                return Ok(());
            }
            output.display(&CollaboratorBoard(ranked))
        }
    }
}
