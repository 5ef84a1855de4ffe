use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Table};
use serde::Serialize;
use webify::{Role, User, UserReport};

use crate::context::{AdminSession, SessionOptions};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Browse Accounts",
        commands: &[
            "webify users list --as admin@example.com                   # Every account",
            "webify users list --role collaborator --as admin@example.com",
            "webify users report ada@example.com --as admin@example.com # Cached stats and content totals",
        ],
    },
    ExampleGroup {
        title: "Administer Accounts",
        commands: &[
            "webify users role ada@example.com collaborator --as admin@example.com",
            "webify users delete spam@example.com --as admin@example.com --yes",
        ],
    },
];

#[derive(Subcommand)]
pub enum UsersCommands {
    /// List registered users
    #[command(name = "list")]
    List {
        /// Only show users holding this role (user, collaborator, admin)
        #[arg(long)]
        role: Option<Role>,
    },

    /// Change a user's role
    #[command(name = "role")]
    Role {
        /// Email of the user to change
        email: String,

        /// New role (user, collaborator, admin)
        role: Role,
    },

    /// Permanently delete a user
    #[command(name = "delete")]
    Delete {
        /// Email of the user to delete
        email: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Show one user's statistics
    #[command(name = "report")]
    Report {
        /// Email of the user to report on
        email: String,
    },
}

#[derive(Serialize)]
#[serde(transparent)]
struct UserList(Vec<User>);

impl TableDisplay for UserList {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Id", "Name", "Email", "Role", "Joined", "Online"]);
        for user in &self.0 {
            table.add_row(vec![
                Cell::new(&user.id),
                Cell::new(&user.name),
                Cell::new(&user.email),
                Cell::new(user.role),
                Cell::new(user.created_at.format("%Y-%m-%d")),
                Cell::new(if user.stats.online { "yes" } else { "no" }),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0
            .iter()
            .map(|user| format!("{}:{}", user.email, user.role))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct ReportView(UserReport);

impl TableDisplay for ReportView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let report = &self.0;
        let stats = &report.stats;
        output.key_value_table(&[
            ("Name", report.name.clone()),
            ("Email", report.email.clone()),
            ("Role", report.role.to_string()),
            (
                "Posts",
                format!("{} ({} likes, {} comments)", report.posts.total, report.posts.likes, report.posts.comments),
            ),
            (
                "Projects",
                format!(
                    "{} ({} likes, {} comments)",
                    report.projects.total, report.projects.likes, report.projects.comments
                ),
            ),
            (
                "Blogs",
                format!("{} ({} likes, {} comments)", report.blogs.total, report.blogs.likes, report.blogs.comments),
            ),
            ("Likes received", stats.likes_received().to_string()),
            ("Comments received", stats.comments_created.to_string()),
            ("Comment likes", stats.comments_liked.to_string()),
            ("Shares", stats.shares.to_string()),
            ("Profile likes", stats.liked_by.len().to_string()),
            ("Reviews", format!("{} (avg {:.2}/5)", report.reviews, report.average_rating)),
        ])
    }

    fn to_compact(&self) -> String {
        let report = &self.0;
        format!(
            "{} role={} posts={} projects={} blogs={} likes={} rating={:.2}",
            report.email,
            report.role,
            report.posts.total,
            report.projects.total,
            report.blogs.total,
            report.stats.likes_received(),
            report.average_rating
        )
    }
}

pub async fn handle_users_commands(
    command: UsersCommands,
    session: &SessionOptions,
    output: &OutputManager,
) -> Result<()> {
    let session = AdminSession::open(session, output).await?;

    match command {
        UsersCommands::List { role } => handle_list(&session, role, output).await,
        UsersCommands::Role { email, role } => handle_role(&session, &email, role, output).await,
        UsersCommands::Delete { email, yes } => handle_delete(&session, &email, yes, output).await,
        UsersCommands::Report { email } => handle_report(&session, &email, output).await,
    }
}

async fn handle_list(session: &AdminSession, role: Option<Role>, output: &OutputManager) -> Result<()> {
    output.heading("Users");
    let mut users = session.webify.users().list().await.context("Failed to list users")?;
    if let Some(role) = role {
        users.retain(|user| user.role == role);
    }
    users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    if users.is_empty() {
        output.info("No users found");
        return Ok(());
    }
    output.display(&UserList(users))
}

async fn handle_role(session: &AdminSession, email: &str, role: Role, output: &OutputManager) -> Result<()> {
    let target = session.user_by_email(email).await?;
    if target.role == role {
        output.info(&format!("{email} is already a {role}"));
        return Ok(());
    }
    let updated = session
        .webify
        .users()
        .set_role(&session.admin.id, &target.id, role)
        .await
        .with_context(|| format!("Failed to change the role of {email}"))?;
    output.success(&format!("{email}: {} -> {}", target.role, updated.role));
    Ok(())
}

async fn handle_delete(session: &AdminSession, email: &str, confirmed: bool, output: &OutputManager) -> Result<()> {
    let target = session.user_by_email(email).await?;
    if !confirmed {
        output.warning(&format!(
            "This permanently deletes {email} ({}). Re-run with --yes to confirm.",
            target.id
        ));
        return Ok(());
    }
    session
        .webify
        .users()
        .delete_user(&session.admin.id, &target.id)
        .await
        .with_context(|| format!("Failed to delete {email}"))?;
    output.success(&format!("Deleted {email}"));
    Ok(())
}

async fn handle_report(session: &AdminSession, email: &str, output: &OutputManager) -> Result<()> {
    let target = session.user_by_email(email).await?;
    output.heading(&format!("Report for {}", target.name));
    let report = session
        .webify
        .reports()
        .user_stats(&session.admin.id, &target.id)
        .await
        .with_context(|| format!("Failed to build the report for {email}"))?;
    output.display(&ReportView(report))
}
