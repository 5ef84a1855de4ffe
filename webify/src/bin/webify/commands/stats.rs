use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use serde::Serialize;
use webify::GlobalStats;

use crate::context::{AdminSession, SessionOptions};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Platform Totals",
    commands: &[
        "webify stats --as admin@example.com              # Users, content and reviews at a glance",
        "webify stats --as admin@example.com --output json",
    ],
}];

#[derive(Serialize)]
#[serde(transparent)]
struct StatsView(GlobalStats);

impl TableDisplay for StatsView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let stats = &self.0;
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["", "Total", "Likes", "Comments", "Shares"]);
        for (label, totals) in [
            ("Posts", &stats.posts),
            ("Projects", &stats.projects),
            ("Blogs", &stats.blogs),
        ] {
            table.add_row(vec![
                Cell::new(label),
                Cell::new(totals.total),
                Cell::new(totals.likes),
                Cell::new(totals.comments),
                Cell::new(totals.shares),
            ]);
        }
        table.add_row(vec![
            Cell::new("Users"),
            Cell::new(stats.users.total),
            Cell::new(format!("{} collaborators", stats.users.collaborators)),
            Cell::new(format!("{} admins", stats.users.admins)),
            Cell::new(""),
        ]);
        table.add_row(vec![
            Cell::new("Reviews"),
            Cell::new(stats.reviews.total),
            Cell::new(format!("{} of the app", stats.reviews.app_reviews)),
            Cell::new(format!("avg {:.2}/5", stats.reviews.average_app_rating)),
            Cell::new(""),
        ]);
        table
    }

    fn to_compact(&self) -> String {
        let stats = &self.0;
        format!(
            "users={} posts={} projects={} blogs={} reviews={} app_rating={:.2}",
            stats.users.total,
            stats.posts.total,
            stats.projects.total,
            stats.blogs.total,
            stats.reviews.total,
            stats.reviews.average_app_rating
        )
    }
}

pub async fn handle_stats(session: &SessionOptions, output: &OutputManager) -> Result<()> {
    let session = AdminSession::open(session, output).await?;
    output.heading("Platform Statistics");
    let stats = session
        .webify
        .reports()
        .global_stats(&session.admin.id)
        .await
        .context("Failed to compute global statistics")?;
    output.display(&StatsView(stats))
}
