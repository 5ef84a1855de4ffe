//! Admin rollups.
//!
//! Every report is computed from full collection scans at query time; nothing
//! is materialized. Averages over an empty set report 0.

use log::debug;
use serde::Serialize;

use super::{load_actor, reviews::average_rating};
use crate::{
    errors::WebifyResult,
    models::{Blog, Content, Post, Project, Review, User, UserStats},
    policy::{Action, Role, ensure},
    store::{Collection, DocumentStore},
};

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct UserTotals {
    pub total: usize,
    pub collaborators: usize,
    pub admins: usize,
}

/// Volume and engagement across a set of content items.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ContentTotals {
    pub total: usize,
    pub likes: usize,
    pub comments: usize,
    pub shares: u64,
}

impl ContentTotals {
    fn tally<'i, T: Content + 'i>(items: impl IntoIterator<Item = &'i T>) -> Self {
        items.into_iter().fold(Self::default(), |mut totals, item| {
            let engagement = item.engagement();
            totals.total += 1;
            totals.likes += engagement.likes.len();
            totals.comments += engagement.comments.len();
            totals.shares += engagement.shares;
            totals
        })
    }

    /// `likes + comments * 2 + shares * 3`.
    fn performance(&self) -> f64 {
        (self.likes as u64 + self.comments as u64 * 2 + self.shares * 3) as f64
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ReviewTotals {
    pub total: usize,
    pub app_reviews: usize,
    pub average_app_rating: f64,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct GlobalStats {
    pub users: UserTotals,
    pub posts: ContentTotals,
    pub projects: ContentTotals,
    pub blogs: ContentTotals,
    pub reviews: ReviewTotals,
}

/// One user's cached counters next to totals recomputed from their content.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UserReport {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub stats: UserStats,
    pub posts: ContentTotals,
    pub projects: ContentTotals,
    pub blogs: ContentTotals,
    pub reviews: usize,
    pub average_rating: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ActiveUser {
    pub user: User,
    pub activity_score: u64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TopCollaborator {
    pub user: User,
    pub performance_score: f64,
    pub posts: usize,
    pub projects: usize,
    pub blogs: usize,
    pub reviews: usize,
    pub average_rating: f64,
}

/// Everything the rollups read, loaded once per report.
struct Snapshot {
    users: Vec<User>,
    posts: Vec<Post>,
    projects: Vec<Project>,
    blogs: Vec<Blog>,
    reviews: Vec<Review>,
}

impl Snapshot {
    fn authored_by<'a, T: Content>(items: &'a [T], author_id: &'a str) -> impl Iterator<Item = &'a T> + 'a {
        items.iter().filter(move |item| item.author_id() == author_id)
    }

    fn reviews_of<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a Review> + 'a {
        self.reviews
            .iter()
            .filter(move |review| review.target_user_id() == Some(user_id))
    }

    fn totals_for(&self, user_id: &str) -> (ContentTotals, ContentTotals, ContentTotals) {
        (
            ContentTotals::tally(Self::authored_by(&self.posts, user_id)),
            ContentTotals::tally(Self::authored_by(&self.projects, user_id)),
            ContentTotals::tally(Self::authored_by(&self.blogs, user_id)),
        )
    }
}

/// `posts * 2 + projects * 3 + blogs * 2 + likes received + comments * 2 + shares * 3`.
fn activity_score(stats: &UserStats, posts: usize, projects: usize, blogs: usize) -> u64 {
    posts as u64 * 2
        + projects as u64 * 3
        + blogs as u64 * 2
        + stats.likes_received()
        + stats.comments_created * 2
        + stats.shares * 3
}

pub struct Reports<'s, S> {
    users: Collection<'s, S, User>,
    posts: Collection<'s, S, Post>,
    projects: Collection<'s, S, Project>,
    blogs: Collection<'s, S, Blog>,
    reviews: Collection<'s, S, Review>,
}

impl<'s, S: DocumentStore> Reports<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            users: Collection::new(store),
            posts: Collection::new(store),
            projects: Collection::new(store),
            blogs: Collection::new(store),
            reviews: Collection::new(store),
        }
    }

    async fn authorize(&self, admin_id: &str, action: Action) -> WebifyResult<User> {
        let admin = load_actor(&self.users, admin_id).await?;
        ensure(admin.role, action)?;
        Ok(admin)
    }

    async fn snapshot(&self) -> WebifyResult<Snapshot> {
        Ok(Snapshot {
            users: self.users.all().await?,
            posts: self.posts.all().await?,
            projects: self.projects.all().await?,
            blogs: self.blogs.all().await?,
            reviews: self.reviews.all().await?,
        })
    }

    pub async fn global_stats(&self, admin_id: &str) -> WebifyResult<GlobalStats> {
        self.authorize(admin_id, Action::ViewGlobalStats).await?;
        let snapshot = self.snapshot().await?;

        let users = UserTotals {
            total: snapshot.users.len(),
            collaborators: snapshot.users.iter().filter(|u| u.role == Role::Collaborator).count(),
            admins: snapshot.users.iter().filter(|u| u.role == Role::Admin).count(),
        };
        let app_reviews: Vec<&Review> = snapshot.reviews.iter().filter(|r| r.is_app_review()).collect();
        let reviews = ReviewTotals {
            total: snapshot.reviews.len(),
            app_reviews: app_reviews.len(),
            average_app_rating: average_rating(app_reviews.iter().copied()),
        };

        debug!("global stats computed over {} users", users.total);
        Ok(GlobalStats {
            users,
            posts: ContentTotals::tally(&snapshot.posts),
            projects: ContentTotals::tally(&snapshot.projects),
            blogs: ContentTotals::tally(&snapshot.blogs),
            reviews,
        })
    }

    pub async fn user_stats(&self, admin_id: &str, target_id: &str) -> WebifyResult<UserReport> {
        self.authorize(admin_id, Action::ViewDashboard).await?;
        let user = self.users.get_or_error(target_id).await?;
        let snapshot = self.snapshot().await?;
        let (posts, projects, blogs) = snapshot.totals_for(&user.id);
        let reviews: Vec<&Review> = snapshot.reviews_of(&user.id).collect();

        Ok(UserReport {
            average_rating: average_rating(reviews.iter().copied()),
            reviews: reviews.len(),
            user_id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            stats: user.stats,
            posts,
            projects,
            blogs,
        })
    }

    /// Users ranked by activity score, highest first.
    pub async fn most_active_users(&self, admin_id: &str, limit: Option<usize>) -> WebifyResult<Vec<ActiveUser>> {
        self.authorize(admin_id, Action::ViewDashboard).await?;
        let snapshot = self.snapshot().await?;

        let mut ranked: Vec<ActiveUser> = snapshot
            .users
            .iter()
            .map(|user| {
                let (posts, projects, blogs) = snapshot.totals_for(&user.id);
                ActiveUser {
                    activity_score: activity_score(&user.stats, posts.total, projects.total, blogs.total),
                    user: user.clone(),
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.activity_score.cmp(&a.activity_score));
        if let Some(limit) = limit {
            ranked.truncate(limit);
        }
        Ok(ranked)
    }

    /// Collaborators ranked by engagement on their content plus ten points
    /// per star of average rating.
    pub async fn top_collaborators(&self, admin_id: &str, limit: Option<usize>) -> WebifyResult<Vec<TopCollaborator>> {
        self.authorize(admin_id, Action::ViewDashboard).await?;
        let snapshot = self.snapshot().await?;

        let mut ranked: Vec<TopCollaborator> = snapshot
            .users
            .iter()
            .filter(|user| user.role == Role::Collaborator)
            .map(|user| {
                let (posts, projects, blogs) = snapshot.totals_for(&user.id);
                let reviews: Vec<&Review> = snapshot.reviews_of(&user.id).collect();
                let average = average_rating(reviews.iter().copied());
                TopCollaborator {
                    performance_score: posts.performance() + projects.performance() + blogs.performance() + average * 10.0,
                    posts: posts.total,
                    projects: projects.total,
                    blogs: blogs.total,
                    reviews: reviews.len(),
                    average_rating: average,
                    user: user.clone(),
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.performance_score.total_cmp(&a.performance_score));
        if let Some(limit) = limit {
            ranked.truncate(limit);
        }
        Ok(ranked)
    }
}
