//! Domain operations. Each service borrows the store and takes the acting
//! user's id explicitly.

mod comments;
mod content;
mod messaging;
mod reports;
mod reviews;
mod skills;
mod social;
mod users;

pub use comments::Comments;
pub use content::Contents;
pub use messaging::Messaging;
pub use reports::{
    ActiveUser, ContentTotals, GlobalStats, ReviewTotals, Reports, TopCollaborator, UserReport, UserTotals,
};
pub use reviews::Reviews;
pub use skills::Skills;
pub use social::SocialGraph;
pub use users::Users;

use chrono::{DateTime, Utc};

use crate::{
    errors::WebifyResult,
    models::User,
    store::{Collection, DocumentStore},
};

/// Loads the acting user; a missing actor is always `NotFound`.
pub(crate) async fn load_actor<S: DocumentStore>(users: &Collection<'_, S, User>, actor_id: &str) -> WebifyResult<User> {
    users.get_or_error(actor_id).await
}

/// Sorts newest first and applies an optional limit.
pub(crate) fn newest_first<T>(mut items: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>, limit: Option<usize>) -> Vec<T> {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}
