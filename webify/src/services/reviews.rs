use chrono::Utc;
use log::debug;

use super::{load_actor, newest_first};
use crate::{
    errors::{ValidationError, WebifyError, WebifyResult},
    id::generate_record_id,
    models::{Review, ReviewAuthor, ReviewTarget, User},
    policy::{Action, ensure},
    store::{Collection, DocumentStore},
    validators::{check_rating, require_text},
};

/// Display name stored on reviews of the platform itself.
pub const APP_TARGET_NAME: &str = "Webify";

pub struct Reviews<'s, S> {
    users: Collection<'s, S, User>,
    reviews: Collection<'s, S, Review>,
}

/// Mean rating, or 0 for an empty set.
pub(crate) fn average_rating<'r>(reviews: impl IntoIterator<Item = &'r Review>) -> f64 {
    let (count, total) = reviews
        .into_iter()
        .fold((0u64, 0u64), |(count, total), review| (count + 1, total + u64::from(review.rating)));
    total as f64 / count.max(1) as f64
}

impl<'s, S: DocumentStore> Reviews<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            users: Collection::new(store),
            reviews: Collection::new(store),
        }
    }

    /// Writes a review of the app or of a collaborator. The author's name and
    /// image are copied onto the record.
    pub async fn create_review(
        &self,
        actor_id: &str,
        target: ReviewTarget,
        content: &str,
        rating: u8,
    ) -> WebifyResult<Review> {
        let actor = load_actor(&self.users, actor_id).await?;
        ensure(actor.role, Action::WriteReview)?;
        let mut issues = Vec::new();
        require_text("content", content, &mut issues);
        check_rating(rating, &mut issues);
        if !issues.is_empty() {
            return Err(ValidationError::new(issues).into());
        }

        let target_name = match &target {
            ReviewTarget::App => APP_TARGET_NAME.to_string(),
            ReviewTarget::User { id } => {
                let reviewed = self.users.get_or_error(id).await?;
                if !reviewed.role.is_contributor() {
                    return Err(WebifyError::invalid_argument(
                        "target",
                        "validation.role",
                        format!("only collaborators can be reviewed; {} is a {}", reviewed.id, reviewed.role),
                    ));
                }
                reviewed.name
            }
        };

        let review = Review {
            id: generate_record_id(),
            created_at: Utc::now(),
            author: ReviewAuthor {
                id: actor.id,
                name: actor.name,
                image: actor.image_url,
            },
            target,
            target_name,
            content: content.to_string(),
            rating,
        };
        self.reviews.insert(&review).await?;
        debug!("review {} by {} ({}/5)", review.id, review.author.id, review.rating);
        Ok(review)
    }

    pub async fn app_reviews(&self, limit: Option<usize>) -> WebifyResult<Vec<Review>> {
        let mut reviews = self.reviews.all().await?;
        reviews.retain(Review::is_app_review);
        Ok(newest_first(reviews, |review| review.created_at, limit))
    }

    pub async fn user_reviews(&self, target_id: &str, limit: Option<usize>) -> WebifyResult<Vec<Review>> {
        let mut reviews = self.reviews.all().await?;
        reviews.retain(|review| review.target_user_id() == Some(target_id));
        Ok(newest_first(reviews, |review| review.created_at, limit))
    }

    /// Reviews of any collaborator.
    pub async fn collaborator_reviews(&self, limit: Option<usize>) -> WebifyResult<Vec<Review>> {
        let mut reviews = self.reviews.all().await?;
        reviews.retain(|review| !review.is_app_review());
        Ok(newest_first(reviews, |review| review.created_at, limit))
    }
}
