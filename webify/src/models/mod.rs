//! Record types persisted by the document store.

mod content;
mod messaging;
mod review;
mod skill;
mod social;
mod user;

pub use content::{
    Blog, BlogDraft, BlogPatch, Comment, CommentParent, Content, ContentKind, Engagement, Post, PostDraft, PostPatch,
    Project, ProjectDraft, ProjectPatch,
};
pub use messaging::{ChatGroup, Message, Recipient};
pub use review::{Review, ReviewAuthor, ReviewTarget};
pub use skill::{Skill, SkillDraft, SkillLevel, SkillPatch};
pub use social::{Friendship, FriendshipStatus};
pub use user::{EmailClaim, ProfilePatch, User, UserStats};
