use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{ValidationError, ValidationIssue, ValidationResult},
    stats::Counter,
    store::Entity,
    validators::{check_project_images, check_url, require_text, require_text_if_present},
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Project,
    Blog,
}

impl ContentKind {
    /// Projects carry no save list.
    pub fn supports_saves(self) -> bool {
        !matches!(self, ContentKind::Project)
    }

    pub fn created_counter(self) -> Counter {
        match self {
            ContentKind::Post => Counter::PostsCreated,
            ContentKind::Project => Counter::ProjectsCreated,
            ContentKind::Blog => Counter::BlogsCreated,
        }
    }

    pub fn liked_counter(self) -> Counter {
        match self {
            ContentKind::Post => Counter::PostsLiked,
            ContentKind::Project => Counter::ProjectsLiked,
            ContentKind::Blog => Counter::BlogsLiked,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ContentKind::Post => "post",
            ContentKind::Project => "project",
            ContentKind::Blog => "blog",
        };
        f.write_str(name)
    }
}

/// Engagement block shared by every content kind.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Engagement {
    pub likes: Vec<String>,
    /// Comment ids in creation order.
    pub comments: Vec<String>,
    pub saves: Vec<String>,
    pub shares: u64,
}

impl Engagement {
    pub const LIKES: &'static str = "likes";
    pub const COMMENTS: &'static str = "comments";
    pub const SAVES: &'static str = "saves";
    pub const SHARES: &'static str = "shares";
}

/// Behaviour shared by posts, projects and blogs.
pub trait Content: Entity + Clone {
    const KIND: ContentKind;

    /// Input accepted by `create`.
    type Draft;
    /// Partial update accepted by `update`.
    type Patch: Serialize;

    fn from_draft(id: String, author_id: String, draft: Self::Draft) -> ValidationResult<Self>;

    fn validate_patch(patch: &Self::Patch) -> ValidationResult<()>;

    fn author_id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    fn engagement(&self) -> &Engagement;

    fn is_published(&self) -> bool;

    fn tags(&self) -> &[String] {
        &[]
    }
}

fn finish(issues: Vec<ValidationIssue>) -> ValidationResult<()> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(issues))
    }
}

// ---------------------------------------------------------------------------
// Post

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub author_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub engagement: Engagement,
    pub is_published: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: Option<String>,
    pub content: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

impl Entity for Post {
    const COLLECTION: &'static str = "posts";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Content for Post {
    const KIND: ContentKind = ContentKind::Post;
    type Draft = PostDraft;
    type Patch = PostPatch;

    fn from_draft(id: String, author_id: String, draft: PostDraft) -> ValidationResult<Self> {
        let mut issues = Vec::new();
        require_text("content", &draft.content, &mut issues);
        finish(issues)?;
        Ok(Self {
            id,
            created_at: Utc::now(),
            author_id,
            title: draft.title,
            content: draft.content,
            image: draft.image,
            tags: draft.tags,
            engagement: Engagement::default(),
            is_published: true,
        })
    }

    fn validate_patch(patch: &PostPatch) -> ValidationResult<()> {
        let mut issues = Vec::new();
        require_text_if_present("content", patch.content.as_deref(), &mut issues);
        finish(issues)
    }

    fn author_id(&self) -> &str {
        &self.author_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn engagement(&self) -> &Engagement {
        &self.engagement
    }

    fn is_published(&self) -> bool {
        self.is_published
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

// ---------------------------------------------------------------------------
// Project

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub author_id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_link: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(flatten)]
    pub engagement: Engagement,
    pub is_published: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub video: Option<String>,
    pub github_link: Option<String>,
    pub demo_link: Option<String>,
    pub technologies: Vec<String>,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

impl Entity for Project {
    const COLLECTION: &'static str = "projects";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Content for Project {
    const KIND: ContentKind = ContentKind::Project;
    type Draft = ProjectDraft;
    type Patch = ProjectPatch;

    fn from_draft(id: String, author_id: String, draft: ProjectDraft) -> ValidationResult<Self> {
        let mut issues = Vec::new();
        require_text("title", &draft.title, &mut issues);
        require_text("description", &draft.description, &mut issues);
        check_project_images(&draft.images, &mut issues);
        check_url("github_link", draft.github_link.as_deref(), &mut issues);
        check_url("demo_link", draft.demo_link.as_deref(), &mut issues);
        finish(issues)?;
        Ok(Self {
            id,
            created_at: Utc::now(),
            author_id,
            title: draft.title,
            description: draft.description,
            images: draft.images,
            video: draft.video,
            github_link: draft.github_link,
            demo_link: draft.demo_link,
            technologies: draft.technologies,
            engagement: Engagement::default(),
            is_published: true,
        })
    }

    fn validate_patch(patch: &ProjectPatch) -> ValidationResult<()> {
        let mut issues = Vec::new();
        require_text_if_present("title", patch.title.as_deref(), &mut issues);
        require_text_if_present("description", patch.description.as_deref(), &mut issues);
        if let Some(images) = &patch.images {
            check_project_images(images, &mut issues);
        }
        check_url("github_link", patch.github_link.as_deref(), &mut issues);
        check_url("demo_link", patch.demo_link.as_deref(), &mut issues);
        finish(issues)
    }

    fn author_id(&self) -> &str {
        &self.author_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn engagement(&self) -> &Engagement {
        &self.engagement
    }

    fn is_published(&self) -> bool {
        self.is_published
    }

    fn tags(&self) -> &[String] {
        &self.technologies
    }
}

// ---------------------------------------------------------------------------
// Blog

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Blog {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub author_id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub engagement: Engagement,
    pub is_published: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct BlogPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

impl Entity for Blog {
    const COLLECTION: &'static str = "blogs";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Content for Blog {
    const KIND: ContentKind = ContentKind::Blog;
    type Draft = BlogDraft;
    type Patch = BlogPatch;

    fn from_draft(id: String, author_id: String, draft: BlogDraft) -> ValidationResult<Self> {
        let mut issues = Vec::new();
        require_text("title", &draft.title, &mut issues);
        require_text("content", &draft.content, &mut issues);
        finish(issues)?;
        Ok(Self {
            id,
            created_at: Utc::now(),
            author_id,
            title: draft.title,
            content: draft.content,
            image: draft.image,
            tags: draft.tags,
            engagement: Engagement::default(),
            is_published: true,
        })
    }

    fn validate_patch(patch: &BlogPatch) -> ValidationResult<()> {
        let mut issues = Vec::new();
        require_text_if_present("title", patch.title.as_deref(), &mut issues);
        require_text_if_present("content", patch.content.as_deref(), &mut issues);
        finish(issues)
    }

    fn author_id(&self) -> &str {
        &self.author_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn engagement(&self) -> &Engagement {
        &self.engagement
    }

    fn is_published(&self) -> bool {
        self.is_published
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

// ---------------------------------------------------------------------------
// Comment

/// The content item a comment belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommentParent {
    pub kind: ContentKind,
    pub id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub author_id: String,
    pub parent: CommentParent,
    pub content: String,
    #[serde(default)]
    pub likes: Vec<String>,
}

impl Comment {
    pub const LIKES: &'static str = "likes";
}

impl Entity for Comment {
    const COLLECTION: &'static str = "comments";

    fn id(&self) -> &str {
        &self.id
    }
}
