use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::image::ImageRef;
use super::title::{default_title, is_blank_title};
use crate::error::{ServiceError, ServiceResult};

pub const TITLE_MAX_LEN: usize = 200;
pub const SLUG_MAX_LEN: usize = 20;
pub const USERNAME_MAX_LEN: usize = 150;

/// Characters shown in a comment preview
const COMMENT_PREVIEW_LEN: usize = 20;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid"));

fn default_active() -> bool {
    true
}

fn require_non_blank(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn check_max_len(field: &str, value: &str, max: usize) -> ServiceResult<()> {
    let len = value.chars().count();
    if len > max {
        return Err(ServiceError::Validation(format!(
            "{} must be at most {} characters (got {})",
            field, max, len
        )));
    }
    Ok(())
}

fn require_id(field: &str, id: i64) -> ServiceResult<()> {
    if id <= 0 {
        return Err(ServiceError::Validation(format!(
            "{} must reference an existing record (got {})",
            field, id
        )));
    }
    Ok(())
}

fn validate_slug(slug: &str) -> ServiceResult<()> {
    require_non_blank("slug", slug)?;
    check_max_len("slug", slug, SLUG_MAX_LEN)?;
    if !SLUG_RE.is_match(slug) {
        return Err(ServiceError::Validation(format!(
            "slug may only contain letters, numbers, underscores or hyphens: {}",
            slug
        )));
    }
    Ok(())
}

fn validate_group_title(title: &str) -> ServiceResult<()> {
    require_non_blank("group title", title)?;
    check_max_len("group title", title, TITLE_MAX_LEN)
}

// ============================================================================
// Users
// ============================================================================

/// Local mirror of an account owned by the identity layer
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
}

impl NewUser {
    pub fn validate(&self) -> ServiceResult<()> {
        require_non_blank("username", &self.username)?;
        check_max_len("username", &self.username, USERNAME_MAX_LEN)
    }
}

// ============================================================================
// Groups
// ============================================================================

/// Topical group a post may belong to
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    /// URL key, unique across groups
    pub slug: String,
    pub description: String,
    pub active: bool,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

impl Group {
    pub fn apply(&mut self, changes: GroupChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(slug) = changes.slug {
            self.slug = slug;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(active) = changes.active {
            self.active = active;
        }
    }

    pub fn validate(&self) -> ServiceResult<()> {
        validate_group_title(&self.title)?;
        validate_slug(&self.slug)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl NewGroup {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            description: String::new(),
            active: true,
        }
    }

    pub fn validate(&self) -> ServiceResult<()> {
        validate_group_title(&self.title)?;
        validate_slug(&self.slug)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

// ============================================================================
// Posts
// ============================================================================

/// Post entity, listed newest first
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Set by the database on insert and never changed afterwards
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    /// Cleared when the group is deleted
    pub group_id: Option<i64>,
    /// Path under the `posts/` image namespace
    pub image: Option<String>,
    pub active: bool,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Post \"{}\" from {}.",
            self.title,
            self.pub_date.format("%d.%m.%Y")
        )
    }
}

impl Post {
    /// Fill an empty title from the text. Present titles are left alone.
    pub fn ensure_title(&mut self) {
        if is_blank_title(&self.title) {
            self.title = default_title(&self.text);
        }
    }

    pub fn apply(&mut self, changes: PostChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(text) = changes.text {
            self.text = text;
        }
        if let Some(group_id) = changes.group_id {
            self.group_id = group_id;
        }
        if let Some(image) = changes.image {
            self.image = image.map(String::from);
        }
        if let Some(active) = changes.active {
            self.active = active;
        }
    }

    pub fn validate(&self) -> ServiceResult<()> {
        require_non_blank("title", &self.title)?;
        check_max_len("title", &self.title, TITLE_MAX_LEN)?;
        require_id("author_id", self.author_id)?;
        if let Some(group_id) = self.group_id {
            require_id("group_id", group_id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    /// Derived from `text` when absent or blank
    #[serde(default)]
    pub title: Option<String>,
    pub text: String,
    pub author_id: i64,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl NewPost {
    pub fn new(author_id: i64, text: impl Into<String>) -> Self {
        Self {
            title: None,
            text: text.into(),
            author_id,
            group_id: None,
            image: None,
            active: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn in_group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }

    /// Resolve the title that will be written.
    pub fn normalize(&mut self) {
        let missing = self.title.as_deref().map_or(true, is_blank_title);
        if missing {
            self.title = Some(default_title(&self.text));
        }
    }

    /// Checks run after `normalize`, so a derived title is held to the same
    /// limits as a supplied one.
    pub fn validate(&self) -> ServiceResult<()> {
        let title = self.title.as_deref().unwrap_or_default();
        require_non_blank("title", title)?;
        check_max_len("title", title, TITLE_MAX_LEN)?;
        require_id("author_id", self.author_id)?;
        if let Some(group_id) = self.group_id {
            require_id("group_id", group_id)?;
        }
        Ok(())
    }
}

/// Partial post update. `pub_date` and `author_id` are not updatable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostChanges {
    pub title: Option<String>,
    pub text: Option<String>,
    /// `Some(None)` detaches the post from its group
    pub group_id: Option<Option<i64>>,
    /// `Some(None)` removes the image reference
    pub image: Option<Option<ImageRef>>,
    pub active: Option<bool>,
}

// ============================================================================
// Comments
// ============================================================================

/// Comment on a post, listed newest first
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
    pub active: bool,
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.text.chars().take(COMMENT_PREVIEW_LEN).collect();
        write!(
            f,
            "Comment {}... from {}.",
            preview,
            self.created.format("%d.%m.%Y")
        )
    }
}

impl Comment {
    pub fn apply(&mut self, changes: CommentChanges) {
        if let Some(text) = changes.text {
            self.text = text;
        }
        if let Some(active) = changes.active {
            self.active = active;
        }
    }

    pub fn validate(&self) -> ServiceResult<()> {
        require_non_blank("comment text", &self.text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl NewComment {
    pub fn new(post_id: i64, author_id: i64, text: impl Into<String>) -> Self {
        Self {
            post_id,
            author_id,
            text: text.into(),
            active: true,
        }
    }

    pub fn validate(&self) -> ServiceResult<()> {
        require_id("post_id", self.post_id)?;
        require_id("author_id", self.author_id)?;
        require_non_blank("comment text", &self.text)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentChanges {
    pub text: Option<String>,
    pub active: Option<bool>,
}

// ============================================================================
// Follows
// ============================================================================

/// Directed subscription: `user_id` follows `author_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NewFollow {
    /// The follower
    pub user_id: i64,
    /// The followed account
    pub author_id: i64,
}

impl NewFollow {
    pub fn new(user_id: i64, author_id: i64) -> Self {
        Self { user_id, author_id }
    }

    pub fn validate(&self) -> ServiceResult<()> {
        require_id("user_id", self.user_id)?;
        require_id("author_id", self.author_id)
    }
}
