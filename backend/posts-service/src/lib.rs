//! Persistent data model for groups, posts, comments and follows.
//!
//! Write-time rules live next to the records in [`domain`]; storage-level
//! rules (cascades, set-null, the follow uniqueness constraint) are part of
//! the embedded migrations in [`db`].

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod repository;

pub use domain::{
    Comment, CommentChanges, Follow, Group, GroupChanges, ImageRef, NewComment, NewFollow,
    NewGroup, NewPost, NewUser, Post, PostChanges, User,
};
pub use error::{ServiceError, ServiceResult};
pub use repository::PostsStore;
