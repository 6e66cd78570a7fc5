pub mod image;
pub mod models;
pub mod title;

pub use image::ImageRef;
pub use models::{
    Comment, CommentChanges, Follow, Group, GroupChanges, NewComment, NewFollow, NewGroup,
    NewPost, NewUser, Post, PostChanges, User,
};
pub use title::default_title;
