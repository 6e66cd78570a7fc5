pub mod comments;
pub mod follows;
pub mod groups;
pub mod posts;
pub mod users;

pub use comments::CommentRepository;
pub use follows::FollowRepository;
pub use groups::GroupRepository;
pub use posts::PostRepository;
pub use users::UserRepository;

use sqlx::PgPool;

/// All repositories over one shared pool
#[derive(Clone)]
pub struct PostsStore {
    pub users: UserRepository,
    pub groups: GroupRepository,
    pub posts: PostRepository,
    pub comments: CommentRepository,
    pub follows: FollowRepository,
}

impl PostsStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            groups: GroupRepository::new(pool.clone()),
            posts: PostRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            follows: FollowRepository::new(pool),
        }
    }
}
