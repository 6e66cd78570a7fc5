//! Integration tests for write-time rules and storage constraints.
//!
//! Run with a reachable PostgreSQL:
//! `DATABASE_URL=postgres://... cargo test -p posts-service --test schema_rules_test -- --ignored`

mod common;

use common::{create_user, setup};
use posts_service::{
    CommentChanges, GroupChanges, ImageRef, NewComment, NewFollow, NewGroup, NewPost,
    PostChanges, ServiceError,
};
use serial_test::serial;

// ========== Title derivation ==========

#[tokio::test]
#[ignore]
#[serial]
async fn test_title_derived_from_first_four_words() {
    let store = setup().await;
    let author = create_user(&store, "leo").await;

    let post = store
        .posts
        .create_post(NewPost::new(author.id, "one two three four five"))
        .await
        .unwrap();
    assert_eq!(post.title, "one two three four...");

    let stored = store.posts.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "one two three four...");
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_title_from_short_and_empty_text() {
    let store = setup().await;
    let author = create_user(&store, "leo").await;

    let short = store
        .posts
        .create_post(NewPost::new(author.id, "hi").with_title(""))
        .await
        .unwrap();
    assert_eq!(short.title, "hi...");

    let empty = store
        .posts
        .create_post(NewPost::new(author.id, ""))
        .await
        .unwrap();
    assert_eq!(empty.title, "...");
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_title_not_recomputed_on_later_saves() {
    let store = setup().await;
    let author = create_user(&store, "leo").await;

    let post = store
        .posts
        .create_post(NewPost::new(author.id, "first body of the post"))
        .await
        .unwrap();

    let updated = store
        .posts
        .update_post(
            post.id,
            PostChanges {
                text: Some("completely different words now".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "first body of the...");
    assert_eq!(updated.text, "completely different words now");
    assert_eq!(updated.pub_date, post.pub_date);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_cleared_title_is_derived_again() {
    let store = setup().await;
    let author = create_user(&store, "leo").await;

    let post = store
        .posts
        .create_post(NewPost::new(author.id, "alpha beta").with_title("Named"))
        .await
        .unwrap();
    assert_eq!(post.title, "Named");

    let updated = store
        .posts
        .update_post(
            post.id,
            PostChanges {
                title: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "alpha beta...");
}

// ========== Follow uniqueness ==========

#[tokio::test]
#[ignore]
#[serial]
async fn test_duplicate_follow_is_rejected() {
    let store = setup().await;
    let reader = create_user(&store, "reader").await;
    let writer = create_user(&store, "writer").await;

    store
        .follows
        .create_follow(NewFollow::new(reader.id, writer.id))
        .await
        .unwrap();

    let err = store
        .follows
        .create_follow(NewFollow::new(reader.id, writer.id))
        .await
        .unwrap_err();
    match err {
        ServiceError::UniqueViolation { constraint } => {
            assert_eq!(constraint, "twice_follow_impossible")
        }
        other => panic!("expected uniqueness violation, got {:?}", other),
    }

    // The reverse direction is a different edge
    store
        .follows
        .create_follow(NewFollow::new(writer.id, reader.id))
        .await
        .unwrap();

    assert!(store.follows.is_following(reader.id, writer.id).await.unwrap());
    assert_eq!(store.follows.list_following(reader.id).await.unwrap().len(), 1);
    assert_eq!(store.follows.list_followers(reader.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_unfollow_then_follow_again() {
    let store = setup().await;
    let reader = create_user(&store, "reader").await;
    let writer = create_user(&store, "writer").await;

    store
        .follows
        .create_follow(NewFollow::new(reader.id, writer.id))
        .await
        .unwrap();
    assert!(store.follows.delete_follow(reader.id, writer.id).await.unwrap());
    assert!(!store.follows.delete_follow(reader.id, writer.id).await.unwrap());
    assert!(!store.follows.is_following(reader.id, writer.id).await.unwrap());

    store
        .follows
        .create_follow(NewFollow::new(reader.id, writer.id))
        .await
        .unwrap();
}

// ========== Cascade policy ==========

#[tokio::test]
#[ignore]
#[serial]
async fn test_deleting_group_detaches_posts() {
    let store = setup().await;
    let author = create_user(&store, "leo").await;
    let group = store
        .groups
        .create_group(NewGroup::new("Cats", "cats"))
        .await
        .unwrap();

    let post = store
        .posts
        .create_post(NewPost::new(author.id, "a cat post").in_group(group.id))
        .await
        .unwrap();
    assert_eq!(post.group_id, Some(group.id));
    assert_eq!(store.posts.list_posts_by_group(group.id).await.unwrap().len(), 1);

    assert!(store.groups.delete_group(group.id).await.unwrap());

    let survivor = store.posts.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(survivor.group_id, None);
    assert_eq!(survivor.title, post.title);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_deleting_user_removes_posts_comments_and_follows() {
    let store = setup().await;
    let doomed = create_user(&store, "doomed").await;
    let other = create_user(&store, "other").await;

    let own_post = store
        .posts
        .create_post(NewPost::new(doomed.id, "going away"))
        .await
        .unwrap();
    let other_post = store
        .posts
        .create_post(NewPost::new(other.id, "staying here"))
        .await
        .unwrap();
    let comment_on_own = store
        .comments
        .create_comment(NewComment::new(own_post.id, other.id, "bye"))
        .await
        .unwrap();
    let comment_by_doomed = store
        .comments
        .create_comment(NewComment::new(other_post.id, doomed.id, "hello"))
        .await
        .unwrap();
    store
        .follows
        .create_follow(NewFollow::new(doomed.id, other.id))
        .await
        .unwrap();
    store
        .follows
        .create_follow(NewFollow::new(other.id, doomed.id))
        .await
        .unwrap();

    assert!(store.users.delete_user(doomed.id).await.unwrap());

    assert!(store.posts.get_post(own_post.id).await.unwrap().is_none());
    assert!(store.posts.get_post(other_post.id).await.unwrap().is_some());
    assert!(store
        .comments
        .get_comment(comment_on_own.id)
        .await
        .unwrap()
        .is_none());
    assert!(store
        .comments
        .get_comment(comment_by_doomed.id)
        .await
        .unwrap()
        .is_none());
    assert!(store.follows.list_following(other.id).await.unwrap().is_empty());
    assert!(store.follows.list_followers(other.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_deleting_post_removes_its_comments() {
    let store = setup().await;
    let author = create_user(&store, "leo").await;
    let post = store
        .posts
        .create_post(NewPost::new(author.id, "short lived"))
        .await
        .unwrap();
    let comment = store
        .comments
        .create_comment(NewComment::new(post.id, author.id, "first!"))
        .await
        .unwrap();

    assert!(store.posts.delete_post(post.id).await.unwrap());
    assert!(store.comments.get_comment(comment.id).await.unwrap().is_none());
    assert!(store.users.get_user(author.id).await.unwrap().is_some());
}

// ========== Ordering ==========

#[tokio::test]
#[ignore]
#[serial]
async fn test_posts_listed_newest_first() {
    let store = setup().await;
    let author = create_user(&store, "leo").await;

    let mut ids = Vec::new();
    for text in ["first", "second", "third"] {
        let post = store
            .posts
            .create_post(NewPost::new(author.id, text))
            .await
            .unwrap();
        ids.push(post.id);
    }

    let listed: Vec<i64> = store
        .posts
        .list_posts(false)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    ids.reverse();
    assert_eq!(listed, ids);

    let by_author: Vec<i64> = store
        .posts
        .list_posts_by_author(author.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(by_author, ids);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_groups_listed_by_title() {
    let store = setup().await;
    for (title, slug) in [("Zebras", "zebras"), ("Apples", "apples"), ("Mangoes", "mangoes")] {
        store
            .groups
            .create_group(NewGroup::new(title, slug))
            .await
            .unwrap();
    }

    let titles: Vec<String> = store
        .groups
        .list_groups(false)
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.title)
        .collect();
    assert_eq!(titles, vec!["Apples", "Mangoes", "Zebras"]);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_comments_listed_newest_first() {
    let store = setup().await;
    let author = create_user(&store, "leo").await;
    let post = store
        .posts
        .create_post(NewPost::new(author.id, "discuss"))
        .await
        .unwrap();

    let older = store
        .comments
        .create_comment(NewComment::new(post.id, author.id, "older"))
        .await
        .unwrap();
    let newer = store
        .comments
        .create_comment(NewComment::new(post.id, author.id, "newer"))
        .await
        .unwrap();

    let listed: Vec<i64> = store
        .comments
        .list_comments_for_post(post.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(listed, vec![newer.id, older.id]);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_followed_posts_feed() {
    let store = setup().await;
    let reader = create_user(&store, "reader").await;
    let followed = create_user(&store, "followed").await;
    let stranger = create_user(&store, "stranger").await;

    store
        .follows
        .create_follow(NewFollow::new(reader.id, followed.id))
        .await
        .unwrap();
    let wanted = store
        .posts
        .create_post(NewPost::new(followed.id, "for my followers"))
        .await
        .unwrap();
    store
        .posts
        .create_post(NewPost::new(stranger.id, "not for the reader"))
        .await
        .unwrap();

    let feed = store.posts.list_followed_posts(reader.id).await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].id, wanted.id);
}

// ========== Rejections ==========

#[tokio::test]
#[ignore]
#[serial]
async fn test_unknown_group_is_reference_violation() {
    let store = setup().await;
    let author = create_user(&store, "leo").await;

    let err = store
        .posts
        .create_post(NewPost::new(author.id, "orphan").in_group(9999))
        .await
        .unwrap_err();
    assert!(err.is_reference_violation(), "got {:?}", err);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_unknown_author_is_reference_violation() {
    let store = setup().await;

    let err = store
        .posts
        .create_post(NewPost::new(4242, "nobody wrote this"))
        .await
        .unwrap_err();
    assert!(err.is_reference_violation(), "got {:?}", err);

    let err = store
        .follows
        .create_follow(NewFollow::new(4242, 4243))
        .await
        .unwrap_err();
    assert!(err.is_reference_violation(), "got {:?}", err);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_missing_author_is_validation_error() {
    let store = setup().await;

    let err = store
        .posts
        .create_post(NewPost::new(0, "no author"))
        .await
        .unwrap_err();
    assert!(err.is_validation(), "got {:?}", err);

    let err = store
        .comments
        .create_comment(NewComment::new(1, 1, ""))
        .await
        .unwrap_err();
    assert!(err.is_validation(), "got {:?}", err);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_duplicate_slug_is_rejected() {
    let store = setup().await;
    let first = store
        .groups
        .create_group(NewGroup::new("Cats", "cats"))
        .await
        .unwrap();
    let err = store
        .groups
        .create_group(NewGroup::new("More cats", "cats"))
        .await
        .unwrap_err();
    assert!(err.is_unique_violation(), "got {:?}", err);

    let found = store.groups.get_group_by_slug("cats").await.unwrap().unwrap();
    assert_eq!(found.id, first.id);
}

// ========== Updates ==========

#[tokio::test]
#[ignore]
#[serial]
async fn test_group_update_and_active_filter() {
    let store = setup().await;
    let group = store
        .groups
        .create_group(NewGroup::new("Cats", "cats"))
        .await
        .unwrap();

    let hidden = store
        .groups
        .update_group(
            group.id,
            GroupChanges {
                description: Some("All about cats".to_string()),
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(hidden.description, "All about cats");
    assert!(!hidden.active);

    assert!(store.groups.list_groups(true).await.unwrap().is_empty());
    assert_eq!(store.groups.list_groups(false).await.unwrap().len(), 1);

    let err = store
        .groups
        .update_group(9999, GroupChanges::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_post_image_and_group_changes() {
    let store = setup().await;
    let author = create_user(&store, "leo").await;
    let group = store
        .groups
        .create_group(NewGroup::new("Cats", "cats"))
        .await
        .unwrap();

    let post = store
        .posts
        .create_post(
            NewPost::new(author.id, "with picture")
                .in_group(group.id)
                .with_image(ImageRef::new("cat.png").unwrap()),
        )
        .await
        .unwrap();
    assert_eq!(post.image.as_deref(), Some("posts/cat.png"));

    let updated = store
        .posts
        .update_post(
            post.id,
            PostChanges {
                group_id: Some(None),
                image: Some(None),
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.group_id, None);
    assert_eq!(updated.image, None);
    assert!(!updated.active);
    assert!(store.posts.list_posts(true).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_comment_update() {
    let store = setup().await;
    let author = create_user(&store, "leo").await;
    let post = store
        .posts
        .create_post(NewPost::new(author.id, "discuss"))
        .await
        .unwrap();
    let comment = store
        .comments
        .create_comment(NewComment::new(post.id, author.id, "typo"))
        .await
        .unwrap();

    let fixed = store
        .comments
        .update_comment(
            comment.id,
            CommentChanges {
                text: Some("fixed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(fixed.text, "fixed");
    assert_eq!(fixed.created, comment.created);
    assert_eq!(
        store
            .comments
            .list_comments_by_author(author.id)
            .await
            .unwrap()
            .len(),
        1
    );
}
