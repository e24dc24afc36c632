//! Joins post store rows with identity provider users.
//!
//! Authors are fetched in bulk (one call per [`MAX_USER_LIST_LIMIT`] distinct
//! ids) and merged in memory. A row whose author cannot be resolved fails the
//! whole batch.

use std::collections::{HashMap, HashSet};

use tracing::error;

use crate::data::identity_provider::{IdentityProvider, MAX_USER_LIST_LIMIT};
use crate::domain::error::DomainError;
use crate::domain::post::{Comment, Post};
use crate::domain::user::UserView;
use crate::domain::view::{CommentWithAuthor, EnrichedPost, PostWithAuthor};

pub(crate) type AuthorIndex = HashMap<String, UserView>;

pub(crate) async fn enrich_posts<I>(
    identity: &I,
    posts: Vec<Post>,
) -> Result<Vec<PostWithAuthor>, DomainError>
where
    I: IdentityProvider + ?Sized,
{
    let author_ids = collect_author_ids(&posts);
    let authors = fetch_authors(identity, &author_ids).await?;
    join_posts(posts, &authors)
}

pub(crate) async fn enrich_comment<I>(
    identity: &I,
    comment: Comment,
) -> Result<CommentWithAuthor, DomainError>
where
    I: IdentityProvider + ?Sized,
{
    let authors = fetch_authors(identity, std::slice::from_ref(&comment.author_id)).await?;
    join_comment(comment, &authors)
}

/// Distinct author ids of posts and their comments, in first-seen order.
pub(crate) fn collect_author_ids(posts: &[Post]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    let all_ids = posts.iter().flat_map(|post| {
        std::iter::once(&post.author_id).chain(post.comments.iter().map(|c| &c.author_id))
    });
    for id in all_ids {
        if seen.insert(id.as_str()) {
            ids.push(id.clone());
        }
    }
    ids
}

pub(crate) async fn fetch_authors<I>(
    identity: &I,
    author_ids: &[String],
) -> Result<AuthorIndex, DomainError>
where
    I: IdentityProvider + ?Sized,
{
    let mut authors = AuthorIndex::with_capacity(author_ids.len());

    for chunk in author_ids.chunks(MAX_USER_LIST_LIMIT) {
        let users = identity.get_user_list(chunk, MAX_USER_LIST_LIMIT).await?;
        for user in users {
            // Users without a username cannot be shown; the row referencing
            // them fails below as unresolved.
            if let Ok(view) = UserView::try_from(user) {
                authors.insert(view.id.clone(), view);
            }
        }
    }

    Ok(authors)
}

pub(crate) fn join_posts(
    posts: Vec<Post>,
    authors: &AuthorIndex,
) -> Result<Vec<PostWithAuthor>, DomainError> {
    posts
        .into_iter()
        .map(|mut post| {
            let author = resolve(authors, format!("post {}", post.id), &post.author_id)?;
            let comments = std::mem::take(&mut post.comments)
                .into_iter()
                .map(|comment| join_comment(comment, authors))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(PostWithAuthor {
                post: EnrichedPost::from_post(post, comments),
                author,
            })
        })
        .collect()
}

fn join_comment(comment: Comment, authors: &AuthorIndex) -> Result<CommentWithAuthor, DomainError> {
    let comment_author = resolve(authors, format!("comment {}", comment.id), &comment.author_id)?;
    Ok(CommentWithAuthor {
        comment,
        comment_author,
    })
}

fn resolve(authors: &AuthorIndex, record: String, author_id: &str) -> Result<UserView, DomainError> {
    match authors.get(author_id) {
        Some(author) => Ok(author.clone()),
        None => {
            error!(%record, author_id, "author not found");
            Err(DomainError::AuthorNotFound {
                record,
                author_id: author_id.to_string(),
            })
        }
    }
}
