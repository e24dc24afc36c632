use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use crate::data::post_repository::{NewComment, NewPost, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Comment, Post};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_comments(&self, rows: Vec<PostRow>) -> Result<Vec<Post>, DomainError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let comment_rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, author_id, content, created_at
            FROM comments
            WHERE post_id = ANY($1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(&post_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        let mut by_post: HashMap<i64, Vec<Comment>> = HashMap::new();
        for row in comment_rows {
            let comment = map_row_to_comment(row)?;
            by_post.entry(comment.post_id).or_default().push(comment);
        }

        rows.into_iter()
            .map(|row| {
                let comments = by_post.remove(&row.id).unwrap_or_default();
                map_row_to_post(row).map(|post| post.with_comments(comments))
            })
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    author_id: String,
    content: String,
    emoji: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: String,
    content: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_recent(&self, limit: i64) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, content, emoji, created_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        self.attach_comments(rows).await
    }

    async fn list_by_author(&self, author_id: &str, limit: i64) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, content, emoji, created_at
            FROM posts
            WHERE author_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        self.attach_comments(rows).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, content, emoji, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        match row {
            Some(row) => Ok(self.attach_comments(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (author_id, content, emoji)
            VALUES ($1, $2, $3)
            RETURNING id, author_id, content, emoji, created_at
            "#,
        )
        .bind(&input.author_id)
        .bind(&input.content)
        .bind(&input.emoji)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (post_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, content, created_at
            "#,
        )
        .bind(input.post_id)
        .bind(&input.author_id)
        .bind(&input.content)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        map_row_to_comment(row)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, author_id, content, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_comment).transpose()
    }

    async fn delete_post_owned(
        &self,
        post_id: i64,
        owner_id: &str,
    ) -> Result<Option<u64>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        // Row lock also blocks concurrent comment inserts on this post (FK check).
        let locked = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM posts
            WHERE id = $1 AND author_id = $2
            FOR UPDATE
            "#,
        )
        .bind(post_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_post_db_error)?;

        if locked.is_none() {
            tx.rollback().await.map_err(map_post_db_error)?;
            return Ok(None);
        }

        let comments = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE post_id = $1
            "#,
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await
        .map_err(map_post_db_error)?;

        let post = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await
        .map_err(map_post_db_error)?;

        if post.rows_affected() != 1 {
            return Err(DomainError::Unexpected(format!(
                "post {post_id} vanished while locked"
            )));
        }

        tx.commit().await.map_err(map_post_db_error)?;
        debug!(
            post_id,
            deleted_comments = comments.rows_affected(),
            "post deleted with comments"
        );
        Ok(Some(comments.rows_affected()))
    }

    async fn delete_comment_owned(
        &self,
        comment_id: i64,
        owner_id: &str,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    Post::new(row.id, row.author_id, row.content, row.emoji, row.created_at)
        .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_row_to_comment(row: CommentRow) -> Result<Comment, DomainError> {
    Comment::new(
        row.id,
        row.post_id,
        row.author_id,
        row.content,
        row.created_at,
    )
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("post".to_string());
    }
    DomainError::Unexpected(err.to_string())
}
