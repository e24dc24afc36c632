use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичный профиль пользователя.
pub struct User {
    /// Идентификатор пользователя у провайдера идентификации.
    pub id: String,
    /// Имя пользователя.
    pub username: String,
    /// URL аватара.
    pub profile_picture: String,
    /// Описание профиля.
    pub description: Option<String>,
    /// URL фонового изображения.
    pub background_img: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Пост в ленте.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Идентификатор автора.
    pub author_id: String,
    /// Текст поста.
    pub content: String,
    /// Эмодзи поста.
    pub emoji: String,
    /// Время создания.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Комментарий к посту.
pub struct Comment {
    /// Идентификатор комментария.
    pub id: i64,
    /// Идентификатор поста.
    pub post_id: i64,
    /// Идентификатор автора комментария.
    pub author_id: String,
    /// Текст комментария.
    pub content: String,
    /// Время создания.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Комментарий вместе с профилем его автора.
pub struct CommentWithAuthor {
    /// Идентификатор комментария.
    pub id: i64,
    /// Идентификатор поста.
    pub post_id: i64,
    /// Идентификатор автора комментария.
    pub author_id: String,
    /// Текст комментария.
    pub content: String,
    /// Время создания.
    pub created_at: DateTime<Utc>,
    /// Профиль автора комментария.
    pub comment_author: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Пост с комментариями (новые комментарии первыми).
pub struct EnrichedPost {
    /// Идентификатор поста.
    pub id: i64,
    /// Идентификатор автора.
    pub author_id: String,
    /// Текст поста.
    pub content: String,
    /// Эмодзи поста.
    pub emoji: String,
    /// Время создания.
    pub created_at: DateTime<Utc>,
    /// Комментарии к посту.
    pub comments: Vec<CommentWithAuthor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Элемент ленты: пост и профиль его автора.
pub struct PostWithAuthor {
    /// Пост с комментариями.
    pub post: EnrichedPost,
    /// Профиль автора поста.
    pub author: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Результат удаления поста.
pub struct DeletedPost {
    /// Идентификатор удалённого поста.
    pub post_id: i64,
    /// Сколько комментариев удалено вместе с постом.
    pub deleted_comments: u64,
}
