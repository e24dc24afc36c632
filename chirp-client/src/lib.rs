//! Клиентская библиотека для работы с chirp-server по HTTP.
//!
//! Предоставляет единый API (`ChirpClient`) для ленты постов, комментариев и
//! профилей. Клиент хранит JWT-токен сессии и автоматически использует его в
//! защищённых операциях.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{ChirpClientError, ChirpClientResult};
pub use http_client::HttpClient;
pub use models::{Comment, CommentWithAuthor, DeletedPost, EnrichedPost, Post, PostWithAuthor, User};

#[derive(Debug, Clone)]
/// Клиент chirp-server с хранимым токеном сессии.
pub struct ChirpClient {
    http_client: HttpClient,
    token: Option<String>,
}

impl ChirpClient {
    /// Создаёт клиент для сервера с базовым URL, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> ChirpClientResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Устанавливает JWT-токен сессии.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий JWT-токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый JWT-токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Лента: до 100 последних постов, новые первыми.
    pub async fn list_posts(&self) -> ChirpClientResult<Vec<PostWithAuthor>> {
        self.http_client.list_posts().await
    }

    /// Посты одного автора, новые первыми.
    pub async fn list_user_posts(&self, user_id: &str) -> ChirpClientResult<Vec<PostWithAuthor>> {
        self.http_client.list_user_posts(user_id).await
    }

    /// Пост по идентификатору: пустой список, если поста нет.
    pub async fn get_post(&self, post_id: i64) -> ChirpClientResult<Vec<PostWithAuthor>> {
        self.http_client.get_post(post_id).await
    }

    /// Комментарий по идентификатору вместе с автором.
    pub async fn get_comment(&self, comment_id: i64) -> ChirpClientResult<CommentWithAuthor> {
        self.http_client.get_comment(comment_id).await
    }

    /// Создаёт пост. Без `emoji` сервер подставит значение по умолчанию.
    ///
    /// Требует токен.
    pub async fn create_post(&self, content: &str, emoji: Option<&str>) -> ChirpClientResult<Post> {
        let token = self.require_token()?;
        self.http_client.create_post(token, content, emoji).await
    }

    /// Добавляет комментарий к посту.
    ///
    /// Требует токен.
    pub async fn add_comment(&self, post_id: i64, content: &str) -> ChirpClientResult<Comment> {
        let token = self.require_token()?;
        self.http_client.add_comment(token, post_id, content).await
    }

    /// Удаляет свой пост вместе со всеми комментариями.
    ///
    /// Требует токен; `author_id` должен совпадать с владельцем токена.
    pub async fn delete_post(&self, post_id: i64, author_id: &str) -> ChirpClientResult<DeletedPost> {
        let token = self.require_token()?;
        self.http_client.delete_post(token, post_id, author_id).await
    }

    /// Удаляет свой комментарий.
    ///
    /// Требует токен; `author_id` должен совпадать с владельцем токена.
    pub async fn delete_comment(&self, comment_id: i64, author_id: &str) -> ChirpClientResult<()> {
        let token = self.require_token()?;
        self.http_client
            .delete_comment(token, comment_id, author_id)
            .await
    }

    /// Профиль по точному имени пользователя.
    pub async fn get_profile_by_username(&self, username: &str) -> ChirpClientResult<User> {
        self.http_client.get_profile_by_username(username).await
    }

    /// Профиль по идентификатору пользователя.
    pub async fn get_profile(&self, user_id: &str) -> ChirpClientResult<User> {
        self.http_client.get_profile(user_id).await
    }

    /// Обновляет описание своего профиля.
    ///
    /// Требует токен.
    pub async fn update_description(
        &self,
        user_id: &str,
        description: &str,
    ) -> ChirpClientResult<User> {
        let token = self.require_token()?;
        self.http_client
            .update_description(token, user_id, description)
            .await
    }

    /// Обновляет фоновое изображение своего профиля.
    ///
    /// Требует токен.
    pub async fn update_background(
        &self,
        user_id: &str,
        background_img: &str,
    ) -> ChirpClientResult<User> {
        let token = self.require_token()?;
        self.http_client
            .update_background(token, user_id, background_img)
            .await
    }

    fn require_token(&self) -> ChirpClientResult<&str> {
        self.token.as_deref().ok_or(ChirpClientError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn protected_calls_without_token_fail_locally() {
        let client = ChirpClient::new("http://127.0.0.1:1").expect("client must build");

        let err = client
            .create_post("hello", None)
            .await
            .expect_err("must require token");
        assert!(matches!(err, ChirpClientError::Unauthorized));

        let err = client
            .delete_post(1, "user_a")
            .await
            .expect_err("must require token");
        assert!(matches!(err, ChirpClientError::Unauthorized));
    }

    #[test]
    fn token_can_be_replaced_and_cleared() {
        let mut client = ChirpClient::new("http://127.0.0.1:8080").expect("client must build");
        assert!(client.get_token().is_none());

        client.set_token("first");
        client.set_token("second");
        assert_eq!(client.get_token(), Some("second"));

        client.clear_token();
        assert!(client.get_token().is_none());
    }
}
