use reqwest::{Client, Method, RequestBuilder, Response, Url, header::RETRY_AFTER};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{ChirpClientError, ChirpClientResult, ErrorPayload};
use crate::models::{Comment, CommentWithAuthor, DeletedPost, Post, PostWithAuthor, User};

#[derive(Debug, Serialize)]
struct CreatePostRequestDto<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    emoji: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct AddCommentRequestDto<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateDescriptionRequestDto<'a> {
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateBackgroundRequestDto<'a> {
    background_img: &'a str,
}

#[derive(Serialize)]
struct AuthorQuery<'a> {
    author_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    code: Option<String>,
    error: Option<String>,
    field: Option<String>,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API `chirp-server`.
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера.
    pub fn new(base_url: impl Into<String>) -> ChirpClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Собирает URL из сегментов пути; каждый сегмент кодируется целиком,
    /// поэтому `/`, `?` и `..` в идентификаторах не меняют маршрут.
    fn url(&self, segments: &[&str]) -> ChirpClientResult<Url> {
        let invalid = |message: String| ChirpClientError::InvalidRequest {
            message,
            field: None,
        };

        let mut url = Url::parse(&self.base_url)
            .map_err(|err| invalid(format!("invalid server url {}: {err}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| invalid(format!("server url {} cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&str>,
    ) -> ChirpClientResult<RequestBuilder> {
        let request = self.client.request(method, self.url(segments)?);
        Ok(match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn decode_error(response: Response) -> ChirpClientError {
        let status = response.status();
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());

        let payload = match response.json::<ErrorResponseDto>().await {
            Ok(body) => ErrorPayload {
                code: body.code,
                message: body.error,
                field: body.field,
                retry_after_secs,
            },
            Err(_) => ErrorPayload {
                retry_after_secs,
                ..ErrorPayload::default()
            },
        };
        ChirpClientError::from_http_status(status, payload)
    }

    /// Отправляет запрос и превращает неуспешный статус в `ChirpClientError`.
    async fn execute(&self, request: RequestBuilder) -> ChirpClientResult<Response> {
        let response = request
            .send()
            .await
            .map_err(ChirpClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    /// универсальный helper для запросов с json-ответом
    async fn fetch_json<TRes>(&self, request: RequestBuilder) -> ChirpClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        self.execute(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(ChirpClientError::from_reqwest)
    }

    /// Возвращает ленту: последние посты с авторами и комментариями.
    pub async fn list_posts(&self) -> ChirpClientResult<Vec<PostWithAuthor>> {
        self.fetch_json(self.request(Method::GET, &["api", "posts"], None)?)
            .await
    }

    /// Возвращает посты одного автора.
    pub async fn list_user_posts(&self, user_id: &str) -> ChirpClientResult<Vec<PostWithAuthor>> {
        let segments = ["api", "users", user_id, "posts"];
        self.fetch_json(self.request(Method::GET, &segments, None)?)
            .await
    }

    /// Получает пост по идентификатору.
    ///
    /// Сервер возвращает массив из нуля или одного элемента.
    pub async fn get_post(&self, post_id: i64) -> ChirpClientResult<Vec<PostWithAuthor>> {
        let post_id = post_id.to_string();
        self.fetch_json(self.request(Method::GET, &["api", "posts", post_id.as_str()], None)?)
            .await
    }

    /// Получает комментарий вместе с автором.
    pub async fn get_comment(&self, comment_id: i64) -> ChirpClientResult<CommentWithAuthor> {
        let comment_id = comment_id.to_string();
        self.fetch_json(self.request(Method::GET, &["api", "comments", comment_id.as_str()], None)?)
            .await
    }

    /// Создаёт пост от имени владельца токена.
    ///
    /// Требует валидный JWT-токен.
    pub async fn create_post(
        &self,
        token: &str,
        content: &str,
        emoji: Option<&str>,
    ) -> ChirpClientResult<Post> {
        let payload = CreatePostRequestDto { content, emoji };
        let request = self
            .request(Method::POST, &["api", "posts"], Some(token))?
            .json(&payload);
        self.fetch_json(request).await
    }

    /// Добавляет комментарий к посту.
    ///
    /// Требует валидный JWT-токен.
    pub async fn add_comment(
        &self,
        token: &str,
        post_id: i64,
        content: &str,
    ) -> ChirpClientResult<Comment> {
        let post_id = post_id.to_string();
        let request = self
            .request(Method::POST, &["api", "posts", post_id.as_str(), "comments"], Some(token))?
            .json(&AddCommentRequestDto { content });
        self.fetch_json(request).await
    }

    /// Удаляет пост вместе с комментариями.
    ///
    /// `author_id` должен совпадать с владельцем токена.
    pub async fn delete_post(
        &self,
        token: &str,
        post_id: i64,
        author_id: &str,
    ) -> ChirpClientResult<DeletedPost> {
        let post_id = post_id.to_string();
        let request = self
            .request(Method::DELETE, &["api", "posts", post_id.as_str()], Some(token))?
            .query(&AuthorQuery { author_id });
        self.fetch_json(request).await
    }

    /// Удаляет комментарий.
    ///
    /// `author_id` должен совпадать с владельцем токена.
    pub async fn delete_comment(
        &self,
        token: &str,
        comment_id: i64,
        author_id: &str,
    ) -> ChirpClientResult<()> {
        let comment_id = comment_id.to_string();
        let request = self
            .request(Method::DELETE, &["api", "comments", comment_id.as_str()], Some(token))?
            .query(&AuthorQuery { author_id });
        self.execute(request).await?;
        Ok(())
    }

    /// Ищет профиль по точному имени пользователя.
    pub async fn get_profile_by_username(&self, username: &str) -> ChirpClientResult<User> {
        let segments = ["api", "profiles", "by-username", username];
        self.fetch_json(self.request(Method::GET, &segments, None)?)
            .await
    }

    /// Получает профиль по идентификатору пользователя.
    pub async fn get_profile(&self, user_id: &str) -> ChirpClientResult<User> {
        self.fetch_json(self.request(Method::GET, &["api", "profiles", user_id], None)?)
            .await
    }

    /// Обновляет описание профиля. Остальные поля профиля сохраняются.
    pub async fn update_description(
        &self,
        token: &str,
        user_id: &str,
        description: &str,
    ) -> ChirpClientResult<User> {
        let segments = ["api", "profiles", user_id, "description"];
        let request = self
            .request(Method::PUT, &segments, Some(token))?
            .json(&UpdateDescriptionRequestDto { description });
        self.fetch_json(request).await
    }

    /// Обновляет фоновое изображение профиля. Остальные поля профиля сохраняются.
    pub async fn update_background(
        &self,
        token: &str,
        user_id: &str,
        background_img: &str,
    ) -> ChirpClientResult<User> {
        let segments = ["api", "profiles", user_id, "background"];
        let request = self
            .request(Method::PUT, &segments, Some(token))?
            .json(&UpdateBackgroundRequestDto { background_img });
        self.fetch_json(request).await
    }
}
