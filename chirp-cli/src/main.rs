use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use chirp_client::{ChirpClient, ChirpClientError, Comment, CommentWithAuthor, Post, PostWithAuthor, User};
use clap::{Parser, Subcommand};
use serde::Serialize;

const TOKEN_FILE: &str = ".chirp_token";
const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "chirp-cli", version, about = "CLI клиент для chirp-server")]
struct Cli {
    /// Адрес HTTP-сервера.
    #[arg(long, global = true, env = "CHIRP_SERVER")]
    server: Option<String>,

    /// JWT-токен сессии (иначе берётся из .chirp_token).
    #[arg(long, global = true, env = "CHIRP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Печатать ответы сервера как JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Сохранить токен из --token или CHIRP_TOKEN в .chirp_token.
    Login,
    /// Удалить сохранённый токен.
    Logout,
    /// Лента последних постов.
    Feed,
    /// Посты одного автора.
    UserPosts {
        #[arg(long)]
        user_id: String,
    },
    /// Пост по id вместе с комментариями.
    Show {
        #[arg(long)]
        id: i64,
    },
    /// Комментарий по id.
    ShowComment {
        #[arg(long)]
        id: i64,
    },
    /// Создание поста (требует токен).
    Post {
        #[arg(long)]
        content: String,
        #[arg(long)]
        emoji: Option<String>,
    },
    /// Комментарий к посту (требует токен).
    Comment {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        content: String,
    },
    /// Удаление своего поста (требует токен).
    Delete {
        #[arg(long)]
        id: i64,
        /// Ваш user id; должен совпадать с владельцем токена.
        #[arg(long)]
        author_id: String,
    },
    /// Удаление своего комментария (требует токен).
    DeleteComment {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        author_id: String,
    },
    /// Профиль по имени пользователя.
    Profile {
        #[arg(long)]
        username: String,
    },
    /// Профиль по user id.
    ProfileId {
        #[arg(long)]
        user_id: String,
    },
    /// Обновление описания своего профиля (требует токен).
    SetDescription {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        description: String,
    },
    /// Обновление фонового изображения своего профиля (требует токен).
    SetBackground {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        url: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let server = normalize_server(cli.server.unwrap_or_else(|| DEFAULT_SERVER.to_string()));
    let mut client = ChirpClient::new(server).map_err(map_client_error)?;

    let token = match cli.token.as_deref().and_then(parse_token_content) {
        Some(token) => Some(token),
        None => load_token().context("не удалось прочитать .chirp_token")?,
    };
    if let Some(token) = token {
        client.set_token(token);
    }

    let output = Output { json: cli.json };

    match cli.command {
        Command::Login => {
            let token = client
                .get_token()
                .context("передайте токен через --token или CHIRP_TOKEN")?;
            fs::write(TOKEN_FILE, token).context("не удалось сохранить токен")?;
            println!("Токен сохранён в {TOKEN_FILE}");
        }
        Command::Logout => {
            remove_token().context("не удалось удалить токен")?;
            println!("Токен удалён");
        }
        Command::Feed => {
            let feed = client.list_posts().await.map_err(map_client_error)?;
            output.feed("Лента", &feed)?;
        }
        Command::UserPosts { user_id } => {
            let posts = client
                .list_user_posts(&user_id)
                .await
                .map_err(map_client_error)?;
            output.feed(&format!("Посты пользователя {user_id}"), &posts)?;
        }
        Command::Show { id } => {
            let found = client.get_post(id).await.map_err(map_client_error)?;
            match found.first() {
                Some(entry) => output.post_with_author(entry)?,
                None => println!("Пост не найден: id={id}"),
            }
        }
        Command::ShowComment { id } => {
            let comment = client.get_comment(id).await.map_err(map_client_error)?;
            output.comment_with_author(&comment)?;
        }
        Command::Post { content, emoji } => {
            let post = client
                .create_post(&content, emoji.as_deref())
                .await
                .map_err(map_client_error)?;
            output.post("Пост создан", &post)?;
        }
        Command::Comment { post_id, content } => {
            let comment = client
                .add_comment(post_id, &content)
                .await
                .map_err(map_client_error)?;
            output.comment("Комментарий добавлен", &comment)?;
        }
        Command::Delete { id, author_id } => {
            let deleted = client
                .delete_post(id, &author_id)
                .await
                .map_err(map_client_error)?;
            println!(
                "Пост удалён: id={}, комментариев удалено: {}",
                deleted.post_id, deleted.deleted_comments
            );
        }
        Command::DeleteComment { id, author_id } => {
            client
                .delete_comment(id, &author_id)
                .await
                .map_err(map_client_error)?;
            println!("Комментарий удалён: id={id}");
        }
        Command::Profile { username } => {
            let user = client
                .get_profile_by_username(&username)
                .await
                .map_err(map_client_error)?;
            output.user("Профиль", &user)?;
        }
        Command::ProfileId { user_id } => {
            let user = client
                .get_profile(&user_id)
                .await
                .map_err(map_client_error)?;
            output.user("Профиль", &user)?;
        }
        Command::SetDescription {
            user_id,
            description,
        } => {
            let user = client
                .update_description(&user_id, &description)
                .await
                .map_err(map_client_error)?;
            output.user("Описание обновлено", &user)?;
        }
        Command::SetBackground { user_id, url } => {
            let user = client
                .update_background(&user_id, &url)
                .await
                .map_err(map_client_error)?;
            output.user("Фон обновлён", &user)?;
        }
    }

    Ok(())
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn remove_token() -> io::Result<()> {
    match fs::remove_file(TOKEN_FILE) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn map_client_error(err: ChirpClientError) -> anyhow::Error {
    let message = match err {
        ChirpClientError::Unauthorized => {
            "требуется авторизация: передайте --token, задайте CHIRP_TOKEN или выполните `chirp-cli --token ... login`"
                .to_string()
        }
        ChirpClientError::Forbidden(message) => format!("нет прав на операцию: {message}"),
        ChirpClientError::NotFound(message) => format!("ресурс не найден: {message}"),
        ChirpClientError::RateLimited {
            retry_after_secs: Some(secs),
            ..
        } => format!("слишком много запросов, повторите через {secs} с"),
        ChirpClientError::RateLimited { message, .. } => {
            format!("слишком много запросов: {message}")
        }
        ChirpClientError::InvalidRequest {
            message,
            field: Some(field),
        } => format!("некорректный запрос ({field}): {message}"),
        ChirpClientError::InvalidRequest { message, .. } => {
            format!("некорректный запрос: {message}")
        }
        ChirpClientError::Server(message) => format!("ошибка сервера: {message}"),
        ChirpClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

struct Output {
    json: bool,
}

impl Output {
    fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn feed(&self, title: &str, feed: &[PostWithAuthor]) -> Result<()> {
        if self.json {
            return self.print_json(&feed);
        }

        println!("{title}: {} пост(ов)", feed.len());
        for entry in feed {
            println!(
                "- [{}] {} @{}: {} (комментариев: {})",
                entry.post.id,
                entry.post.emoji,
                entry.author.username,
                entry.post.content,
                entry.post.comments.len()
            );
        }
        Ok(())
    }

    fn post_with_author(&self, entry: &PostWithAuthor) -> Result<()> {
        if self.json {
            return self.print_json(entry);
        }

        println!("Пост");
        println!("id: {}", entry.post.id);
        println!("author: @{} ({})", entry.author.username, entry.post.author_id);
        println!("emoji: {}", entry.post.emoji);
        println!("content: {}", entry.post.content);
        println!("created_at: {}", entry.post.created_at);
        println!("comments: {}", entry.post.comments.len());
        for comment in &entry.post.comments {
            println!(
                "  - [{}] @{}: {}",
                comment.id, comment.comment_author.username, comment.content
            );
        }
        Ok(())
    }

    fn comment_with_author(&self, comment: &CommentWithAuthor) -> Result<()> {
        if self.json {
            return self.print_json(comment);
        }

        println!("Комментарий");
        println!("id: {}", comment.id);
        println!("post_id: {}", comment.post_id);
        println!("author: @{} ({})", comment.comment_author.username, comment.author_id);
        println!("content: {}", comment.content);
        println!("created_at: {}", comment.created_at);
        Ok(())
    }

    fn post(&self, title: &str, post: &Post) -> Result<()> {
        if self.json {
            return self.print_json(post);
        }

        println!("{title}");
        println!("id: {}", post.id);
        println!("author_id: {}", post.author_id);
        println!("emoji: {}", post.emoji);
        println!("content: {}", post.content);
        println!("created_at: {}", post.created_at);
        Ok(())
    }

    fn comment(&self, title: &str, comment: &Comment) -> Result<()> {
        if self.json {
            return self.print_json(comment);
        }

        println!("{title}");
        println!("id: {}", comment.id);
        println!("post_id: {}", comment.post_id);
        println!("author_id: {}", comment.author_id);
        println!("content: {}", comment.content);
        println!("created_at: {}", comment.created_at);
        Ok(())
    }

    fn user(&self, title: &str, user: &User) -> Result<()> {
        if self.json {
            return self.print_json(user);
        }

        println!("{title}");
        println!("id: {}", user.id);
        println!("username: {}", user.username);
        println!("profile_picture: {}", user.profile_picture);
        println!("description: {}", user.description.as_deref().unwrap_or("-"));
        println!("background_img: {}", user.background_img.as_deref().unwrap_or("-"));
        Ok(())
    }
}
