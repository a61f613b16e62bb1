use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use teloxide::types::{ChatAction, ChatId, ParseMode};
use tracing::debug;

use crate::platform::Messenger;

#[derive(Debug, Serialize)]
struct SendMessageForm<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: ParseMode,
}

#[derive(Debug, Serialize)]
struct SendPhotoForm<'a> {
    chat_id: i64,
    photo: &'a str,
    caption: &'a str,
}

#[derive(Debug, Serialize)]
struct SendChatActionForm {
    chat_id: i64,
    action: ChatAction,
}

/// Form-encoded client for the Telegram Bot API.
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(client: reqwest::Client, api_base_url: &str, token: &str) -> Self {
        Self {
            client,
            base_url: api_base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<F: Serialize + ?Sized>(&self, method: &str, form: &F) -> Result<()> {
        // The URL embeds the token; log the method only.
        debug!("Calling Telegram {}", method);

        let response = self
            .client
            .post(self.method_url(method))
            .form(form)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Failed to send Telegram {} request", method))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telegram {} error ({}): {}", method, status, error_body);
        }

        Ok(())
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let form = SendMessageForm {
            chat_id: chat_id.0,
            text,
            parse_mode: ParseMode::Html,
        };
        self.call("sendMessage", &form).await
    }

    async fn send_photo(&self, chat_id: ChatId, photo_url: &str, caption: &str) -> Result<()> {
        let form = SendPhotoForm {
            chat_id: chat_id.0,
            photo: photo_url,
            caption,
        };
        self.call("sendPhoto", &form).await
    }

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()> {
        let form = SendChatActionForm {
            chat_id: chat_id.0,
            action,
        };
        self.call("sendChatAction", &form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> TelegramClient {
        TelegramClient::new(reqwest::Client::new(), &server.url(), "123:abc")
    }

    fn form(fields: &[(&str, &str)]) -> Matcher {
        Matcher::AllOf(
            fields
                .iter()
                .map(|(k, v)| Matcher::UrlEncoded(k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_method_url_strips_trailing_slash() {
        let client = TelegramClient::new(reqwest::Client::new(), "https://api.telegram.org/", "t0k");
        assert_eq!(
            client.method_url("sendMessage"),
            "https://api.telegram.org/bott0k/sendMessage"
        );
    }

    #[tokio::test]
    async fn test_send_message_posts_html_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(form(&[
                ("chat_id", "42"),
                ("text", "Привет! 😊"),
                ("parse_mode", "HTML"),
            ]))
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        client(&server)
            .send_message(ChatId(42), "Привет! 😊")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_photo_posts_url_and_caption() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:abc/sendPhoto")
            .match_body(form(&[
                ("chat_id", "-1001"),
                ("photo", "https://example.com/a.jpg?w=800&h=1200"),
                ("caption", "Держи фотографию! 😉"),
            ]))
            .with_status(200)
            .create_async()
            .await;

        client(&server)
            .send_photo(
                ChatId(-1001),
                "https://example.com/a.jpg?w=800&h=1200",
                "Держи фотографию! 😉",
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_chat_action_uses_snake_case_action() {
        let mut server = mockito::Server::new_async().await;
        let typing = server
            .mock("POST", "/bot123:abc/sendChatAction")
            .match_body(form(&[("chat_id", "7"), ("action", "typing")]))
            .with_status(200)
            .create_async()
            .await;
        let upload = server
            .mock("POST", "/bot123:abc/sendChatAction")
            .match_body(form(&[("chat_id", "7"), ("action", "upload_photo")]))
            .with_status(200)
            .create_async()
            .await;

        let client = client(&server);
        client
            .send_chat_action(ChatId(7), ChatAction::Typing)
            .await
            .unwrap();
        client
            .send_chat_action(ChatId(7), ChatAction::UploadPhoto)
            .await
            .unwrap();

        typing.assert_async().await;
        upload.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(403)
            .with_body(r#"{"ok":false,"description":"Forbidden: bot was blocked by the user"}"#)
            .create_async()
            .await;

        let err = client(&server)
            .send_message(ChatId(42), "hi")
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("sendMessage"));
        assert!(message.contains("403"));
        assert!(message.contains("blocked"));
    }

    #[tokio::test]
    async fn test_unreachable_server_error_hides_token() {
        let client = TelegramClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1",
            "123456:SECRET-TOKEN",
        );
        let err = client
            .send_chat_action(ChatId(1), ChatAction::Typing)
            .await
            .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("sendChatAction"));
        assert!(!message.contains("SECRET-TOKEN"), "token leaked: {}", message);
    }
}
