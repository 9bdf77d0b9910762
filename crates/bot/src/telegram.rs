//! Telegram Bot API adapter.
//!
//! Implements [`Messenger`] over the HTTPS Bot API and feeds incoming updates
//! into a [`BlockCommandHandler`] via long polling (`getUpdates`). Each command
//! is handled on its own task, so slow generations never block the update feed.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use flowchart::{ChatId, MessageId, UserId};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::task::{JoinError, JoinSet};

use crate::{
    parse_block_command, BlockCommandHandler, CommandOutcome, IncomingMessage, Messenger,
    MessengerError, Photo, SentMessage,
};

/// Long-poll timeout passed to `getUpdates`.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Pause after a failed `getUpdates` before polling again.
const POLL_ERROR_DELAY: Duration = Duration::from_secs(3);

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> Envelope<T> {
    fn into_result(self, method: &'static str) -> Result<T, MessengerError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(MessengerError::Api {
                method,
                description: self
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}

/// One entry of the `getUpdates` feed.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update id; the next poll starts after the last one seen.
    pub update_id: i64,
    #[serde(default)]
    message: Option<WireMessage>,
}

impl Update {
    /// The text message carried by this update, if any.
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        let message = self.message?;
        Some(IncomingMessage {
            chat_id: ChatId::new(message.chat.id),
            message_id: MessageId::new(message.message_id),
            user_id: UserId::new(message.from?.id),
            text: message.text?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct WireMessage {
    message_id: i64,
    chat: WireChat,
    #[serde(default)]
    from: Option<WireUser>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct WireChat {
    id: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct WireUser {
    id: i64,
}

#[derive(Debug, Serialize)]
struct ReplyParameters {
    message_id: MessageId,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Minimal Telegram Bot API client.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base: String,
}

impl TelegramClient {
    /// Creates a client for the bot identified by `token`.
    ///
    /// `api_base` is normally `https://api.telegram.org`; a local Bot API
    /// server can be used instead.
    pub fn new(http: reqwest::Client, api_base: &str, token: &str) -> Self {
        Self {
            http,
            base: format!("{}/bot{token}", api_base.trim_end_matches('/')),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.base)
    }

    async fn call<B, T>(&self, method: &'static str, body: &B) -> Result<T, MessengerError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let envelope: Envelope<T> = self
            .http
            .post(self.url(method))
            .json(body)
            .send()
            .await?
            .json()
            .await?;
        envelope.into_result(method)
    }

    async fn call_multipart<T>(&self, method: &'static str, form: Form) -> Result<T, MessengerError>
    where
        T: DeserializeOwned,
    {
        let envelope: Envelope<T> = self
            .http
            .post(self.url(method))
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;
        envelope.into_result(method)
    }

    /// Fetches updates after `offset`, waiting up to `timeout_secs` for one
    /// to arrive.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, MessengerError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }
}

async fn photo_part(path: &Path) -> Result<Part, MessengerError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| MessengerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "flowchart.jpg".to_string());
    Ok(Part::bytes(bytes).file_name(file_name).mime_str("image/jpeg")?)
}

#[derive(Debug, Deserialize)]
struct WireSent {
    message_id: i64,
    chat: WireChat,
}

impl From<WireSent> for SentMessage {
    fn from(value: WireSent) -> Self {
        Self {
            chat_id: ChatId::new(value.chat.id),
            message_id: MessageId::new(value.message_id),
        }
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn reply(&self, to: &IncomingMessage, text: &str) -> Result<SentMessage, MessengerError> {
        let reply = ReplyParameters {
            message_id: to.message_id,
        };
        let sent: WireSent = self
            .call(
                "sendMessage",
                &json!({
                    "chat_id": to.chat_id,
                    "text": text,
                    "reply_parameters": reply,
                }),
            )
            .await?;
        Ok(sent.into())
    }

    async fn reply_photos(
        &self,
        to: &IncomingMessage,
        photos: &[Photo],
    ) -> Result<(), MessengerError> {
        let reply = serde_json::to_string(&ReplyParameters {
            message_id: to.message_id,
        })?;

        // Albums need at least two items; a single image goes out as a photo.
        if let [photo] = photos {
            let form = Form::new()
                .text("chat_id", to.chat_id.to_string())
                .text("caption", photo.caption.clone())
                .text("reply_parameters", reply)
                .part("photo", photo_part(&photo.path).await?);
            let _: WireSent = self.call_multipart("sendPhoto", form).await?;
            return Ok(());
        }

        let mut form = Form::new()
            .text("chat_id", to.chat_id.to_string())
            .text("reply_parameters", reply);
        let mut media = Vec::with_capacity(photos.len());
        for (i, photo) in photos.iter().enumerate() {
            let name = format!("photo{i}");
            media.push(json!({
                "type": "photo",
                "media": format!("attach://{name}"),
                "caption": photo.caption,
            }));
            form = form.part(name, photo_part(&photo.path).await?);
        }
        form = form.text("media", serde_json::to_string(&media)?);

        let _: Vec<WireSent> = self.call_multipart("sendMediaGroup", form).await?;
        Ok(())
    }

    async fn delete(&self, message: &SentMessage) -> Result<(), MessengerError> {
        let _: bool = self
            .call(
                "deleteMessage",
                &json!({
                    "chat_id": message.chat_id,
                    "message_id": message.message_id,
                }),
            )
            .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Update loop
// ---------------------------------------------------------------------------

/// Polls for updates and dispatches every `/block` message to `handler` on a
/// new task, until `shutdown` resolves.
///
/// Commands still running at shutdown are awaited before returning, so their
/// downloaded files are always removed.
pub async fn run_polling(
    client: Arc<TelegramClient>,
    handler: Arc<BlockCommandHandler>,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);
    let mut offset = 0;
    let mut in_flight = JoinSet::new();
    tracing::info!("bot polling started");

    loop {
        while let Some(joined) = in_flight.try_join_next() {
            log_finished(joined);
        }

        let updates = tokio::select! {
            _ = &mut shutdown => break,
            updates = client.get_updates(offset, POLL_TIMEOUT_SECS) => updates,
        };

        let updates = match updates {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, "getUpdates failed");
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(POLL_ERROR_DELAY) => {}
                }
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.into_incoming() else {
                continue;
            };
            if parse_block_command(&message.text).is_none() {
                continue;
            }

            let handler = Arc::clone(&handler);
            in_flight.spawn(async move { handler.handle(&message).await });
        }
    }

    if !in_flight.is_empty() {
        tracing::info!(commands = in_flight.len(), "waiting for in-flight commands");
    }
    while let Some(joined) = in_flight.join_next().await {
        log_finished(joined);
    }

    tracing::info!("bot polling stopped");
}

fn log_finished(joined: Result<CommandOutcome, JoinError>) {
    match joined {
        Ok(outcome) => tracing::debug!(?outcome, "command handled"),
        Err(e) => tracing::error!(error = %e, "command task failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use axum::extract::{FromRequest, Multipart, Path as UrlPath, Request, State};
    use axum::routing::post;
    use axum::{Json, Router};
    use flowchart::AttemptIndex;
    use serde_json::Value;

    use crate::messages::IN_PROGRESS;
    use crate::{DiagramFetchError, DiagramSource, RateLimiter};

    #[test]
    fn test_update_with_text_message_converts() {
        let update: Update = serde_json::from_str(
            r#"{"update_id": 10, "message": {"message_id": 5, "date": 0,
                "chat": {"id": -100, "type": "group"},
                "from": {"id": 42, "is_bot": false, "first_name": "A"},
                "text": "/block sort an array"}}"#,
        )
        .unwrap();

        assert_eq!(update.update_id, 10);
        assert_eq!(
            update.into_incoming(),
            Some(IncomingMessage {
                chat_id: ChatId::new(-100),
                message_id: MessageId::new(5),
                user_id: UserId::new(42),
                text: "/block sort an array".to_string(),
            })
        );
    }

    #[test]
    fn test_update_without_text_or_sender_is_skipped() {
        let photo_only: Update = serde_json::from_str(
            r#"{"update_id": 1, "message": {"message_id": 1, "chat": {"id": 1}, "from": {"id": 1}}}"#,
        )
        .unwrap();
        assert_eq!(photo_only.into_incoming(), None);

        let channel_post: Update = serde_json::from_str(
            r#"{"update_id": 2, "message": {"message_id": 1, "chat": {"id": 1}, "text": "/block x"}}"#,
        )
        .unwrap();
        assert_eq!(channel_post.into_incoming(), None);

        let edited: Update =
            serde_json::from_str(r#"{"update_id": 3, "edited_message": {}}"#).unwrap();
        assert_eq!(edited.into_incoming(), None);
    }

    #[test]
    fn test_envelope_error_carries_description() {
        let envelope: Envelope<bool> = serde_json::from_str(
            r#"{"ok": false, "error_code": 400, "description": "Bad Request: message to delete not found"}"#,
        )
        .unwrap();

        match envelope.into_result("deleteMessage").unwrap_err() {
            MessengerError::Api {
                method,
                description,
            } => {
                assert_eq!(method, "deleteMessage");
                assert!(description.contains("not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_envelope_ok_returns_result() {
        let envelope: Envelope<Vec<Update>> =
            serde_json::from_str(r#"{"ok": true, "result": []}"#).unwrap();
        assert!(envelope.into_result("getUpdates").unwrap().is_empty());
    }

    #[test]
    fn test_client_url_includes_token() {
        let client = TelegramClient::new(reqwest::Client::new(), "https://api.telegram.org/", "123:abc");
        assert_eq!(
            client.url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    // -----------------------------------------------------------------------
    // Local Bot API fake
    // -----------------------------------------------------------------------

    /// One request received by the fake, with its form or JSON fields
    /// flattened to strings. File parts are recorded as `file:<name>:<body>`.
    #[derive(Debug, Clone)]
    struct ApiCall {
        method: String,
        fields: HashMap<String, String>,
    }

    #[derive(Default)]
    struct FakeBotApi {
        calls: Mutex<Vec<ApiCall>>,
        update_batches: Mutex<VecDeque<Vec<Value>>>,
        next_message_id: AtomicI64,
    }

    impl FakeBotApi {
        fn calls(&self, method: &str) -> Vec<ApiCall> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.method == method)
                .cloned()
                .collect()
        }

        fn sent(&self, chat_id: &str) -> Value {
            let id = 500 + self.next_message_id.fetch_add(1, Ordering::SeqCst);
            serde_json::json!({
                "message_id": id,
                "chat": {"id": chat_id.parse::<i64>().unwrap()},
            })
        }
    }

    async fn fake_method(
        State(api): State<Arc<FakeBotApi>>,
        UrlPath(method): UrlPath<String>,
        request: Request,
    ) -> Json<Value> {
        let is_multipart = request
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        let mut fields = HashMap::new();
        if is_multipart {
            let mut form = Multipart::from_request(request, &()).await.unwrap();
            while let Some(field) = form.next_field().await.unwrap() {
                let name = field.name().unwrap_or_default().to_string();
                let file_name = field.file_name().map(str::to_string);
                let body = String::from_utf8_lossy(&field.bytes().await.unwrap()).into_owned();
                let value = match file_name {
                    Some(file_name) => format!("file:{file_name}:{body}"),
                    None => body,
                };
                fields.insert(name, value);
            }
        } else {
            let Json(body) = Json::<Value>::from_request(request, &()).await.unwrap();
            for (key, value) in body.as_object().cloned().unwrap_or_default() {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                fields.insert(key, value);
            }
        }
        api.calls.lock().unwrap().push(ApiCall {
            method: method.clone(),
            fields: fields.clone(),
        });

        let result = match method.as_str() {
            "getUpdates" => {
                let batch = api.update_batches.lock().unwrap().pop_front();
                match batch {
                    Some(batch) => Value::Array(batch),
                    None => {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Value::Array(Vec::new())
                    }
                }
            }
            "sendMessage" | "sendPhoto" => api.sent(&fields["chat_id"]),
            "sendMediaGroup" => {
                let media: Vec<Value> = serde_json::from_str(&fields["media"]).unwrap();
                Value::Array(media.iter().map(|_| api.sent(&fields["chat_id"])).collect())
            }
            "deleteMessage" => Value::Bool(true),
            other => panic!("unexpected Bot API method {other}"),
        };
        Json(serde_json::json!({"ok": true, "result": result}))
    }

    async fn spawn_bot_api(api: Arc<FakeBotApi>) -> TelegramClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new()
            .route("/bottest/{method}", post(fake_method))
            .with_state(api);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        TelegramClient::new(reqwest::Client::new(), &format!("http://{addr}"), "test")
    }

    fn command() -> IncomingMessage {
        IncomingMessage {
            chat_id: ChatId::new(-100),
            message_id: MessageId::new(5),
            user_id: UserId::new(42),
            text: "/block sort an array".to_string(),
        }
    }

    fn replied_to(fields: &HashMap<String, String>) -> Value {
        let reply: Value = serde_json::from_str(&fields["reply_parameters"]).unwrap();
        reply["message_id"].clone()
    }

    #[tokio::test]
    async fn test_single_photo_is_sent_with_send_photo() {
        let api = Arc::new(FakeBotApi::default());
        let client = spawn_bot_api(api.clone()).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flowchart_a.jpg");
        std::fs::write(&path, "jpeg-1").unwrap();

        client
            .reply_photos(
                &command(),
                &[Photo {
                    path,
                    caption: "🎉 Блок-схема 1".to_string(),
                }],
            )
            .await
            .unwrap();

        assert!(api.calls("sendMediaGroup").is_empty());
        let calls = api.calls("sendPhoto");
        assert_eq!(calls.len(), 1);
        let fields = &calls[0].fields;
        assert_eq!(fields["chat_id"], "-100");
        assert_eq!(fields["caption"], "🎉 Блок-схема 1");
        assert_eq!(fields["photo"], "file:flowchart_a.jpg:jpeg-1");
        assert_eq!(replied_to(fields), 5);
    }

    #[tokio::test]
    async fn test_several_photos_are_sent_as_one_album() {
        let api = Arc::new(FakeBotApi::default());
        let client = spawn_bot_api(api.clone()).await;
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.jpg");
        let third = dir.path().join("b.jpg");
        std::fs::write(&first, "jpeg-1").unwrap();
        std::fs::write(&third, "jpeg-3").unwrap();

        client
            .reply_photos(
                &command(),
                &[
                    Photo {
                        path: first,
                        caption: "🎉 Блок-схема 1".to_string(),
                    },
                    Photo {
                        path: third,
                        caption: "🎉 Блок-схема 3".to_string(),
                    },
                ],
            )
            .await
            .unwrap();

        assert!(api.calls("sendPhoto").is_empty());
        let calls = api.calls("sendMediaGroup");
        assert_eq!(calls.len(), 1);
        let fields = &calls[0].fields;
        assert_eq!(fields["chat_id"], "-100");
        assert_eq!(replied_to(fields), 5);

        let media: Vec<Value> = serde_json::from_str(&fields["media"]).unwrap();
        assert_eq!(media.len(), 2);
        let expected = [
            ("🎉 Блок-схема 1", "file:a.jpg:jpeg-1"),
            ("🎉 Блок-схема 3", "file:b.jpg:jpeg-3"),
        ];
        for (item, (caption, upload)) in media.iter().zip(expected) {
            assert_eq!(item["type"], "photo");
            assert_eq!(item["caption"], caption);
            let part = item["media"]
                .as_str()
                .and_then(|m| m.strip_prefix("attach://"))
                .unwrap();
            assert_eq!(fields[part], upload, "part '{part}' must carry its image");
        }
    }

    #[tokio::test]
    async fn test_reply_then_delete_targets_the_sent_message() {
        let api = Arc::new(FakeBotApi::default());
        let client = spawn_bot_api(api.clone()).await;

        let sent = client.reply(&command(), IN_PROGRESS).await.unwrap();
        assert_eq!(sent.chat_id, ChatId::new(-100));
        assert_eq!(sent.message_id, MessageId::new(500));

        client.delete(&sent).await.unwrap();

        let replies = api.calls("sendMessage");
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].fields["text"], IN_PROGRESS);
        assert_eq!(replied_to(&replies[0].fields), 5);

        let deletes = api.calls("deleteMessage");
        assert_eq!(deletes.len(), 1);
        assert_eq!(deletes[0].fields["chat_id"], "-100");
        assert_eq!(deletes[0].fields["message_id"], "500");
    }

    // -----------------------------------------------------------------------
    // Update loop
    // -----------------------------------------------------------------------

    /// Succeeds on every attempt after a short delay.
    #[derive(Default)]
    struct SlowDiagrams {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DiagramSource for SlowDiagrams {
        async fn fetch(
            &self,
            algorithm: &str,
            attempt: AttemptIndex,
        ) -> Result<Vec<u8>, DiagramFetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(format!("{algorithm}#{attempt}").into_bytes())
        }
    }

    fn text_update(update_id: i64, text: &str) -> Value {
        serde_json::json!({
            "update_id": update_id,
            "message": {
                "message_id": update_id,
                "chat": {"id": -100},
                "from": {"id": 42},
                "text": text,
            },
        })
    }

    #[tokio::test]
    async fn test_polling_dispatches_block_commands_and_finishes_them_on_shutdown() {
        let api = Arc::new(FakeBotApi::default());
        api.update_batches
            .lock()
            .unwrap()
            .push_back(vec![text_update(10, "hello"), text_update(11, "/block sort")]);
        let client = Arc::new(spawn_bot_api(api.clone()).await);
        let dir = tempfile::tempdir().unwrap();
        let diagrams = Arc::new(SlowDiagrams::default());
        let handler = Arc::new(BlockCommandHandler::new(
            client.clone(),
            diagrams.clone(),
            RateLimiter::default(),
            dir.path(),
        ));

        // Stops once the next poll starts after both updates, while the
        // command is still running its attempts.
        let watcher = api.clone();
        let shutdown = async move {
            while !watcher
                .calls("getUpdates")
                .iter()
                .any(|c| c.fields["offset"] == "12")
            {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };

        tokio::time::timeout(
            Duration::from_secs(10),
            run_polling(client, handler, shutdown),
        )
        .await
        .expect("polling must stop after shutdown");

        let offsets: Vec<String> = api
            .calls("getUpdates")
            .iter()
            .map(|c| c.fields["offset"].clone())
            .collect();
        assert_eq!(offsets[0], "0");
        assert!(offsets[1..].iter().all(|o| o == "12"));

        assert_eq!(diagrams.calls.load(Ordering::SeqCst), 3);
        let replies = api.calls("sendMessage");
        assert_eq!(replies.len(), 1, "only the /block message is answered");
        assert_eq!(replies[0].fields["text"], IN_PROGRESS);
        assert_eq!(api.calls("sendMediaGroup").len(), 1);
        assert_eq!(api.calls("deleteMessage").len(), 1);
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_error_backoff() {
        let client = Arc::new(TelegramClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1",
            "test",
        ));
        let dir = tempfile::tempdir().unwrap();
        let handler = Arc::new(BlockCommandHandler::new(
            client.clone(),
            Arc::new(SlowDiagrams::default()),
            RateLimiter::default(),
            dir.path(),
        ));

        let started = std::time::Instant::now();
        run_polling(
            client,
            handler,
            tokio::time::sleep(Duration::from_millis(200)),
        )
        .await;

        assert!(started.elapsed() < POLL_ERROR_DELAY);
    }
}
