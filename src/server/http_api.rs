use std::{future::Future, sync::mpsc::Sender};

use reqwest::StatusCode;
use serde::Deserialize;
use tokio::runtime::Handle;

use crate::{
    domain::{
        events::{ApiFailure, ApiResponse, AppEvent, HistoryEntry},
        message::MessageColor,
    },
    infra::config::ServerConfig,
    usecases::contracts::{PostMessage, ServerApi},
};

const HTTP_API_REQUEST_FAILED: &str = "HTTP_API_REQUEST_FAILED";
const HTTP_API_RESPONSE_DROPPED: &str = "HTTP_API_RESPONSE_DROPPED";

const REGISTER_USER_PATH: &str = "/user";
const POST_MESSAGE_PATH: &str = "/message";
const LIST_ROOMS_PATH: &str = "/get_rooms";
const LIST_USERS_PATH: &str = "/get_users";
const HISTORY_PATH: &str = "/messages";

/// Stored message as returned by the history endpoint.
#[derive(Debug, Deserialize)]
struct StoredMessage {
    #[serde(default)]
    username: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    color: Option<String>,
}

impl From<StoredMessage> for HistoryEntry {
    fn from(stored: StoredMessage) -> Self {
        Self {
            username: stored.username,
            message: stored.message,
            color: MessageColor::from_wire(stored.color.as_deref()),
        }
    }
}

/// [`ServerApi`] over HTTP. Requests run on the tokio runtime and their
/// outcomes are posted back to the shell event queue.
pub struct HttpServerApi {
    runtime: Handle,
    client: reqwest::Client,
    server: ServerConfig,
    events: Sender<AppEvent>,
}

impl HttpServerApi {
    pub fn new(
        runtime: Handle,
        client: reqwest::Client,
        server: ServerConfig,
        events: Sender<AppEvent>,
    ) -> Self {
        Self {
            runtime,
            client,
            server,
            events,
        }
    }

    fn dispatch<F>(&self, request: F)
    where
        F: Future<Output = ApiResponse> + Send + 'static,
    {
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let response = request.await;
            if events.send(AppEvent::Api(response)).is_err() {
                tracing::debug!(code = HTTP_API_RESPONSE_DROPPED, "shell event queue closed");
            }
        });
    }
}

impl ServerApi for HttpServerApi {
    fn register_user(&self, old_username: &str, new_username: &str) {
        let request = self
            .client
            .post(self.server.endpoint(REGISTER_USER_PATH))
            .form(&[("old_username", old_username), ("new_username", new_username)]);
        let username = new_username.to_owned();

        self.dispatch(async move {
            let result = send(request).await.map(|_| ());
            ApiResponse::Registered { username, result }
        });
    }

    fn post_message(&self, message: PostMessage) {
        let request = self.client.post(self.server.endpoint(POST_MESSAGE_PATH)).form(&[
            ("room", message.room.as_str()),
            ("username", message.username.as_str()),
            ("message", message.message.as_str()),
            ("color", message.color.as_str()),
        ]);
        let room = message.room;

        self.dispatch(async move {
            let result = send(request).await.map(|_| ());
            ApiResponse::MessagePosted { room, result }
        });
    }

    fn list_rooms(&self) {
        let request = self.client.get(self.server.endpoint(LIST_ROOMS_PATH));

        self.dispatch(async move { ApiResponse::RoomsListed(fetch_names(request).await) });
    }

    fn list_online_users(&self) {
        let request = self.client.get(self.server.endpoint(LIST_USERS_PATH));

        self.dispatch(async move { ApiResponse::OnlineUsersListed(fetch_names(request).await) });
    }

    fn fetch_history(&self, room: &str) {
        let request = self
            .client
            .post(self.server.endpoint(HISTORY_PATH))
            .form(&[("room_name", room)]);
        let room = room.to_owned();

        self.dispatch(async move {
            let result = fetch_history(request).await;
            ApiResponse::HistoryFetched { room, result }
        });
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiFailure> {
    let response = request.send().await.map_err(|error| {
        tracing::warn!(code = HTTP_API_REQUEST_FAILED, error = %error, "request failed");
        ApiFailure::Transport(error.to_string())
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiFailure::Status(status.as_u16()));
    }
    Ok(response)
}

async fn read_body(response: reqwest::Response) -> Result<String, ApiFailure> {
    response
        .text()
        .await
        .map_err(|error| ApiFailure::Transport(error.to_string()))
}

async fn fetch_names(request: reqwest::RequestBuilder) -> Result<Vec<String>, ApiFailure> {
    let body = read_body(send(request).await?).await?;
    parse_names(&body)
}

async fn fetch_history(request: reqwest::RequestBuilder) -> Result<Vec<HistoryEntry>, ApiFailure> {
    match send(request).await {
        Ok(response) => parse_history(&read_body(response).await?),
        // Rooms nobody has written to yet have no stored log.
        Err(ApiFailure::Status(status)) if status == StatusCode::NOT_FOUND.as_u16() => {
            Ok(Vec::new())
        }
        Err(error) => Err(error),
    }
}

fn parse_names(body: &str) -> Result<Vec<String>, ApiFailure> {
    serde_json::from_str(body).map_err(|error| ApiFailure::InvalidData(error.to_string()))
}

fn parse_history(body: &str) -> Result<Vec<HistoryEntry>, ApiFailure> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let stored: Vec<StoredMessage> =
        serde_json::from_str(body).map_err(|error| ApiFailure::InvalidData(error.to_string()))?;
    Ok(stored.into_iter().map(HistoryEntry::from).collect())
}
