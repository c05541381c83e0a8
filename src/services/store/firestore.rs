/// Firestore comment store
///
/// Uses the Firestore REST v1 API:
/// 1. Create: `documents:commit` with a `REQUEST_TIME` transform on `createdAt`,
///    so the timestamp is assigned by the server.
/// 2. Read: `documents:runQuery` with an optional `movieId` equality filter and
///    `createdAt` descending.
///
/// Document fields keep the names the web client has always written:
/// `text`, `user`, `userId`, `movieId`, `createdAt`.
use crate::{
    error::{AppError, AppResult},
    models::{Comment, NewComment},
    services::{
        providers::check_status,
        store::{CommentStore, COMMENTS_COLLECTION},
    },
};
use chrono::{DateTime, Utc};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

const STORE: &str = "firestore";

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<FirestoreDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: HashMap<String, FirestoreValue>,
    #[serde(default)]
    create_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirestoreValue {
    #[serde(default)]
    string_value: Option<String>,
    #[serde(default)]
    integer_value: Option<String>,
    #[serde(default)]
    timestamp_value: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    #[serde(default)]
    write_results: Vec<WriteResult>,
    #[serde(default)]
    commit_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WriteResult {
    #[serde(default)]
    transform_results: Vec<FirestoreValue>,
}

pub struct FirestoreCommentStore {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    project_id: String,
    changes_tx: broadcast::Sender<()>,
}

impl FirestoreCommentStore {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String, project_id: String) -> Self {
        let (changes_tx, _) = broadcast::channel(64);
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            project_id,
            changes_tx,
        }
    }

    /// Resource name of the database's document root
    fn documents_root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn documents_url(&self, method: &str) -> String {
        format!("{}/{}:{}", self.api_url, self.documents_root(), method)
    }

    fn commit_body(&self, document_id: &str, comment: &NewComment) -> Value {
        let movie_id = match &comment.movie_id {
            Some(id) => json!({ "stringValue": id }),
            None => json!({ "nullValue": null }),
        };

        json!({
            "writes": [{
                "update": {
                    "name": format!("{}/{}/{}", self.documents_root(), COMMENTS_COLLECTION, document_id),
                    "fields": {
                        "text": { "stringValue": comment.text },
                        "user": { "stringValue": comment.user },
                        "userId": { "stringValue": comment.user_id },
                        "movieId": movie_id,
                    }
                },
                "updateTransforms": [{
                    "fieldPath": "createdAt",
                    "setToServerValue": "REQUEST_TIME"
                }],
                "currentDocument": { "exists": false }
            }]
        })
    }

    fn structured_query(movie_id: Option<&str>) -> Value {
        let mut query = json!({
            "from": [{ "collectionId": COMMENTS_COLLECTION }],
            "orderBy": [{
                "field": { "fieldPath": "createdAt" },
                "direction": "DESCENDING"
            }]
        });

        if let Some(movie_id) = movie_id {
            query["where"] = json!({
                "fieldFilter": {
                    "field": { "fieldPath": "movieId" },
                    "op": "EQUAL",
                    "value": { "stringValue": movie_id }
                }
            });
        }

        json!({ "structuredQuery": query })
    }

    fn into_comment(document: FirestoreDocument) -> Comment {
        let mut fields = document.fields;
        let mut string_field = |name: &str| -> Option<String> {
            fields.remove(name).and_then(|value| value.string_value)
        };

        let text = string_field("text").unwrap_or_default();
        let user = string_field("user").unwrap_or_default();
        let user_id = string_field("userId").unwrap_or_default();
        let movie_id = fields
            .remove("movieId")
            .and_then(|value| value.string_value.or(value.integer_value));
        let created_at = fields
            .remove("createdAt")
            .and_then(|value| value.timestamp_value);

        let id = document
            .name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();

        Comment {
            id,
            text,
            user,
            user_id,
            movie_id,
            created_at,
        }
    }
}

#[async_trait::async_trait]
impl CommentStore for FirestoreCommentStore {
    async fn insert(&self, comment: NewComment, id_token: &str) -> AppResult<Comment> {
        let document_id = Uuid::new_v4().simple().to_string();

        let response = self
            .http_client
            .post(self.documents_url("commit"))
            .query(&[("key", self.api_key.as_str())])
            .bearer_auth(id_token)
            .json(&self.commit_body(&document_id, &comment))
            .send()
            .await?;

        let response = check_status("Firestore", response).await?;
        let commit: CommitResponse = response.json().await?;

        let created_at = commit
            .write_results
            .into_iter()
            .next()
            .and_then(|result| result.transform_results.into_iter().next())
            .and_then(|value| value.timestamp_value)
            .or(commit.commit_time);

        tracing::info!(
            comment_id = %document_id,
            movie_id = ?comment.movie_id,
            store = STORE,
            "Comment written"
        );

        let _ = self.changes_tx.send(());

        Ok(Comment {
            id: document_id,
            text: comment.text,
            user: comment.user,
            user_id: comment.user_id,
            movie_id: comment.movie_id,
            created_at,
        })
    }

    async fn query(&self, movie_id: Option<&str>) -> AppResult<Vec<Comment>> {
        let response = self
            .http_client
            .post(self.documents_url("runQuery"))
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::structured_query(movie_id))
            .send()
            .await?;

        let response = check_status("Firestore", response).await?;
        let items: Vec<RunQueryItem> = response.json().await.map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse Firestore response: {}", e))
        })?;

        let comments: Vec<Comment> = items
            .into_iter()
            .filter_map(|item| item.document)
            .map(|document| {
                let create_time = document.create_time;
                let mut comment = Self::into_comment(document);
                if comment.created_at.is_none() {
                    comment.created_at = create_time;
                }
                comment
            })
            .collect();

        tracing::debug!(
            movie_id = ?movie_id,
            results = comments.len(),
            store = STORE,
            "Comments queried"
        );

        Ok(comments)
    }

    fn changes(&self) -> broadcast::Receiver<()> {
        self.changes_tx.subscribe()
    }

    fn name(&self) -> &'static str {
        STORE
    }
}
