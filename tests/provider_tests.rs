use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{
    body_partial_json, body_string_contains, header, method, path, path_regex, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cinehub_api::{
    models::{Category, NewComment},
    services::{
        identity::{FirebaseIdentityProvider, IdentityError, IdentityProvider},
        providers::{CatalogProvider, OmdbProvider, RatingProvider, TmdbProvider},
        store::{CommentStore, FirestoreCommentStore},
        AuthService, AuthSession, CommentService,
    },
};

fn tmdb(server: &MockServer, result_limit: usize) -> TmdbProvider {
    TmdbProvider::new(HttpClient::new(), "tmdb-key".to_string(), server.uri(), result_limit)
}

#[tokio::test]
async fn test_tmdb_trending_truncated_to_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trending/movie/week"))
        .and(query_param("api_key", "tmdb-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": [
                { "id": 1, "title": "Inception", "vote_average": 8.4, "release_date": "2010-07-15" },
                { "id": 2, "title": "Interstellar", "vote_average": 8.6 },
                { "id": 3, "title": "Tenet", "vote_average": 7.3 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let movies = assert_ok!(tmdb(&server, 2).list_movies(&Category::Trending).await);
    let ids: Vec<u64> = movies.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(movies[0].release_year(), Some(2010));
}

#[tokio::test]
async fn test_tmdb_regional_discover_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("with_origin_country", "IN"))
        .and(query_param("with_original_language", "ta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": 10, "title": "Vikram" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let category = Category::Region {
        country: "IN".to_string(),
        language: Some("ta".to_string()),
    };
    let movies = assert_ok!(tmdb(&server, 20).list_movies(&category).await);
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].title, "Vikram");
}

#[tokio::test]
async fn test_tmdb_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status_code": 34,
            "status_message": "The resource you requested could not be found."
        })))
        .mount(&server)
        .await;

    assert_err!(tmdb(&server, 20).movie_details(999).await);
}

#[tokio::test]
async fn test_tmdb_details_credits_and_videos() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/27205"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 27205,
            "title": "Inception",
            "imdb_id": "tt1375666",
            "revenue": 839030630u64
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/27205/credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 27205,
            "cast": [{ "cast_id": 1, "name": "Leonardo DiCaprio", "character": "Cobb" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/27205/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "key": "YoHD9XEInc0", "site": "YouTube", "type": "Trailer" }]
        })))
        .mount(&server)
        .await;

    let provider = tmdb(&server, 20);

    let details = assert_ok!(provider.movie_details(27205).await);
    assert_eq!(details.cross_reference_id(), Some("tt1375666"));
    assert_eq!(details.revenue, Some(839030630));

    let cast = assert_ok!(provider.movie_credits(27205).await);
    assert_eq!(cast[0].name, "Leonardo DiCaprio");

    let videos = assert_ok!(provider.movie_videos(27205).await);
    assert!(videos[0].is_youtube_trailer());
}

#[tokio::test]
async fn test_omdb_rating_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("i", "tt1375666"))
        .and(query_param("apikey", "omdb-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Title": "Inception",
            "imdbRating": "8.8",
            "Response": "True"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OmdbProvider::new(HttpClient::new(), "omdb-key".to_string(), server.uri());
    let rating = assert_ok!(provider.rating("tt1375666").await);
    assert_eq!(rating.as_deref(), Some("8.8"));
}

#[tokio::test]
async fn test_omdb_unknown_id_has_no_rating() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Response": "False",
            "Error": "Incorrect IMDb ID."
        })))
        .mount(&server)
        .await;

    let provider = OmdbProvider::new(HttpClient::new(), "omdb-key".to_string(), server.uri());
    assert_eq!(assert_ok!(provider.rating("tt0000000").await), None);
}

fn firestore(server: &MockServer) -> FirestoreCommentStore {
    FirestoreCommentStore::new(
        HttpClient::new(),
        "web-key".to_string(),
        server.uri(),
        "cinehub-test".to_string(),
    )
}

#[tokio::test]
async fn test_firestore_insert_uses_server_timestamp() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"/projects/cinehub-test/databases/.+/documents:commit$"))
        .and(query_param("key", "web-key"))
        .and(header("authorization", "Bearer id-token"))
        .and(body_partial_json(json!({
            "writes": [{
                "updateTransforms": [{
                    "fieldPath": "createdAt",
                    "setToServerValue": "REQUEST_TIME"
                }]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "writeResults": [{
                "updateTime": "2024-05-01T10:00:00.000001Z",
                "transformResults": [{ "timestampValue": "2024-05-01T10:00:00.000001Z" }]
            }],
            "commitTime": "2024-05-01T10:00:00.000001Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = firestore(&server);
    let mut changes = store.changes();

    let comment = assert_ok!(
        store
            .insert(
                NewComment {
                    text: "Loved the ending".to_string(),
                    user: "ada@example.com".to_string(),
                    user_id: "uid-1".to_string(),
                    movie_id: Some("27205".to_string()),
                },
                "id-token",
            )
            .await
    );

    assert_eq!(comment.text, "Loved the ending");
    assert!(comment.created_at.is_some());
    assert_ok!(changes.try_recv());
}

#[tokio::test]
async fn test_firestore_query_maps_documents() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"/documents:runQuery$"))
        .and(body_partial_json(json!({
            "structuredQuery": {
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "movieId" },
                        "value": { "stringValue": "27205" }
                    }
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "document": {
                    "name": "projects/cinehub-test/databases/(default)/documents/comments/abc123",
                    "fields": {
                        "text": { "stringValue": "Loved the ending" },
                        "user": { "stringValue": "Ada" },
                        "userId": { "stringValue": "uid-1" },
                        "movieId": { "stringValue": "27205" },
                        "createdAt": { "timestampValue": "2024-05-01T10:00:00Z" }
                    },
                    "createTime": "2024-05-01T10:00:00Z"
                },
                "readTime": "2024-05-01T10:05:00Z"
            }
        ])))
        .mount(&server)
        .await;

    let comments = assert_ok!(firestore(&server).query(Some("27205")).await);
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].id, "abc123");
    assert_eq!(comments[0].user, "Ada");
    assert_eq!(comments[0].movie_id.as_deref(), Some("27205"));
}

#[tokio::test]
async fn test_firestore_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"/documents:runQuery$"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "readTime": "2024-05-01T10:05:00Z" }])),
        )
        .mount(&server)
        .await;

    let comments = assert_ok!(firestore(&server).query(None).await);
    assert!(comments.is_empty());
}

#[tokio::test]
async fn test_firestore_permission_denied() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"/documents:commit$"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "status": "PERMISSION_DENIED" }
        })))
        .mount(&server)
        .await;

    let result = firestore(&server)
        .insert(
            NewComment {
                text: "hi".to_string(),
                user: "Ada".to_string(),
                user_id: "uid-1".to_string(),
                movie_id: None,
            },
            "expired-token",
        )
        .await;
    assert_err!(result);
}

fn firebase(server: &MockServer) -> FirebaseIdentityProvider {
    FirebaseIdentityProvider::new(
        HttpClient::new(),
        "web-key".to_string(),
        server.uri(),
        server.uri(),
    )
}

#[tokio::test]
async fn test_firebase_password_sign_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .and(query_param("key", "web-key"))
        .and(body_partial_json(json!({
            "email": "ada@example.com",
            "returnSecureToken": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-1",
            "email": "ada@example.com",
            "displayName": "Ada Lovelace",
            "idToken": "id-token",
            "refreshToken": "refresh-token",
            "expiresIn": "3600"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = assert_ok!(
        firebase(&server)
            .sign_in_with_password("ada@example.com", "secret123")
            .await
    );
    assert_eq!(session.user.uid, "uid-1");
    assert_eq!(session.user.display_name.as_deref(), Some("Ada Lovelace"));
    assert_eq!(session.id_token, "id-token");
}

#[tokio::test]
async fn test_firebase_rejection_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signUp"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "EMAIL_EXISTS", "errors": [] }
        })))
        .mount(&server)
        .await;

    let error = assert_err!(firebase(&server).sign_up("ada@example.com", "secret123").await);
    match error {
        IdentityError::Rejected(code) => assert_eq!(code, "EMAIL_EXISTS"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_firebase_federated_sign_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signInWithIdp"))
        .and(body_partial_json(json!({
            "postBody": "id_token=google-token&providerId=google.com",
            "returnSecureToken": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-2",
            "email": "grace@example.com",
            "photoUrl": "https://photos.example/grace.jpg",
            "idToken": "id-token-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = assert_ok!(
        firebase(&server)
            .sign_in_with_idp("google.com", "google-token")
            .await
    );
    assert_eq!(session.user.uid, "uid-2");
    assert_eq!(
        session.user.photo_url.as_deref(),
        Some("https://photos.example/grace.jpg")
    );
    assert_eq!(session.refresh_token, None);
}

#[tokio::test]
async fn test_firebase_refresh_token_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(query_param("key", "web-key"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_token": "fresh-token",
            "refresh_token": "refresh-2",
            "expires_in": "3600",
            "user_id": "uid-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let grant = assert_ok!(firebase(&server).refresh_token("refresh-1").await);
    assert_eq!(grant.id_token, "fresh-token");
    assert_eq!(grant.refresh_token.as_deref(), Some("refresh-2"));
    assert!(grant.expires_at.is_some());
}

#[tokio::test]
async fn test_expired_session_refreshes_before_comment_write() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-1",
            "email": "ada@example.com",
            "idToken": "stale-token",
            "refreshToken": "refresh-1",
            "expiresIn": "0"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_token": "fresh-token",
            "refresh_token": "refresh-2",
            "expires_in": "3600",
            "user_id": "uid-1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"/documents:commit$"))
        .and(header("authorization", "Bearer stale-token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": 401, "status": "UNAUTHENTICATED" }
        })))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"/documents:commit$"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "writeResults": [{
                "transformResults": [{ "timestampValue": "2024-05-01T10:00:00Z" }]
            }],
            "commitTime": "2024-05-01T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth_session = AuthSession::new(AuthService::new(Arc::new(firebase(&server))));
    assert_ok!(
        auth_session
            .sign_in_with_password("ada@example.com", "secret123")
            .await
    );

    let session = auth_session.fresh_session().await.unwrap();
    assert_eq!(session.id_token, "fresh-token");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-2"));

    let comments = CommentService::new(Arc::new(firestore(&server)), Duration::from_secs(5));
    let comment = assert_ok!(comments.create(Some(&session), "Still great", None).await);
    assert_eq!(comment.user_id, "uid-1");
}
