use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use esologs::{
    AuthMode, ClientConfig, EntityRef, ErrorKind, EsoLogsClient, EventsQuery, MemoryTokenStore,
    Param, ProviderEndpoints, ReportSearch, Token, TokenState, TokenStore,
};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new("my-client", "my-secret")
        .with_endpoints(ProviderEndpoints::with_base_url(&server.uri()))
}

async fn mount_token(server: &MockServer, access: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access,
            "token_type": "Bearer",
            "expires_in": 3600,
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn graphql(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": data }))
}

fn report_page(codes: &[&str], current: u32, last: u32) -> Value {
    let data: Vec<Value> = codes
        .iter()
        .map(|code| {
            json!({
                "code": code,
                "title": format!("Report {code}"),
                "startTime": 1_700_000_000_000_i64,
                "endTime": 1_700_003_600_000_i64,
            })
        })
        .collect();
    json!({
        "reportData": {
            "reports": {
                "data": data,
                "total": 5,
                "per_page": 2,
                "current_page": current,
                "from": null,
                "to": null,
                "last_page": last,
                "has_more_pages": current < last,
            }
        }
    })
}

#[tokio::test]
async fn app_query_sends_bearer_token_and_variables() {
    let server = MockServer::start().await;
    mount_token(&server, "app-token", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/client"))
        .and(header("authorization", "Bearer app-token"))
        .and(body_partial_json(json!({
            "operationName": "GetZone",
            "variables": { "id": 16 },
        })))
        .respond_with(graphql(json!({
            "worldData": {
                "zone": {
                    "id": 16,
                    "name": "Sunspire",
                    "frozen": false,
                    "difficulties": [{ "id": 121, "name": "Veteran", "sizes": [12] }],
                    "encounters": [{ "id": 39, "name": "Lokkestiiz" }],
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = EsoLogsClient::new(config_for(&server)).unwrap();
    let zone = client.world_data().zone(16.0).await.unwrap().unwrap();

    assert_eq!(zone.name, "Sunspire");
    assert_eq!(zone.difficulties[0].sizes, vec![12]);
    assert_eq!(client.token_state(), TokenState::Valid);
}

#[tokio::test]
async fn missing_entity_is_none() {
    let server = MockServer::start().await;
    mount_token(&server, "app-token", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/client"))
        .respond_with(graphql(json!({ "characterData": { "character": null } })))
        .mount(&server)
        .await;

    let client = EsoLogsClient::new(config_for(&server)).unwrap();
    let character = client.characters().by_id(99_999_999).await.unwrap();
    assert!(character.is_none());
}

#[tokio::test]
async fn invalid_arguments_never_reach_the_network() {
    let server = MockServer::start().await;
    mount_token(&server, "app-token", 0).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/client"))
        .respond_with(graphql(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let client = EsoLogsClient::new(config_for(&server)).unwrap();

    let err = client.game_data().abilities(Some(26), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = client.game_data().ability(1.5).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = client.guilds().by_name("Tamriel Rejects", "", "NA").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let partial = ReportSearch {
        guild_name: Param::Value("Tamriel Rejects".into()),
        ..ReportSearch::default()
    };
    let err = client.reports().search(&partial).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("guildServerSlug"));

    let err = client.reports().by_code("not a code").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert_eq!(client.token_state(), TokenState::Unissued);
}

#[tokio::test]
async fn guild_lookup_by_full_name_group() {
    let server = MockServer::start().await;
    mount_token(&server, "app-token", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/client"))
        .and(body_partial_json(json!({
            "operationName": "GetGuild",
            "variables": {
                "name": "Tamriel Rejects",
                "serverSlug": "pc-na",
                "serverRegion": "NA",
            },
        })))
        .respond_with(graphql(json!({
            "guildData": {
                "guild": {
                    "id": 7,
                    "name": "Tamriel Rejects",
                    "faction": { "id": 1, "name": "Aldmeri Dominion" },
                    "tags": [{ "id": 3, "name": "Core" }],
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = EsoLogsClient::new(config_for(&server)).unwrap();
    let guild = client
        .guilds()
        .by_name("Tamriel Rejects", "pc-na", "NA")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(guild.id, 7);
    assert_eq!(guild.tags.len(), 1);
}

#[tokio::test]
async fn report_list_follows_pages() {
    let server = MockServer::start().await;
    mount_token(&server, "app-token", 1).await;
    for (page, codes) in [(1, vec!["aaaa", "bbbb"]), (2, vec!["cccc", "dddd"]), (3, vec!["eeee"])] {
        Mock::given(method("POST"))
            .and(path("/api/v2/client"))
            .and(body_partial_json(json!({
                "operationName": "GetReports",
                "variables": { "zoneID": 16, "page": page, "limit": 2 },
            })))
            .respond_with(graphql(report_page(&codes, page, 3)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = EsoLogsClient::new(config_for(&server)).unwrap();
    let search = ReportSearch::new().zone_id(16).limit(2);
    let reports = client.reports().list(&search, None).await.unwrap();

    let codes: Vec<_> = reports.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, ["aaaa", "bbbb", "cccc", "dddd", "eeee"]);
}

#[tokio::test]
async fn report_list_stops_at_limit() {
    let server = MockServer::start().await;
    mount_token(&server, "app-token", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/client"))
        .and(body_partial_json(json!({ "variables": { "page": 1 } })))
        .respond_with(graphql(report_page(&["aaaa", "bbbb"], 1, 3)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/client"))
        .and(body_partial_json(json!({ "variables": { "page": 2 } })))
        .respond_with(graphql(report_page(&["cccc", "dddd"], 2, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let client = EsoLogsClient::new(config_for(&server)).unwrap();
    let reports = client
        .reports()
        .list(&ReportSearch::new().limit(2), Some(3))
        .await
        .unwrap();
    assert_eq!(reports.len(), 3);
}

#[tokio::test]
async fn all_events_follows_next_page_timestamp() {
    let server = MockServer::start().await;
    mount_token(&server, "app-token", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/client"))
        .and(body_partial_json(json!({
            "operationName": "GetReportEvents",
            "variables": { "code": "a1B2c3D4", "startTime": 0, "endTime": 60_000 },
        })))
        .respond_with(graphql(json!({
            "reportData": { "report": { "events": {
                "data": [{ "timestamp": 10, "type": "cast" }, { "timestamp": 20, "type": "damage" }],
                "nextPageTimestamp": 25_000,
            } } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/client"))
        .and(body_partial_json(json!({
            "variables": { "code": "a1B2c3D4", "startTime": 25_000.0 },
        })))
        .respond_with(graphql(json!({
            "reportData": { "report": { "events": {
                "data": [{ "timestamp": 25_000, "type": "death" }],
                "nextPageTimestamp": null,
            } } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = EsoLogsClient::new(config_for(&server)).unwrap();
    let mut query = EventsQuery::new("a1B2c3D4");
    query.start_time = Param::Value(0);
    query.end_time = Param::Value(60_000);

    let events = client.reports().all_events(&query, None).await.unwrap();
    let types: Vec<_> = events.iter().map(|e| e["type"].as_str().unwrap()).collect();
    assert_eq!(types, ["cast", "damage", "death"]);
}

#[tokio::test]
async fn rate_limit_data() {
    let server = MockServer::start().await;
    mount_token(&server, "app-token", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/client"))
        .and(body_partial_json(json!({ "operationName": "GetRateLimitData" })))
        .respond_with(graphql(json!({
            "rateLimitData": {
                "limitPerHour": 3600,
                "pointsSpentThisHour": 12.5,
                "pointsResetIn": 1800,
            }
        })))
        .mount(&server)
        .await;

    let client = EsoLogsClient::new(config_for(&server)).unwrap();
    let limits = client.system().rate_limit().await.unwrap();
    assert_eq!(limits.limit_per_hour, 3600);
    assert!((limits.points_spent_this_hour - 12.5).abs() < f64::EPSILON);
    assert_eq!(limits.points_reset_in, 1800);
}

#[tokio::test]
async fn rejected_token_is_an_authentication_error() {
    let server = MockServer::start().await;
    mount_token(&server, "app-token", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/client"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthenticated."))
        .mount(&server)
        .await;

    let client = EsoLogsClient::new(config_for(&server)).unwrap();
    let err = client.world_data().regions().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn server_errors_are_retryable_transport_errors() {
    let server = MockServer::start().await;
    mount_token(&server, "app-token", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/client"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = EsoLogsClient::new(config_for(&server)).unwrap();
    let err = client.world_data().expansions().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn graphql_errors_are_api_errors() {
    let server = MockServer::start().await;
    mount_token(&server, "app-token", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "You do not have permission to view this report." }],
        })))
        .mount(&server)
        .await;

    let client = EsoLogsClient::new(config_for(&server)).unwrap();
    let err = client.reports().by_code("a1B2c3D4").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert!(err.to_string().contains("permission"));
}

#[tokio::test]
async fn token_endpoint_failure_is_an_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "Client authentication failed",
        })))
        .mount(&server)
        .await;

    let client = EsoLogsClient::new(config_for(&server)).unwrap();
    let err = client.world_data().regions().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(client.token_state(), TokenState::Unissued);
}

#[tokio::test]
async fn current_user_requires_user_mode() {
    let server = MockServer::start().await;
    mount_token(&server, "app-token", 0).await;

    let client = EsoLogsClient::new(config_for(&server)).unwrap();
    let err = client.users().current_user().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn user_mode_uses_user_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/user"))
        .and(header("authorization", "Bearer user-access"))
        .and(body_partial_json(json!({ "operationName": "GetCurrentUser" })))
        .respond_with(graphql(json!({
            "userData": {
                "currentUser": {
                    "id": 12,
                    "name": "nightblade",
                    "guilds": [{ "id": 7, "name": "Tamriel Rejects" }],
                    "characters": [{ "id": 42, "name": "Zaan" }],
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = Token::new("user-access", "Bearer", Utc::now() + chrono::Duration::hours(1))
        .with_refresh_token("user-refresh");
    let client = EsoLogsClient::builder(config_for(&server))
        .user_token(token)
        .build()
        .unwrap();
    assert_eq!(client.mode(), AuthMode::User);

    let user = client.users().current_user().await.unwrap().unwrap();
    assert_eq!(user.name, "nightblade");
    assert_eq!(user.characters[0].id, 42);
}

#[tokio::test]
async fn expired_user_token_is_refreshed_and_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-access",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "fresh-refresh",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/user"))
        .and(header("authorization", "Bearer fresh-access"))
        .respond_with(graphql(json!({
            "userData": { "user": { "id": 12, "name": "nightblade" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let expired = Token::new("old-access", "Bearer", Utc::now() - chrono::Duration::seconds(5))
        .with_refresh_token("old-refresh");
    store.save("session", &expired).unwrap();

    let client = EsoLogsClient::builder(config_for(&server))
        .user_mode()
        .token_store(store.clone(), "session")
        .build()
        .unwrap();
    assert_eq!(client.token_state(), TokenState::Expired);

    let user = client.users().by_id(12).await.unwrap().unwrap();
    assert_eq!(user.id, 12);

    let saved = store.load("session").unwrap().unwrap();
    assert_eq!(saved.access_token(), "fresh-access");
    assert_eq!(saved.refresh_token(), Some("fresh-refresh"));
}

#[tokio::test]
async fn concurrent_calls_share_one_token_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "access_token": "shared-token",
                    "token_type": "Bearer",
                    "expires_in": 3600,
                }))
                .set_delay(std::time::Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/client"))
        .and(header("authorization", "Bearer shared-token"))
        .respond_with(graphql(json!({
            "gameData": { "ability": { "id": 1, "name": "Crystal Fragments" } }
        })))
        .expect(10)
        .mount(&server)
        .await;

    let client = EsoLogsClient::new(config_for(&server)).unwrap();
    let mut handles = Vec::new();
    for _ in 0..10 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.game_data().ability(1).await
        }));
    }
    for handle in handles {
        let ability = handle.await.unwrap().unwrap().unwrap();
        assert_eq!(ability.name.as_deref(), Some("Crystal Fragments"));
    }
}

#[tokio::test]
async fn character_rankings_by_name() {
    let server = MockServer::start().await;
    mount_token(&server, "app-token", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/client"))
        .and(body_partial_json(json!({
            "operationName": "GetCharacterZoneRankings",
            "variables": {
                "name": "Zaan",
                "serverSlug": "pc-eu",
                "serverRegion": "EU",
                "zoneID": 16,
            },
        })))
        .respond_with(graphql(json!({
            "characterData": { "character": { "zoneRankings": { "bestPerformanceAverage": 97.4 } } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = EsoLogsClient::new(config_for(&server)).unwrap();
    let mut query = esologs::ZoneRankingQuery::new(EntityRef::name("Zaan", "pc-eu", "EU"));
    query.zone_id = Param::Value(16.into());

    let rankings = client.characters().zone_rankings(&query).await.unwrap().unwrap();
    assert_eq!(rankings["bestPerformanceAverage"], json!(97.4));
}

#[tokio::test]
async fn app_and_user_sessions_share_a_token_dir() {
    let server = MockServer::start().await;
    mount_token(&server, "app-token", 1).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server).with_token_dir(dir.path());

    let user_token = Token::new("user-access", "Bearer", Utc::now() + chrono::Duration::hours(1))
        .with_refresh_token("user-refresh");
    EsoLogsClient::builder(config.clone())
        .persist_to_token_dir()
        .user_token(user_token.clone())
        .build()
        .unwrap();

    let app = EsoLogsClient::builder(config.clone())
        .persist_to_token_dir()
        .build()
        .unwrap();
    assert_eq!(app.access_token().await.unwrap().access_token(), "app-token");

    let user = EsoLogsClient::builder(config.clone())
        .user_mode()
        .persist_to_token_dir()
        .build()
        .unwrap();
    let restored = user.access_token().await.unwrap();
    assert_eq!(restored, user_token);
    assert_eq!(restored.refresh_token(), Some("user-refresh"));

    let store = config.token_store();
    assert_eq!(
        store.load(esologs_oauth::APP_TOKEN_KEY).unwrap().unwrap().access_token(),
        "app-token"
    );
}
