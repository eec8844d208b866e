#[cfg(test)]
mod client_tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, Query},
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Json},
        routing::{get, post},
        Router,
    };
    use chrono::DateTime;
    use serde_json::{json, Value};

    use crate::chat::{ChatPoster, SlackClient};
    use crate::client::{GaroonClient, Groupware};
    use crate::client_mock::meeting;
    use crate::error::{ChatError, GroupwareError};
    use crate::models::meeting::{AvailabilityQuery, RoomMatch, RoomRef, TimeWindow};
    use crate::models::slack::Attachment;

    // base64("alice:secret")
    const AUTHORIZATION: &str = "YWxpY2U6c2VjcmV0";

    type Seen = Arc<Mutex<Vec<Value>>>;

    /// Serves `router` on an ephemeral port and returns its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn garoon(base: &str) -> GaroonClient {
        GaroonClient::with_endpoint(format!("{}/g/api/v1/", base), "alice", "secret")
    }

    fn authorization(headers: &HeaderMap) -> String {
        headers
            .get("X-Cybozu-Authorization")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    fn event_json() -> Value {
        json!({
            "id": "M1",
            "eventType": "REGULAR",
            "subject": "Sync",
            "start": { "dateTime": "2019-01-07T10:00:00+09:00", "timeZone": "Asia/Tokyo" },
            "end": { "dateTime": "2019-01-07T11:00:00+09:00", "timeZone": "Asia/Tokyo" },
            "isAllDay": false,
            "isStartOnly": false,
            "attendees": [
                { "type": "USER", "id": "u1", "code": "alice", "name": "Alice" }
            ],
            "facilities": [
                { "id": "r1", "name": "Room 1", "code": "R-01", "facilityGroup": "g1" }
            ]
        })
    }

    #[test]
    fn test_default_endpoint() {
        let client = GaroonClient::new("example", "alice", "secret");
        assert_eq!(client.endpoint(), "https://example.cybozu.com/g/api/v1");
    }

    #[tokio::test]
    async fn test_find_event() {
        let router = Router::new().route(
            "/g/api/v1/schedule/events/:id",
            get(|headers: HeaderMap, Path(id): Path<String>| async move {
                if authorization(&headers) != AUTHORIZATION {
                    return StatusCode::UNAUTHORIZED.into_response();
                }
                if id != "M1" {
                    return (StatusCode::NOT_FOUND, "GRN_SCHEDULE_13022").into_response();
                }
                Json(event_json()).into_response()
            }),
        );
        let client = garoon(&serve(router).await);

        let found = client.find_event("M1").await.unwrap();
        assert_eq!(found.subject, "Sync");
        assert_eq!(found.end.unwrap().time_zone, "Asia/Tokyo");
        assert_eq!(found.attendees[0].code.as_deref(), Some("alice"));
        assert_eq!(found.rooms[0].code, "R-01");
        assert_eq!(found.rooms[0].group_id.as_deref(), Some("g1"));

        let err = client.find_event("M404").await.unwrap_err();
        match err {
            GroupwareError::Api { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "GRN_SCHEDULE_13022");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_event_sends_full_meeting() {
        let seen: Seen = Arc::default();
        let recorded = Arc::clone(&seen);
        let router = Router::new().route(
            "/g/api/v1/schedule/events/:id",
            axum::routing::patch(move |Json(body): Json<Value>| async move {
                recorded.lock().unwrap().push(body.clone());
                Json(body)
            }),
        );
        let client = garoon(&serve(router).await);

        let mut moved = meeting("M1", "Sync", "2019-01-08T16:00:00+09:00", 60);
        moved.rooms = vec![crate::models::meeting::Room::with_id("r2")];
        let updated = client.update_event(&moved).await.unwrap();
        assert_eq!(updated, moved);

        let body = seen.lock().unwrap()[0].clone();
        assert_eq!(body["start"]["dateTime"], "2019-01-08T16:00:00+09:00");
        assert_eq!(body["end"]["dateTime"], "2019-01-08T17:00:00+09:00");
        assert_eq!(body["facilities"], json!([{ "id": "r2" }]));
        assert_eq!(body["attendees"][0], json!({ "type": "USER", "id": "u1" }));
    }

    #[tokio::test]
    async fn test_search_events_query() {
        let seen: Arc<Mutex<Vec<HashMap<String, String>>>> = Arc::default();
        let recorded = Arc::clone(&seen);
        let router = Router::new().route(
            "/g/api/v1/schedule/events",
            get(move |Query(query): Query<HashMap<String, String>>| async move {
                recorded.lock().unwrap().push(query);
                Json(json!({ "events": [event_json()], "hasNext": false }))
            }),
        );
        let client = garoon(&serve(router).await);

        let now = DateTime::parse_from_rfc3339("2019-01-06T10:00:00+09:00").unwrap();
        let events = client.search_events("Sync", now).await.unwrap();
        assert_eq!(events.len(), 1);

        let query = seen.lock().unwrap()[0].clone();
        assert_eq!(query["keyword"], "Sync");
        assert_eq!(query["excludeFromSearch"], "company,notes,comments");
        assert_eq!(query["rangeStart"], "2019-01-06T10:00:00+09:00");
        assert_eq!(query["orderBy"], "createdAt asc");
    }

    #[tokio::test]
    async fn test_search_available_times() {
        let seen: Seen = Arc::default();
        let recorded = Arc::clone(&seen);
        let router = Router::new().route(
            "/g/api/v1/schedule/searchAvailableTimes",
            post(move |Json(body): Json<Value>| async move {
                recorded.lock().unwrap().push(body);
                Json(json!({
                    "availableTimes": [{
                        "start": { "dateTime": "2019-01-07T13:00:00+09:00", "timeZone": "Asia/Tokyo" },
                        "end": { "dateTime": "2019-01-07T14:00:00+09:00", "timeZone": "Asia/Tokyo" },
                        "facility": { "id": "r2", "name": "Room 2", "code": "R-02" }
                    }]
                }))
            }),
        );
        let client = garoon(&serve(router).await);

        let query = AvailabilityQuery {
            time_ranges: vec![TimeWindow {
                start: DateTime::parse_from_rfc3339("2019-01-07T10:00:00+09:00").unwrap(),
                end: DateTime::parse_from_rfc3339("2019-01-07T19:00:00+09:00").unwrap(),
            }],
            time_interval: 60,
            attendees: meeting("M1", "Sync", "2019-01-07T10:00:00+09:00", 60).attendees,
            rooms: vec![RoomRef { id: "r1".to_string() }, RoomRef { id: "r2".to_string() }],
            room_match: RoomMatch::Any,
        };
        let slots = client.search_available_times(&query).await.unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].room.name, "Room 2");

        let body = seen.lock().unwrap()[0].clone();
        assert_eq!(
            body["timeRanges"],
            json!([{ "start": "2019-01-07T10:00:00+09:00", "end": "2019-01-07T19:00:00+09:00" }])
        );
        assert_eq!(body["timeInterval"], 60);
        assert_eq!(body["facilities"], json!([{ "id": "r1" }, { "id": "r2" }]));
        assert_eq!(body["facilitySearchCondition"], "OR");
    }

    #[tokio::test]
    async fn test_room_lookups() {
        let router = Router::new()
            .route(
                "/g/api/v1/schedule/facilities",
                get(|Query(query): Query<HashMap<String, String>>| async move {
                    let name = query.get("name").cloned().unwrap_or_default();
                    Json(json!({
                        "facilities": [{ "id": "r1", "name": name, "code": "R-01", "facilityGroup": "g1" }],
                        "hasNext": false
                    }))
                }),
            )
            .route(
                "/g/api/v1/schedule/facilityGroups/:id/facilities",
                get(|Path(id): Path<String>| async move {
                    Json(json!({
                        "facilities": [
                            { "id": "r1", "name": "Room 1", "code": "R-01", "facilityGroup": id },
                            { "id": "r2", "name": "Room 2", "code": "R-02", "facilityGroup": id }
                        ]
                    }))
                }),
            );
        let client = garoon(&serve(router).await);

        let rooms = client.find_rooms_by_name("Room 1").await.unwrap();
        assert_eq!(rooms[0].name, "Room 1");

        let rooms = client.list_rooms_in_group("g1").await.unwrap();
        let codes: Vec<&str> = rooms.iter().map(|room| room.code.as_str()).collect();
        assert_eq!(codes, vec!["R-01", "R-02"]);
        assert!(rooms.iter().all(|room| room.group_id.as_deref() == Some("g1")));
    }

    #[tokio::test]
    async fn test_slack_post_message() {
        let seen: Seen = Arc::default();
        let recorded = Arc::clone(&seen);
        let router = Router::new().route(
            "/api/chat.postMessage",
            post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
                let bearer = headers
                    .get("authorization")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                recorded.lock().unwrap().push(body.clone());

                if bearer != "Bearer xoxb-test" {
                    return Json(json!({ "ok": false, "error": "invalid_auth" }));
                }
                if body["channel"] == "C404" {
                    return Json(json!({ "ok": false, "error": "channel_not_found" }));
                }
                Json(json!({ "ok": true }))
            }),
        );
        let base = serve(router).await;
        let slack = SlackClient::with_endpoint(format!("{}/api", base), "xoxb-test");

        let attachment = Attachment {
            title: "done".to_string(),
            color: "#32cd32".to_string(),
            ..Attachment::default()
        };
        slack.post_attachment("C1", &attachment).await.unwrap();

        let body = seen.lock().unwrap()[0].clone();
        assert_eq!(body["channel"], "C1");
        assert_eq!(body["attachments"][0]["title"], "done");
        assert_eq!(body["attachments"][0]["color"], "#32cd32");

        let err = slack.post_attachment("C404", &attachment).await.unwrap_err();
        assert!(matches!(err, ChatError::Api(ref message) if message == "channel_not_found"));

        let intruder = SlackClient::with_endpoint(format!("{}/api", base), "xoxb-wrong");
        let err = intruder.post_attachment("C1", &attachment).await.unwrap_err();
        assert!(matches!(err, ChatError::Api(ref message) if message == "invalid_auth"));
    }
}
