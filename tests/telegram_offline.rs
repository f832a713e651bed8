use httpmock::{Method::POST, MockServer};
use regex::Regex;
use std::collections::BTreeSet;
use std::time::Duration;

use briefing::destinations::resolve_destinations;
use briefing::dispatcher::{Attachment, DispatchOutcome, Dispatcher};
use briefing::scraping::finviz::MAP_CAPTION;
use briefing::telegram::{Destination, TelegramBot, Transport};

const TOKEN: &str = "123456:TEST";

fn bot(server: &MockServer) -> TelegramBot {
    TelegramBot::with_api_url(TOKEN, &server.base_url()).unwrap()
}

/// Bot API method names are case-insensitive.
fn method_path(method: &str) -> Regex {
    Regex::new(&format!("(?i)^/bot{}/{}$", regex::escape(TOKEN), method)).unwrap()
}

fn sent_message(chat_id: i64) -> String {
    format!(
        r#"{{"ok":true,"result":{{"message_id":1,"date":1760000000,"chat":{{"id":{},"type":"private","first_name":"Desk"}},"text":"ok"}}}}"#,
        chat_id
    )
}

#[tokio::test]
async fn send_text_posts_html_message() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path_matches(method_path("sendMessage"))
            .body_includes(r#""chat_id":100"#)
            .body_includes(r#""text":"<b>hello</b>""#)
            .body_includes(r#""parse_mode":"HTML""#);
        then.status(200)
            .header("content-type", "application/json")
            .body(sent_message(100));
    });

    bot(&server)
        .send_text(&Destination::from(100), "<b>hello</b>")
        .await
        .unwrap();
    mock.assert();
}

#[tokio::test]
async fn send_photo_uploads_png_with_caption() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path_matches(method_path("sendPhoto"))
            .body_includes("name=\"chat_id\"")
            .body_includes("100")
            .body_includes("name=\"photo\"")
            .body_includes("filename=\"sector_map.png\"")
            .body_includes("name=\"caption\"")
            .body_includes(MAP_CAPTION);
        then.status(200)
            .header("content-type", "application/json")
            .body(
                r#"{"ok":true,"result":{"message_id":2,"date":1760000000,
                    "chat":{"id":100,"type":"private","first_name":"Desk"},
                    "photo":[{"file_id":"f1","file_unique_id":"u1","width":1200,"height":600,"file_size":4}],
                    "caption":"현재 핀비즈 섹터 맵"}}"#,
            );
    });

    bot(&server)
        .send_photo(&Destination::from(100), b"PNG!", MAP_CAPTION)
        .await
        .unwrap();
    mock.assert();
}

#[tokio::test]
async fn send_photo_error_is_reported_without_token() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path_matches(method_path("sendPhoto"));
        then.status(400)
            .header("content-type", "application/json")
            .body(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#);
    });

    let err = bot(&server)
        .send_photo(&Destination::from(100), b"PNG!", MAP_CAPTION)
        .await
        .unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("sendPhoto failed"));
    assert!(message.contains("chat not found"));
    assert!(!message.contains(TOKEN));
}

#[tokio::test]
async fn send_text_error_is_reported_without_token() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path_matches(method_path("sendMessage"));
        then.status(403)
            .header("content-type", "application/json")
            .body(
                r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#,
            );
    });

    let err = bot(&server)
        .send_text(&Destination::from(42), "hi")
        .await
        .unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("sendMessage failed"));
    assert!(message.contains("bot was blocked"));
    assert!(!message.contains(TOKEN));
}

#[tokio::test]
async fn discovery_deduplicates_chats_from_updates() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path_matches(method_path("getUpdates"))
            .body_includes(r#""offset":-1"#)
            .body_includes(r#""limit":100"#)
            .body_includes(r#""timeout":30"#);
        then.status(200)
            .header("content-type", "application/json")
            .body(
                r#"{"ok":true,"result":[
                    {"update_id":1,"message":{"message_id":5,"date":1760000000,"chat":{"id":777,"type":"private","first_name":"Desk"},"text":"hi"}},
                    {"update_id":2,"edited_message":{"message_id":5,"date":1760000000,"edit_date":1760000100,"chat":{"id":777,"type":"private","first_name":"Desk"},"text":"hi!"}},
                    {"update_id":3,"channel_post":{"message_id":9,"date":1760000000,"chat":{"id":-1001,"type":"channel","title":"Briefing"},"text":"post"}}
                ]}"#,
            );
    });

    let destinations = resolve_destinations(None, &bot(&server)).await;

    mock.assert();
    assert_eq!(destinations, BTreeSet::from([Destination::from(777), Destination::from(-1001)]));
}

#[tokio::test]
async fn configured_chat_skips_discovery() {
    let server = MockServer::start();
    let updates = server.mock(|when, then| {
        when.method(POST).path_matches(method_path("getUpdates"));
        then.status(200).body(r#"{"ok":true,"result":[]}"#);
    });

    let destinations = resolve_destinations(Some("@market_briefing"), &bot(&server)).await;

    updates.assert_calls(0);
    assert_eq!(destinations, BTreeSet::from([Destination::from("@market_briefing")]));
}

#[tokio::test]
async fn blocked_chat_does_not_stop_other_deliveries() {
    let server = MockServer::start();
    let blocked = server.mock(|when, then| {
        when.method(POST)
            .path_matches(method_path("sendMessage"))
            .body_includes(r#""chat_id":1001"#);
        then.status(403)
            .header("content-type", "application/json")
            .body(
                r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#,
            );
    });
    let delivered = server.mock(|when, then| {
        when.method(POST)
            .path_matches(method_path("sendMessage"))
            .body_includes(r#""chat_id":2002"#);
        then.status(200)
            .header("content-type", "application/json")
            .body(sent_message(2002));
    });
    let photo = server.mock(|when, then| {
        when.method(POST).path_matches(method_path("sendPhoto"));
        then.status(200)
            .header("content-type", "application/json")
            .body(
                r#"{"ok":true,"result":{"message_id":3,"date":1760000000,
                    "chat":{"id":2002,"type":"private","first_name":"Desk"},
                    "photo":[{"file_id":"f1","file_unique_id":"u1","width":1200,"height":600}]}}"#,
            );
    });

    let bot = bot(&server);
    let destinations = BTreeSet::from([Destination::from(1001), Destination::from(2002)]);
    let attachment = Attachment {
        png: b"PNG!".to_vec(),
        caption: MAP_CAPTION.to_string(),
    };
    let outcome = Dispatcher::new(&bot, Duration::ZERO)
        .dispatch("briefing", Some(&attachment), &destinations)
        .await;

    blocked.assert();
    delivered.assert();
    // The blocked chat never reaches the photo step.
    photo.assert_calls(1);
    let DispatchOutcome::Completed(summary) = outcome else {
        panic!("expected a completed dispatch");
    };
    assert_eq!(summary.delivered, vec![Destination::from(2002)]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, Destination::from(1001));
}
