mod common;

use common::FakeClient;
use reading::{parse_batch, Field, TimeRange};
use sensorgraph_core::{CancelToken, FetchError, ReadingSource};
use sensorgraph_fetch::{date_prefix, fetch_objects, parse_listing, HttpResponse, ListingSource};

const BASE: &str = "http://sensors.test";

fn listing_xml(keys: &[&str], token: Option<&str>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Name>sensors</Name>"#,
    );
    for key in keys {
        xml.push_str(&format!(
            "<Contents><Key>{key}</Key><Size>10</Size></Contents>"
        ));
    }
    if let Some(token) = token {
        xml.push_str(&format!("<NextContinuationToken>{token}</NextContinuationToken>"));
    }
    xml.push_str("</ListBucketResult>");
    xml
}

fn text(body: &str) -> HttpResponse {
    HttpResponse::ok("text/plain", body)
}

// 2024-03-05T12:00:00Z
const MARCH_5: i64 = 1_709_640_000_000;

#[test]
fn date_prefix_pads_month_but_not_day() {
    assert_eq!(
        date_prefix("environment", MARCH_5).unwrap(),
        "environment2024/03/5"
    );
    assert_eq!(date_prefix("env-", 0).unwrap(), "env-1970/01/1");
}

#[test]
fn parse_listing_reads_keys_and_token() {
    let page = parse_listing(&listing_xml(&["a/1.json", "a/2.json"], Some("tok&amp;en")));
    assert_eq!(page.keys, vec!["a/1.json", "a/2.json"]);
    assert_eq!(page.next_token.as_deref(), Some("tok&en"));

    let last = parse_listing(&listing_xml(&["b"], None));
    assert_eq!(last.keys, vec!["b"]);
    assert!(last.next_token.is_none());
    assert!(parse_listing("<ListBucketResult/>").keys.is_empty());
}

#[test]
fn parse_listing_decodes_numeric_references() {
    let page = parse_listing(&listing_xml(
        &["log&#13;1", "a&#x2F;b", "x&#xZZ;y&amp;lt;"],
        None,
    ));
    assert_eq!(page.keys, vec!["log\r1", "a/b", "x&#xZZ;y&lt;"]);
}

#[test]
fn listing_follows_continuation_tokens() {
    let mut client = FakeClient::new();
    client.respond(
        &format!("{BASE}?list-type=2&start-after=environment2024/03/5&max-keys=1000"),
        text(&listing_xml(&["environment2024/03/5/a"], Some("page2"))),
    );
    client.respond(
        &format!("{BASE}?list-type=2&continuation-token=page2"),
        text(&listing_xml(&["environment2024/03/6/b"], None)),
    );
    client.respond(
        &format!("{BASE}/environment2024/03/5/a"),
        text("{\"time\": 2, \"temperature\": 20}\n{\"time\": 1, \"temperature\": 19}\n"),
    );
    client.respond(
        &format!("{BASE}/environment2024/03/6/b"),
        text("{\"time\": 3, \"temperature\": 21, \"light\": 9}\nbroken\n"),
    );

    let source = ListingSource::new(client, &format!("{BASE}/")).with_workers(2);
    let range = TimeRange::new(MARCH_5, MARCH_5 + 86_400_000).unwrap();
    let batches = source.fetch(&range, &CancelToken::new()).expect("fetch");

    assert_eq!(batches.len(), 2);
    assert_eq!(parse_batch(&batches[0]).len(), 2);
    let second = parse_batch(&batches[1]);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].light, Some(9.0));
    assert_eq!(source.fields(), &[Field::Temperature, Field::Light]);
}

#[test]
fn repeated_token_is_malformed() {
    let mut client = FakeClient::new();
    client.respond(
        &format!("{BASE}?list-type=2&start-after=x&max-keys=5"),
        text(&listing_xml(&[], Some("again"))),
    );
    client.respond(
        &format!("{BASE}?list-type=2&continuation-token=again"),
        text(&listing_xml(&[], Some("again"))),
    );
    let source = ListingSource::new(client, BASE).with_max_keys(5);
    let err = source.list_keys("x", &CancelToken::new()).unwrap_err();
    assert!(matches!(err, FetchError::Malformed(_)));
}

#[test]
fn listing_status_error_aborts() {
    let client = FakeClient::new();
    let source = ListingSource::new(client, BASE);
    let err = source.list_keys("x", &CancelToken::new()).unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
}

#[test]
fn one_failed_object_fails_the_batch() {
    let mut client = FakeClient::new();
    for key in ["k1", "k2", "k4"] {
        client.respond(&format!("{BASE}/{key}"), text("{\"time\": 1}"));
    }
    let keys: Vec<String> = ["k1", "k2", "k3", "k4"].iter().map(|k| k.to_string()).collect();
    let err = fetch_objects(&client, BASE, &keys, 3, &CancelToken::new()).unwrap_err();
    match err {
        FetchError::Status { url, status } => {
            assert_eq!(url, format!("{BASE}/k3"));
            assert_eq!(status, 404);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn objects_keep_key_order() {
    let mut client = FakeClient::new();
    let keys: Vec<String> = (0..12).map(|idx| format!("obj{idx}")).collect();
    for (idx, key) in keys.iter().enumerate() {
        client.respond(
            &format!("{BASE}/{key}"),
            text(&format!("{{\"time\": {idx}}}")),
        );
    }
    let batches = fetch_objects(&client, BASE, &keys, 4, &CancelToken::new()).expect("fetch");
    let times: Vec<i64> = batches
        .iter()
        .flat_map(|batch| parse_batch(batch))
        .map(|reading| reading.time)
        .collect();
    assert_eq!(times, (0..12).collect::<Vec<i64>>());
    assert_eq!(client.requests().len(), 12);
}

#[test]
fn cancelled_token_stops_fetching() {
    let client = FakeClient::new();
    let cancel = CancelToken::new();
    cancel.cancel();
    let keys = vec!["a".to_string()];
    let err = fetch_objects(&client, BASE, &keys, 1, &cancel).unwrap_err();
    assert!(matches!(err, FetchError::Cancelled));
    assert!(client.requests().is_empty());

    let source = ListingSource::new(FakeClient::new(), BASE);
    let range = TimeRange::new(0, 1).unwrap();
    assert!(matches!(
        source.fetch(&range, &cancel),
        Err(FetchError::Cancelled)
    ));
}

#[test]
fn empty_listing_fetches_nothing() {
    let batches = fetch_objects(&FakeClient::new(), BASE, &[], 8, &CancelToken::new()).unwrap();
    assert!(batches.is_empty());
}
