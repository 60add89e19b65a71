//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, Duration, TimeZone, Utc};
use runstory_core::{
  Token,
  cache::{self, CacheDecision},
  record::{NewRecord, Record},
  store::{LinkIndex, RecordStore, StoryStore, WriteOutcome},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 5, 4, 9, 0, 0).unwrap() }

fn record(entity_id: &str, fetched_at: DateTime<Utc>, content: &str) -> Record {
  NewRecord {
    entity_id:    entity_id.into(),
    content:      content.into(),
    raw_data:     Some(format!("# Runner {entity_id}")),
    display_name: format!("Runner {entity_id}"),
    fetched_at,
  }
  .into_record(Token::generate(), fetched_at + Duration::seconds(30))
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_record() {
  let s = store().await;
  let r = record("12345", t0(), "Once upon a parkrun");

  assert_eq!(s.create_record(&r).await.unwrap(), WriteOutcome::Written);

  let fetched = s
    .get_by_entity_and_token("12345", &r.token)
    .await
    .unwrap()
    .expect("record present");
  assert_eq!(fetched, r);
}

#[tokio::test]
async fn get_with_wrong_entity_returns_none() {
  let s = store().await;
  let r = record("12345", t0(), "story");
  s.create_record(&r).await.unwrap();

  assert!(s.get_by_entity_and_token("99999", &r.token).await.unwrap().is_none());
  assert!(
    s.get_by_entity_and_token("12345", &Token::generate())
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn null_raw_data_round_trips() {
  let s = store().await;
  let mut r = record("12345", t0(), "legacy story");
  r.raw_data = None;
  s.create_record(&r).await.unwrap();

  let fetched = s.most_recent_for("12345").await.unwrap().unwrap();
  assert_eq!(fetched.raw_data, None);
}

#[tokio::test]
async fn create_record_never_overwrites() {
  let s = store().await;
  let first = record("12345", t0(), "first");
  s.create_record(&first).await.unwrap();

  let mut clash = record("12345", t0() + Duration::days(1), "second");
  clash.token = first.token.clone();
  assert_eq!(s.create_record(&clash).await.unwrap(), WriteOutcome::TokenCollision);

  // Same token under another athlete is also a collision.
  let mut elsewhere = record("777", t0(), "elsewhere");
  elsewhere.token = first.token.clone();
  assert_eq!(s.create_record(&elsewhere).await.unwrap(), WriteOutcome::TokenCollision);

  let kept = s.get_by_entity_and_token("12345", &first.token).await.unwrap().unwrap();
  assert_eq!(kept.content, "first");
}

#[tokio::test]
async fn most_recent_picks_latest_fetch() {
  let s = store().await;
  s.create_record(&record("12345", t0(), "oldest")).await.unwrap();
  s.create_record(&record("12345", t0() + Duration::days(3), "newest")).await.unwrap();
  s.create_record(&record("12345", t0() + Duration::days(1), "middle")).await.unwrap();

  let latest = s.most_recent_for("12345").await.unwrap().unwrap();
  assert_eq!(latest.content, "newest");
}

#[tokio::test]
async fn most_recent_breaks_ties_on_creation() {
  let s = store().await;
  let mut a = record("12345", t0(), "earlier write");
  let mut b = record("12345", t0(), "later write");
  a.created_at = t0() + Duration::minutes(1);
  b.created_at = t0() + Duration::minutes(2);
  s.create_record(&b).await.unwrap();
  s.create_record(&a).await.unwrap();

  let latest = s.most_recent_for("12345").await.unwrap().unwrap();
  assert_eq!(latest.content, "later write");
}

#[tokio::test]
async fn most_recent_is_scoped_to_entity() {
  let s = store().await;
  s.create_record(&record("111", t0() + Duration::days(5), "other athlete")).await.unwrap();
  s.create_record(&record("222", t0(), "mine")).await.unwrap();

  let latest = s.most_recent_for("222").await.unwrap().unwrap();
  assert_eq!(latest.content, "mine");
  assert!(s.most_recent_for("333").await.unwrap().is_none());
}

#[tokio::test]
async fn list_for_is_newest_first() {
  let s = store().await;
  s.create_record(&record("12345", t0(), "a")).await.unwrap();
  s.create_record(&record("12345", t0() + Duration::days(2), "c")).await.unwrap();
  s.create_record(&record("12345", t0() + Duration::days(1), "b")).await.unwrap();
  s.create_record(&record("555", t0(), "x")).await.unwrap();

  let contents: Vec<String> = s
    .list_for("12345")
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.content)
    .collect();
  assert_eq!(contents, vec!["c", "b", "a"]);
}

// ─── Links ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_unknown_token_returns_none() {
  let s = store().await;
  assert!(s.resolve(&Token::generate()).await.unwrap().is_none());
}

#[tokio::test]
async fn link_collision_keeps_original_mapping() {
  let s = store().await;
  let r = record("12345", t0(), "story");
  assert_eq!(s.create_link(&r.link_entry()).await.unwrap(), WriteOutcome::Written);

  let mut hijack = r.link_entry();
  hijack.entity_id = "66666".into();
  assert_eq!(s.create_link(&hijack).await.unwrap(), WriteOutcome::TokenCollision);

  assert_eq!(s.resolve(&r.token).await.unwrap().as_deref(), Some("12345"));
}

#[tokio::test]
async fn expired_links_still_resolve() {
  let s = store().await;
  let r = record("12345", t0() - Duration::days(400), "ancient");
  s.persist(&r, &r.link_entry()).await.unwrap();

  assert!(r.expires_at < Utc::now());
  assert_eq!(s.resolve(&r.token).await.unwrap().as_deref(), Some("12345"));
}

// ─── Persist ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn persist_then_resolve_round_trip() {
  let s = store().await;
  let r = record("12345", t0(), "The tale of a Saturday morning");

  assert_eq!(s.persist(&r, &r.link_entry()).await.unwrap(), WriteOutcome::Written);

  let entity_id = s.resolve(&r.token).await.unwrap().expect("link present");
  assert_eq!(entity_id, "12345");
  let fetched = s
    .get_by_entity_and_token(&entity_id, &r.token)
    .await
    .unwrap()
    .expect("record present");
  assert_eq!(fetched.content, "The tale of a Saturday morning");
}

#[tokio::test]
async fn persist_link_collision_writes_nothing() {
  let s = store().await;
  let existing = record("111", t0(), "existing");
  s.persist(&existing, &existing.link_entry()).await.unwrap();

  // Fresh record, but its link token clashes with an existing link.
  let mut r = record("222", t0(), "new");
  r.token = existing.token.clone();
  let mut r_only = r.clone();
  r_only.token = Token::generate();

  assert_eq!(
    s.persist(&r_only, &r.link_entry()).await.unwrap(),
    WriteOutcome::TokenCollision
  );
  // The record insert in the same transaction was rolled back.
  assert!(s.most_recent_for("222").await.unwrap().is_none());
  assert_eq!(s.resolve(&existing.token).await.unwrap().as_deref(), Some("111"));
}

#[tokio::test]
async fn persist_record_collision_writes_nothing() {
  let s = store().await;
  let existing = record("111", t0(), "existing");
  s.create_record(&existing).await.unwrap();

  let mut r = record("111", t0(), "new");
  r.token = existing.token.clone();
  assert_eq!(
    s.persist(&r, &r.link_entry()).await.unwrap(),
    WriteOutcome::TokenCollision
  );
  assert!(s.resolve(&existing.token).await.unwrap().is_none());
}

// ─── Cache decision against the real store ──────────────────────────────────

#[tokio::test]
async fn cache_decision_over_sqlite() {
  let s = store().await;
  let now = t0() + Duration::days(10);

  assert_eq!(cache::decide(&s, "12345", now).await.unwrap(), CacheDecision::Miss);

  s.create_record(&record("12345", now - Duration::days(7), "stale")).await.unwrap();
  assert_eq!(cache::decide(&s, "12345", now).await.unwrap(), CacheDecision::Miss);

  let fresh = record("12345", now - Duration::hours(2), "fresh");
  s.create_record(&fresh).await.unwrap();
  assert_eq!(
    cache::decide(&s, "12345", now).await.unwrap(),
    CacheDecision::Reuse(fresh)
  );
}

#[tokio::test]
async fn file_backed_store_reopens_with_data() {
  let dir = std::env::temp_dir().join(format!("runstory-test-{}", Token::generate()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("stories.db");
  let r = record("12345", t0(), "durable");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.persist(&r, &r.link_entry()).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.resolve(&r.token).await.unwrap().as_deref(), Some("12345"));
  drop(s);
  let _ = std::fs::remove_dir_all(&dir);
}
