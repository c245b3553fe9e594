//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, NaiveDate, Utc};
use gather_core::{
  enrollment::{EnrollmentInsert, NewEnrollment},
  event::{EventPatch, NewEvent},
  participant::{NewParticipant, ParticipantInsert, ParticipantPatch},
  store::{EnrollmentStore, EventQuery, EventStore, PageRequest, ParticipantStore},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

fn event_input(name: &str, category: &str, days_ahead: i64) -> NewEvent {
  NewEvent {
    name:             name.into(),
    description:      format!("{name} description"),
    date:             Utc::now() + Duration::days(days_ahead),
    location:         "Main Hall".into(),
    category:         category.into(),
    max_participants: 10,
    image:            None,
  }
}

fn participant_input(account: &str) -> NewParticipant {
  NewParticipant {
    first_name:    "Alice".into(),
    last_name:     "Liddell".into(),
    date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 26).unwrap(),
    email:         format!("{account}@example.com"),
    account_id:    account.into(),
  }
}

async fn create_participant(s: &SqliteStore, account: &str) -> i64 {
  match s.create_participant(participant_input(account)).await.unwrap() {
    ParticipantInsert::Created(p) => p.id,
    ParticipantInsert::DuplicateAccount => panic!("account taken: {account}"),
  }
}

fn enrollment_of(insert: EnrollmentInsert) -> gather_core::enrollment::Enrollment {
  match insert {
    EnrollmentInsert::Created(e) => e,
    other => panic!("expected Created, got {other:?}"),
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_event() {
  let s = store().await;

  let created = s.create_event(event_input("Concert", "Music", 3)).await.unwrap();
  assert!(created.id > 0);

  let fetched = s.get_event(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Concert");
  assert_eq!(fetched.category, "Music");
  assert_eq!(fetched.max_participants, 10);
  assert_eq!(fetched.date, created.date);
}

#[tokio::test]
async fn get_event_missing_returns_none() {
  let s = store().await;
  assert!(s.get_event(999).await.unwrap().is_none());
}

#[tokio::test]
async fn update_event_applies_present_fields_only() {
  let s = store().await;
  let created = s.create_event(event_input("Workshop", "Tech", 5)).await.unwrap();

  let patch = EventPatch {
    name: Some("Rust Workshop".into()),
    max_participants: Some(25),
    ..Default::default()
  };
  let updated = s.update_event(created.id, patch).await.unwrap().unwrap();

  assert_eq!(updated.name, "Rust Workshop");
  assert_eq!(updated.max_participants, 25);
  // untouched fields survive
  assert_eq!(updated.description, created.description);
  assert_eq!(updated.category, "Tech");
  assert_eq!(updated.date, created.date);
}

#[tokio::test]
async fn update_event_missing_returns_none() {
  let s = store().await;
  let patch = EventPatch { name: Some("x".into()), ..Default::default() };
  assert!(s.update_event(42, patch).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_event_true_then_false() {
  let s = store().await;
  let created = s.create_event(event_input("Gone", "Misc", 1)).await.unwrap();

  assert!(s.delete_event(created.id).await.unwrap());
  assert!(!s.delete_event(created.id).await.unwrap());
  assert!(s.get_event(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_event_cascades_enrollments() {
  let s = store().await;
  let event = s.create_event(event_input("Cascade", "Misc", 2)).await.unwrap();
  let pid = create_participant(&s, "acct-cascade").await;

  let enrollment = enrollment_of(
    s.create_enrollment(NewEnrollment {
      event_id:       event.id,
      participant_id: pid,
      registered_at:  None,
    })
    .await
    .unwrap(),
  );

  assert!(s.delete_event(event.id).await.unwrap());
  assert!(s.get_enrollment(enrollment.id).await.unwrap().is_none());
  assert_eq!(s.count_enrollments(event.id).await.unwrap(), 0);
}

#[tokio::test]
async fn event_image_roundtrip_and_replace() {
  let s = store().await;

  let mut input = event_input("Pictured", "Art", 4);
  input.image = Some(vec![0xde, 0xad, 0xbe, 0xef]);
  let event = s.create_event(input).await.unwrap();

  assert_eq!(
    s.event_image(event.id).await.unwrap(),
    Some(vec![0xde, 0xad, 0xbe, 0xef])
  );

  let patch = EventPatch { image: Some(vec![1, 2, 3]), ..Default::default() };
  s.update_event(event.id, patch).await.unwrap().unwrap();
  assert_eq!(s.event_image(event.id).await.unwrap(), Some(vec![1, 2, 3]));
}

#[tokio::test]
async fn event_without_image_yields_none() {
  let s = store().await;
  let event = s.create_event(event_input("Plain", "Misc", 1)).await.unwrap();
  assert!(s.event_image(event.id).await.unwrap().is_none());
  // unknown id behaves the same
  assert!(s.event_image(9999).await.unwrap().is_none());
}

// ─── Event listing ───────────────────────────────────────────────────────────

#[tokio::test]
async fn list_events_filters_by_category_substring() {
  let s = store().await;
  s.create_event(event_input("A", "Live Music", 1)).await.unwrap();
  s.create_event(event_input("B", "Theatre", 2)).await.unwrap();
  s.create_event(event_input("C", "Music", 3)).await.unwrap();

  let page = s
    .list_events(&EventQuery {
      category: Some("Music".into()),
      page: PageRequest { number: 1, size: 10 },
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(page.total_count, 2);
  assert_eq!(page.events.len(), 2);
  assert!(page.events.iter().all(|e| e.category.contains("Music")));
}

#[tokio::test]
async fn list_events_filters_by_date_range() {
  let s = store().await;
  s.create_event(event_input("Soon", "Misc", 1)).await.unwrap();
  s.create_event(event_input("Later", "Misc", 10)).await.unwrap();
  s.create_event(event_input("Much later", "Misc", 30)).await.unwrap();

  let page = s
    .list_events(&EventQuery {
      start_date: Some(Utc::now() + Duration::days(5)),
      end_date:   Some(Utc::now() + Duration::days(15)),
      page: PageRequest { number: 1, size: 10 },
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(page.total_count, 1);
  assert_eq!(page.events[0].name, "Later");
}

#[tokio::test]
async fn list_events_excludes_dates_before_cutoff() {
  let s = store().await;
  s.create_event(event_input("Past", "Misc", -3)).await.unwrap();
  s.create_event(event_input("Future", "Misc", 3)).await.unwrap();

  let page = s
    .list_events(&EventQuery {
      not_before: Some(Utc::now()),
      page: PageRequest { number: 1, size: 10 },
      ..Default::default()
    })
    .await
    .unwrap();

  // The excluded row is gone from the total, not just from the page.
  assert_eq!(page.total_count, 1);
  assert_eq!(page.events[0].name, "Future");
}

#[tokio::test]
async fn list_events_orders_by_date_ascending() {
  let s = store().await;
  s.create_event(event_input("Third", "Misc", 9)).await.unwrap();
  s.create_event(event_input("First", "Misc", 1)).await.unwrap();
  s.create_event(event_input("Second", "Misc", 5)).await.unwrap();

  let page = s
    .list_events(&EventQuery {
      page: PageRequest { number: 1, size: 10 },
      ..Default::default()
    })
    .await
    .unwrap();

  let names: Vec<_> = page.events.iter().map(|e| e.name.as_str()).collect();
  assert_eq!(names, ["First", "Second", "Third"]);
}

#[tokio::test]
async fn list_events_pages_enumerate_filtered_set_exactly() {
  let s = store().await;
  for i in 1..=3 {
    s.create_event(event_input(&format!("M{i}"), "Music", i)).await.unwrap();
  }
  s.create_event(event_input("Other", "Theatre", 2)).await.unwrap();

  let query = |number| EventQuery {
    category: Some("Music".into()),
    page: PageRequest { number, size: 2 },
    ..Default::default()
  };

  let first = s.list_events(&query(1)).await.unwrap();
  let second = s.list_events(&query(2)).await.unwrap();

  assert_eq!(first.total_count, 3);
  assert_eq!(second.total_count, 3);

  let mut ids: Vec<i64> = first
    .events
    .iter()
    .chain(second.events.iter())
    .map(|e| e.id)
    .collect();
  let before_dedup = ids.len();
  ids.sort_unstable();
  ids.dedup();

  // no duplicates, no gaps: both pages together cover the filtered set
  assert_eq!(before_dedup, 3);
  assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn list_events_out_of_range_page_is_empty_with_total() {
  let s = store().await;
  s.create_event(event_input("Only", "Misc", 1)).await.unwrap();

  let page = s
    .list_events(&EventQuery {
      page: PageRequest { number: 7, size: 10 },
      ..Default::default()
    })
    .await
    .unwrap();

  assert!(page.events.is_empty());
  assert_eq!(page.total_count, 1);
}

#[tokio::test]
async fn list_events_for_account_returns_joined_rows() {
  let s = store().await;
  let pid = create_participant(&s, "acct-join").await;
  let other = create_participant(&s, "acct-other").await;

  let e1 = s.create_event(event_input("Joined A", "Misc", 2)).await.unwrap();
  let e2 = s.create_event(event_input("Joined B", "Misc", 1)).await.unwrap();
  let e3 = s.create_event(event_input("Not joined", "Misc", 3)).await.unwrap();

  for event_id in [e1.id, e2.id] {
    s.create_enrollment(NewEnrollment {
      event_id,
      participant_id: pid,
      registered_at: None,
    })
    .await
    .unwrap();
  }
  s.create_enrollment(NewEnrollment {
    event_id:       e3.id,
    participant_id: other,
    registered_at:  None,
  })
  .await
  .unwrap();

  let rows = s.list_events_for_account("acct-join").await.unwrap();
  assert_eq!(rows.len(), 2);
  // date ascending: B (1 day ahead) before A (2 days ahead)
  assert_eq!(rows[0].0.name, "Joined B");
  assert_eq!(rows[1].0.name, "Joined A");
  assert!(rows.iter().all(|(_, en)| en.participant_id == pid));
}

// ─── Enrollments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_enrollment_assigns_id_and_timestamp() {
  let s = store().await;
  let event = s.create_event(event_input("E", "Misc", 1)).await.unwrap();
  let pid = create_participant(&s, "acct-e").await;

  let before = Utc::now();
  let enrollment = enrollment_of(
    s.create_enrollment(NewEnrollment {
      event_id:       event.id,
      participant_id: pid,
      registered_at:  None,
    })
    .await
    .unwrap(),
  );

  assert!(enrollment.id > 0);
  assert!(enrollment.registered_at >= before);

  let fetched = s.get_enrollment(enrollment.id).await.unwrap().unwrap();
  assert_eq!(fetched.event_id, event.id);
  assert_eq!(fetched.participant_id, pid);
}

#[tokio::test]
async fn create_enrollment_keeps_supplied_timestamp() {
  let s = store().await;
  let event = s.create_event(event_input("E", "Misc", 1)).await.unwrap();
  let pid = create_participant(&s, "acct-ts").await;

  let supplied = Utc::now() - Duration::hours(2);
  let enrollment = enrollment_of(
    s.create_enrollment(NewEnrollment {
      event_id:       event.id,
      participant_id: pid,
      registered_at:  Some(supplied),
    })
    .await
    .unwrap(),
  );

  let fetched = s.get_enrollment(enrollment.id).await.unwrap().unwrap();
  assert_eq!(fetched.registered_at, supplied);
}

#[tokio::test]
async fn duplicate_pair_is_reported_as_such() {
  let s = store().await;
  let event = s.create_event(event_input("Dup", "Misc", 1)).await.unwrap();
  let pid = create_participant(&s, "acct-dup").await;

  let input = NewEnrollment {
    event_id:       event.id,
    participant_id: pid,
    registered_at:  None,
  };

  enrollment_of(s.create_enrollment(input.clone()).await.unwrap());
  let second = s.create_enrollment(input).await.unwrap();
  assert!(matches!(second, EnrollmentInsert::DuplicatePair));
  assert_eq!(s.count_enrollments(event.id).await.unwrap(), 1);
}

#[tokio::test]
async fn enrollment_against_missing_event_is_reported() {
  let s = store().await;
  let pid = create_participant(&s, "acct-miss").await;

  let insert = s
    .create_enrollment(NewEnrollment {
      event_id:       777,
      participant_id: pid,
      registered_at:  None,
    })
    .await
    .unwrap();

  assert!(matches!(insert, EnrollmentInsert::EventMissing));
}

#[tokio::test]
async fn delete_enrollment_true_then_false() {
  let s = store().await;
  let event = s.create_event(event_input("D", "Misc", 1)).await.unwrap();
  let pid = create_participant(&s, "acct-del").await;

  let enrollment = enrollment_of(
    s.create_enrollment(NewEnrollment {
      event_id:       event.id,
      participant_id: pid,
      registered_at:  None,
    })
    .await
    .unwrap(),
  );

  assert!(s.delete_enrollment(enrollment.id).await.unwrap());
  assert!(!s.delete_enrollment(enrollment.id).await.unwrap());
}

#[tokio::test]
async fn list_enrollments_scoped_and_unscoped() {
  let s = store().await;
  let e1 = s.create_event(event_input("L1", "Misc", 1)).await.unwrap();
  let e2 = s.create_event(event_input("L2", "Misc", 2)).await.unwrap();
  let p1 = create_participant(&s, "acct-l1").await;
  let p2 = create_participant(&s, "acct-l2").await;

  for (event_id, participant_id) in [(e1.id, p1), (e1.id, p2), (e2.id, p1)] {
    s.create_enrollment(NewEnrollment {
      event_id,
      participant_id,
      registered_at: None,
    })
    .await
    .unwrap();
  }

  let scoped = s.list_enrollments(Some(e1.id)).await.unwrap();
  assert_eq!(scoped.len(), 2);
  assert!(scoped.iter().all(|(en, _)| en.event_id == e1.id));

  let all = s.list_enrollments(None).await.unwrap();
  assert_eq!(all.len(), 3);
  // participant info rides along
  assert!(all.iter().any(|(_, p)| p.account_id == "acct-l2"));
}

#[tokio::test]
async fn enrollments_for_participant_is_scoped_to_one_event() {
  let s = store().await;
  let e1 = s.create_event(event_input("S1", "Misc", 1)).await.unwrap();
  let e2 = s.create_event(event_input("S2", "Misc", 2)).await.unwrap();
  let pid = create_participant(&s, "acct-scope").await;

  for event_id in [e1.id, e2.id] {
    s.create_enrollment(NewEnrollment {
      event_id,
      participant_id: pid,
      registered_at: None,
    })
    .await
    .unwrap();
  }

  let found = s.enrollments_for_participant(pid, e1.id).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].event_id, e1.id);

  assert!(s.enrollments_for_participant(pid, 555).await.unwrap().is_empty());
}

// ─── Participants ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_participant_by_account() {
  let s = store().await;
  let pid = create_participant(&s, "acct-find").await;

  let found = s.find_participant_by_account("acct-find").await.unwrap().unwrap();
  assert_eq!(found.id, pid);
  assert_eq!(found.email, "acct-find@example.com");

  assert!(s.find_participant_by_account("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_account_is_reported_as_such() {
  let s = store().await;
  create_participant(&s, "acct-taken").await;

  let second = s.create_participant(participant_input("acct-taken")).await.unwrap();
  assert!(matches!(second, ParticipantInsert::DuplicateAccount));
}

#[tokio::test]
async fn update_participant_applies_present_fields_only() {
  let s = store().await;
  let pid = create_participant(&s, "acct-up").await;

  let patch = ParticipantPatch {
    email: Some("new@example.com".into()),
    ..Default::default()
  };
  let updated = s.update_participant(pid, patch).await.unwrap().unwrap();

  assert_eq!(updated.email, "new@example.com");
  assert_eq!(updated.first_name, "Alice");
  assert_eq!(updated.account_id, "acct-up");
}

#[tokio::test]
async fn get_participant_missing_returns_none() {
  let s = store().await;
  assert!(s.get_participant(404).await.unwrap().is_none());
}

#[tokio::test]
async fn list_participants_returns_all() {
  let s = store().await;
  create_participant(&s, "acct-a").await;
  create_participant(&s, "acct-b").await;

  let all = s.list_participants().await.unwrap();
  assert_eq!(all.len(), 2);
}
