//! [`SqliteStore`] — the SQLite implementation of the core store traits.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use gather_core::{
  enrollment::{Enrollment, EnrollmentInsert, NewEnrollment},
  event::{Event, EventPatch, NewEvent},
  participant::{NewParticipant, Participant, ParticipantInsert, ParticipantPatch},
  store::{EnrollmentStore, EventPage, EventQuery, EventStore, ParticipantStore},
};

use crate::{
  Error, Result,
  encode::{RawEnrollment, RawEvent, RawParticipant, encode_date, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Gather store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// are serialised onto the connection's worker thread, so a multi-statement
/// closure runs without interleaving.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row readers ─────────────────────────────────────────────────────────────

const EVENT_COLUMNS: &str =
  "event_id, name, description, date, location, category, max_participants";

fn event_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
  Ok(RawEvent {
    event_id:         row.get(0)?,
    name:             row.get(1)?,
    description:      row.get(2)?,
    date:             row.get(3)?,
    location:         row.get(4)?,
    category:         row.get(5)?,
    max_participants: row.get(6)?,
  })
}

fn enrollment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEnrollment> {
  Ok(RawEnrollment {
    enrollment_id:  row.get(0)?,
    event_id:       row.get(1)?,
    participant_id: row.get(2)?,
    registered_at:  row.get(3)?,
  })
}

fn participant_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawParticipant> {
  Ok(RawParticipant {
    participant_id: row.get(0)?,
    first_name:     row.get(1)?,
    last_name:      row.get(2)?,
    date_of_birth:  row.get(3)?,
    email:          row.get(4)?,
    account_id:     row.get(5)?,
  })
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = Error;

  async fn create_event(&self, input: NewEvent) -> Result<Event> {
    let date = input.date;
    let date_str = encode_dt(date);
    let NewEvent {
      name,
      description,
      location,
      category,
      max_participants,
      image,
      ..
    } = input;

    let (row_name, row_description, row_location, row_category) =
      (name.clone(), description.clone(), location.clone(), category.clone());

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events
             (name, description, date, location, category, max_participants, image)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            row_name,
            row_description,
            date_str,
            row_location,
            row_category,
            max_participants,
            image,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Event {
      id,
      name,
      description,
      date,
      location,
      category,
      max_participants,
    })
  }

  async fn update_event(&self, id: i64, patch: EventPatch) -> Result<Option<Event>> {
    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        let existing = conn
          .query_row(
            &format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = ?1"),
            rusqlite::params![id],
            event_row,
          )
          .optional()?;

        let Some(mut raw) = existing else {
          return Ok(None);
        };

        if let Some(name) = patch.name {
          raw.name = name;
        }
        if let Some(description) = patch.description {
          raw.description = description;
        }
        if let Some(date) = patch.date {
          raw.date = encode_dt(date);
        }
        if let Some(location) = patch.location {
          raw.location = location;
        }
        if let Some(category) = patch.category {
          raw.category = category;
        }
        if let Some(max) = patch.max_participants {
          raw.max_participants = i64::from(max);
        }

        conn.execute(
          "UPDATE events
           SET name = ?1, description = ?2, date = ?3, location = ?4,
               category = ?5, max_participants = ?6
           WHERE event_id = ?7",
          rusqlite::params![
            raw.name,
            raw.description,
            raw.date,
            raw.location,
            raw.category,
            raw.max_participants,
            id,
          ],
        )?;

        if let Some(image) = patch.image {
          conn.execute(
            "UPDATE events SET image = ?1 WHERE event_id = ?2",
            rusqlite::params![image, id],
          )?;
        }

        Ok(Some(raw))
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn delete_event(&self, id: i64) -> Result<bool> {
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM events WHERE event_id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(affected > 0)
  }

  async fn get_event(&self, id: i64) -> Result<Option<Event>> {
    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = ?1"),
              rusqlite::params![id],
              event_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn event_image(&self, id: i64) -> Result<Option<Vec<u8>>> {
    let blob: Option<Option<Vec<u8>>> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT image FROM events WHERE event_id = ?1",
              rusqlite::params![id],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(blob.flatten())
  }

  async fn list_events(&self, query: &EventQuery) -> Result<EventPage> {
    use rusqlite::types::Value;

    // Build the WHERE clause dynamically; placeholders are positional in
    // push order and shared between the COUNT and the page query.
    let mut conds: Vec<&'static str> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(start) = query.start_date {
      conds.push("date >= ?");
      params.push(Value::from(encode_dt(start)));
    }
    if let Some(end) = query.end_date {
      conds.push("date <= ?");
      params.push(Value::from(encode_dt(end)));
    }
    if let Some(location) = &query.location {
      conds.push("location LIKE ?");
      params.push(Value::from(format!("%{location}%")));
    }
    if let Some(category) = &query.category {
      conds.push("category LIKE ?");
      params.push(Value::from(format!("%{category}%")));
    }
    if let Some(name) = &query.name {
      conds.push("name LIKE ?");
      params.push(Value::from(format!("%{name}%")));
    }
    if let Some(cutoff) = query.not_before {
      conds.push("date >= ?");
      params.push(Value::from(encode_dt(cutoff)));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    let limit = i64::from(query.page.size);
    let offset = i64::try_from(query.page.offset()).unwrap_or(i64::MAX);

    let (raws, total): (Vec<RawEvent>, i64) = self
      .conn
      .call(move |conn| {
        // COUNT runs over the same filter, before LIMIT/OFFSET, so the
        // total reflects the post-filter set.
        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM events {where_clause}"),
          rusqlite::params_from_iter(params.iter()),
          |row| row.get(0),
        )?;

        let sql = format!(
          "SELECT {EVENT_COLUMNS} FROM events {where_clause}
           ORDER BY date ASC
           LIMIT ? OFFSET ?"
        );

        let mut page_params = params;
        page_params.push(Value::from(limit));
        page_params.push(Value::from(offset));

        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
          .query_map(rusqlite::params_from_iter(page_params.iter()), event_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((raws, total))
      })
      .await?;

    let events = raws
      .into_iter()
      .map(RawEvent::into_event)
      .collect::<Result<Vec<_>>>()?;

    Ok(EventPage { events, total_count: total as u64 })
  }

  async fn list_events_for_account(
    &self,
    account_id: &str,
  ) -> Result<Vec<(Event, Enrollment)>> {
    let account = account_id.to_owned();

    let raws: Vec<(RawEvent, RawEnrollment)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             e.event_id, e.name, e.description, e.date, e.location,
             e.category, e.max_participants,
             en.enrollment_id, en.event_id, en.participant_id, en.registered_at
           FROM events e
           JOIN enrollments  en ON en.event_id       = e.event_id
           JOIN participants p  ON p.participant_id  = en.participant_id
           WHERE p.account_id = ?1
           ORDER BY e.date ASC",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![account], |row| {
            let event = event_row(row)?;
            let enrollment = RawEnrollment {
              enrollment_id:  row.get(7)?,
              event_id:       row.get(8)?,
              participant_id: row.get(9)?,
              registered_at:  row.get(10)?,
            };
            Ok((event, enrollment))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(event, enrollment)| {
        Ok((event.into_event()?, enrollment.into_enrollment()?))
      })
      .collect()
  }
}

// ─── EnrollmentStore impl ────────────────────────────────────────────────────

impl EnrollmentStore for SqliteStore {
  type Error = Error;

  async fn create_enrollment(&self, input: NewEnrollment) -> Result<EnrollmentInsert> {
    let registered_at = input.registered_at.unwrap_or_else(Utc::now);
    let at_str = encode_dt(registered_at);
    let (event_id, participant_id) = (input.event_id, input.participant_id);

    let insert = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO enrollments (event_id, participant_id, registered_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![event_id, participant_id, at_str],
        );

        match result {
          Ok(_) => Ok(EnrollmentInsert::Created(Enrollment {
            id: conn.last_insert_rowid(),
            event_id,
            participant_id,
            registered_at,
          })),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
          {
            Ok(EnrollmentInsert::DuplicatePair)
          }
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
          {
            Ok(EnrollmentInsert::EventMissing)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(insert)
  }

  async fn delete_enrollment(&self, id: i64) -> Result<bool> {
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM enrollments WHERE enrollment_id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;
    Ok(affected > 0)
  }

  async fn get_enrollment(&self, id: i64) -> Result<Option<Enrollment>> {
    let raw: Option<RawEnrollment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT enrollment_id, event_id, participant_id, registered_at
               FROM enrollments WHERE enrollment_id = ?1",
              rusqlite::params![id],
              enrollment_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEnrollment::into_enrollment).transpose()
  }

  async fn list_enrollments(
    &self,
    event_id: Option<i64>,
  ) -> Result<Vec<(Enrollment, Participant)>> {
    let raws: Vec<(RawEnrollment, RawParticipant)> = self
      .conn
      .call(move |conn| {
        let sql = "SELECT
             en.enrollment_id, en.event_id, en.participant_id, en.registered_at,
             p.participant_id, p.first_name, p.last_name, p.date_of_birth,
             p.email, p.account_id
           FROM enrollments en
           JOIN participants p ON p.participant_id = en.participant_id";

        let read = |row: &rusqlite::Row<'_>| {
          let enrollment = enrollment_row(row)?;
          let participant = RawParticipant {
            participant_id: row.get(4)?,
            first_name:     row.get(5)?,
            last_name:      row.get(6)?,
            date_of_birth:  row.get(7)?,
            email:          row.get(8)?,
            account_id:     row.get(9)?,
          };
          Ok((enrollment, participant))
        };

        let rows = if let Some(event_id) = event_id {
          let mut stmt =
            conn.prepare(&format!("{sql} WHERE en.event_id = ?1"))?;
          stmt
            .query_map(rusqlite::params![event_id], read)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(sql)?;
          stmt.query_map([], read)?.collect::<rusqlite::Result<Vec<_>>>()?
        };

        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(enrollment, participant)| {
        Ok((enrollment.into_enrollment()?, participant.into_participant()?))
      })
      .collect()
  }

  async fn enrollments_for_participant(
    &self,
    participant_id: i64,
    event_id: i64,
  ) -> Result<Vec<Enrollment>> {
    let raws: Vec<RawEnrollment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT enrollment_id, event_id, participant_id, registered_at
           FROM enrollments
           WHERE participant_id = ?1 AND event_id = ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![participant_id, event_id], enrollment_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEnrollment::into_enrollment).collect()
  }

  async fn count_enrollments(&self, event_id: i64) -> Result<u32> {
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM enrollments WHERE event_id = ?1",
          rusqlite::params![event_id],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count as u32)
  }
}

// ─── ParticipantStore impl ───────────────────────────────────────────────────

impl ParticipantStore for SqliteStore {
  type Error = Error;

  async fn create_participant(
    &self,
    input: NewParticipant,
  ) -> Result<ParticipantInsert> {
    let NewParticipant {
      first_name,
      last_name,
      date_of_birth,
      email,
      account_id,
    } = input;
    let dob_str = encode_date(date_of_birth);

    let (row_first, row_last, row_email, row_account) = (
      first_name.clone(),
      last_name.clone(),
      email.clone(),
      account_id.clone(),
    );

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO participants
             (first_name, last_name, date_of_birth, email, account_id)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![row_first, row_last, dob_str, row_email, row_account],
        );

        match result {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
          {
            Ok(None)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(match id {
      Some(id) => ParticipantInsert::Created(Participant {
        id,
        first_name,
        last_name,
        date_of_birth,
        email,
        account_id,
      }),
      None => ParticipantInsert::DuplicateAccount,
    })
  }

  async fn update_participant(
    &self,
    id: i64,
    patch: ParticipantPatch,
  ) -> Result<Option<Participant>> {
    let raw: Option<RawParticipant> = self
      .conn
      .call(move |conn| {
        let existing = conn
          .query_row(
            "SELECT participant_id, first_name, last_name, date_of_birth,
                    email, account_id
             FROM participants WHERE participant_id = ?1",
            rusqlite::params![id],
            participant_row,
          )
          .optional()?;

        let Some(mut raw) = existing else {
          return Ok(None);
        };

        if let Some(first_name) = patch.first_name {
          raw.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
          raw.last_name = last_name;
        }
        if let Some(date_of_birth) = patch.date_of_birth {
          raw.date_of_birth = encode_date(date_of_birth);
        }
        if let Some(email) = patch.email {
          raw.email = email;
        }

        conn.execute(
          "UPDATE participants
           SET first_name = ?1, last_name = ?2, date_of_birth = ?3, email = ?4
           WHERE participant_id = ?5",
          rusqlite::params![
            raw.first_name,
            raw.last_name,
            raw.date_of_birth,
            raw.email,
            id,
          ],
        )?;

        Ok(Some(raw))
      })
      .await?;

    raw.map(RawParticipant::into_participant).transpose()
  }

  async fn get_participant(&self, id: i64) -> Result<Option<Participant>> {
    let raw: Option<RawParticipant> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT participant_id, first_name, last_name, date_of_birth,
                      email, account_id
               FROM participants WHERE participant_id = ?1",
              rusqlite::params![id],
              participant_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawParticipant::into_participant).transpose()
  }

  async fn find_participant_by_account(
    &self,
    account_id: &str,
  ) -> Result<Option<Participant>> {
    let account = account_id.to_owned();

    let raw: Option<RawParticipant> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT participant_id, first_name, last_name, date_of_birth,
                      email, account_id
               FROM participants WHERE account_id = ?1",
              rusqlite::params![account],
              participant_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawParticipant::into_participant).transpose()
  }

  async fn list_participants(&self) -> Result<Vec<Participant>> {
    let raws: Vec<RawParticipant> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT participant_id, first_name, last_name, date_of_birth,
                  email, account_id
           FROM participants
           ORDER BY participant_id",
        )?;
        let rows = stmt
          .query_map([], participant_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawParticipant::into_participant).collect()
  }
}
