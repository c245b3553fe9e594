//! [`ParticipantService`] — participant-profile reads and edits.
//!
//! Profiles are created when a user registers and edited from the profile
//! page. Account creation and authentication live in the identity
//! subsystem; this service only stores the profile and resolves the
//! external account reference.

use std::sync::Arc;

use validator::Validate as _;

use gather_core::{
  Error, FieldError, Result,
  cancel::CancelToken,
  participant::{NewParticipant, Participant, ParticipantInsert, ParticipantPatch},
  store::ParticipantStore,
};

use crate::ensure_live;

pub struct ParticipantService<S> {
  store: Arc<S>,
}

impl<S> ParticipantService<S>
where
  S: ParticipantStore + 'static,
{
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// Create a profile for a freshly registered account.
  pub async fn register(
    &self,
    input: NewParticipant,
    cancel: &CancelToken,
  ) -> Result<Participant> {
    ensure_live(cancel)?;
    input.validate().map_err(Error::from)?;

    ensure_live(cancel)?;
    match self.store.create_participant(input).await.map_err(Error::store)? {
      ParticipantInsert::Created(participant) => {
        tracing::info!(participant_id = participant.id, "participant registered");
        Ok(participant)
      }
      ParticipantInsert::DuplicateAccount => {
        Err(Error::Validation(vec![FieldError {
          field:   "account_id".into(),
          message: "a profile is already registered for this account".into(),
        }]))
      }
    }
  }

  pub async fn get(&self, id: i64, cancel: &CancelToken) -> Result<Participant> {
    ensure_live(cancel)?;
    self
      .store
      .get_participant(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ParticipantNotFound(id))
  }

  pub async fn get_by_account(
    &self,
    account_id: &str,
    cancel: &CancelToken,
  ) -> Result<Participant> {
    ensure_live(cancel)?;
    self
      .store
      .find_participant_by_account(account_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::AccountNotRegistered(account_id.to_owned()))
  }

  pub async fn update_profile(
    &self,
    id: i64,
    patch: ParticipantPatch,
    cancel: &CancelToken,
  ) -> Result<Participant> {
    ensure_live(cancel)?;
    patch.validate().map_err(Error::from)?;

    ensure_live(cancel)?;
    self
      .store
      .update_participant(id, patch)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ParticipantNotFound(id))
  }

  pub async fn list(&self, cancel: &CancelToken) -> Result<Vec<Participant>> {
    ensure_live(cancel)?;
    self.store.list_participants().await.map_err(Error::store)
  }
}
