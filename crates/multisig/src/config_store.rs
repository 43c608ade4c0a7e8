use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError};

use global_utils::common_types::{get_ordered_uuid, now};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::config::QuorumConfig;
use crate::errors::{LedgerError, MultisigError, Result};
use crate::traits::LedgerClient;
use crate::types::*;

#[derive(Debug, Default)]
struct StoreState {
    signer_sets: BTreeMap<SignerSetId, SignerSet>,
}

/// Live [`SignerSetPin`]s per set, a set with pins cannot be deleted.
type PinCounts = Arc<std::sync::Mutex<HashMap<SignerSetId, usize>>>;

fn lock_pins(pins: &PinCounts) -> std::sync::MutexGuard<'_, HashMap<SignerSetId, usize>> {
    pins.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keeps a signer set from being deleted until dropped.
#[derive(Debug)]
pub(crate) struct SignerSetPin {
    pins: PinCounts,
    set_id: SignerSetId,
}

impl Drop for SignerSetPin {
    fn drop(&mut self) {
        let mut pins = lock_pins(&self.pins);
        match pins.get_mut(&self.set_id) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                pins.remove(&self.set_id);
            }
            None => warn!(signer_set_id = %self.set_id, "Released pin without matching count"),
        }
    }
}

/// Single writer over all signer sets.
///
/// Mutations are serialized by `mutation_lock`, which is held across the
/// ledger round trip so a persisted set only changes locally after the
/// ledger acknowledged the new version. Reads never wait on the ledger.
#[derive(Debug)]
pub struct ConfigStore {
    ledger: Arc<dyn LedgerClient>,
    config: QuorumConfig,
    state: RwLock<StoreState>,
    pins: PinCounts,
    mutation_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(ledger: Arc<dyn LedgerClient>, config: QuorumConfig) -> Self {
        Self {
            ledger,
            config,
            state: RwLock::new(StoreState::default()),
            pins: PinCounts::default(),
            mutation_lock: Mutex::new(()),
        }
    }

    #[instrument(skip(self), level = "trace", ret)]
    pub async fn create(&self, name: &str, initial_signers: Vec<Identity>) -> Result<SignerSet> {
        validate_name(name)?;
        let mut signer_set = SignerSet {
            id: get_ordered_uuid(),
            name: name.to_string(),
            signers: Vec::with_capacity(initial_signers.len()),
            threshold: 0,
            created_at: now(),
            persistence: PersistenceState::Draft,
        };
        for identity in initial_signers {
            self.validate_identity(&identity)?;
            if signer_set.contains(&identity) {
                return Err(MultisigError::Duplicate(format!("Signer {identity} listed twice")));
            }
            signer_set.push_signer(identity);
        }

        let _guard = self.mutation_lock.lock().await;
        self.state
            .write()
            .await
            .signer_sets
            .insert(signer_set.id, signer_set.clone());
        info!(signer_set_id = %signer_set.id, "Created draft signer set '{}'", signer_set.name);
        Ok(signer_set)
    }

    pub async fn get(&self, set_id: SignerSetId) -> Result<SignerSet> {
        self.state
            .read()
            .await
            .signer_sets
            .get(&set_id)
            .cloned()
            .ok_or_else(|| signer_set_not_found(set_id))
    }

    /// All signer sets, ordered by their time-ordered ids.
    pub async fn list(&self) -> Vec<SignerSet> {
        self.state.read().await.signer_sets.values().cloned().collect()
    }

    #[instrument(skip(self), level = "trace", ret)]
    pub async fn add_signer(&self, set_id: SignerSetId, identity: &str) -> Result<SignerSet> {
        self.validate_identity(identity)?;
        self.apply(set_id, |signer_set| {
            if signer_set.contains(identity) {
                return Err(MultisigError::Duplicate(format!(
                    "Signer {identity} already in set {}",
                    signer_set.id
                )));
            }
            signer_set.push_signer(identity.to_string());
            Ok(())
        })
        .await
    }

    /// Drafts allow direct removal. Persisted sets need `authorization` signed
    /// by a simple majority of the current signers.
    #[instrument(skip(self, authorization), level = "trace", ret)]
    pub async fn remove_signer(
        &self,
        set_id: SignerSetId,
        identity: &str,
        authorization: Option<&QuorumProof>,
    ) -> Result<SignerSet> {
        self.apply(set_id, |signer_set| {
            if !signer_set.contains(identity) {
                return Err(MultisigError::NotFound(format!(
                    "Signer {identity} is not a member of set {}",
                    signer_set.id
                )));
            }
            if !signer_set.is_draft() {
                let proof = authorization.ok_or_else(|| {
                    MultisigError::Authorization(format!(
                        "Removing {identity} from a persisted set needs {} approvals",
                        signer_set.majority()
                    ))
                })?;
                validate_removal_proof(signer_set, identity, proof)?;
                if signer_set.signer_count() == 1 {
                    return Err(MultisigError::Validation(
                        "Persisted signer set must keep at least one signer".to_string(),
                    ));
                }
            }
            signer_set.drop_signer(identity);
            Ok(())
        })
        .await
    }

    #[instrument(skip(self), level = "trace", ret)]
    pub async fn set_threshold(&self, set_id: SignerSetId, value: usize) -> Result<SignerSet> {
        self.apply(set_id, |signer_set| {
            if value < 1 || value > signer_set.signer_count() {
                return Err(MultisigError::Validation(format!(
                    "Threshold {value} outside 1..={}",
                    signer_set.signer_count()
                )));
            }
            signer_set.threshold = value;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self), level = "trace", ret)]
    pub async fn rename(&self, set_id: SignerSetId, name: &str) -> Result<SignerSet> {
        validate_name(name)?;
        self.apply(set_id, |signer_set| {
            signer_set.name = name.to_string();
            Ok(())
        })
        .await
    }

    /// Persists the set through the ledger and marks it as persisted.
    #[instrument(skip(self), level = "trace", ret)]
    pub async fn save(&self, set_id: SignerSetId) -> Result<SignerSet> {
        let saved = self
            .apply(set_id, |signer_set| {
                validate_name(&signer_set.name)?;
                if signer_set.signers.is_empty() {
                    return Err(MultisigError::Validation(
                        "Signer set needs at least one signer to be saved".to_string(),
                    ));
                }
                signer_set.persistence = PersistenceState::Persisted;
                Ok(())
            })
            .await?;
        info!(signer_set_id = %saved.id, "Signer set saved, {} of {}", saved.threshold, saved.signer_count());
        Ok(saved)
    }

    #[instrument(skip(self), level = "trace", ret)]
    pub async fn delete(&self, set_id: SignerSetId) -> Result<()> {
        let _guard = self.mutation_lock.lock().await;
        let mut state = self.state.write().await;
        if !state.signer_sets.contains_key(&set_id) {
            return Err(signer_set_not_found(set_id));
        }
        let pending = lock_pins(&self.pins).get(&set_id).copied().unwrap_or(0);
        if pending > 0 {
            return Err(MultisigError::Conflict(format!(
                "Signer set {set_id} is referenced by {pending} pending action(s)"
            )));
        }
        state.signer_sets.remove(&set_id);
        info!(signer_set_id = %set_id, "Signer set deleted");
        Ok(())
    }

    /// Marks the set as referenced until the returned pin is dropped.
    ///
    /// The existence check and the count update happen under the state lock
    /// `delete` takes for writing, so a pin never lands on a deleted set.
    pub(crate) async fn pin(&self, set_id: SignerSetId) -> Result<(SignerSet, SignerSetPin)> {
        let state = self.state.read().await;
        let signer_set = state
            .signer_sets
            .get(&set_id)
            .cloned()
            .ok_or_else(|| signer_set_not_found(set_id))?;
        *lock_pins(&self.pins).entry(set_id).or_insert(0) += 1;
        let pin = SignerSetPin {
            pins: self.pins.clone(),
            set_id,
        };
        Ok((signer_set, pin))
    }

    async fn apply<F>(&self, set_id: SignerSetId, mutate: F) -> Result<SignerSet>
    where
        F: FnOnce(&mut SignerSet) -> Result<()>,
    {
        let _guard = self.mutation_lock.lock().await;
        let mut updated = self.get(set_id).await?;
        mutate(&mut updated)?;

        if !updated.is_draft() {
            self.persist(&updated).await?;
        }

        self.state
            .write()
            .await
            .signer_sets
            .insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn persist(&self, signer_set: &SignerSet) -> Result<()> {
        let timeout = self.config.ledger_timeout();
        debug!(signer_set_id = %signer_set.id, "Persisting signer set");
        let persisted = tokio::time::timeout(timeout, self.ledger.persist_config(signer_set))
            .await
            .map_err(|_| LedgerError::Timeout(timeout))
            .and_then(|result| result);
        if let Err(err) = &persisted {
            warn!(signer_set_id = %signer_set.id, "Ledger refused signer set: {err}");
        }
        Ok(persisted?)
    }

    fn validate_identity(&self, identity: &str) -> Result<()> {
        if identity.chars().count() < self.config.min_identity_length {
            return Err(MultisigError::Validation(format!(
                "Signer identity must be at least {} characters",
                self.config.min_identity_length
            )));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(MultisigError::Validation("Signer set name is empty".to_string()));
    }
    Ok(())
}

fn validate_removal_proof(signer_set: &SignerSet, identity: &str, proof: &QuorumProof) -> Result<()> {
    if proof.signer_set_id != signer_set.id {
        return Err(MultisigError::Authorization(format!(
            "Proof was collected for set {}, not {}",
            proof.signer_set_id, signer_set.id
        )));
    }
    match &proof.kind {
        ActionKind::RemoveSigner { target } if target == identity => {}
        _ => {
            return Err(MultisigError::Authorization(format!(
                "Proof {} does not authorize removing {identity}",
                proof.action_id
            )));
        }
    }
    let approvals = proof.distinct_member_signers(signer_set);
    let required = signer_set.majority();
    if approvals < required {
        return Err(MultisigError::Authorization(format!(
            "Removal requires {required} approvals, proof carries {approvals}"
        )));
    }
    Ok(())
}

fn signer_set_not_found(set_id: SignerSetId) -> MultisigError {
    MultisigError::NotFound(format!("Signer set {set_id}"))
}
