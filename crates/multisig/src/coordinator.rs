use std::collections::BTreeMap;
use std::sync::Arc;

use global_utils::common_types::{get_ordered_uuid, now};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::config::QuorumConfig;
use crate::config_store::{ConfigStore, SignerSetPin};
use crate::errors::{LedgerError, MultisigError, Result, SignerError};
use crate::traits::{LedgerClient, SignerClient};
use crate::types::*;

#[derive(Debug)]
struct TrackedAction {
    action: QuorumAction,
    /// Held while the action is pending.
    pin: Option<SignerSetPin>,
}

type ActionSlot = Mutex<TrackedAction>;

/// Drives quorum actions from proposal to a terminal status.
///
/// Every state change of one action happens under that action's lock,
/// including the ledger submission, so at most one resolution attempt per
/// action is in flight. Signer set state is re-read from the [`ConfigStore`]
/// at every decision point.
///
/// Dropping any call midway leaves the action consistent: its lock and pins
/// are released by their guards, a pending action stays pending.
#[derive(Debug)]
pub struct QuorumCoordinator {
    store: Arc<ConfigStore>,
    ledger: Arc<dyn LedgerClient>,
    signer: Arc<dyn SignerClient>,
    config: QuorumConfig,
    actions: RwLock<BTreeMap<ActionId, Arc<ActionSlot>>>,
}

impl QuorumCoordinator {
    pub fn new(
        store: Arc<ConfigStore>,
        ledger: Arc<dyn LedgerClient>,
        signer: Arc<dyn SignerClient>,
        config: QuorumConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            signer,
            config,
            actions: RwLock::new(BTreeMap::new()),
        }
    }

    #[instrument(skip(self), level = "trace", ret)]
    pub async fn propose(&self, signer_set_id: SignerSetId, kind: ActionKind) -> Result<QuorumAction> {
        let (signer_set, pin) = self.store.pin(signer_set_id).await?;
        validate_proposal(&signer_set, &kind)?;

        let action = QuorumAction {
            id: get_ordered_uuid(),
            signer_set_id,
            approval_rule: kind.approval_rule(),
            kind,
            collected_signatures: Vec::new(),
            status: ActionStatus::Pending,
            created_at: now(),
            resolved_at: None,
            submission_attempts: 0,
            last_error: None,
        };
        let slot = Arc::new(Mutex::new(TrackedAction {
            action: action.clone(),
            pin: Some(pin),
        }));
        self.actions.write().await.insert(action.id, slot);

        info!(
            action_id = %action.id,
            %signer_set_id,
            "Proposed action, needs {} approvals",
            signer_set.required_approvals(action.approval_rule)
        );
        Ok(action)
    }

    /// Records one approval. Reaching quorum submits right away; the returned
    /// action then is `Executed` or `Failed`.
    ///
    /// A repeated signer is rejected with [`MultisigError::Duplicate`], but the
    /// call still re-evaluates quorum, so a lowered threshold takes effect.
    #[instrument(skip(self, signature), level = "trace", ret)]
    pub async fn add_signature(
        &self,
        action_id: ActionId,
        signer: &str,
        signature: SignatureBytes,
    ) -> Result<QuorumAction> {
        let slot = self.slot(action_id).await?;
        let mut tracked = slot.lock().await;
        ensure_pending(&tracked.action)?;

        let signer_set = self.store.get(tracked.action.signer_set_id).await?;
        if !signer_set.contains(signer) {
            return Err(MultisigError::Authorization(format!(
                "{signer} is not a signer of set {}",
                signer_set.id
            )));
        }

        if tracked.action.has_signed(signer) {
            if tracked.action.quorum_reached(&signer_set) {
                self.resolve(&mut tracked).await;
            }
            return Err(MultisigError::Duplicate(format!(
                "{signer} already signed action {action_id}"
            )));
        }
        if signature.is_empty() {
            return Err(MultisigError::Validation("Signature is empty".to_string()));
        }

        tracked.action.collected_signatures.push(CollectedSignature {
            signer: signer.to_string(),
            signature,
        });
        debug!(
            %action_id,
            "Signature from {signer} accepted, {}/{}",
            tracked.action.effective_approvals(&signer_set),
            signer_set.required_approvals(tracked.action.approval_rule)
        );

        if tracked.action.quorum_reached(&signer_set) {
            self.resolve(&mut tracked).await;
        }
        Ok(tracked.action.clone())
    }

    /// Asks the wallet for `identity`'s signature over the action, then adds it.
    #[instrument(skip(self), level = "trace", ret)]
    pub async fn sign_and_add(&self, action_id: ActionId, identity: &str) -> Result<QuorumAction> {
        let action = self.get(action_id).await?;
        ensure_pending(&action)?;
        let signer_set = self.store.get(action.signer_set_id).await?;
        if !signer_set.contains(identity) {
            return Err(MultisigError::Authorization(format!(
                "{identity} is not a signer of set {}",
                signer_set.id
            )));
        }
        let payload = action
            .signing_payload()
            .map_err(|e| MultisigError::Internal(format!("Failed to encode signing payload: {e}")))?;

        let timeout = self.config.signer_timeout();
        let signature = tokio::time::timeout(timeout, self.signer.sign(identity, &payload))
            .await
            .map_err(|_| SignerError::Timeout(timeout))??;

        self.add_signature(action_id, identity, signature).await
    }

    /// Re-checks a pending action against the current signer set and resolves it
    /// when quorum is already met.
    #[instrument(skip(self), level = "trace", ret)]
    pub async fn evaluate(&self, action_id: ActionId) -> Result<QuorumAction> {
        let slot = self.slot(action_id).await?;
        let mut tracked = slot.lock().await;
        ensure_pending(&tracked.action)?;

        let signer_set = self.store.get(tracked.action.signer_set_id).await?;
        if tracked.action.quorum_reached(&signer_set) {
            self.resolve(&mut tracked).await;
        }
        Ok(tracked.action.clone())
    }

    /// Retries a failed action with the signatures it already holds.
    ///
    /// The set stays pinned only for the duration of the call.
    #[instrument(skip(self), level = "trace", ret)]
    pub async fn resubmit(&self, action_id: ActionId) -> Result<QuorumAction> {
        let slot = self.slot(action_id).await?;
        let mut tracked = slot.lock().await;
        if tracked.action.status != ActionStatus::Failed {
            return Err(MultisigError::State {
                action_id,
                status: tracked.action.status,
            });
        }

        let (signer_set, _pin) = self.store.pin(tracked.action.signer_set_id).await?;
        if !tracked.action.quorum_reached(&signer_set) {
            return Err(MultisigError::Authorization(format!(
                "Action {action_id} holds {} of {} required approvals",
                tracked.action.effective_approvals(&signer_set),
                signer_set.required_approvals(tracked.action.approval_rule)
            )));
        }

        self.resolve(&mut tracked).await;
        Ok(tracked.action.clone())
    }

    /// Cancels a pending action. Fails fast while another call holds the
    /// action, which covers an in-flight ledger submission.
    #[instrument(skip(self), level = "trace", ret)]
    pub async fn cancel(&self, action_id: ActionId) -> Result<QuorumAction> {
        let slot = self.slot(action_id).await?;
        let Ok(mut tracked) = slot.try_lock() else {
            return Err(MultisigError::SubmissionInFlight(action_id));
        };
        ensure_pending(&tracked.action)?;

        tracked.action.status = ActionStatus::Cancelled;
        tracked.action.resolved_at = Some(now());
        tracked.pin = None;
        info!(%action_id, "Action cancelled");
        Ok(tracked.action.clone())
    }

    pub async fn get(&self, action_id: ActionId) -> Result<QuorumAction> {
        let slot = self.slot(action_id).await?;
        let tracked = slot.lock().await;
        Ok(tracked.action.clone())
    }

    pub async fn list(&self) -> Vec<QuorumAction> {
        let slots: Vec<_> = self.actions.read().await.values().cloned().collect();
        let mut actions = Vec::with_capacity(slots.len());
        for slot in slots {
            actions.push(slot.lock().await.action.clone());
        }
        actions
    }

    /// Pending actions, optionally only those of one signer set.
    pub async fn pending_actions(&self, signer_set_id: Option<SignerSetId>) -> Vec<QuorumAction> {
        self.list()
            .await
            .into_iter()
            .filter(|action| action.status == ActionStatus::Pending)
            .filter(|action| signer_set_id.is_none_or(|id| action.signer_set_id == id))
            .collect()
    }

    pub async fn progress(&self, action_id: ActionId) -> Result<ApprovalProgress> {
        let action = self.get(action_id).await?;
        let signer_set = self.store.get(action.signer_set_id).await?;
        Ok(ApprovalProgress {
            collected: action.effective_approvals(&signer_set),
            required: signer_set.required_approvals(action.approval_rule),
            total_signers: signer_set.signer_count(),
        })
    }

    async fn slot(&self, action_id: ActionId) -> Result<Arc<ActionSlot>> {
        self.actions
            .read()
            .await
            .get(&action_id)
            .cloned()
            .ok_or_else(|| MultisigError::NotFound(format!("Action {action_id}")))
    }

    /// Submits the action and moves it to `Executed` or `Failed`, releasing
    /// its pin on the set. Nothing changes besides the attempt counter if the
    /// call is dropped before the ledger answers.
    async fn resolve(&self, tracked: &mut TrackedAction) {
        let action = &mut tracked.action;
        action.submission_attempts += 1;

        match self.submit(action).await {
            Ok(()) => {
                action.status = ActionStatus::Executed;
                action.last_error = None;
                info!(action_id = %action.id, "Action executed");
            }
            Err(err) => {
                action.status = ActionStatus::Failed;
                action.last_error = Some(err.to_string());
                warn!(
                    action_id = %action.id,
                    attempt = action.submission_attempts,
                    retryable = err.is_retryable(),
                    "Action submission failed: {err}"
                );
            }
        }
        action.resolved_at = Some(now());
        tracked.pin = None;
    }

    async fn submit(&self, action: &QuorumAction) -> Result<()> {
        let proof = action.proof();
        match &action.kind {
            ActionKind::RemoveSigner { target } => {
                self.store
                    .remove_signer(action.signer_set_id, target, Some(&proof))
                    .await?;
            }
            ActionKind::ExecutePayload { .. } => {
                let timeout = self.config.ledger_timeout();
                tokio::time::timeout(timeout, self.ledger.submit_action(action, &proof))
                    .await
                    .map_err(|_| LedgerError::Timeout(timeout))??;
            }
        }
        Ok(())
    }
}

fn ensure_pending(action: &QuorumAction) -> Result<()> {
    if action.status.is_terminal() {
        return Err(MultisigError::State {
            action_id: action.id,
            status: action.status,
        });
    }
    Ok(())
}

fn validate_proposal(signer_set: &SignerSet, kind: &ActionKind) -> Result<()> {
    if signer_set.signers.is_empty() {
        return Err(MultisigError::Validation(format!(
            "Signer set {} has no signers",
            signer_set.id
        )));
    }
    if let ActionKind::RemoveSigner { target } = kind
        && !signer_set.contains(target)
    {
        return Err(MultisigError::NotFound(format!(
            "Signer {target} is not a member of set {}",
            signer_set.id
        )));
    }
    Ok(())
}
