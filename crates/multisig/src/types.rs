use global_utils::common_types::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SignerSetId = Uuid;
pub type ActionId = Uuid;
pub type Identity = String;
pub type SignatureBytes = Vec<u8>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceState {
    /// Not yet recorded by the ledger, freely editable.
    Draft,
    /// Recorded by the ledger, removals need a quorum proof.
    Persisted,
}

/// Named group of signer identities plus the approval threshold.
///
/// Only [`crate::config_store::ConfigStore`] mutates these; everyone else gets clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSet {
    pub id: SignerSetId,
    pub name: String,
    pub signers: Vec<Identity>,
    pub threshold: usize,
    pub created_at: Timestamp,
    pub persistence: PersistenceState,
}

impl SignerSet {
    pub fn contains(&self, identity: &str) -> bool {
        self.signers.iter().any(|signer| signer == identity)
    }

    pub fn signer_count(&self) -> usize {
        self.signers.len()
    }

    pub fn is_draft(&self) -> bool {
        self.persistence == PersistenceState::Draft
    }

    /// Simple majority of the current signers, `ceil(n / 2)`.
    pub fn majority(&self) -> usize {
        self.signers.len().div_ceil(2)
    }

    /// Approvals needed under `rule`, computed from the current membership.
    pub fn required_approvals(&self, rule: ApprovalRule) -> usize {
        match rule {
            ApprovalRule::SignerSetThreshold => self.threshold,
            ApprovalRule::SimpleMajority => self.majority(),
        }
    }

    pub(crate) fn push_signer(&mut self, identity: Identity) {
        self.signers.push(identity);
        if self.threshold == 0 {
            self.threshold = 1;
        }
    }

    /// Removes `identity` and clamps the threshold into `1..=|signers|`.
    /// An emptied set keeps threshold 0 and cannot be saved.
    pub(crate) fn drop_signer(&mut self, identity: &str) {
        self.signers.retain(|signer| signer != identity);
        self.threshold = match self.signers.len() {
            0 => 0,
            count => self.threshold.clamp(1, count),
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ActionKind {
    RemoveSigner { target: Identity },
    ExecutePayload { payload: Vec<u8> },
}

impl ActionKind {
    pub fn approval_rule(&self) -> ApprovalRule {
        match self {
            ActionKind::RemoveSigner { .. } => ApprovalRule::SimpleMajority,
            ActionKind::ExecutePayload { .. } => ApprovalRule::SignerSetThreshold,
        }
    }
}

/// How many approvals an action needs, resolved against live SignerSet state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalRule {
    SignerSetThreshold,
    SimpleMajority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Executed,
    Failed,
    Cancelled,
}

impl ActionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ActionStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedSignature {
    pub signer: Identity,
    #[serde(with = "hex_bytes")]
    pub signature: SignatureBytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumAction {
    pub id: ActionId,
    pub signer_set_id: SignerSetId,
    pub kind: ActionKind,
    pub approval_rule: ApprovalRule,
    /// Insertion ordered, at most one entry per signer.
    pub collected_signatures: Vec<CollectedSignature>,
    pub status: ActionStatus,
    pub created_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
    pub submission_attempts: u32,
    pub last_error: Option<String>,
}

impl QuorumAction {
    pub fn has_signed(&self, identity: &str) -> bool {
        self.collected_signatures.iter().any(|entry| entry.signer == identity)
    }

    /// Signatures whose signer is still a member of `signer_set`.
    pub fn effective_approvals(&self, signer_set: &SignerSet) -> usize {
        self.collected_signatures
            .iter()
            .filter(|entry| signer_set.contains(&entry.signer))
            .count()
    }

    /// Quorum over current members only. Signatures of signers removed after
    /// signing stay in [`QuorumAction::proof`] but do not count here.
    pub fn quorum_reached(&self, signer_set: &SignerSet) -> bool {
        let required = signer_set.required_approvals(self.approval_rule);
        required > 0 && self.effective_approvals(signer_set) >= required
    }

    /// Canonical bytes every signer signs for this action.
    pub fn signing_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        #[derive(Serialize)]
        struct SigningPayload<'a> {
            action_id: &'a ActionId,
            signer_set_id: &'a SignerSetId,
            kind: &'a ActionKind,
        }

        serde_json::to_vec(&SigningPayload {
            action_id: &self.id,
            signer_set_id: &self.signer_set_id,
            kind: &self.kind,
        })
    }

    pub fn proof(&self) -> QuorumProof {
        QuorumProof {
            action_id: self.id,
            signer_set_id: self.signer_set_id,
            kind: self.kind.clone(),
            signatures: self.collected_signatures.clone(),
        }
    }
}

/// Collected approvals handed to the ledger or to the store as authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumProof {
    pub action_id: ActionId,
    pub signer_set_id: SignerSetId,
    pub kind: ActionKind,
    pub signatures: Vec<CollectedSignature>,
}

impl QuorumProof {
    /// Number of distinct signers of the proof who are members of `signer_set`.
    pub fn distinct_member_signers(&self, signer_set: &SignerSet) -> usize {
        let mut seen: Vec<&str> = Vec::with_capacity(self.signatures.len());
        for entry in &self.signatures {
            if signer_set.contains(&entry.signer) && !seen.contains(&entry.signer.as_str()) {
                seen.push(&entry.signer);
            }
        }
        seen.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalProgress {
    pub collected: usize,
    pub required: usize,
    pub total_signers: usize,
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        hex::decode(encoded).map_err(serde::de::Error::custom)
    }
}
