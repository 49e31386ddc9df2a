//! Per-operation policies.
//!
//! Every operation takes a policy value by move; policies are cheap plain
//! data and implement `Default` with the values an unconfigured host sees.

use serde::{Deserialize, Serialize};

/// How a write interacts with an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordExistsAction {
    /// Create or update, merging bins.
    #[default]
    Update,
    /// Update only; fail with `NotFound` if the record does not exist.
    UpdateOnly,
    /// Create or replace the whole record.
    Replace,
    /// Replace only; fail with `NotFound` if the record does not exist.
    ReplaceOnly,
    /// Create only; fail with `KeyExists` if the record exists.
    CreateOnly,
}

/// Generation check applied before a write or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPolicy {
    /// No generation check.
    #[default]
    None,
    /// Write only when the stored generation equals the policy generation.
    ExpectGenEqual,
    /// Write only when the policy generation is greater than the stored one.
    ExpectGenGreater,
}

/// Fields shared by every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasePolicy {
    /// Total transaction deadline in milliseconds; zero means no limit.
    pub timeout_ms: u32,
    /// Retry attempts after the first failure.
    pub max_retries: u32,
}

impl Default for BasePolicy {
    fn default() -> Self {
        BasePolicy {
            timeout_ms: 1000,
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadPolicy {
    pub base: BasePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WritePolicy {
    pub base: BasePolicy,
    pub exists: RecordExistsAction,
    pub gen: GenerationPolicy,
    /// Expected generation when `gen` is not `None`.
    pub generation: u32,
    /// TTL in seconds applied by the write.
    pub ttl: u32,
    /// Store the user key alongside the digest.
    pub send_key: bool,
}

impl Default for WritePolicy {
    fn default() -> Self {
        WritePolicy {
            base: BasePolicy::default(),
            exists: RecordExistsAction::default(),
            gen: GenerationPolicy::default(),
            generation: 0,
            ttl: kestrel_core::TTL_NEVER_EXPIRE,
            send_key: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemovePolicy {
    pub base: BasePolicy,
    pub gen: GenerationPolicy,
    pub generation: u32,
    /// Leave a tombstone instead of fully expunging.
    pub durable_delete: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPolicy {
    pub base: BasePolicy,
    /// Issue sub-requests concurrently where the engine supports it.
    pub concurrent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanPolicy {
    pub base: BasePolicy,
    /// Stop after this many records; zero means unbounded.
    pub max_records: u64,
    /// Include bin data, not just metadata.
    pub include_bin_data: bool,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        ScanPolicy {
            base: BasePolicy::default(),
            max_records: 0,
            include_bin_data: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryPolicy {
    pub base: BasePolicy,
}
