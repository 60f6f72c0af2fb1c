use serde::{Deserialize, Serialize};

/// Best-effort storage usage. `quota_bytes` is 0 when the host exposes no
/// quota for the database location.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StorageEstimate {
    pub used_bytes: u64,
    pub quota_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageStats {
    pub used_bytes: u64,
    pub quota_bytes: u64,
    pub entry_count: usize,
}
