use std::time::Duration;

/// TTL shared by every read-side cache entry (group lists, group detail,
/// pending invitations). Writes invalidate their keys explicitly; anything
/// else ages out within this window.
pub const CACHE_TTL: Duration = Duration::from_secs(30);
