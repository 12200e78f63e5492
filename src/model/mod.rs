//! # Domain Model
//!
//! Plain records stored by the resource actors: [`Order`] and [`PushSubscription`],
//! together with their create / update / query DTOs.

pub mod order;
pub mod subscription;

pub use order::*;
pub use subscription::*;

/// Normalizes a user identity the way it is stored and routed: trimmed and lower-cased.
/// Blank input means "no identity".
pub fn normalize_identity(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}
