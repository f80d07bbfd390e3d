//! Normalized user profile.

use serde::{Deserialize, Serialize};

/// Provider user profile mapped onto one shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable provider-side user id.
    pub id: String,
    /// Handle or vanity name; equal to `id` when the provider has none.
    pub uid: String,
    pub nickname: String,
    /// Large picture URL.
    pub avatar: Option<String>,
    /// Small picture URL.
    pub icon: Option<String>,
    pub intro: Option<String>,
    pub signature: Option<String>,
    pub email: Option<String>,
}
