//! Storage key constants.

/// Keys under which the credential pair is persisted.
pub struct StorageKeys;

impl StorageKeys {
    /// Short-lived bearer credential
    pub const ACCESS_TOKEN: &'static str = "access_token";

    /// Long-lived secret exchanged for a new access token
    pub const REFRESH_TOKEN: &'static str = "refresh_token";

    /// Both keys, in write order.
    pub const CREDENTIAL_PAIR: [&'static str; 2] = [Self::ACCESS_TOKEN, Self::REFRESH_TOKEN];
}
