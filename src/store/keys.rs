/// The reactive store keys the controller reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// The active session.
    Session,
    /// The active credentials.
    Credentials,
    /// The parked session of a previous identity.
    StashedSession,
    /// The parked credentials of a previous identity.
    StashedCredentials,
    /// The presentation-facing auth surface.
    Account,
    /// Personal details keyed by account id.
    PersonalDetailsList,
    /// The user's preferred locale.
    PreferredLocale,
    /// The active workspace id.
    ActivePolicyId,
    /// The public room a signed-out deep link pointed at, kept for restoration.
    LastVisitedPublicRoomId,
}

impl StoreKey {
    /// The persisted key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Session => "session",
            StoreKey::Credentials => "credentials",
            StoreKey::StashedSession => "stashedSession",
            StoreKey::StashedCredentials => "stashedCredentials",
            StoreKey::Account => "account",
            StoreKey::PersonalDetailsList => "personalDetailsList",
            StoreKey::PreferredLocale => "preferredLocale",
            StoreKey::ActivePolicyId => "activePolicyID",
            StoreKey::LastVisitedPublicRoomId => "lastVisitedPublicRoomID",
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
