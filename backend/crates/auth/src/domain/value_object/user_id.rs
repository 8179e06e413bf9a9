use kernel::id::SerialId;

/// Identity record marker; ids are assigned by storage
pub struct UserMarker;
pub type UserId = SerialId<UserMarker>;
