//! Domain logic - pure version rules independent of git operations

pub mod bump;
pub mod commit;
pub mod prerelease;
pub mod version;

pub use bump::BumpPolicy;
pub use commit::CommitRef;
pub use prerelease::PreRelease;
pub use version::VersionRecord;
