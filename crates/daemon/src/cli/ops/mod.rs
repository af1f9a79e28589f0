pub mod daemon;
pub mod folder;
pub mod health;
pub mod init;
pub mod object;
pub mod user;
pub mod version;

pub use daemon::Daemon;
pub use folder::Folder;
pub use health::Health;
pub use init::Init;
pub use object::Object;
pub use user::User;
pub use version::Version;
