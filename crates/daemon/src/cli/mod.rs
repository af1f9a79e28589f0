pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Daemon, Folder, Health, Init, Object, User, Version};
