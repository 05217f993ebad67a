pub mod catalog;
pub mod completion;
pub mod export;
pub mod markdown;
pub mod session;
