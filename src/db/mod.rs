pub mod logs;
pub mod posts;
pub mod profiles;
