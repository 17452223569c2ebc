mod log_record;
mod log_stats;
mod user_profile;

pub use log_record::LogRecord;
pub use log_stats::LogStats;
pub use user_profile::UserProfile;
