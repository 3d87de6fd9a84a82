pub mod time;
pub mod url;

pub use time::{hk_time_string, now_ms};
pub use url::parse_meeting_url;
