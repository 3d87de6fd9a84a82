pub mod series;

pub use series::{bucket_ohlc, filter_by_window, paginate};
