pub mod display;
pub mod metrics;

pub use display::{DisplayError, ScrollView};
pub use metrics::{init_metrics, serve_metrics};
