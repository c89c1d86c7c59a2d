mod output;
pub use output::*;

#[cfg(feature = "cpal_sink")]
pub(crate) mod cpal_output;
