mod mixer;
mod panner;

pub use mixer::*;
pub use panner::*;
