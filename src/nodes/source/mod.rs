mod player;
mod sine;
mod stream;

pub use player::*;
pub use sine::*;
pub use stream::*;
