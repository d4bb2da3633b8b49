mod timer;
mod value;

pub use timer::LagTimer;
pub use value::{LagConfig, LagValue};
