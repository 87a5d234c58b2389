pub mod constants;
pub mod constraint;
pub mod curve;
pub mod error;
pub mod frame;
pub mod rig;
pub mod sink;
pub mod weight;

pub use constants::*;
pub use constraint::*;
pub use curve::*;
pub use error::{Axis, BlendError};
pub use frame::*;
pub use rig::*;
pub use sink::*;
pub use weight::*;
