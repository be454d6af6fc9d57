pub mod clock;
pub mod interval;
pub mod test_utils;
pub mod validation;

pub use clock::{Clock, SystemClock};
pub use interval::overlaps;
