pub mod clock;

pub use clock::{Clock, FixedStep, InvalidStep, Span, Timeline};
