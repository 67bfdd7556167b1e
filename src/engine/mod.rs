//! Pure scoring and trend analytics. Everything in here is a total,
//! synchronous function of its inputs; handlers own validation and I/O.

pub mod advice;
pub mod duration;
pub mod score;
pub mod trend;
