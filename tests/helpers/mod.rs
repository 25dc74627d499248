#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod assert;
mod files;
mod mocks;
mod test_case;

pub use assert::*;
pub use files::*;
pub use mocks::*;
pub use test_case::*;
