//! Common imports for the `tgtext` integration tests.
#![allow(unfulfilled_lint_expectations)]

#[expect(unused_imports, reason = "re-exporting common test utilities")]
pub use assert_cmd::{Command, prelude::*};
#[expect(unused_imports, reason = "re-exporting common test utilities")]
pub use predicates::prelude::*;
#[expect(unused_imports, reason = "re-exporting common test utilities")]
pub use rstest::{fixture, rstest};
#[expect(unused_imports, reason = "re-exporting the types most suites build")]
pub use tgtext::{Entity, EntityKind, Text};

#[macro_use]
#[path = "../common/mod.rs"]
mod common;
#[expect(unused_imports, reason = "re-exporting common test utilities")]
pub use common::*;
