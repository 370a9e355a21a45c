//! # Suites
//!
//! The suites shipped with the binary. New suites are added to [`all`].

use crate::testing::{TestCase, TestSuite};

/// Starting point for a real suite: one test that does nothing.
pub fn template() -> TestSuite {
    TestSuite::new("template").case(TestCase::new("test_template1", |_| Ok(())).doc("test template1"))
}

pub fn all() -> Vec<TestSuite> {
    vec![template()]
}
