//! Wizard form test harness for the NTS web application.
//!
//! The core is the form exercise loop in [`wizard::exercise`]: for each page
//! of a multi-step form it submits a list of test cases, restoring the form
//! to its original state between them, and checks the validation errors and
//! the resulting navigation of every submission.

pub mod browser;
pub mod cli;
pub mod error;
pub mod form;
pub mod logging;
pub mod report;
pub mod screenshots;
pub mod spec;
pub mod wizard;

pub use error::{HarnessError, Result};
