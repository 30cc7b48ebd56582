//! Shared test harness modules for the Pinpoint CLI.

use super::*;

mod helpers;
