//! Test suites for the nexus daemon.

mod bootstrap_behaviour;
pub(crate) mod support;
