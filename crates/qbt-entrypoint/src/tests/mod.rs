//! Test suites for the entrypoint pipeline.

mod launch_behaviour;
pub(crate) mod support;
