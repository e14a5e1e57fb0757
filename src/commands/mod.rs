// src/commands/mod.rs
//! Command handlers for the nfvkit CLI

mod cleanup;
mod lint;
mod onboard;
mod package;
mod translate;
mod validate;

pub use cleanup::{CleanupArgs, cmd_cleanup};
pub use lint::{EXIT_USAGE, LintArgs, cmd_lint};
pub use onboard::{OnboardArgs, cmd_onboard};
pub use package::{PackageBuildArgs, cmd_package_build, cmd_package_inspect};
pub use translate::{ToscaToNativeArgs, cmd_native_to_tosca, cmd_tosca_to_native};
pub use validate::cmd_validate;
