#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use placement_controller_core as core;
pub use placement_controller_k8s_api as k8s;

mod args;
mod client;
mod controller;
mod metrics;
mod watch;

pub use self::args::Args;
