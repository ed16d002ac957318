//! Built-in steps, one per [`JobKind`].

pub mod cleanup;
pub mod probe;
pub mod transcode;

use vf_core::JobKind;

use crate::step::Step;

pub use cleanup::{remove_targets, CleanupStep};
pub use probe::{run_probe, ProbeStep};
pub use transcode::{run_transcode, TranscodeStep};

/// The step that executes jobs of `kind`.
pub fn step_for(kind: JobKind) -> Box<dyn Step> {
    match kind {
        JobKind::Probe => Box::new(ProbeStep::default()),
        JobKind::Transcode => Box::new(TranscodeStep),
        JobKind::Cleanup => Box::new(CleanupStep),
    }
}
