//! Ordering of imaging steps.
//!
//! Steps run in a fixed chain: dirty → clean → pbcor → cutout → stats. A run
//! may start at any step (the dirty image is usually made once, then only the
//! later steps are iterated), but once started every further step must follow
//! its predecessor. The first step of a run creates each target's script;
//! later steps append to it.

use crate::casa::ScriptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    DirtyDone,
    CleanDone,
    PbCorDone,
    CutoutDone,
    StatsDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Dirty,
    Clean,
    PbCor,
    Cutout,
    Stats,
}

impl Step {
    /// Phase that must be current for this step to append.
    pub fn predecessor(self) -> Phase {
        match self {
            Step::Dirty => Phase::NotStarted,
            Step::Clean => Phase::DirtyDone,
            Step::PbCor => Phase::CleanDone,
            Step::Cutout => Phase::PbCorDone,
            Step::Stats => Phase::CutoutDone,
        }
    }

    /// Phase reached once the step has been written.
    pub fn completes(self) -> Phase {
        match self {
            Step::Dirty => Phase::DirtyDone,
            Step::Clean => Phase::CleanDone,
            Step::PbCor => Phase::PbCorDone,
            Step::Cutout => Phase::CutoutDone,
            Step::Stats => Phase::StatsDone,
        }
    }
}

/// How a step opens the per-target script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Create or truncate; the script is new to this run.
    Overwrite,
    Append,
}

#[derive(Debug, Clone)]
pub struct PhaseTracker {
    phase: Phase,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            phase: Phase::NotStarted,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Record `step` and return how its output must be written.
    ///
    /// On error the phase is left unchanged.
    pub fn advance(&mut self, step: Step) -> Result<WriteMode, ScriptError> {
        let mode = if self.phase == Phase::NotStarted {
            WriteMode::Overwrite
        } else if self.phase == step.predecessor() {
            WriteMode::Append
        } else {
            return Err(ScriptError::PhaseOrder {
                current: self.phase,
                step,
            });
        };
        self.phase = step.completes();
        Ok(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_chain_overwrites_once_then_appends() {
        let mut t = PhaseTracker::new();
        let modes: Vec<WriteMode> = [Step::Dirty, Step::Clean, Step::PbCor, Step::Cutout, Step::Stats]
            .into_iter()
            .map(|s| t.advance(s).unwrap())
            .collect();
        assert_eq!(modes[0], WriteMode::Overwrite);
        assert!(modes[1..].iter().all(|m| *m == WriteMode::Append));
        assert_eq!(t.phase(), Phase::StatsDone);
    }

    #[test]
    fn run_may_start_at_clean() {
        let mut t = PhaseTracker::new();
        assert_eq!(t.advance(Step::Clean).unwrap(), WriteMode::Overwrite);
        assert_eq!(t.advance(Step::PbCor).unwrap(), WriteMode::Append);
    }

    #[test]
    fn out_of_order_step_is_an_error() {
        let mut t = PhaseTracker::new();
        t.advance(Step::Dirty).unwrap();
        let err = t.advance(Step::Cutout).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::PhaseOrder {
                current: Phase::DirtyDone,
                step: Step::Cutout
            }
        ));
        assert_eq!(t.phase(), Phase::DirtyDone);

        assert!(t.advance(Step::Dirty).is_err(), "dirty cannot repeat");
    }
}
