use core::cell::Cell;
use core::ops::ControlFlow;
use std::rc::Rc;

use latfit::prelude::*;

use super::unit_space;

#[test]
fn test_stop_handle_stops_between_trials() {
    let study = Study::builder().search_space(unit_space()).open().unwrap();
    let stop = study.stop_handle();
    let evaluations = Cell::new(0);

    study
        .optimize(50, |p: &ParamSet| {
            evaluations.set(evaluations.get() + 1);
            if evaluations.get() == 4 {
                stop.stop();
            }
            Ok::<_, Error>(p["a"])
        })
        .unwrap();

    // The fourth evaluation finished and was recorded before stopping.
    assert_eq!(study.n_trials(), 4);
    assert!(study.trials_by_state(TrialState::Running).is_empty());
    assert!(!stop.is_stop_requested());

    // The request was consumed: the next call runs normally.
    study
        .optimize(2, |p: &ParamSet| Ok::<_, Error>(p["a"]))
        .unwrap();
    assert_eq!(study.n_trials(), 6);
}

struct StopAbove {
    threshold: f64,
    before_calls: Rc<Cell<usize>>,
}

impl Objective for StopAbove {
    type Error = Error;

    fn evaluate(&self, params: &ParamSet) -> Result<f64> {
        Ok(params["a"])
    }

    fn before_trial(&self, _study: &Study) -> ControlFlow<()> {
        self.before_calls.set(self.before_calls.get() + 1);
        ControlFlow::Continue(())
    }

    fn after_trial(&self, _study: &Study, trial: &Trial) -> ControlFlow<()> {
        match trial.completed_value() {
            Some(v) if v > self.threshold => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }
}

#[test]
fn test_after_trial_hook_breaks_loop() {
    let study = Study::builder()
        .maximize()
        .search_space(unit_space())
        .sampler(RandomSampler::with_seed(1))
        .open()
        .unwrap();
    let before_calls = Rc::new(Cell::new(0));
    let objective = StopAbove {
        threshold: 0.8,
        before_calls: Rc::clone(&before_calls),
    };

    study.optimize(1000, objective).unwrap();

    let history = study.history();
    assert_eq!(before_calls.get(), history.len());
    assert!(history.last().unwrap().value.unwrap() > 0.8);
    assert!(history[..history.len() - 1].iter().all(|t| t.value.unwrap() <= 0.8));
}

struct Budget(usize);

impl Objective for Budget {
    type Error = Error;

    fn evaluate(&self, params: &ParamSet) -> Result<f64> {
        Ok(params["a"])
    }

    fn before_trial(&self, study: &Study) -> ControlFlow<()> {
        if study.n_trials() >= self.0 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

#[test]
fn test_before_trial_hook_sees_study() {
    let study = Study::builder().search_space(unit_space()).open().unwrap();
    study.optimize(100, Budget(6)).unwrap();
    assert_eq!(study.n_trials(), 6);
}
