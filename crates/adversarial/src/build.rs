//! Accepting host-supplied rules and solvers.
//!
//! The host evaluates the rules program and the solver program separately.
//! Each result is checked against its method checklist before anything runs,
//! and every failure is tagged with the program it came from so the host can
//! point at the right editor.

use plyboard_core::{validate, BuildError, Capabilities, Fault, PlyError, PlyResult};
use tracing::debug;

use crate::case::{Case, CASE_CHECKLIST, POSITION_CHECKLIST};
use crate::engine::ExpansionEngine;
use crate::routine::{AdversarialSolver, SOLVER_CHECKLIST};

/// Validated engine and solver, ready for a driver.
pub struct AdversarialSetup<C: Case> {
    /// Engine with the tree at the initial position.
    pub engine: ExpansionEngine<C>,
    /// Accepted solver.
    pub solver: Box<dyn AdversarialSolver<C>>,
}

fn tagged(fault: Fault) -> impl Fn(PlyError) -> PlyError {
    move |err| match err {
        PlyError::Build(build) => PlyError::Build(build),
        other => BuildError::new(fault, other.to_string()).into(),
    }
}

/// Evaluate both programs and check them.
///
/// `case_program` and `solver_program` stand for the host's evaluation of the
/// user's code. The case is evaluated and checked first, including the
/// initial position it produces.
pub fn build_adversarial<C, S, FC, FS>(case_program: FC, solver_program: FS) -> PlyResult<AdversarialSetup<C>>
where
    C: Case + Capabilities,
    C::Position: Capabilities,
    S: AdversarialSolver<C> + Capabilities + 'static,
    FC: FnOnce() -> PlyResult<C>,
    FS: FnOnce() -> PlyResult<S>,
{
    let case = case_program().map_err(tagged(Fault::Case))?;
    validate(CASE_CHECKLIST, &case, "the Case class").map_err(|message| BuildError::new(Fault::Case, message))?;
    let engine = ExpansionEngine::new(case).map_err(tagged(Fault::Case))?;
    let root = engine.tree().root();
    if let Some(position) = engine.tree().position(root) {
        validate(
            POSITION_CHECKLIST,
            position,
            "the Position class returned from getInitialPosition",
        )
        .map_err(|message| BuildError::new(Fault::Case, message))?;
    }

    let solver = solver_program().map_err(tagged(Fault::Solver))?;
    validate(SOLVER_CHECKLIST, &solver, "the Solution class")
        .map_err(|message| BuildError::new(Fault::Solver, message))?;
    debug!("adversarial case and solver accepted");
    Ok(AdversarialSetup {
        engine,
        solver: Box::new(solver),
    })
}
