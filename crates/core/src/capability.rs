//! Capability checklists for host-supplied programs.
//!
//! A host evaluates user code on its own and hands the result over as an
//! object implementing [`Capabilities`]. Before the object is wrapped as a
//! collaborator, every method in the matching checklist must be present with
//! exactly the listed parameter count.

use std::collections::HashMap;

/// A required method and its parameter count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSpec {
    /// Method name as exposed by the host program.
    pub name: &'static str,
    /// Number of declared parameters.
    pub arity: usize,
}

impl MethodSpec {
    /// Create a method spec.
    pub const fn new(name: &'static str, arity: usize) -> Self {
        Self { name, arity }
    }
}

/// Method table reported by a host-evaluated object.
pub trait Capabilities {
    /// Declared parameter count of `method`, `None` when absent.
    fn arity(&self, method: &str) -> Option<usize>;
}

/// Plain method table, the usual way a host describes an evaluated object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodTable {
    methods: HashMap<String, usize>,
}

impl MethodTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method.
    pub fn with(mut self, name: impl Into<String>, arity: usize) -> Self {
        self.methods.insert(name.into(), arity);
        self
    }

    /// Add a method in place.
    pub fn insert(&mut self, name: impl Into<String>, arity: usize) {
        self.methods.insert(name.into(), arity);
    }

    /// Build a table that satisfies `checklist` exactly.
    pub fn from_checklist(checklist: &[MethodSpec]) -> Self {
        checklist
            .iter()
            .fold(Self::new(), |table, spec| table.with(spec.name, spec.arity))
    }
}

impl Capabilities for MethodTable {
    fn arity(&self, method: &str) -> Option<usize> {
        self.methods.get(method).copied()
    }
}

/// Arity of `method` in `checklist`.
///
/// Native collaborators implement every checklist method by construction and
/// can answer [`Capabilities::arity`] with this.
pub fn arity_in(checklist: &[MethodSpec], method: &str) -> Option<usize> {
    checklist.iter().find(|spec| spec.name == method).map(|spec| spec.arity)
}

/// Check `subject` against `checklist`, stopping at the first failure.
///
/// `owner` names the role in the message, e.g. "the Case class".
pub fn validate(checklist: &[MethodSpec], subject: &dyn Capabilities, owner: &str) -> Result<(), String> {
    for spec in checklist {
        if subject.arity(spec.name) != Some(spec.arity) {
            return Err(format!(
                "{} method is not defined in {} or has the wrong number of arguments, it should expect {} argument{}.",
                spec.name,
                owner,
                spec.arity,
                if spec.arity == 1 { "" } else { "s" }
            ));
        }
    }
    Ok(())
}
