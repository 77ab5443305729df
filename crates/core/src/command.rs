//! Reversible commands and the undo/redo log.
//!
//! A [`Command`] wraps a [`Reversible`] operation and enforces strict
//! alternation between execute and revert. A [`CommandHandler`] keeps an
//! append-only log with two cursors:
//!
//! - `current`: the logical position, moved by queue_undo/queue_redo without
//!   side effects
//! - `executed`: how far the target has actually been brought
//!
//! [`CommandHandler::execute_to_current`] is the only place side effects run.

use std::fmt;

use tracing::trace;

use crate::error::{PlyError, PlyResult};

/// An operation that can be applied to and removed from a target.
pub trait Reversible<T> {
    /// Apply the operation.
    fn apply(&mut self, target: &mut T) -> PlyResult<()>;
    /// Undo a previous [`Reversible::apply`].
    fn revert(&mut self, target: &mut T) -> PlyResult<()>;
}

type StepFn<T> = Box<dyn FnMut(&mut T) -> PlyResult<()>>;

/// A [`Reversible`] built from a pair of closures.
pub struct FnPair<T> {
    forward: StepFn<T>,
    backward: StepFn<T>,
}

impl<T> FnPair<T> {
    /// Pair a forward and a backward closure.
    pub fn new<D, U>(forward: D, backward: U) -> Self
    where
        D: FnMut(&mut T) -> PlyResult<()> + 'static,
        U: FnMut(&mut T) -> PlyResult<()> + 'static,
    {
        Self {
            forward: Box::new(forward),
            backward: Box::new(backward),
        }
    }
}

impl<T> Reversible<T> for FnPair<T> {
    fn apply(&mut self, target: &mut T) -> PlyResult<()> {
        (self.forward)(target)
    }

    fn revert(&mut self, target: &mut T) -> PlyResult<()> {
        (self.backward)(target)
    }
}

/// A named reversible operation with a done/not-done state machine.
pub struct Command<T> {
    name: String,
    done: bool,
    op: Box<dyn Reversible<T>>,
}

impl<T> Command<T> {
    /// Wrap a reversible operation.
    pub fn new(name: impl Into<String>, op: impl Reversible<T> + 'static) -> Self {
        Self {
            name: name.into(),
            done: false,
            op: Box::new(op),
        }
    }

    /// Build a command from a do/undo closure pair.
    pub fn from_fns<D, U>(name: impl Into<String>, forward: D, backward: U) -> Self
    where
        T: 'static,
        D: FnMut(&mut T) -> PlyResult<()> + 'static,
        U: FnMut(&mut T) -> PlyResult<()> + 'static,
    {
        Self::new(name, FnPair::new(forward, backward))
    }

    /// Command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the command is currently applied.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Apply; fails if already applied.
    ///
    /// `done` only flips when the operation succeeds.
    pub fn execute(&mut self, target: &mut T) -> PlyResult<()> {
        if self.done {
            return Err(PlyError::command(format!(
                "Command {} already executed, cannot be re-executed.",
                self.name
            )));
        }
        self.op.apply(target)?;
        self.done = true;
        Ok(())
    }

    /// Undo; fails if not applied.
    pub fn revert(&mut self, target: &mut T) -> PlyResult<()> {
        if !self.done {
            return Err(PlyError::command(format!(
                "Command {} not yet executed, cannot be reverted.",
                self.name
            )));
        }
        self.op.revert(target)?;
        self.done = false;
        Ok(())
    }
}

impl<T> fmt::Debug for Command<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("done", &self.done)
            .finish()
    }
}

/// Direction a command was moved in by a catch-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Triggered {
    /// The command was executed.
    Executed,
    /// The command was reverted.
    Reverted,
}

/// One command touched by [`CommandHandler::execute_to_current`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggeredCommand {
    /// Position of the command in the log.
    pub index: usize,
    /// Command name.
    pub name: String,
    /// What happened to it.
    pub direction: Triggered,
}

/// Undo/redo log.
///
/// Cursors count applied commands: `current == 0` means nothing is logically
/// applied, `current == len` means everything is.
pub struct CommandHandler<T> {
    commands: Vec<Command<T>>,
    current: usize,
    executed: usize,
    /// Truncated commands still applied to the target, in revert order,
    /// with the log index they had.
    detached: Vec<(usize, Command<T>)>,
}

impl<T> Default for CommandHandler<T> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            current: 0,
            executed: 0,
            detached: Vec::new(),
        }
    }
}

impl<T> CommandHandler<T> {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commands in the log.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Logical position.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Applied position.
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Command at `index`.
    pub fn command(&self, index: usize) -> Option<&Command<T>> {
        self.commands.get(index)
    }

    /// Drop every command after the logical position.
    ///
    /// Commands between `current` and `executed` are still applied to the
    /// target. They leave the log but are kept aside so the next catch-up
    /// reverts them before anything else runs.
    fn truncate_forward(&mut self) {
        let applied_end = self.executed.max(self.current);
        let mut dropped: Vec<(usize, Command<T>)> = self
            .commands
            .drain(self.current..)
            .enumerate()
            .map(|(offset, cmd)| (self.current + offset, cmd))
            .take_while(|(index, _)| *index < applied_end)
            .collect();
        dropped.reverse();
        self.detached.extend(dropped);
        self.executed = self.executed.min(self.current);
    }

    /// Whether truncated commands are waiting to be reverted.
    pub fn has_detached(&self) -> bool {
        !self.detached.is_empty()
    }

    /// Truncate forward history, then append and advance the logical cursor.
    pub fn add_command(&mut self, command: Command<T>) {
        self.truncate_forward();
        self.commands.push(command);
        self.current += 1;
    }

    /// Whether a redo is queued-able.
    pub fn can_redo(&self) -> bool {
        self.current < self.commands.len()
    }

    /// Move the logical cursor forward.
    pub fn queue_redo(&mut self) -> PlyResult<()> {
        if !self.can_redo() {
            return Err(PlyError::command("No more commands to redo."));
        }
        self.current += 1;
        Ok(())
    }

    /// Whether an undo is queue-able.
    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    /// Move the logical cursor back.
    pub fn queue_undo(&mut self) -> PlyResult<()> {
        if !self.can_undo() {
            return Err(PlyError::command("No more commands to undo."));
        }
        self.current -= 1;
        Ok(())
    }

    /// Move the logical cursor to an absolute position.
    pub fn seek(&mut self, position: usize) -> PlyResult<()> {
        if position > self.commands.len() {
            return Err(PlyError::command(format!(
                "Cannot seek to {}, only {} commands recorded.",
                position,
                self.commands.len()
            )));
        }
        self.current = position;
        Ok(())
    }

    /// Bring the target to the logical position.
    ///
    /// Reverts any truncated commands still applied, then executes forward
    /// or reverts backward one command at a time and returns the commands
    /// touched, in order. On failure the cursor stays at the last command
    /// that succeeded.
    pub fn execute_to_current(&mut self, target: &mut T) -> PlyResult<Vec<TriggeredCommand>> {
        let mut touched = Vec::new();
        while !self.detached.is_empty() {
            let (index, cmd) = &mut self.detached[0];
            cmd.revert(target)?;
            trace!(index = *index, name = %cmd.name, "truncated command reverted");
            touched.push(TriggeredCommand {
                index: *index,
                name: cmd.name.clone(),
                direction: Triggered::Reverted,
            });
            self.detached.remove(0);
        }
        while self.executed < self.current {
            let index = self.executed;
            let cmd = &mut self.commands[index];
            cmd.execute(target)?;
            trace!(index, name = %cmd.name, "command executed");
            self.executed += 1;
            touched.push(TriggeredCommand {
                index,
                name: cmd.name.clone(),
                direction: Triggered::Executed,
            });
        }
        while self.executed > self.current {
            let index = self.executed - 1;
            let cmd = &mut self.commands[index];
            cmd.revert(target)?;
            trace!(index, name = %cmd.name, "command reverted");
            self.executed -= 1;
            touched.push(TriggeredCommand {
                index,
                name: cmd.name.clone(),
                direction: Triggered::Reverted,
            });
        }
        Ok(touched)
    }
}

impl<T> fmt::Debug for CommandHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandler")
            .field("commands", &self.commands)
            .field("current", &self.current)
            .field("executed", &self.executed)
            .field("detached", &self.detached.len())
            .finish()
    }
}
