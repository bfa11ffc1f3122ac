use super::{Process, Snapshot};
use std::{
    io::{BufRead, Write},
    sync::mpsc::{Receiver, Sender},
};
use thiserror::Error;

/// The answer a step controller gives after seeing a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCommand {
    Continue,
    RunToEnd,
    Abort,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("step controller channel closed")]
pub struct ChannelClosed;

/// Pause point between ticks of a stepped run.
pub trait StepControl {
    fn acknowledge(
        &mut self,
        snapshot: &Snapshot,
        processes: &[Process],
    ) -> Result<StepCommand, ChannelClosed>;
}

/// Sends every snapshot out over a channel and waits for the matching command.
pub struct ChannelControl {
    snapshots: Sender<Snapshot>,
    commands: Receiver<StepCommand>,
}

impl ChannelControl {
    pub fn new(snapshots: Sender<Snapshot>, commands: Receiver<StepCommand>) -> Self {
        Self {
            snapshots,
            commands,
        }
    }
}

impl StepControl for ChannelControl {
    fn acknowledge(
        &mut self,
        snapshot: &Snapshot,
        _processes: &[Process],
    ) -> Result<StepCommand, ChannelClosed> {
        self.snapshots
            .send(snapshot.clone())
            .map_err(|_| ChannelClosed)?;
        self.commands.recv().map_err(|_| ChannelClosed)
    }
}

/// Prints one status line per tick and reads the command from a line of input.
///
/// An empty line or `s` steps, `c` or `r` runs to the end and `q` aborts. End of input counts
/// as a closed channel.
pub struct LineControl<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineControl<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_command(&mut self) -> Result<StepCommand, ChannelClosed> {
        let mut line = String::new();
        loop {
            line.clear();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return Err(ChannelClosed),
                Ok(_) => {}
            }

            match line.trim() {
                "" | "s" => return Ok(StepCommand::Continue),
                "c" | "r" => return Ok(StepCommand::RunToEnd),
                "q" => return Ok(StepCommand::Abort),
                other => {
                    writeln!(
                        self.output,
                        "unknown command {other:?} (enter/s: step, r: run, q: quit)"
                    )
                    .map_err(|_| ChannelClosed)?;
                }
            }
        }
    }
}

/// `Tick   3 | Running: A | Ready: B C`
pub fn status_line(snapshot: &Snapshot) -> String {
    format!(
        "Tick {:>3} | Running: {} | Ready: {}",
        snapshot.tick,
        snapshot.running.as_deref().unwrap_or("-"),
        snapshot.ready.join(" ")
    )
}

impl<R: BufRead, W: Write> StepControl for LineControl<R, W> {
    fn acknowledge(
        &mut self,
        snapshot: &Snapshot,
        _processes: &[Process],
    ) -> Result<StepCommand, ChannelClosed> {
        writeln!(self.output, "{}", status_line(snapshot))
            .and_then(|_| self.output.flush())
            .map_err(|_| ChannelClosed)?;
        self.read_command()
    }
}
