//! Host loop driving replay actions on a single-threaded tokio runtime.
//!
//! The loop owns the one timer for the outstanding action and, when
//! interactive, multiplexes it with playback commands read from stdin.

use crate::commands::{Command, HELP};
use crate::timeline::{record_line, status_line};
use rewind_recorder::{Action, PositionController, Record, ReplayMessage, ReplayScheduler};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufRead, Lines};
use tokio::time::{sleep_until, Instant};

/// Stand-in deadline for delays too large to represent.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// The action waiting for its timer.
struct Pending {
    deadline: Instant,
    action: Action<Record>,
}

impl Pending {
    fn new(action: Action<Record>) -> Self {
        let now = Instant::now();
        let deadline = now
            .checked_add(action.delay())
            .unwrap_or_else(|| now + FAR_FUTURE);
        Self { deadline, action }
    }
}

/// Replays records and prints them as they are emitted.
pub struct Player<W> {
    scheduler: ReplayScheduler<Record>,
    pending: Option<Pending>,
    out: W,
    emitted: usize,
}

impl<W: Write> Player<W> {
    pub fn new(scheduler: ReplayScheduler<Record>, out: W) -> Self {
        Self {
            scheduler,
            pending: None,
            out,
            emitted: 0,
        }
    }

    pub fn scheduler(&self) -> &ReplayScheduler<Record> {
        &self.scheduler
    }

    /// Number of records printed so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Start playback, optionally from `from` instead of the first record.
    pub fn start(&mut self, from: Option<i64>) {
        if let Some(action) = self.scheduler.play() {
            // The first action reads the live position when it fires.
            if let Some(index) = from {
                self.scheduler.scrub(index);
            }
            self.pending = Some(Pending::new(action));
        }
    }

    /// Run until the replay finishes. Without input, there is nothing else
    /// that could restart it.
    pub async fn run(&mut self) {
        while let Some(pending) = self.pending.take() {
            sleep_until(pending.deadline).await;
            self.fire(pending.action);
        }
    }

    /// Run while also accepting commands from `input`, until `quit` or
    /// until input has ended and nothing is pending.
    pub async fn run_interactive<R>(&mut self, mut input: Lines<R>)
    where
        R: AsyncBufRead + Unpin,
    {
        let mut input_open = true;

        loop {
            if !input_open && self.pending.is_none() {
                break;
            }

            let deadline = self.pending.as_ref().map(|p| p.deadline);
            tokio::select! {
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(pending) = self.pending.take() {
                        self.fire(pending.action);
                    }
                }
                line = input.next_line(), if input_open => {
                    match line {
                        Ok(Some(line)) => {
                            if !self.handle_line(&line) {
                                break;
                            }
                        }
                        Ok(None) => input_open = false,
                        Err(err) => {
                            tracing::warn!(%err, "stopped reading commands");
                            input_open = false;
                        }
                    }
                }
            }
        }
    }

    /// Apply one line of input. Returns `false` on quit.
    fn handle_line(&mut self, line: &str) -> bool {
        match line.parse::<Command>() {
            Ok(command) => self.apply(command),
            Err(message) => {
                self.print(&message);
                true
            }
        }
    }

    /// Apply a playback command to the scheduler. Returns `false` on quit,
    /// after dropping any pending action.
    pub fn apply(&mut self, command: Command) -> bool {
        tracing::debug!(?command, "playback command");
        match command {
            Command::Play => {
                if let Some(action) = self.scheduler.play() {
                    self.pending = Some(Pending::new(action));
                }
            }
            Command::Pause => self.scheduler.pause(),
            Command::Resume => self.resume(),
            Command::Toggle => {
                if self.scheduler.is_paused() {
                    self.resume();
                } else {
                    self.scheduler.pause();
                }
            }
            Command::Reset => {
                self.scheduler.reset();
                self.pending = None;
            }
            Command::Speed(speed) => {
                if let Err(err) = self.scheduler.set_speed(speed) {
                    self.print(&err.to_string());
                }
            }
            Command::Seek(index) => self.scheduler.scrub(index),
            Command::StepForward => self.scheduler.scrub_forward(),
            Command::StepBack => self.scheduler.scrub_backward(),
            Command::Status => {}
            Command::Help => self.print(HELP),
            Command::Quit => {
                self.pending = None;
                return false;
            }
        }
        let status = status_line(&self.scheduler);
        self.print(&status);
        true
    }

    fn resume(&mut self) {
        // Replaces the wait in flight; that action is superseded and would no-op.
        if let Some(action) = self.scheduler.resume() {
            self.pending = Some(Pending::new(action));
        }
    }

    fn fire(&mut self, action: Action<Record>) {
        let Some(mut message) = action.fire() else {
            return;
        };
        if let Some(next) = message.take_next() {
            self.pending = Some(Pending::new(next));
        }

        match message {
            ReplayMessage::RecordEmitted {
                record,
                index,
                total,
                ..
            } => {
                self.emitted += 1;
                self.print(&record_line(&record, index, total));
            }
            ReplayMessage::Paused { index, total } => {
                self.print(&format!("-- paused at {index}/{total}"));
            }
            ReplayMessage::Completed { total } => {
                self.print(&format!("-- replay complete ({total} records)"));
            }
        }
    }

    fn print(&mut self, line: &str) {
        if let Err(err) = writeln!(self.out, "{line}") {
            tracing::warn!(%err, "failed to write replay output");
        }
    }
}
