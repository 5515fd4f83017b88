//! Pomodoro / two-minute timer and the focus clock.
//!
//! Both are driven by one-second `tick()` calls from the event loop; neither
//! owns a thread.

use chrono::{DateTime, Local};

use crate::model::config::TimerConfig;

/// Longest phase or countdown accepted, in minutes (one day)
pub const MAX_MINUTES: u32 = 24 * 60;

fn minutes_ok(minutes: u32) -> bool {
    (1..=MAX_MINUTES).contains(&minutes)
}

/// Which cycle the productivity timer runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    Pomodoro,
    TwoMinute,
}

impl TimerMode {
    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Pomodoro => "Pomodoro",
            TimerMode::TwoMinute => "Two-Minute",
        }
    }

    pub fn next(self) -> TimerMode {
        match self {
            TimerMode::Pomodoro => TimerMode::TwoMinute,
            TimerMode::TwoMinute => TimerMode::Pomodoro,
        }
    }
}

/// Something the user should be told about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    BreakStarted,
    WorkResumed,
    TwoMinuteDone,
    TimeUp,
}

impl TimerEvent {
    pub fn message(self) -> &'static str {
        match self {
            TimerEvent::BreakStarted => "Time for a break!",
            TimerEvent::WorkResumed => "Back to work!",
            TimerEvent::TwoMinuteDone => "Two minutes completed! Start another task or take a break.",
            TimerEvent::TimeUp => "Time's up!",
        }
    }
}

/// A completed phase, newest first in [`ProductivityTimer::history`]
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub at: DateTime<Local>,
    pub mode: TimerMode,
}

impl HistoryEntry {
    pub fn label(&self) -> String {
        format!("{}  {} Session", self.at.format("%H:%M:%S"), self.mode.label())
    }
}

#[derive(Debug, Clone)]
pub struct ProductivityTimer {
    mode: TimerMode,
    work_minutes: u32,
    break_minutes: u32,
    two_minute_minutes: u32,
    remaining: u32,
    running: bool,
    on_break: bool,
    sessions: u32,
    history: Vec<HistoryEntry>,
}

impl Default for ProductivityTimer {
    fn default() -> Self {
        Self::new(&TimerConfig::default())
    }
}

impl ProductivityTimer {
    pub fn new(config: &TimerConfig) -> Self {
        let work_minutes = config.work_minutes.clamp(1, MAX_MINUTES);
        ProductivityTimer {
            mode: TimerMode::Pomodoro,
            work_minutes,
            break_minutes: config.break_minutes.clamp(1, MAX_MINUTES),
            two_minute_minutes: config.two_minute_minutes.clamp(1, MAX_MINUTES),
            remaining: work_minutes * 60,
            running: false,
            on_break: false,
            sessions: 0,
            history: Vec::new(),
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn on_break(&self) -> bool {
        self.on_break
    }

    pub fn sessions(&self) -> u32 {
        self.sessions
    }

    /// Seconds left in the current phase
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn work_minutes(&self) -> u32 {
        self.work_minutes
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    /// Stop and rewind to the start of a work phase.
    pub fn reset(&mut self) {
        self.pause();
        match self.mode {
            TimerMode::Pomodoro => {
                self.remaining = self.work_minutes * 60;
                self.on_break = false;
            }
            TimerMode::TwoMinute => self.remaining = self.two_minute_minutes * 60,
        }
    }

    /// Switch cycle. The clock is reloaded but keeps running if it was.
    pub fn set_mode(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.on_break = false;
        self.remaining = self.phase_seconds();
    }

    /// Zero and values above [`MAX_MINUTES`] are rejected. Resets the clock
    /// unless a break is in progress.
    pub fn set_work_minutes(&mut self, minutes: u32) -> bool {
        if !minutes_ok(minutes) {
            return false;
        }
        self.work_minutes = minutes;
        if !self.on_break {
            self.reset();
        }
        true
    }

    /// Same bounds as work. Resets the clock only during a break.
    pub fn set_break_minutes(&mut self, minutes: u32) -> bool {
        if !minutes_ok(minutes) {
            return false;
        }
        self.break_minutes = minutes;
        if self.on_break {
            self.reset();
        }
        true
    }

    fn phase_seconds(&self) -> u32 {
        match self.mode {
            TimerMode::Pomodoro if self.on_break => self.break_minutes * 60,
            TimerMode::Pomodoro => self.work_minutes * 60,
            TimerMode::TwoMinute => self.two_minute_minutes * 60,
        }
    }

    /// Advance one second. Does nothing while paused.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return None;
        }

        let event = match self.mode {
            TimerMode::Pomodoro => {
                self.on_break = !self.on_break;
                if self.on_break {
                    TimerEvent::BreakStarted
                } else {
                    self.sessions += 1;
                    TimerEvent::WorkResumed
                }
            }
            TimerMode::TwoMinute => {
                self.sessions += 1;
                self.pause();
                TimerEvent::TwoMinuteDone
            }
        };
        self.remaining = self.phase_seconds();
        self.history.insert(
            0,
            HistoryEntry {
                at: Local::now(),
                mode: self.mode,
            },
        );
        tracing::debug!(?event, sessions = self.sessions, "timer phase complete");
        Some(event)
    }

    /// `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }

    /// Share of the current phase already elapsed, 0–100
    pub fn progress(&self) -> u16 {
        let total = self.phase_seconds().max(1);
        let elapsed = total.saturating_sub(self.remaining);
        ((elapsed as u64 * 100) / total as u64) as u16
    }
}

// ---------------------------------------------------------------------------
// Focus clock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    Countdown,
    Stopwatch,
}

/// Large HH:MM:SS clock: a countdown or a stopwatch.
#[derive(Debug, Clone)]
pub struct FocusClock {
    kind: ClockKind,
    seconds: u32,
    running: bool,
}

impl Default for FocusClock {
    fn default() -> Self {
        FocusClock {
            kind: ClockKind::Countdown,
            seconds: 0,
            running: false,
        }
    }
}

impl FocusClock {
    pub fn kind(&self) -> ClockKind {
        self.kind
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Start counting down from `minutes`, which must be 1..=[`MAX_MINUTES`].
    pub fn start_countdown(&mut self, minutes: u32) -> bool {
        if !minutes_ok(minutes) {
            return false;
        }
        self.kind = ClockKind::Countdown;
        self.seconds = minutes * 60;
        self.running = true;
        true
    }

    pub fn start_stopwatch(&mut self) {
        self.kind = ClockKind::Stopwatch;
        self.seconds = 0;
        self.running = true;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.seconds = 0;
    }

    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running {
            return None;
        }
        match self.kind {
            ClockKind::Stopwatch => {
                self.seconds += 1;
                None
            }
            ClockKind::Countdown => {
                self.seconds = self.seconds.saturating_sub(1);
                if self.seconds == 0 {
                    self.running = false;
                    Some(TimerEvent::TimeUp)
                } else {
                    None
                }
            }
        }
    }

    /// `HH:MM:SS`
    pub fn display(&self) -> String {
        let s = self.seconds;
        format!("{:02}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
    }
}
