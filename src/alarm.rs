/*
Copyright [2025] Seimizu Joukan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

#[allow(unused)]
use {
    chrono::{DateTime, Local},
    jlogger_tracing::{jdebug, jinfo},
    std::collections::{HashMap, VecDeque},
};

const LOG_CAPACITY: usize = 500;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LatchState {
    #[default]
    Quiescent,
    Latched,
}

/// Edge detectors keyed by condition name. Only a false to true transition
/// reports, a condition that stays true is silent until it clears again.
#[derive(Debug, Default)]
pub struct EdgeTracker {
    latches: HashMap<String, LatchState>,
}

impl EdgeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one observation, returns true on a rising edge.
    pub fn observe(&mut self, condition: &str, value: bool) -> bool {
        let latch = self.latches.entry(condition.to_owned()).or_default();
        match (*latch, value) {
            (LatchState::Quiescent, true) => {
                *latch = LatchState::Latched;
                jdebug!(func = "EdgeTracker::observe", condition = condition, note = "latched");
                true
            }
            (LatchState::Latched, false) => {
                *latch = LatchState::Quiescent;
                false
            }
            _ => false,
        }
    }

    #[cfg(test)]
    pub fn state(&self, condition: &str) -> LatchState {
        self.latches.get(condition).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    timestamp: DateTime<Local>,
    text: String,
}

impl LogLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> &DateTime<Local> {
        &self.timestamp
    }

    pub fn render(&self) -> String {
        format!("[{}] {}", self.timestamp.format("%H:%M:%S"), self.text)
    }
}

/// On-screen event log, oldest entries drop off once full.
#[derive(Debug, Default)]
pub struct EventLog {
    lines: VecDeque<LogLine>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: impl Into<String>) {
        let line = LogLine::new(text);
        jinfo!(func = "EventLog::push", text = line.text());
        if self.lines.len() == LOG_CAPACITY {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn last(&self) -> Option<&LogLine> {
        self.lines.back()
    }
}

/// Visible alarm list. Acknowledging clears the rows but leaves the edge
/// latches alone, so a condition that is still active stays silent.
#[derive(Debug, Default)]
pub struct AlarmList {
    rows: Vec<LogLine>,
}

impl AlarmList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&mut self, text: impl Into<String>) {
        self.rows.push(LogLine::new(text));
    }

    pub fn acknowledge(&mut self) -> usize {
        let count = self.rows.len();
        self.rows.clear();
        count
    }

    pub fn rows(&self) -> &[LogLine] {
        &self.rows
    }
}
