//! The interactive calculator session.
//!
//! A [`Session`] owns the text being typed, the undo/redo snapshots of that
//! text, the log of committed calculations and the memory register. Every
//! operation runs to completion and leaves a fresh live preview behind; only
//! [`Session::calculate`] reports a failure to its caller.
//!
//! A session is not meant to be shared: callers that need several actors
//! must put it behind a single lock.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::{
    CalcError,
    convert::{Conversion, leading_number},
    eval::evaluate_str,
    format::{format_preview, format_result},
    lex::{Lexer, Token},
};

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Oldest history entries beyond this count are dropped. `None` keeps all.
    pub history_limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub input: String,
    pub result: String,
}

/// What the presentation layer needs after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub text: String,
    pub preview: Option<String>,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct Session {
    config: SessionConfig,
    input: String,
    undo: Vec<String>,
    redo: Vec<String>,
    history: VecDeque<HistoryEntry>,
    memory: f64,
    preview: Option<String>,
    generation: u64,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Session {
            config,
            ..Session::default()
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// The raw input, or `"0"` while nothing has been typed.
    pub fn display_text(&self) -> &str {
        if self.input.is_empty() {
            "0"
        } else {
            &self.input
        }
    }

    /// Tokens of the displayed text for highlighting. Characters the lexer
    /// rejects are left out; they render as plain text.
    pub fn classified_tokens(&self) -> Vec<Token<'_>> {
        Lexer::new(self.display_text())
            .filter_map(Result::ok)
            .collect()
    }

    pub fn live_preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    /// Committed calculations, newest first.
    pub fn history_entries(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    pub fn memory(&self) -> f64 {
        self.memory
    }

    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Increases with every change to the displayed state.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether nothing has changed since `generation` was observed. A delayed
    /// error revert must do nothing once this turns false.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            text: self.display_text().to_string(),
            preview: self.preview.clone(),
            generation: self.generation,
        }
    }

    pub fn append(&mut self, fragment: &str) -> Snapshot {
        self.input.push_str(fragment);
        self.commit();
        self.refresh()
    }

    /// Drops the last character. Not recorded as an undo step.
    pub fn backspace(&mut self) -> Snapshot {
        self.input.pop();
        self.refresh()
    }

    pub fn clear(&mut self) -> Snapshot {
        self.input.clear();
        self.commit();
        self.refresh()
    }

    /// Evaluates the input and, on success, logs it and replaces the input
    /// with the result. On failure the input is emptied before the error is
    /// returned.
    pub fn calculate(&mut self) -> Result<Snapshot, CalcError> {
        match evaluate_str(&self.input) {
            Ok(value) => {
                let result = format_result(value);
                debug!("calculated {:?} = {result}", self.input);

                let input = std::mem::replace(&mut self.input, result.clone());
                self.history.push_front(HistoryEntry { input, result });
                if let Some(limit) = self.config.history_limit {
                    self.history.truncate(limit);
                }

                self.commit();
                Ok(self.refresh())
            }
            Err(e) => {
                debug!("calculation of {:?} failed: {e}", self.input);
                self.input.clear();
                self.refresh();
                Err(e)
            }
        }
    }

    pub fn undo(&mut self) -> Snapshot {
        if !self.can_undo() {
            return self.snapshot();
        }
        if let Some(current) = self.undo.pop() {
            self.redo.push(current);
        }
        self.input = self.undo.last().cloned().unwrap_or_default();
        debug!("undo to {:?}", self.input);
        self.refresh()
    }

    pub fn redo(&mut self) -> Snapshot {
        let Some(next) = self.redo.pop() else {
            return self.snapshot();
        };
        self.input = next.clone();
        self.undo.push(next);
        debug!("redo to {:?}", self.input);
        self.refresh()
    }

    /// Puts the input side of history entry `index` back into the input.
    /// Out-of-range indices change nothing.
    pub fn reuse_from_history(&mut self, index: usize) -> Snapshot {
        let Some(entry) = self.history.get(index) else {
            return self.snapshot();
        };
        self.input = entry.input.clone();
        self.commit();
        self.refresh()
    }

    pub fn memory_store(&mut self) -> Snapshot {
        self.memory = self.value_or_zero();
        debug!("memory = {}", self.memory);
        self.snapshot()
    }

    /// Adds the input's value to memory. A sum that overflows is dropped and
    /// the register keeps its old value.
    pub fn memory_add(&mut self) -> Snapshot {
        let sum = self.memory + self.value_or_zero();
        if sum.is_finite() {
            self.memory = sum;
        }
        debug!("memory = {}", self.memory);
        self.snapshot()
    }

    pub fn memory_clear(&mut self) -> Snapshot {
        self.memory = 0.0;
        self.snapshot()
    }

    pub fn memory_recall(&mut self) -> Snapshot {
        let text = format_result(self.memory);
        self.append(&text)
    }

    /// Scales the leading number of the input. Does nothing when the input
    /// does not start with a finite number or the scaled value overflows.
    pub fn convert_units(&mut self, conversion: Conversion) -> Snapshot {
        let Some(value) = leading_number(&self.input) else {
            return self.snapshot();
        };
        let converted = conversion.apply(value);
        if !converted.is_finite() {
            return self.snapshot();
        }
        self.input = format_result(converted);
        debug!("converted {value} with {conversion} to {}", self.input);
        self.commit();
        self.refresh()
    }

    fn value_or_zero(&self) -> f64 {
        evaluate_str(&self.input).unwrap_or(0.0)
    }

    fn commit(&mut self) {
        self.undo.push(self.input.clone());
        self.redo.clear();
    }

    fn refresh(&mut self) -> Snapshot {
        self.preview = if self.input.is_empty() {
            None
        } else {
            evaluate_str(&self.input).ok().map(format_preview)
        };
        trace!("preview of {:?}: {:?}", self.input, self.preview);
        self.generation += 1;
        self.snapshot()
    }
}
