//! Tool-call state machine.
//!
//! Providers stream each tool call as fragments tagged with a
//! `toolCallIndex` and never send an explicit end marker. A call is complete
//! once anything else arrives: a fragment for another call, text, a tool
//! result, a `done`, or the end of the stream.
//!
//! An index identifies a call only for one open/complete cycle. Providers
//! reuse index 0 across turns of the same stream, so a fragment whose id or
//! name differs from the call currently held at its index starts a new call,
//! and [`ToolCallTracker::end_turn`] forgets every index at a turn boundary.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{ToolCall, ToolCallChunk};

/// Status of a tracked tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCallStatus {
    /// No call has been seen at this index.
    Idle,
    /// Accumulating fragments.
    Open,
    Completed,
}

/// One reassembled tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallEntry {
    pub index: u32,
    pub id: String,
    pub name: String,
    pub arguments: String,
    pub status: ToolCallStatus,
}

/// Transition produced by [`ToolCallTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCallEvent {
    Started {
        index: u32,
        id: String,
        name: String,
    },
    Delta {
        index: u32,
        fragment: String,
    },
    Completed {
        index: u32,
        id: String,
        name: String,
        arguments: String,
    },
}

/// Ordered tool-call entries plus the open/complete bookkeeping.
#[derive(Debug, Default)]
pub struct ToolCallTracker {
    entries: Vec<ToolCallEntry>,
    /// Latest entry per index.
    latest: HashMap<u32, usize>,
    open: Option<usize>,
}

impl ToolCallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one fragment and return the resulting transitions in order.
    pub fn apply(&mut self, chunk: &ToolCallChunk) -> Vec<ToolCallEvent> {
        let index = chunk.tool_call_index;
        let delta = &chunk.tool_call;
        let mut events = Vec::new();

        let target = match self.latest.get(&index) {
            Some(&pos) if !Self::is_new_call(&self.entries[pos], chunk) => Some(pos),
            Some(&pos) => {
                debug!(
                    index,
                    previous_id = %self.entries[pos].id,
                    id = %delta.id,
                    name = %delta.function.name,
                    "tool call index reused by a new call"
                );
                None
            }
            None => None,
        };

        if self.open.is_some() && self.open != target {
            events.extend(self.complete_open());
        }

        let pos = match target {
            Some(pos) => pos,
            None => {
                if delta.id.is_empty() {
                    debug!(index, "tool call started without an id");
                }
                let pos = self.entries.len();
                self.entries.push(ToolCallEntry {
                    index,
                    id: delta.id.clone(),
                    name: delta.function.name.clone(),
                    arguments: String::new(),
                    status: ToolCallStatus::Open,
                });
                self.latest.insert(index, pos);
                events.push(ToolCallEvent::Started {
                    index,
                    id: delta.id.clone(),
                    name: delta.function.name.clone(),
                });
                pos
            }
        };

        let entry = &mut self.entries[pos];
        if entry.id.is_empty() && !delta.id.is_empty() {
            entry.id = delta.id.clone();
        }
        if entry.name.is_empty() && !delta.function.name.is_empty() {
            entry.name = delta.function.name.clone();
        }
        if !delta.function.arguments.is_empty() {
            entry.arguments.push_str(&delta.function.arguments);
            events.push(ToolCallEvent::Delta {
                index,
                fragment: delta.function.arguments.clone(),
            });
        }
        if entry.status == ToolCallStatus::Open {
            self.open = Some(pos);
        }

        events
    }

    /// Complete the open call, if any.
    pub fn complete_open(&mut self) -> Option<ToolCallEvent> {
        let pos = self.open.take()?;
        let entry = &mut self.entries[pos];
        entry.status = ToolCallStatus::Completed;
        Some(ToolCallEvent::Completed {
            index: entry.index,
            id: entry.id.clone(),
            name: entry.name.clone(),
            arguments: entry.arguments.clone(),
        })
    }

    /// Close the current turn: complete the open call and forget which
    /// call each index belongs to. Fragments after this always start new
    /// calls.
    pub fn end_turn(&mut self) -> Option<ToolCallEvent> {
        let completed = self.complete_open();
        self.latest.clear();
        completed
    }

    /// Status of the latest call at `index`.
    pub fn status(&self, index: u32) -> ToolCallStatus {
        self.latest
            .get(&index)
            .map_or(ToolCallStatus::Idle, |&pos| self.entries[pos].status)
    }

    /// Latest call at `index`.
    pub fn current(&self, index: u32) -> Option<&ToolCallEntry> {
        self.latest.get(&index).map(|&pos| &self.entries[pos])
    }

    pub fn entries(&self) -> &[ToolCallEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tool calls in first-seen order, or `None` if none were seen.
    pub fn into_tool_calls(self) -> Option<Vec<ToolCall>> {
        if self.entries.is_empty() {
            return None;
        }
        Some(
            self.entries
                .into_iter()
                .map(|e| ToolCall::function(e.id, e.name, e.arguments))
                .collect(),
        )
    }

    // A differing non-empty id or name means the provider reused the index.
    fn is_new_call(entry: &ToolCallEntry, chunk: &ToolCallChunk) -> bool {
        let differs =
            |known: &str, seen: &str| !seen.is_empty() && !known.is_empty() && known != seen;
        differs(&entry.id, &chunk.tool_call.id)
            || differs(&entry.name, &chunk.tool_call.function.name)
    }
}
