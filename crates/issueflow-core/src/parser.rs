//! Extraction of file edits from free-form model output.
//!
//! The model is asked to emit each file as a fenced block whose opening fence
//! carries the file path:
//!
//! ````text
//! ```src/index.ts
//! export const x = 1;
//! ```
//! ````
//!
//! Blocks are found by [`FenceScanner`], a three-state scanner. A body ends at
//! the first closing fence after the label line, so a fence nested inside
//! file content truncates that file. Blocks whose label is not a plausible
//! relative path are dropped without affecting later blocks.

use tracing::debug;

use crate::domain::{FileEdit, FileSet};

const FENCE: &str = "```";

/// A raw fenced block, untrimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FencedBlock<'a> {
    /// Text between the opening fence and the end of its line.
    pub label: &'a str,
    /// Text between the label line and the closing fence.
    pub body: &'a str,
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    SeekingOpenFence,
    /// `label_start` is the byte right after the opening fence.
    ReadingLabel { fence_start: usize, label_start: usize },
    ReadingBody { label_start: usize, label_end: usize, body_start: usize },
}

/// Iterator over non-overlapping fenced blocks in order of appearance.
#[derive(Debug, Clone)]
pub struct FenceScanner<'a> {
    text: &'a str,
    cursor: usize,
    done: bool,
}

impl<'a> FenceScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            cursor: 0,
            done: false,
        }
    }
}

impl<'a> Iterator for FenceScanner<'a> {
    type Item = FencedBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.text;
        let mut state = ScanState::SeekingOpenFence;

        while !self.done {
            state = match state {
                ScanState::SeekingOpenFence => match text[self.cursor..].find(FENCE) {
                    Some(offset) => {
                        let fence_start = self.cursor + offset;
                        ScanState::ReadingLabel {
                            fence_start,
                            label_start: fence_start + FENCE.len(),
                        }
                    }
                    None => {
                        self.done = true;
                        break;
                    }
                },
                ScanState::ReadingLabel {
                    fence_start,
                    label_start,
                } => match text[label_start..].find('\n') {
                    // The label must be at least one character long.
                    Some(0) => {
                        self.cursor = fence_start + 1;
                        ScanState::SeekingOpenFence
                    }
                    Some(offset) => {
                        let label_end = label_start + offset;
                        ScanState::ReadingBody {
                            label_start,
                            label_end,
                            body_start: label_end + 1,
                        }
                    }
                    // No line break after this fence, so no later fence can
                    // open a block either.
                    None => {
                        self.done = true;
                        break;
                    }
                },
                ScanState::ReadingBody {
                    label_start,
                    label_end,
                    body_start,
                } => match text[body_start..].find(FENCE) {
                    Some(offset) => {
                        let body_end = body_start + offset;
                        self.cursor = body_end + FENCE.len();
                        return Some(FencedBlock {
                            label: &text[label_start..label_end],
                            body: &text[body_start..body_end],
                        });
                    }
                    None => {
                        self.done = true;
                        break;
                    }
                },
            };
        }

        None
    }
}

/// Turn model output into a [`FileSet`].
///
/// Never fails: text without fenced blocks yields an empty set.
pub fn parse_response(raw: &str) -> FileSet {
    let mut edits = Vec::new();

    for block in FenceScanner::new(raw) {
        let path = block.label.trim();
        if !FileEdit::is_valid_path(path) {
            debug!(label = %path, "Dropping fenced block with non-path label");
            continue;
        }
        edits.push(FileEdit::new(path, block.body.trim()));
    }

    let summary = format!("Generated {} files for implementation", edits.len());
    FileSet::new(edits, summary)
}
