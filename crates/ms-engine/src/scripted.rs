//! A deterministic in-process [`Engine`].
//!
//! [`ScriptedEngine`] never looks at the bytes it is fed. It counts them,
//! answers "go to" queries from a [`Script`], reports itself finished once a
//! byte budget has been consumed, and records every call in a shared
//! [`CallLog`] so the sequence can be inspected after the instance is gone.

use std::collections::BTreeMap;
use std::sync::Arc;

use ms_core::{EngineOutputKind, SeekWords};
use parking_lot::Mutex;

use crate::engine::{status, Engine, EngineFactory, EngineSettings};

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Init { size: u64, offset: u64 },
    Continue { len: usize, first: Option<u8> },
    GotoGet,
    Finalize,
    Inform,
    Close,
}

/// Shared, append-only record of engine calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<EngineCall>>>);

impl CallLog {
    fn push(&self, call: EngineCall) {
        self.0.lock().push(call);
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.0.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.0.lock().iter().filter(|c| pred(c)).count()
    }

    /// `(size, offset)` of every `open_buffer_init`, in order.
    pub fn inits(&self) -> Vec<(u64, u64)> {
        self.0
            .lock()
            .iter()
            .filter_map(|c| match c {
                EngineCall::Init { size, offset } => Some((*size, *offset)),
                _ => None,
            })
            .collect()
    }

    /// Lengths of every chunk fed, in order.
    pub fn feed_lengths(&self) -> Vec<usize> {
        self.0
            .lock()
            .iter()
            .filter_map(|c| match c {
                EngineCall::Continue { len, .. } => Some(*len),
                _ => None,
            })
            .collect()
    }
}

/// What a [`ScriptedEngine`] does in response to the driver.
#[derive(Debug, Clone, Default)]
pub struct Script {
    finish_after: Option<u64>,
    seeks: BTreeMap<usize, SeekWords>,
    report: Option<String>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report finished once at least `bytes` have been fed since creation.
    pub fn finish_after(mut self, bytes: u64) -> Self {
        self.finish_after = Some(bytes);
        self
    }

    /// After the `feed`-th chunk (1-based), ask to jump to `target`.
    pub fn seek_after_feed(self, feed: usize, target: u64) -> Self {
        self.seek_words_after_feed(feed, SeekWords::from_target(Some(target)))
    }

    /// After the `feed`-th chunk (1-based), surface `words` verbatim.
    pub fn seek_words_after_feed(mut self, feed: usize, words: SeekWords) -> Self {
        self.seeks.insert(feed, words);
        self
    }

    /// Replace the generated report with a fixed string.
    pub fn report(mut self, report: impl Into<String>) -> Self {
        self.report = Some(report.into());
        self
    }
}

/// Deterministic engine driven by a [`Script`].
#[derive(Debug)]
pub struct ScriptedEngine {
    script: Script,
    kind: EngineOutputKind,
    log: CallLog,
    consumed: u64,
    feeds: usize,
    size: u64,
    finalized: bool,
}

impl ScriptedEngine {
    pub fn new(script: Script, kind: EngineOutputKind) -> Self {
        Self::with_log(script, kind, CallLog::default())
    }

    pub fn with_log(script: Script, kind: EngineOutputKind, log: CallLog) -> Self {
        Self {
            script,
            kind,
            log,
            consumed: 0,
            feeds: 0,
            size: 0,
            finalized: false,
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Total bytes fed so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    fn pending_words(&self) -> SeekWords {
        self.script
            .seeks
            .get(&self.feeds)
            .copied()
            .unwrap_or(SeekWords::ABSENT)
    }

    fn generated_report(&self) -> String {
        let state = if self.finalized { "Yes" } else { "No" };
        match self.kind {
            EngineOutputKind::Json => format!(
                concat!(
                    r#"{{"creatingLibrary":{{"name":"ScriptedEngine","version":"1.0"}},"#,
                    r#""media":{{"@ref":"","track":[{{"@type":"General","#,
                    r#""FileSize":"{}","StreamSize":"{}","Finalized":"{}"}}]}}}}"#
                ),
                self.size, self.consumed, state
            ),
            EngineOutputKind::Xml => format!(
                concat!(
                    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                    "<MediaInfo><media ref=\"\"><track type=\"General\">",
                    "<FileSize>{}</FileSize><StreamSize>{}</StreamSize>",
                    "<Finalized>{}</Finalized></track></media></MediaInfo>\n"
                ),
                self.size, self.consumed, state
            ),
            EngineOutputKind::Html => format!(
                "<html><body><table><tr><td>File size</td><td>{}</td></tr>\
                 <tr><td>Stream size</td><td>{}</td></tr></table></body></html>\n",
                self.size, self.consumed
            ),
            EngineOutputKind::Text => format!(
                "General\nFile size                                : {}\n\
                 Stream size                              : {}\n",
                self.size, self.consumed
            ),
        }
    }
}

impl Engine for ScriptedEngine {
    fn open_buffer_init(&mut self, size: u64, offset: u64) {
        self.size = size;
        self.log.push(EngineCall::Init { size, offset });
    }

    fn open_buffer_continue(&mut self, data: &[u8]) -> u32 {
        self.feeds += 1;
        self.consumed += data.len() as u64;
        self.log.push(EngineCall::Continue {
            len: data.len(),
            first: data.first().copied(),
        });

        let finished = self
            .script
            .finish_after
            .is_some_and(|limit| self.consumed >= limit);
        if finished {
            status::ACCEPTED | status::FILLED | status::FINALIZED
        } else {
            status::ACCEPTED
        }
    }

    fn open_buffer_continue_goto_get_lower(&mut self) -> i32 {
        self.log.push(EngineCall::GotoGet);
        self.pending_words().low
    }

    fn open_buffer_continue_goto_get_upper(&mut self) -> i32 {
        self.pending_words().high
    }

    fn open_buffer_finalize(&mut self) {
        self.finalized = true;
        self.log.push(EngineCall::Finalize);
    }

    fn inform(&mut self) -> String {
        self.log.push(EngineCall::Inform);
        match &self.script.report {
            Some(report) => report.clone(),
            None => self.generated_report(),
        }
    }

    fn close(&mut self) {
        self.log.push(EngineCall::Close);
    }
}

/// Factory producing [`ScriptedEngine`]s that share one [`CallLog`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedFactory {
    script: Script,
    log: CallLog,
}

impl ScriptedFactory {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            log: CallLog::default(),
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl EngineFactory for ScriptedFactory {
    type Engine = ScriptedEngine;

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn create(&self, settings: EngineSettings) -> ms_core::Result<ScriptedEngine> {
        Ok(ScriptedEngine::with_log(
            self.script.clone(),
            settings.output_kind,
            self.log.clone(),
        ))
    }
}
