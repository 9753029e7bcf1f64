//! Match recorder - an observer capturing every frame for replay dumps.
//!
//! The recorded JSON carries the canonical `GameState` schema, so anything
//! that parses dump files can replay a match turn by turn.

use async_trait::async_trait;
use mazeclash_env::{GameState, Observer, UniverseSnapshot};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// One observed frame: the deep snapshot and record after one bot-turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFrame {
    pub snapshot: UniverseSnapshot,
    pub game_state: GameState,
}

/// Complete recording of a match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Snapshot distributed before the first round
    pub initial: Option<UniverseSnapshot>,

    /// One frame per observer notification, in order
    pub frames: Vec<MatchFrame>,
}

impl MatchRecord {
    /// The record of the most recent frame.
    pub fn final_state(&self) -> Option<&GameState> {
        self.frames.last().map(|frame| &frame.game_state)
    }

    /// Serializes the recording.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Writes the recording to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Observer that appends every notification to a shared [`MatchRecord`].
///
/// The recorder itself is boxed into the scheduler; keep a
/// [`RecorderHandle`] to read the recording afterwards.
pub struct MatchRecorder {
    record: Arc<Mutex<MatchRecord>>,
}

impl MatchRecorder {
    pub fn new() -> Self {
        Self {
            record: Arc::new(Mutex::new(MatchRecord::default())),
        }
    }

    /// Returns a handle that stays valid after the recorder is registered.
    pub fn handle(&self) -> RecorderHandle {
        RecorderHandle {
            record: Arc::clone(&self.record),
        }
    }
}

impl Default for MatchRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Observer for MatchRecorder {
    async fn send_initial(&mut self, snapshot: UniverseSnapshot) {
        self.record.lock().unwrap().initial = Some(snapshot);
    }

    async fn observe(&mut self, snapshot: UniverseSnapshot, game_state: GameState) {
        self.record.lock().unwrap().frames.push(MatchFrame {
            snapshot,
            game_state,
        });
    }
}

/// Read access to a recording while (and after) the match runs.
#[derive(Clone)]
pub struct RecorderHandle {
    record: Arc<Mutex<MatchRecord>>,
}

impl RecorderHandle {
    /// A copy of the full recording so far.
    pub fn record(&self) -> MatchRecord {
        self.record.lock().unwrap().clone()
    }

    /// Number of observed frames so far.
    pub fn frame_count(&self) -> usize {
        self.record.lock().unwrap().frames.len()
    }

    /// The most recent game state, if any frame was observed.
    pub fn final_state(&self) -> Option<GameState> {
        self.record.lock().unwrap().final_state().cloned()
    }
}
