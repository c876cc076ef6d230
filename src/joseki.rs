//! The joseki index: position hashes mapped to the moves played from them.
//!
//! Building replays every variation of a record tree on one working board.
//! Before each move after the second ply, the position is hashed under all
//! eight symmetries and the move, expressed in each symmetry's own frame, is
//! recorded as a candidate for that hash. Variations share the board and its
//! undo log; leaving a variation rolls the board back to where it was when
//! the variation started. The walk uses an explicit stack, so deeply nested
//! records cannot overflow the call stack.
//!
//! Once built, the index is immutable. [`JosekiIndex::spawn_load`] builds it
//! on a worker thread and hands it out only when complete.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::Context;
use log::{error, info, log_enabled, trace, warn, Level};

use crate::board::{format_point, parse_point, Board, Color, Point};
use crate::codec;
use crate::constants::{DEFAULT_SIZE, MAX_SIZE, MIN_INDEXED_STONES};
use crate::rules::{place, UndoLog};
use crate::sgf::{self, Command, Node, ParseError};
use crate::symmetry::Transform;
use crate::zobrist::{KeyTable, SymmetricHash};

/// Counters collected while building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Move commands seen.
    pub moves: usize,
    /// Moves recorded in the index (each under eight hashes).
    pub recorded: usize,
    /// Moves skipped because their coordinate did not resolve.
    pub unresolved: usize,
    /// Illegal moves, each of which ended its variation level.
    pub illegal: usize,
}

/// Immutable map from position hash to candidate next moves.
#[derive(Debug, Default)]
pub struct JosekiIndex {
    keys: KeyTable,
    entries: HashMap<u32, BTreeSet<Point>>,
    stats: BuildStats,
}

impl JosekiIndex {
    /// An index with no entries; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from parsed records with the default key table.
    pub fn build(records: &[Node]) -> Self {
        Self::build_with(KeyTable::default(), records)
    }

    pub fn build_with(keys: KeyTable, records: &[Node]) -> Self {
        let mut builder = Builder::new(keys);
        builder.walk(records);
        let Builder {
            keys,
            entries,
            stats,
            ..
        } = builder;
        Self {
            keys,
            entries,
            stats,
        }
    }

    /// Parse and build from record text.
    pub fn from_text(text: &str) -> Result<Self, ParseError> {
        Ok(Self::build(&sgf::parse(text)?))
    }

    /// Read, parse and build from a corpus file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let started = Instant::now();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read corpus {}", path.display()))?;
        let index = Self::from_text(&text)
            .with_context(|| format!("failed to parse corpus {}", path.display()))?;
        info!(
            "loaded {}: {} positions, {} candidates from {} moves ({} illegal, {} unresolved) in {:.2?}",
            path.display(),
            index.len(),
            index.candidate_count(),
            index.stats.moves,
            index.stats.illegal,
            index.stats.unresolved,
            started.elapsed()
        );
        Ok(index)
    }

    /// Like [`JosekiIndex::load`], but a missing or malformed corpus gives an
    /// empty index so the advisor simply has nothing to suggest.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            error!("{e:#}");
            Self::empty()
        })
    }

    /// Start loading on a worker thread.
    pub fn spawn_load(path: impl Into<PathBuf>) -> PendingIndex {
        let path = path.into();
        PendingIndex {
            handle: thread::spawn(move || Self::load_or_empty(&path)),
        }
    }

    pub fn keys(&self) -> &KeyTable {
        &self.keys
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Candidate moves recorded for `hash`.
    pub fn candidates(&self, hash: u32) -> Option<&BTreeSet<Point>> {
        self.entries.get(&hash)
    }

    /// Number of distinct position hashes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of (hash, move) pairs.
    pub fn candidate_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }
}

/// An index being built on another thread.
#[derive(Debug)]
pub struct PendingIndex {
    handle: JoinHandle<JosekiIndex>,
}

impl PendingIndex {
    pub fn is_ready(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the build is done.
    pub fn wait(self) -> JosekiIndex {
        self.handle.join().unwrap_or_else(|_| {
            error!("joseki index build panicked, continuing without an index");
            JosekiIndex::empty()
        })
    }
}

/// One variation level on the walk stack.
struct Frame<'a> {
    nodes: &'a [Node],
    next: usize,
    size: usize,
    /// Undo log length when the level was entered.
    mark: usize,
}

enum Flow {
    Continue,
    /// Skip the rest of this level.
    Stop,
}

struct Builder {
    keys: KeyTable,
    entries: HashMap<u32, BTreeSet<Point>>,
    stats: BuildStats,
    board: Board,
    undo: UndoLog,
    hashes: SymmetricHash,
}

impl Builder {
    fn new(keys: KeyTable) -> Self {
        Self {
            keys,
            entries: HashMap::new(),
            stats: BuildStats::default(),
            board: Board::new(DEFAULT_SIZE),
            undo: UndoLog::new(),
            hashes: SymmetricHash::default(),
        }
    }

    fn walk(&mut self, records: &[Node]) {
        let mut stack = vec![Frame {
            nodes: records,
            next: 0,
            size: self.board.size(),
            mark: self.undo.len(),
        }];

        while let Some(frame) = stack.last_mut() {
            let nodes = frame.nodes;
            let Some(node) = nodes.get(frame.next) else {
                let mark = frame.mark;
                stack.pop();
                self.unwind(mark);
                if let Some(parent) = stack.last() {
                    self.board.resize(parent.size);
                }
                continue;
            };
            frame.next += 1;

            match node {
                Node::Branch(children) => {
                    let size = frame.size;
                    stack.push(Frame {
                        nodes: children,
                        next: 0,
                        size,
                        mark: self.undo.len(),
                    });
                }
                Node::Command(command) => {
                    if let Flow::Stop = self.command(command, &mut frame.size) {
                        frame.next = nodes.len();
                    }
                }
            }
        }
    }

    fn command(&mut self, command: &Command, size: &mut usize) -> Flow {
        if command.name == "SZ" {
            self.set_size(command, size);
            return Flow::Continue;
        }
        let Some(color) = Color::from_property(&command.name) else {
            return Flow::Continue;
        };
        self.stats.moves += 1;

        let arg = command.arg().unwrap_or_default();
        let Some(pt) = parse_point(arg, *size) else {
            warn!("skipping {}[{}]: not a point on a {size}x{size} board", command.name, arg);
            self.stats.unresolved += 1;
            return Flow::Continue;
        };

        if self.board.stones() >= MIN_INDEXED_STONES {
            self.record(pt, *size);
        }

        let mark = self.undo.len();
        match place(&mut self.board, pt, color, &mut self.undo) {
            Ok(_) => {
                for entry in self.undo.since(mark) {
                    let now = self.board.get(entry.pt);
                    self.hashes
                        .update(&self.keys, *size, entry.pt, entry.previous, now);
                }
                Flow::Continue
            }
            Err(e) => {
                warn!("{}[{}]: {e}, skipping the rest of the variation", command.name, arg);
                self.stats.illegal += 1;
                Flow::Stop
            }
        }
    }

    fn set_size(&mut self, command: &Command, size: &mut usize) {
        let parsed = command.arg().and_then(|a| a.trim().parse::<usize>().ok());
        match parsed {
            Some(n) if (1..=MAX_SIZE).contains(&n) && self.board.resize(n) => *size = n,
            _ => warn!("ignoring SZ[{}]", command.arg().unwrap_or_default()),
        }
    }

    /// Register `pt` as a candidate for the current position under every
    /// symmetry.
    fn record(&mut self, pt: Point, size: usize) {
        if log_enabled!(Level::Trace) {
            trace!(
                "{} [{}]: {}",
                codec::encode(&self.board, &[], None),
                self.hashes.get(Transform::Identity),
                format_point(pt, size)
            );
        }
        for t in Transform::ALL {
            self.entries
                .entry(self.hashes.get(t))
                .or_default()
                .insert(t.apply(pt, size));
        }
        self.stats.recorded += 1;
    }

    fn unwind(&mut self, mark: usize) {
        let size = self.board.size();
        while self.undo.len() > mark {
            let Some((entry, replaced)) = self.undo.undo_one(&mut self.board) else {
                break;
            };
            self.hashes
                .update(&self.keys, size, entry.pt, replaced, entry.previous);
        }
    }
}
