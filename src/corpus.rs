//! Corpus ingestion for the command line front end
//!
//! Files become units and their non-empty lines become texts. Each unit gets
//! its own terminator from the Unicode private use area, so file contents
//! never collide with a terminator. In simple mode every line is its own unit
//! because a simple tree holds one text per unit.

use crate::interrupt::Interrupt;
use crate::tree::types::*;
use crate::tree::SuffixTree;
use crate::utils::progress::text_progress;
use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Hands out one distinct terminator per unit
#[derive(Debug, Clone)]
pub struct TerminatorAllocator {
    range: TerminatorRange,
    next: u32,
}

impl TerminatorAllocator {
    pub fn new(range: TerminatorRange) -> Self {
        Self {
            range,
            next: range.first as u32,
        }
    }

    pub fn private_use() -> Self {
        Self::new(TerminatorRange::PRIVATE_USE)
    }

    pub fn range(&self) -> TerminatorRange {
        self.range
    }

    /// Next unused terminator
    pub fn allocate(&mut self) -> Result<char> {
        while self.next <= self.range.last as u32 {
            let candidate = char::from_u32(self.next);
            self.next += 1;
            if let Some(ch) = candidate {
                return Ok(ch);
            }
        }
        bail!(
            "Terminator range U+{:04X}..=U+{:04X} exhausted",
            self.range.first as u32,
            self.range.last as u32
        )
    }
}

impl Default for TerminatorAllocator {
    fn default() -> Self {
        Self::private_use()
    }
}

/// One line of a source file, ready for insertion
#[derive(Debug, Clone)]
pub struct CorpusText {
    pub unit: UnitId,
    /// Index into [`Corpus::sources`]
    pub source: usize,
    /// 1-based line number in the source
    pub line_number: usize,
    /// Line content without terminator
    pub body: String,
    pub terminator: char,
}

impl CorpusText {
    /// Body followed by the unit's terminator
    pub fn terminated(&self) -> String {
        let mut text = String::with_capacity(self.body.len() + 4);
        text.push_str(&self.body);
        text.push(self.terminator);
        text
    }
}

/// Texts grouped into units, in insertion order
#[derive(Debug, Clone)]
pub struct Corpus {
    mode: TreeMode,
    range: TerminatorRange,
    sources: Vec<PathBuf>,
    texts: Vec<CorpusText>,
    unit_count: usize,
}

impl Corpus {
    /// Read every file in `paths`
    pub fn from_files(paths: &[PathBuf], mode: TreeMode) -> Result<Self> {
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            sources.push((path.clone(), content));
        }
        Self::from_sources(sources, mode)
    }

    /// Build a corpus from in-memory `(name, content)` pairs
    pub fn from_sources<I>(sources: I, mode: TreeMode) -> Result<Self>
    where
        I: IntoIterator<Item = (PathBuf, String)>,
    {
        let mut allocator = TerminatorAllocator::private_use();
        let range = allocator.range();
        let mut corpus = Corpus {
            mode,
            range,
            sources: Vec::new(),
            texts: Vec::new(),
            unit_count: 0,
        };

        for (path, content) in sources {
            let source = corpus.sources.len();
            let mut file_terminator = None;
            let mut stripped = 0usize;

            for (idx, line) in content.lines().enumerate() {
                let body: String = line.chars().filter(|c| !range.contains(*c)).collect();
                stripped += line.chars().count() - body.chars().count();
                if body.trim().is_empty() {
                    continue;
                }

                let (unit, terminator) = match (mode, file_terminator) {
                    (TreeMode::Generalized, Some(pair)) => pair,
                    _ => {
                        let pair = (corpus.unit_count as UnitId, allocator.allocate()?);
                        corpus.unit_count += 1;
                        if mode == TreeMode::Generalized {
                            file_terminator = Some(pair);
                        }
                        pair
                    }
                };

                corpus.texts.push(CorpusText {
                    unit,
                    source,
                    line_number: idx + 1,
                    body,
                    terminator,
                });
            }

            if stripped > 0 {
                warn!(
                    path = %path.display(),
                    stripped,
                    "removed reserved terminator characters from input"
                );
            }
            corpus.sources.push(path);
        }

        debug!(
            sources = corpus.sources.len(),
            units = corpus.unit_count,
            texts = corpus.texts.len(),
            "corpus loaded"
        );
        Ok(corpus)
    }

    pub fn mode(&self) -> TreeMode {
        self.mode
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn texts(&self) -> &[CorpusText] {
        &self.texts
    }

    pub fn unit_count(&self) -> usize {
        self.unit_count
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Text inserted as `text_nr`
    pub fn text(&self, text_nr: TextNr) -> Option<&CorpusText> {
        self.texts.get(text_nr as usize)
    }

    /// Source file a text came from
    pub fn source_of(&self, text: &CorpusText) -> &Path {
        &self.sources[text.source]
    }

    /// `base` with this corpus's mode and terminator range
    pub fn tree_config(&self, base: &TreeConfig) -> TreeConfig {
        TreeConfig {
            mode: self.mode,
            reserved_terminators: Some(self.range),
            ..base.clone()
        }
    }

    /// Insert every text into a fresh tree and finalize it
    pub fn build_tree(
        &self,
        base: &TreeConfig,
        interrupt: Option<Interrupt>,
        show_progress: bool,
    ) -> Result<SuffixTree> {
        if self.is_empty() {
            bail!("Corpus contains no text");
        }

        let mut tree = SuffixTree::new(self.tree_config(base));
        tree.set_interrupt(interrupt);

        let progress = text_progress(self.texts.len() as u64, show_progress);
        for text in &self.texts {
            tree.insert(text.unit, &text.terminated()).with_context(|| {
                format!(
                    "Failed to insert {}:{}",
                    self.source_of(text).display(),
                    text.line_number
                )
            })?;
            progress.inc(1);
        }
        progress.finish_and_clear();
        tree.finalize();

        info!(
            units = tree.unit_count(),
            texts = tree.text_count(),
            nodes = tree.node_count(),
            "tree built"
        );
        Ok(tree)
    }

    /// One corpus per source file, unit ids renumbered from zero
    pub fn split(&self) -> Vec<Corpus> {
        let mut parts: Vec<Corpus> = self
            .sources
            .iter()
            .map(|path| Corpus {
                mode: self.mode,
                range: self.range,
                sources: vec![path.clone()],
                texts: Vec::new(),
                unit_count: 0,
            })
            .collect();

        let mut last_unit: Vec<Option<UnitId>> = vec![None; parts.len()];
        for text in &self.texts {
            let part = &mut parts[text.source];
            if last_unit[text.source] != Some(text.unit) {
                last_unit[text.source] = Some(text.unit);
                part.unit_count += 1;
            }
            part.texts.push(CorpusText {
                unit: (part.unit_count - 1) as UnitId,
                source: 0,
                ..text.clone()
            });
        }
        parts
    }
}

/// Build one tree per source file on a dedicated rayon pool
///
/// Files without any text are skipped. Results keep source order.
pub fn build_split(
    corpus: &Corpus,
    base: &TreeConfig,
    threads: usize,
    interrupt: Option<Interrupt>,
) -> Result<Vec<(PathBuf, SuffixTree)>> {
    let parts: Vec<Corpus> = corpus.split().into_iter().filter(|c| !c.is_empty()).collect();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to create build thread pool")?;

    info!(files = parts.len(), threads, "building trees in parallel");
    pool.install(|| {
        parts
            .par_iter()
            .map(|part| -> Result<(PathBuf, SuffixTree)> {
                let tree = part.build_tree(base, interrupt.clone(), false)?;
                Ok((part.sources[0].clone(), tree))
            })
            .collect()
    })
}
