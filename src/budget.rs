//! Resource budget enforced while YAML events are read into nodes.
//!
//! The node reader feeds every raw parser event to a [`BudgetEnforcer`] before the
//! event becomes part of a node, so pathological inputs are rejected before a
//! large tree is built.

use std::collections::HashSet;

use nohash_hasher::BuildNoHashHasher;
use saphyr_parser::Event;

/// Budgets for reading a YAML stream.
///
/// The defaults are permissive for typical configuration files while stopping
/// obvious resource-amplifying inputs.
///
/// ```rust
/// let options = yaml_keys::options! {
///     budget: Some(yaml_keys::budget! {
///         max_depth: 16,
///     }),
/// };
///
/// let value = yaml_keys::from_str_with_options("a: [1, 2]", options).unwrap();
/// assert!(value.as_map().is_some());
/// ```
#[derive(Clone, Debug)]
pub struct Budget {
    /// Maximum total parser events (counting every event).
    ///
    /// Default: 1,000,000
    pub max_events: usize,
    /// Maximum number of alias (`*ref`) events allowed.
    ///
    /// Default: 50,000
    pub max_aliases: usize,
    /// Maximal total number of anchors (distinct `&anchor` definitions).
    ///
    /// Default: 50,000
    pub max_anchors: usize,
    /// Maximum structural nesting depth (sequences + mappings).
    ///
    /// Default: 1,000
    pub max_depth: usize,
    /// Maximum number of YAML documents in the stream.
    ///
    /// Default: 1,024
    pub max_documents: usize,
    /// Maximum number of nodes (scalars, sequences and mappings).
    ///
    /// Default: 250,000
    pub max_nodes: usize,
    /// Maximum total bytes of scalar contents.
    ///
    /// Default: 67,108,864 (64 MiB)
    pub max_total_scalar_bytes: usize,
    /// Maximum number of merge keys (`<<`) allowed across the stream. Not counted when
    /// [`Options::merge_keys`](crate::Options::merge_keys) is off.
    ///
    /// Default: 10,000
    pub max_merge_keys: usize,
    /// Maximum number of decoded bytes accepted from a reader (`from_reader*`).
    /// `None` disables the cap.
    ///
    /// Default: 256 MiB
    pub max_reader_input_bytes: Option<usize>,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_events: 1_000_000,
            max_aliases: 50_000,
            max_anchors: 50_000,
            max_depth: 1_000,
            max_documents: 1_024,
            max_nodes: 250_000,
            max_total_scalar_bytes: 64 * 1024 * 1024,
            max_merge_keys: 10_000,
            max_reader_input_bytes: Some(256 * 1024 * 1024),
        }
    }
}

/// What tripped the budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BudgetBreach {
    /// The total number of parser events exceeded [`Budget::max_events`].
    Events { events: usize },
    /// The number of alias events exceeded [`Budget::max_aliases`].
    Aliases { aliases: usize },
    /// The number of distinct anchors exceeded [`Budget::max_anchors`].
    Anchors { anchors: usize },
    /// The structural nesting depth exceeded [`Budget::max_depth`].
    Depth { depth: usize },
    /// The number of documents exceeded [`Budget::max_documents`].
    Documents { documents: usize },
    /// The number of nodes exceeded [`Budget::max_nodes`].
    Nodes { nodes: usize },
    /// The cumulative size of scalar contents exceeded [`Budget::max_total_scalar_bytes`].
    ScalarBytes { total_scalar_bytes: usize },
    /// The number of merge keys exceeded [`Budget::max_merge_keys`].
    MergeKeys { merge_keys: usize },
    /// A reader supplied more than [`Budget::max_reader_input_bytes`].
    InputBytes { limit: usize },
}

/// Stateful counter that enforces a [`Budget`] over a stream of parser events.
#[derive(Debug)]
pub(crate) struct BudgetEnforcer {
    budget: Budget,
    events: usize,
    aliases: usize,
    nodes: usize,
    depth: usize,
    documents: usize,
    total_scalar_bytes: usize,
    merge_keys: usize,
    defined_anchors: HashSet<usize, BuildNoHashHasher<usize>>,
}

impl BudgetEnforcer {
    pub(crate) fn new(budget: Budget) -> Self {
        Self {
            budget,
            events: 0,
            aliases: 0,
            nodes: 0,
            depth: 0,
            documents: 0,
            total_scalar_bytes: 0,
            merge_keys: 0,
            defined_anchors: HashSet::with_capacity_and_hasher(64, BuildNoHashHasher::default()),
        }
    }

    /// Observe a parser [`Event`], updating the counters.
    ///
    /// Returns `Err(BudgetBreach)` as soon as a limit is exceeded.
    pub(crate) fn observe(&mut self, ev: &Event) -> Result<(), BudgetBreach> {
        self.events += 1;
        if self.events > self.budget.max_events {
            return Err(BudgetBreach::Events {
                events: self.events,
            });
        }

        match ev {
            Event::StreamStart | Event::StreamEnd | Event::DocumentEnd | Event::Nothing => {}
            Event::DocumentStart(_) => {
                self.documents += 1;
                if self.documents > self.budget.max_documents {
                    return Err(BudgetBreach::Documents {
                        documents: self.documents,
                    });
                }
            }
            Event::Alias(_) => {
                self.aliases += 1;
                if self.aliases > self.budget.max_aliases {
                    return Err(BudgetBreach::Aliases {
                        aliases: self.aliases,
                    });
                }
            }
            Event::Scalar(value, _style, anchor_id, _tag) => {
                self.bump_nodes()?;
                self.total_scalar_bytes = self.total_scalar_bytes.saturating_add(value.len());
                if self.total_scalar_bytes > self.budget.max_total_scalar_bytes {
                    return Err(BudgetBreach::ScalarBytes {
                        total_scalar_bytes: self.total_scalar_bytes,
                    });
                }
                self.record_anchor(*anchor_id)?;
            }
            Event::SequenceStart(anchor_id, _tag) | Event::MappingStart(anchor_id, _tag) => {
                self.bump_nodes()?;
                self.depth = self.depth.saturating_add(1);
                if self.depth > self.budget.max_depth {
                    return Err(BudgetBreach::Depth { depth: self.depth });
                }
                self.record_anchor(*anchor_id)?;
            }
            Event::SequenceEnd | Event::MappingEnd => {
                // Unbalanced ends are reported by the node reader itself.
                self.depth = self.depth.saturating_sub(1);
            }
        }

        Ok(())
    }

    /// Count a merge key (`<<`) recognized by the node reader in key position.
    pub(crate) fn observe_merge_key(&mut self) -> Result<(), BudgetBreach> {
        self.merge_keys += 1;
        if self.merge_keys > self.budget.max_merge_keys {
            return Err(BudgetBreach::MergeKeys {
                merge_keys: self.merge_keys,
            });
        }
        Ok(())
    }

    fn bump_nodes(&mut self) -> Result<(), BudgetBreach> {
        self.nodes += 1;
        if self.nodes > self.budget.max_nodes {
            return Err(BudgetBreach::Nodes { nodes: self.nodes });
        }
        Ok(())
    }

    fn record_anchor(&mut self, anchor_id: usize) -> Result<(), BudgetBreach> {
        if anchor_id != 0 && self.defined_anchors.insert(anchor_id) {
            let count = self.defined_anchors.len();
            if count > self.budget.max_anchors {
                return Err(BudgetBreach::Anchors { anchors: count });
            }
        }
        Ok(())
    }
}
