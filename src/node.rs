//! Generic YAML node tree built from the `saphyr_parser` event stream.
//!
//! [`NodeReader`] pulls raw events, checks them against the [`Budget`], and assembles one
//! document at a time into a [`Node`] tree. Anchored nodes are kept in a per-document table;
//! an alias becomes a [`NodeKind::Alias`] node pointing at the shared target, so the tree stays
//! finite and acyclic while the decoder still sees every alias occurrence.

use std::collections::HashMap;
use std::rc::Rc;

use nohash_hasher::BuildNoHashHasher;
use saphyr_parser::{Event, Parser, StrInput};
use smallvec::SmallVec;

pub use saphyr_parser::ScalarStyle;

use crate::budget::{Budget, BudgetEnforcer};
use crate::error::{budget_error, location_from_span, Error, Location};
use crate::tags;

/// One node of a parsed document.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    /// Resolved tag, e.g. `tag:yaml.org,2002:int` or a local `!custom`.
    pub tag: Option<String>,
    /// Where the node starts in the source.
    pub location: Location,
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Scalar { value: String, style: ScalarStyle },
    Sequence(Vec<Rc<Node>>),
    /// Alternating key and value nodes.
    Mapping(Vec<Rc<Node>>),
    /// Reference to an anchored node defined earlier in the same document.
    Alias { anchor: usize, target: Rc<Node> },
    /// A document; well-formed documents have exactly one child.
    Document(Vec<Rc<Node>>),
}

impl Node {
    /// Untagged node without a source position.
    pub fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            tag: None,
            location: Location::UNKNOWN,
        }
    }

    /// Plain untagged scalar without a source position.
    pub fn scalar(value: impl Into<String>) -> Self {
        Node::new(NodeKind::Scalar {
            value: value.into(),
            style: ScalarStyle::Plain,
        })
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// True for a scalar that spells a merge key: plain untagged `<<`, or anything tagged `!!merge`.
    pub fn is_merge_key(&self) -> bool {
        match &self.kind {
            NodeKind::Scalar { value, style } => {
                tags::is_merge_tag(self.tag.as_deref())
                    || (self.tag.is_none() && matches!(style, ScalarStyle::Plain) && value == "<<")
            }
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameKind {
    Document,
    Sequence,
    Mapping,
}

/// Container under construction.
#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    anchor: usize,
    tag: Option<String>,
    location: Location,
    children: Vec<Rc<Node>>,
}

impl Frame {
    fn new(kind: FrameKind, anchor: usize, tag: Option<String>, location: Location) -> Self {
        Frame {
            kind,
            anchor,
            tag,
            location,
            children: Vec::new(),
        }
    }

    /// True if the next child of this frame is a mapping key.
    fn expects_key(&self) -> bool {
        self.kind == FrameKind::Mapping && self.children.len() % 2 == 0
    }
}

/// Reads YAML text into document nodes, one document per call.
pub struct NodeReader<'a> {
    parser: Parser<'a, StrInput<'a>>,
    /// One event of lookahead, used to detect a following document.
    look: Option<(Event<'a>, Location)>,
    anchors: HashMap<usize, Rc<Node>, BuildNoHashHasher<usize>>,
    budget: Option<BudgetEnforcer>,
    merge_keys: bool,
    last_location: Location,
}

impl<'a> NodeReader<'a> {
    /// Reader with the default [`Budget`].
    pub fn new(input: &'a str) -> Self {
        Self::with_budget(input, Some(Budget::default()))
    }

    /// Reader with an explicit budget; `None` disables budget checks.
    pub fn with_budget(input: &'a str, budget: Option<Budget>) -> Self {
        NodeReader {
            parser: Parser::new_from_str(input),
            look: None,
            anchors: HashMap::default(),
            budget: budget.map(BudgetEnforcer::new),
            merge_keys: true,
            last_location: Location::UNKNOWN,
        }
    }

    /// Whether `<<` keys count against [`Budget::max_merge_keys`]. With merge handling off they
    /// are ordinary keys and are not counted.
    pub fn with_merge_keys(mut self, enabled: bool) -> Self {
        self.merge_keys = enabled;
        self
    }

    /// Location of the last event read.
    pub fn last_location(&self) -> Location {
        self.last_location
    }

    /// Read the next document node, or `None` at the end of the stream.
    pub fn next_document(&mut self) -> Result<Option<Node>, Error> {
        loop {
            let Some((ev, location)) = self.next_event()? else {
                return Ok(None);
            };
            match ev {
                Event::StreamStart | Event::DocumentEnd | Event::Nothing => continue,
                Event::StreamEnd => return Ok(None),
                Event::DocumentStart(_) => {
                    self.anchors.clear();
                    return self.read_document(location).map(Some);
                }
                _ => {
                    return Err(
                        Error::malformed("content outside of a document").with_location(location)
                    );
                }
            }
        }
    }

    /// True if another document starts before the end of the stream. Does not consume it.
    pub fn has_next_document(&mut self) -> Result<bool, Error> {
        loop {
            let Some((ev, location)) = self.next_event()? else {
                return Ok(false);
            };
            match ev {
                Event::StreamStart | Event::DocumentEnd | Event::Nothing => continue,
                Event::StreamEnd => return Ok(false),
                other => {
                    self.look = Some((other, location));
                    return Ok(true);
                }
            }
        }
    }

    fn next_event(&mut self) -> Result<Option<(Event<'a>, Location)>, Error> {
        if let Some(item) = self.look.take() {
            return Ok(Some(item));
        }
        let Some(item) = self.parser.next() else {
            return Ok(None);
        };
        let (ev, span) = item.map_err(Error::from_scan_error)?;
        let location = location_from_span(&span);
        if let Some(budget) = self.budget.as_mut() {
            if let Err(breach) = budget.observe(&ev) {
                tracing::debug!(?breach, line = location.line(), "YAML budget exceeded");
                return Err(budget_error(breach).with_location(location));
            }
        }
        self.last_location = location;
        Ok(Some((ev, location)))
    }

    fn read_document(&mut self, location: Location) -> Result<Node, Error> {
        let mut stack: SmallVec<[Frame; 8]> = SmallVec::new();
        stack.push(Frame::new(FrameKind::Document, 0, None, location));

        loop {
            let Some((ev, location)) = self.next_event()? else {
                return Err(Error::eof().with_location(self.last_location));
            };
            let (anchor, node) = match ev {
                Event::Nothing => continue,
                Event::Scalar(value, style, anchor, tag) => {
                    let node = Node {
                        kind: NodeKind::Scalar {
                            value: value.into_owned(),
                            style,
                        },
                        tag: tag.map(|t| t.to_string()),
                        location,
                    };
                    if self.merge_keys
                        && node.is_merge_key()
                        && stack.last().is_some_and(Frame::expects_key)
                    {
                        self.observe_merge_key(location)?;
                    }
                    (anchor, node)
                }
                Event::SequenceStart(anchor, tag) => {
                    let tag = tag.map(|t| t.to_string());
                    stack.push(Frame::new(FrameKind::Sequence, anchor, tag, location));
                    continue;
                }
                Event::MappingStart(anchor, tag) => {
                    let tag = tag.map(|t| t.to_string());
                    stack.push(Frame::new(FrameKind::Mapping, anchor, tag, location));
                    continue;
                }
                Event::SequenceEnd => close_frame(&mut stack, FrameKind::Sequence, location)?,
                Event::MappingEnd => close_frame(&mut stack, FrameKind::Mapping, location)?,
                Event::Alias(id) => {
                    let target = self
                        .anchors
                        .get(&id)
                        .cloned()
                        .ok_or(Error::UnknownAnchor { id, location })?;
                    (0, Node::new(NodeKind::Alias { anchor: id, target }).with_location(location))
                }
                Event::DocumentEnd => {
                    let (_, document) = close_frame(&mut stack, FrameKind::Document, location)?;
                    return Ok(document);
                }
                Event::StreamStart | Event::StreamEnd | Event::DocumentStart(_) => {
                    return Err(
                        Error::malformed("document is not terminated").with_location(location)
                    );
                }
            };

            let node = Rc::new(node);
            if anchor != 0 {
                self.anchors.insert(anchor, Rc::clone(&node));
            }
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => return Err(Error::malformed("node outside of a document").with_location(location)),
            }
        }
    }

    fn observe_merge_key(&mut self, location: Location) -> Result<(), Error> {
        if let Some(budget) = self.budget.as_mut() {
            if let Err(breach) = budget.observe_merge_key() {
                tracing::debug!(?breach, line = location.line(), "merge key budget exceeded");
                return Err(budget_error(breach).with_location(location));
            }
        }
        Ok(())
    }
}

/// Pop the innermost frame, which must be of kind `expected`, and turn it into a node.
fn close_frame(
    stack: &mut SmallVec<[Frame; 8]>,
    expected: FrameKind,
    location: Location,
) -> Result<(usize, Node), Error> {
    let frame = match stack.pop() {
        Some(frame) if frame.kind == expected => frame,
        _ => return Err(Error::malformed("unbalanced container end").with_location(location)),
    };
    let kind = match frame.kind {
        FrameKind::Sequence => NodeKind::Sequence(frame.children),
        FrameKind::Mapping => NodeKind::Mapping(frame.children),
        FrameKind::Document => {
            let mut children = frame.children;
            if children.is_empty() {
                children.push(Rc::new(Node::scalar("").with_location(frame.location)));
            }
            NodeKind::Document(children)
        }
    };
    let node = Node {
        kind,
        tag: frame.tag,
        location: frame.location,
    };
    Ok((frame.anchor, node))
}
