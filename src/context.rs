use crate::parser::expression::DeclarationKind;
use compact_str::CompactString;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Var,
    Const,
}

impl From<DeclarationKind> for IdentifierKind {
    fn from(kind: DeclarationKind) -> Self {
        match kind {
            DeclarationKind::Var => IdentifierKind::Var,
            DeclarationKind::Const => IdentifierKind::Const,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierEntry<T> {
    pub name: CompactString,
    pub payload: T,
    pub kind: IdentifierKind,
}

impl<T> IdentifierEntry<T> {
    pub fn new(name: impl Into<CompactString>, payload: T, kind: IdentifierKind) -> Self {
        Self {
            name: name.into(),
            payload,
            kind,
        }
    }

    pub fn is_const(&self) -> bool {
        self.kind == IdentifierKind::Const
    }
}

/// Position of a frame in the scope chain. The root frame is `FrameId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrameId(usize);

impl FrameId {
    pub const ROOT: FrameId = FrameId(0);
}

#[derive(Debug, Clone)]
struct Frame<T> {
    identifiers: HashMap<CompactString, IdentifierEntry<T>>,
    parent: FrameId,
}

/// Lexical scope chain, instantiated with `ValueType` by the checker and
/// `Value` by the evaluator.
///
/// Frames live on a stack: the current frame is the last one and its parent
/// is the one below it. The root frame is its own parent, so walking the
/// chain stops once `frame == parent`.
#[derive(Debug, Clone)]
pub struct Context<T> {
    frames: Vec<Frame<T>>,
}

impl<T> Default for Context<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Context<T> {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame {
                identifiers: HashMap::new(),
                parent: FrameId::ROOT,
            }],
        }
    }

    pub fn current_frame(&self) -> FrameId {
        FrameId(self.frames.len() - 1)
    }

    /// Number of frames above the root.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Opens a child frame of the current one. Every binding of the parent stays
    /// visible from the child; declarations made in the child vanish on exit.
    pub fn enter_scope(&mut self) -> FrameId {
        let parent = self.current_frame();
        self.frames.push(Frame {
            identifiers: HashMap::new(),
            parent,
        });
        self.current_frame()
    }

    /// Discards the current frame. The root frame is never discarded.
    pub fn exit_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Declares `name` in the current frame, replacing any entry already there.
    pub fn add_identifier(&mut self, entry: IdentifierEntry<T>) {
        let frame = self.frames.len() - 1;
        self.frames[frame]
            .identifiers
            .insert(entry.name.clone(), entry);
    }

    /// Resolves `name` through the chain and reports the frame that owns it.
    pub fn get_identifier(&self, name: &str) -> Option<(&IdentifierEntry<T>, FrameId)> {
        let frame = self.resolve(name)?;
        self.frames[frame.0]
            .identifiers
            .get(name)
            .map(|entry| (entry, frame))
    }

    /// Resolves `name` and hands out the entry in its owning frame, so writes
    /// made from a nested scope land where the name was declared.
    pub fn get_identifier_mut(&mut self, name: &str) -> Option<&mut IdentifierEntry<T>> {
        let frame = self.resolve(name)?;
        self.frames[frame.0].identifiers.get_mut(name)
    }

    /// Removes `name` from the current frame only.
    pub fn delete_identifier(&mut self, name: &str) -> Option<IdentifierEntry<T>> {
        let frame = self.frames.len() - 1;
        self.frames[frame].identifiers.remove(name)
    }

    fn resolve(&self, name: &str) -> Option<FrameId> {
        let mut frame = self.current_frame();
        loop {
            let current = &self.frames[frame.0];
            if current.identifiers.contains_key(name) {
                return Some(frame);
            }
            if current.parent == frame {
                return None;
            }
            frame = current.parent;
        }
    }
}
