use std::fmt;

use crate::engine::Primitive;

/// Names are stored truncated to this many bytes and compared up to it.
pub const NAME_LEN: usize = 7;

/// Arena slot index.
pub type Addr = usize;

/// A data stack value.
pub type Cell = i32;

pub type EntryId = usize;

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Name([u8; NAME_LEN]);

impl Name {
    pub fn new(text: &str) -> Self {
        let mut buf = [0u8; NAME_LEN];
        let bytes = text.as_bytes();
        let len = bytes.len().min(NAME_LEN);
        buf[..len].copy_from_slice(&bytes[..len]);
        Name(buf)
    }

    fn as_bytes(&self) -> &[u8] {
        let len = self.0.iter().position(|b| *b == 0).unwrap_or(NAME_LEN);
        &self.0[..len]
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(self.as_bytes()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    Native(Primitive),
    Call(Addr),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Token(Token),
    Data(Cell),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Body {
    Native(Primitive),
    /// Entry point of a compiled token stream.
    Thread(Addr),
}

impl Body {
    pub fn token(&self) -> Token {
        match *self {
            Body::Native(primitive) => Token::Native(primitive),
            Body::Thread(addr) => Token::Call(addr),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub previous: Option<EntryId>,
    pub name: Name,
    pub active: bool,
    pub immediate: bool,
    pub body: Body,
}

/// Append-only word headers plus the slot arena holding word bodies.
///
/// The first two arena slots are the springboard used to run a single
/// resolved word from the top level.
#[derive(Debug)]
pub struct Dictionary {
    entries: Vec<Entry>,
    latest: Option<EntryId>,
    arena: Vec<Slot>,
}

pub const SPRINGBOARD: Addr = 0;

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionary {
    pub fn new() -> Self {
        let exit = Slot::Token(Token::Native(Primitive::Exit));
        Self {
            entries: Vec::new(),
            latest: None,
            arena: vec![exit, exit],
        }
    }

    pub fn here(&self) -> Addr {
        self.arena.len()
    }

    pub fn append(&mut self, slot: Slot) -> Addr {
        let addr = self.arena.len();
        self.arena.push(slot);
        addr
    }

    pub fn slot(&self, addr: Addr) -> Option<Slot> {
        self.arena.get(addr).copied()
    }

    /// Overwrite an already emitted slot. Returns `false` if `addr` was
    /// never emitted.
    pub fn overwrite(&mut self, addr: Addr, slot: Slot) -> bool {
        match self.arena.get_mut(addr) {
            Some(old) => {
                *old = slot;
                true
            }
            None => false,
        }
    }

    pub fn add_entry(&mut self, name: &str, body: Body, active: bool, immediate: bool) -> EntryId {
        let id = self.entries.len();
        self.entries.push(Entry {
            previous: self.latest,
            name: Name::new(name),
            active,
            immediate,
            body,
        });
        self.latest = Some(id);
        id
    }

    pub fn entry(&self, id: EntryId) -> &Entry {
        &self.entries[id]
    }

    pub fn latest_mut(&mut self) -> Option<&mut Entry> {
        let id = self.latest?;
        self.entries.get_mut(id)
    }

    /// Newest to oldest, following the link chain.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Entry)> + '_ {
        let mut cur = self.latest;
        std::iter::from_fn(move || {
            let id = cur?;
            let entry = &self.entries[id];
            cur = entry.previous;
            Some((id, entry))
        })
    }

    pub fn find(&self, word: &str) -> Option<EntryId> {
        let name = Name::new(word);
        self.iter()
            .find(|(_, entry)| entry.active && entry.name == name)
            .map(|(id, _)| id)
    }

    pub fn count_named(&self, word: &str) -> usize {
        let name = Name::new(word);
        self.iter().filter(|(_, entry)| entry.name == name).count()
    }
}
