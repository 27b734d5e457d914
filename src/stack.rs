use std::fmt;

use crate::config::StackConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackKind {
    Data,
    Return,
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data => f.write_str("Data"),
            Self::Return => f.write_str("Return"),
        }
    }
}

/// A stack whose push and pop never check bounds.
///
/// The owner calls [`Stack::underflow`] and [`Stack::overflow`] once per
/// execution step; in between, the top index may wander past either end.
/// Reads outside the backing storage yield `T::default()` and writes there
/// are dropped, so the host never panics on a runaway program.
#[derive(Debug)]
pub struct Stack<T> {
    kind: StackKind,
    cells: Vec<T>,
    top: isize,
    base: isize,
    capacity: isize,
}

impl<T: Copy + Default> Stack<T> {
    pub fn new(kind: StackKind, config: StackConfig) -> Self {
        let base = config.base as isize;
        Self {
            kind,
            cells: vec![T::default(); config.base + 1],
            top: base,
            base,
            capacity: config.capacity as isize,
        }
    }

    pub fn kind(&self) -> StackKind {
        self.kind
    }

    #[inline]
    pub fn push(&mut self, value: T) {
        self.top += 1;
        if let Ok(idx) = usize::try_from(self.top) {
            if idx >= self.cells.len() {
                self.cells.resize(idx + 1, T::default());
            }
            self.cells[idx] = value;
        }
    }

    #[inline]
    pub fn pop(&mut self) -> T {
        let value = self.peek();
        self.top -= 1;
        value
    }

    #[inline]
    pub fn peek(&self) -> T {
        self.nth(0)
    }

    /// Value `n` places below the top.
    pub fn nth(&self, n: usize) -> T {
        self.index(n)
            .and_then(|idx| self.cells.get(idx))
            .copied()
            .unwrap_or_default()
    }

    pub fn set_nth(&mut self, n: usize, value: T) {
        if let Some(cell) = self.index(n).and_then(|idx| self.cells.get_mut(idx)) {
            *cell = value;
        }
    }

    fn index(&self, n: usize) -> Option<usize> {
        usize::try_from(self.top - n as isize).ok()
    }

    /// Number of entries above the base. Negative after an underflow.
    pub fn depth(&self) -> isize {
        self.top - self.base
    }

    pub fn set_depth(&mut self, depth: isize) {
        self.top = self.base + depth;
    }

    /// Live entries, bottom first.
    pub fn as_slice(&self) -> &[T] {
        let start = (self.base + 1) as usize;
        let end = usize::try_from(self.top + 1)
            .unwrap_or(0)
            .clamp(start, self.cells.len().max(start));
        &self.cells[start..end]
    }

    pub fn underflow(&self) -> Option<usize> {
        (self.top < self.base).then(|| (self.base - self.top) as usize)
    }

    pub fn overflow(&self) -> Option<usize> {
        (self.top >= self.capacity).then(|| (self.top - (self.capacity - 1)) as usize)
    }

    pub fn in_range(&self) -> bool {
        self.underflow().is_none() && self.overflow().is_none()
    }
}
