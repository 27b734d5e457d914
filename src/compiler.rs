//! Defining words and control-structure words.
//!
//! Control words run immediately while a definition is being compiled.
//! They emit branch tokens with placeholder offsets and keep the
//! placeholder addresses on the data stack until the matching word
//! patches them. An `if`, `else` or `begin` without its partner leaves an
//! address behind (or consumes an unrelated value) and the program that
//! follows is undefined.

use tracing::{debug, warn};

use crate::{
    dictionary::{Addr, Body, Cell, Slot, Token},
    engine::{Primitive, Step},
    forth::{Forth, ForthError},
};

impl Forth {
    /// `def NAME`: start a new, not yet visible entry.
    pub(crate) fn define(&mut self) -> Step {
        let Some(name) = self.input.next_word() else {
            debug!("def without a name");
            return Step::Halt;
        };
        let here = self.dict.here();
        self.dict.add_entry(&name, Body::Thread(here), false, false);
        self.compiling = true;
        self.open_fixups = 0;
        debug!(%name, here, "defining");
        Step::Continue
    }

    /// `;`: terminate the body and make the entry visible.
    pub(crate) fn end_definition(&mut self) {
        self.compiling = false;
        self.dict.append(Slot::Token(Token::Native(Primitive::Exit)));
        if let Some(entry) = self.dict.latest_mut() {
            entry.active = true;
            debug!(name = %entry.name, "defined");
        }
        if self.open_fixups != 0 {
            warn!(
                open = self.open_fixups,
                "unbalanced control words in definition"
            );
            self.open_fixups = 0;
        }
    }

    pub(crate) fn mark_immediate(&mut self) {
        if let Some(entry) = self.dict.latest_mut() {
            entry.immediate = true;
        }
    }

    pub(crate) fn compile_token(&mut self, token: Token) {
        let at = self.dict.append(Slot::Token(token));
        debug!(at, ?token, "compiled");
    }

    pub(crate) fn compile_literal(&mut self, value: Cell) {
        self.dict
            .append(Slot::Token(Token::Native(Primitive::Literal)));
        let at = self.dict.append(Slot::Data(value));
        debug!(at, value, "compiled literal");
    }

    /// Emit `primitive` followed by an empty offset slot, returning the
    /// slot's address.
    fn emit_branch(&mut self, primitive: Primitive) -> Addr {
        self.dict.append(Slot::Token(Token::Native(primitive)));
        self.dict.append(Slot::Data(0))
    }

    /// Patch the offset slot at `placeholder` so the branch lands on
    /// `target`. Offsets count from the slot after the placeholder.
    fn resolve(&mut self, placeholder: Cell, target: Addr) {
        let offset = target as i64 - i64::from(placeholder) - 1;
        let patched = match (usize::try_from(placeholder), Cell::try_from(offset)) {
            (Ok(at), Ok(offset)) => self.dict.overwrite(at, Slot::Data(offset)),
            _ => false,
        };
        if patched {
            debug!(placeholder, offset, "fixup");
        } else {
            warn!(placeholder, target, "fixup address outside the arena, ignored");
        }
    }

    pub(crate) fn compile_if(&mut self) {
        let placeholder = self.emit_branch(Primitive::Jmp0);
        self.data_stack.push(placeholder as Cell);
        self.open_fixups += 1;
    }

    pub(crate) fn compile_else(&mut self) {
        self.dict.append(Slot::Token(Token::Native(Primitive::Jmp)));
        let orig = self.data_stack.pop();
        // a false `if` lands just past this jump's offset slot
        let past_jump = self.dict.here() + 1;
        self.resolve(orig, past_jump);
        let placeholder = self.dict.append(Slot::Data(0));
        self.data_stack.push(placeholder as Cell);
    }

    pub(crate) fn compile_then(&mut self) {
        let orig = self.data_stack.pop();
        let here = self.dict.here();
        self.resolve(orig, here);
        self.open_fixups -= 1;
    }

    pub(crate) fn compile_begin(&mut self) {
        self.data_stack.push(self.dict.here() as Cell);
        self.open_fixups += 1;
    }

    /// Loops back to `begin` while the tested value is zero.
    pub(crate) fn compile_until(&mut self) {
        let placeholder = self.emit_branch(Primitive::Jmp0);
        let dest = self.data_stack.pop();
        match Addr::try_from(dest) {
            Ok(dest) => self.resolve(placeholder as Cell, dest),
            Err(_) => warn!(dest, "until without a loop start, ignored"),
        }
        self.open_fixups -= 1;
    }

    /// `[compile] NAME` / `postpone NAME`: append NAME's token even if it is
    /// immediate.
    pub(crate) fn compile_next(&mut self) -> Result<(), ForthError> {
        let Some(word) = self.input.next_word() else {
            return Ok(());
        };
        match self.dict.find(&word) {
            Some(id) => {
                let token = self.dict.entry(id).body.token();
                self.compile_token(token);
                Ok(())
            }
            None => Err(ForthError::UnknownWord(word)),
        }
    }
}
