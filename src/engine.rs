use tracing::{trace, warn};

use crate::{
    dictionary::{Cell, Slot, Token},
    forth::{Forth, ForthError},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    Bye,
    Dup,
    Swap,
    Drop,
    Not,
    Add,
    Exit,
    Literal,
    Def,
    Semicolon,
    Immediate,
    Jmp0,
    Jmp,
    If,
    Else,
    Then,
    Begin,
    Until,
    BracketCompile,
    Postpone,
    Nop,
    Subtract,
    Rot,
    Dot,
    Emit,
    Show,
}

/// Native words in dictionary order, oldest first.
pub const NATIVES: &[(&str, Primitive)] = &[
    ("bye", Primitive::Bye),
    ("dup", Primitive::Dup),
    ("swap", Primitive::Swap),
    ("drop", Primitive::Drop),
    ("not", Primitive::Not),
    ("+", Primitive::Add),
    ("exit", Primitive::Exit),
    ("literal", Primitive::Literal),
    ("def", Primitive::Def),
    (":", Primitive::Def),
    (";", Primitive::Semicolon),
    ("immediate", Primitive::Immediate),
    ("jmp0", Primitive::Jmp0),
    ("jmp", Primitive::Jmp),
    ("if", Primitive::If),
    ("else", Primitive::Else),
    ("then", Primitive::Then),
    ("begin", Primitive::Begin),
    ("until", Primitive::Until),
    ("[compile]", Primitive::BracketCompile),
    ("postpone", Primitive::Postpone),
    ("nop", Primitive::Nop),
    ("-", Primitive::Subtract),
    ("rot", Primitive::Rot),
    (".", Primitive::Dot),
    ("emit", Primitive::Emit),
    (".s", Primitive::Show),
];

impl Primitive {
    pub fn is_immediate(self) -> bool {
        matches!(
            self,
            Self::Semicolon
                | Self::If
                | Self::Else
                | Self::Then
                | Self::Begin
                | Self::Until
                | Self::BracketCompile
                | Self::Postpone
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Continue,
    Halt,
}

impl Forth {
    /// Drive the engine from the current instruction pointer until an
    /// `exit` pops the top-level sentinel.
    pub(crate) fn run(&mut self) -> Result<(), ForthError> {
        loop {
            let step = self.step()?;
            self.check_stacks()?;
            if step == Step::Halt {
                return Ok(());
            }
        }
    }

    /// Follow calls until a native token is reached, then invoke it once.
    pub(crate) fn step(&mut self) -> Result<Step, ForthError> {
        loop {
            let token = match self.dict.slot(self.ip) {
                Some(Slot::Token(token)) => token,
                other => {
                    warn!(ip = self.ip, slot = ?other, "no execution token, halting");
                    return Ok(Step::Halt);
                }
            };
            trace!(ip = self.ip, ?token, stack = ?self.data_stack.as_slice());
            self.ip += 1;

            match token {
                Token::Call(entry) => {
                    self.return_stack.push(Some(self.ip));
                    self.ip = entry;
                    // a call chain with no native in it must still reach the range check
                    if !self.return_stack.in_range() {
                        return Ok(Step::Continue);
                    }
                }
                Token::Native(primitive) => return self.invoke(primitive),
            }
        }
    }

    fn invoke(&mut self, primitive: Primitive) -> Result<Step, ForthError> {
        match primitive {
            Primitive::Bye => return Err(ForthError::UserQuit),
            Primitive::Dup => {
                let value = self.data_stack.peek();
                self.data_stack.push(value);
            }
            Primitive::Swap => {
                let a = self.data_stack.nth(0);
                let b = self.data_stack.nth(1);
                self.data_stack.set_nth(0, b);
                self.data_stack.set_nth(1, a);
            }
            Primitive::Drop => {
                self.data_stack.pop();
            }
            Primitive::Not => {
                let value = self.data_stack.peek();
                self.data_stack.set_nth(0, Cell::from(value == 0));
            }
            Primitive::Add => {
                let b = self.data_stack.pop();
                let a = self.data_stack.pop();
                self.data_stack.push(a.wrapping_add(b));
            }
            Primitive::Subtract => {
                let b = self.data_stack.pop();
                let a = self.data_stack.pop();
                self.data_stack.push(a.wrapping_sub(b));
            }
            Primitive::Rot => {
                let c = self.data_stack.pop();
                let b = self.data_stack.pop();
                let a = self.data_stack.pop();
                self.data_stack.push(b);
                self.data_stack.push(c);
                self.data_stack.push(a);
            }
            Primitive::Literal => match self.read_operand() {
                Some(value) => self.data_stack.push(value),
                None => return Ok(Step::Halt),
            },
            Primitive::Exit => match self.return_stack.pop() {
                Some(addr) => self.ip = addr,
                None => return Ok(Step::Halt),
            },
            Primitive::Jmp => match self.read_operand() {
                Some(offset) => return Ok(self.jump(offset)),
                None => return Ok(Step::Halt),
            },
            Primitive::Jmp0 => {
                let Some(offset) = self.read_operand() else {
                    return Ok(Step::Halt);
                };
                if self.data_stack.pop() == 0 {
                    return Ok(self.jump(offset));
                }
            }
            Primitive::Nop => {}
            Primitive::Dot => {
                let value = self.data_stack.pop();
                self.output
                    .extend_from_slice(format!("{} ", value).as_bytes());
            }
            Primitive::Emit => {
                let value = self.data_stack.pop();
                // low byte only, written raw
                self.output.push(value as u8);
            }
            Primitive::Show => {
                let shown = format!("{:?} ", self.data_stack.as_slice());
                self.output.extend_from_slice(shown.as_bytes());
            }
            Primitive::Def => return Ok(self.define()),
            Primitive::Semicolon => self.end_definition(),
            Primitive::Immediate => self.mark_immediate(),
            Primitive::If => self.compile_if(),
            Primitive::Else => self.compile_else(),
            Primitive::Then => self.compile_then(),
            Primitive::Begin => self.compile_begin(),
            Primitive::Until => self.compile_until(),
            Primitive::BracketCompile | Primitive::Postpone => self.compile_next()?,
        }
        Ok(Step::Continue)
    }

    /// Read the inline slot following the current token.
    fn read_operand(&mut self) -> Option<Cell> {
        match self.dict.slot(self.ip) {
            Some(Slot::Data(value)) => {
                self.ip += 1;
                Some(value)
            }
            other => {
                warn!(ip = self.ip, slot = ?other, "expected an inline operand, halting");
                None
            }
        }
    }

    fn jump(&mut self, offset: Cell) -> Step {
        match self.ip.checked_add_signed(offset as isize) {
            Some(target) => {
                self.ip = target;
                Step::Continue
            }
            None => {
                warn!(ip = self.ip, offset, "branch before the start of the arena, halting");
                Step::Halt
            }
        }
    }
}
