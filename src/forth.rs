use tracing::{debug, error};

use crate::{
    config::Config,
    dictionary::{Addr, Body, Cell, Dictionary, Slot, Token, SPRINGBOARD},
    engine::NATIVES,
    input::Input,
    stack::{Stack, StackKind},
};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ForthError {
    #[error("{0}?")]
    UnknownWord(String),
    #[error("{stack} stack underflow by {by} entries")]
    StackUnderflow { stack: StackKind, by: usize },
    #[error("{stack} stack overflow by {by} entries")]
    StackOverflow { stack: StackKind, by: usize },
    #[error("Bye")]
    UserQuit,
}

impl ForthError {
    /// Stack violations end the process; everything else is local to a line.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::StackUnderflow { .. } | Self::StackOverflow { .. }
        )
    }
}

const PRELUDE: &[&str] = &["def push4 4 ;", "def push8 push4 push4 + ;"];

#[derive(Debug)]
pub struct Forth {
    pub(crate) data_stack: Stack<Cell>,
    /// `None` is the top-level sentinel that halts the engine.
    pub(crate) return_stack: Stack<Option<Addr>>,
    pub(crate) dict: Dictionary,
    pub(crate) ip: Addr,
    pub(crate) compiling: bool,
    /// Open `if`/`else`/`begin` fixups in the current definition. Only
    /// used to warn about unbalanced control words.
    pub(crate) open_fixups: isize,
    pub(crate) input: Input,
    /// Bytes written by `.`, `emit` and `.s`, drained by the REPL.
    pub(crate) output: Vec<u8>,
}

impl Forth {
    pub fn new(config: Config) -> Result<Self, ForthError> {
        let mut dict = Dictionary::new();
        for (name, primitive) in NATIVES {
            dict.add_entry(name, Body::Native(*primitive), true, primitive.is_immediate());
        }

        let mut forth = Self {
            data_stack: Stack::new(StackKind::Data, config.data_stack),
            return_stack: Stack::new(StackKind::Return, config.return_stack),
            dict,
            ip: SPRINGBOARD,
            compiling: false,
            open_fixups: 0,
            input: Input::default(),
            output: Vec::new(),
        };

        if config.prelude {
            for line in PRELUDE {
                forth.eval(line)?;
            }
        }
        Ok(forth)
    }

    /// Resolve and run (or compile) every token of one input line.
    ///
    /// An unknown token aborts the rest of the line. Compile mode is left
    /// as it was, so a definition may span lines.
    pub fn eval(&mut self, line: &str) -> Result<(), ForthError> {
        self.input.fill(line);
        while let Some(word) = self.input.next_word() {
            if let Err(e) = self.interpret_word(&word) {
                self.input.clear();
                return Err(e);
            }
        }
        Ok(())
    }

    fn interpret_word(&mut self, word: &str) -> Result<(), ForthError> {
        if let Some(id) = self.dict.find(word) {
            let entry = self.dict.entry(id);
            let token = entry.body.token();
            if !self.compiling || entry.immediate {
                return self.execute(token);
            }
            self.compile_token(token);
            return Ok(());
        }

        match word.parse::<Cell>() {
            Ok(value) if self.compiling => self.compile_literal(value),
            Ok(value) => self.data_stack.push(value),
            Err(_) => return Err(ForthError::UnknownWord(word.to_string())),
        }
        Ok(())
    }

    /// Run a single token through the springboard `[token, exit]`.
    pub(crate) fn execute(&mut self, token: Token) -> Result<(), ForthError> {
        self.dict.overwrite(SPRINGBOARD, Slot::Token(token));
        let depth = self.return_stack.depth();
        self.return_stack.push(None);
        self.ip = SPRINGBOARD;

        let result = self.run();
        if !matches!(&result, Err(e) if e.is_fatal()) && self.return_stack.depth() > depth {
            debug!(
                left = self.return_stack.depth() - depth,
                "execution stopped early, unwinding return stack"
            );
            self.return_stack.set_depth(depth);
        }
        result
    }

    pub(crate) fn check_stacks(&self) -> Result<(), ForthError> {
        let underflows = [
            (self.return_stack.kind(), self.return_stack.underflow()),
            (self.data_stack.kind(), self.data_stack.underflow()),
        ];
        for (stack, by) in underflows {
            if let Some(by) = by {
                error!(%stack, by, "stack underflow");
                return Err(ForthError::StackUnderflow { stack, by });
            }
        }

        let overflows = [
            (self.return_stack.kind(), self.return_stack.overflow()),
            (self.data_stack.kind(), self.data_stack.overflow()),
        ];
        for (stack, by) in overflows {
            if let Some(by) = by {
                error!(%stack, by, "stack overflow");
                return Err(ForthError::StackOverflow { stack, by });
            }
        }
        Ok(())
    }

    pub fn data_stack(&self) -> &[Cell] {
        self.data_stack.as_slice()
    }

    pub fn top(&self) -> Option<Cell> {
        self.data_stack().last().copied()
    }

    pub fn return_depth(&self) -> isize {
        self.return_stack.depth()
    }

    pub fn is_compiling(&self) -> bool {
        self.compiling
    }

    /// Physical entries carrying `name`, reachable or shadowed.
    pub fn entries_named(&self, name: &str) -> usize {
        self.dict.count_named(name)
    }

    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }
}

#[cfg(test)]
mod test {
    use test_case::test_case;

    use super::*;

    fn forth() -> Forth {
        Forth::new(Config::default()).unwrap()
    }

    #[test]
    fn cannot_parse_letter() {
        let mut forth = forth();
        let result = forth.eval("1 a 3 4 5");
        assert_eq!(Err(ForthError::UnknownWord("a".to_string())), result);
        assert_eq!(&[1], forth.data_stack());
    }

    #[test]
    fn next_line_runs_after_unknown_word() {
        let mut forth = forth();
        assert!(forth.eval("2 nope 3").is_err());
        forth.eval("4 +").unwrap();
        assert_eq!(Some(6), forth.top());
    }

    #[test]
    fn parses_signed_numbers() {
        let mut forth = forth();
        forth.eval("1 -23 +7 0").unwrap();
        assert_eq!(&[1, -23, 7, 0], forth.data_stack());
    }

    #[test]
    fn rejects_partial_numbers() {
        let mut forth = forth();
        assert_eq!(
            Err(ForthError::UnknownWord("12abc".to_string())),
            forth.eval("12abc")
        );
    }

    #[test_case(&["5 3 +"], 8; "add")]
    #[test_case(&["5 dup +"], 10; "dup add")]
    #[test_case(&["0 not"], 1; "not of zero")]
    #[test_case(&["5 not"], 0; "not of five")]
    #[test_case(&[": inc 1 + ; 5 inc"], 6; "define and use")]
    #[test_case(&[": inc 1 + ; 5 inc", ": inc 2 + ; 5 inc"], 7; "shadowing")]
    #[test_case(&[": pick if 111 else 222 then ; 1 pick"], 111; "true branch")]
    #[test_case(&[": pick if 111 else 222 then ;", "0 pick"], 222; "false branch")]
    #[test_case(&["push8"], 8; "prelude words")]
    fn top_after(lines: &[&str], expected: i32) {
        let mut forth = forth();
        for line in lines {
            forth.eval(line).unwrap();
        }
        assert_eq!(Some(expected), forth.top());
    }

    #[test]
    fn shadowed_entry_is_kept() {
        let mut forth = forth();
        forth.eval(": inc 1 + ; 5 inc").unwrap();
        forth.eval(": inc 2 + ; 5 inc").unwrap();
        assert_eq!(&[6, 7], forth.data_stack());
        assert_eq!(2, forth.entries_named("inc"));
    }

    #[test]
    fn fatal_classification() {
        assert!(ForthError::StackUnderflow {
            stack: StackKind::Data,
            by: 1
        }
        .is_fatal());
        assert!(!ForthError::UnknownWord("x".into()).is_fatal());
        assert!(!ForthError::UserQuit.is_fatal());
    }

    #[test]
    fn diagnostics_name_direction_and_size() {
        let under = ForthError::StackUnderflow {
            stack: StackKind::Data,
            by: 1,
        };
        let over = ForthError::StackOverflow {
            stack: StackKind::Return,
            by: 3,
        };
        assert_eq!("Data stack underflow by 1 entries", under.to_string());
        assert_eq!("Return stack overflow by 3 entries", over.to_string());
        assert_eq!("foo?", ForthError::UnknownWord("foo".into()).to_string());
    }

    #[test]
    fn machines_are_independent() {
        let mut a = forth();
        let mut b = forth();
        a.eval(": nine 9 ;").unwrap();
        assert!(b.eval("nine").is_err());
        a.eval("nine").unwrap();
        assert_eq!(Some(9), a.top());
        assert_eq!(None, b.top());
    }

    #[test]
    fn without_prelude() {
        let mut forth = Forth::new(Config {
            prelude: false,
            ..Config::default()
        })
        .unwrap();
        assert_eq!(
            Err(ForthError::UnknownWord("push4".to_string())),
            forth.eval("push4")
        );
    }
}
