use std::collections::VecDeque;

#[derive(Clone, Debug, PartialEq)]
struct Lexeme {
    value: String,
}

impl Lexeme {
    fn new(value: &str) -> Self {
        Lexeme {
            value: value.to_string(),
        }
    }
}

/// Whitespace-delimited words of the line currently being processed.
///
/// Words are handed out one at a time so defining words can take the
/// next word as a name.
#[derive(Debug, Default)]
pub struct Input {
    lexemes: VecDeque<Lexeme>,
}

impl Input {
    pub fn fill(&mut self, line: &str) {
        self.lexemes = lex(line);
    }

    pub fn next_word(&mut self) -> Option<String> {
        self.lexemes.pop_front().map(|lexeme| lexeme.value)
    }

    pub fn clear(&mut self) {
        self.lexemes.clear();
    }
}

fn lex(input: &str) -> VecDeque<Lexeme> {
    input.split_whitespace().map(Lexeme::new).collect()
}
