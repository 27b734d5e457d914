use std::io::{self, BufRead, Write};

use tracing::info;

use crate::forth::{Forth, ForthError};

pub const PROMPT: &str = "> ";

#[derive(thiserror::Error, Debug)]
pub enum ReplError {
    #[error(transparent)]
    Forth(#[from] ForthError),
    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Prompt, read and evaluate lines until `bye` or end of input.
///
/// Unknown words are reported and the session goes on. Only fatal machine
/// errors and I/O failures come back as `Err`.
pub fn run<R: BufRead, W: Write>(forth: &mut Forth, mut input: R, out: &mut W) -> Result<(), ReplError> {
    let mut line = Vec::new();
    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            writeln!(out, " bye!")?;
            info!("end of input");
            return Ok(());
        }

        // undecodable bytes become U+FFFD and fail lookup like any unknown word
        let result = forth.eval(&String::from_utf8_lossy(&line));
        out.write_all(&forth.take_output())?;
        match result {
            Ok(()) => writeln!(out, "  ok")?,
            Err(ForthError::UserQuit) => {
                writeln!(out, "bye!")?;
                info!("bye");
                return Ok(());
            }
            Err(e @ ForthError::UnknownWord(_)) => writeln!(out, "{}", e)?,
            Err(e) => {
                out.flush()?;
                return Err(e.into());
            }
        }
    }
}
