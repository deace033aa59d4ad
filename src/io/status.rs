//! Line-oriented evaluation status channel
//!
//! Each analysed position produces one `EVAL:<sign><pawns>` line, flushed
//! immediately so a reader on the other end of a pipe sees it at once.

use std::io::{self, Stdout, Write};

/// `EVAL:+1.25` style line for `pawns`
pub fn format_eval(pawns: f32) -> String {
    // Avoid printing "-0.00"
    let pawns = if pawns == 0.0 { 0.0 } else { pawns };
    format!("EVAL:{pawns:+.2}")
}

pub struct StatusLine<W: Write = Stdout> {
    out: W,
}

impl StatusLine<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> StatusLine<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn emit(&mut self, pawns: f32) -> io::Result<()> {
        writeln!(self.out, "{}", format_eval(pawns))?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
