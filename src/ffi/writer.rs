//! # Source Writer
//!
//! A minimal line-oriented writer the emitters build their output in. Text
//! accumulates in a `String`; the emitters own all formatting decisions, so
//! the writer stays dumb on purpose.

#[derive(Debug, Default)]
pub struct SourceWriter {
    out: String,
}

impl SourceWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Appends `s` followed by a newline.
    pub fn line(&mut self, s: &str) {
        self.out.push_str(s);
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    pub fn finish(self) -> String {
        self.out
    }
}
