// Console output log shared by the TUI and batch mode

/// What produced a transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Input,  // echoed operator command
    Output, // command result
    Error,
}

/// A line of console output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub text: String,
    pub kind: LineKind,
}

/// Append-only record of everything the console printed
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Vec<TranscriptLine>,
}

impl Transcript {
    pub fn new() -> Self {
        Transcript { lines: Vec::new() }
    }

    pub fn input(&mut self, text: &str) {
        self.push(LineKind::Input, format!("> {}", text));
    }

    /// Print command output; embedded newlines become separate lines
    pub fn output(&mut self, text: impl AsRef<str>) {
        for line in text.as_ref().lines() {
            self.push(LineKind::Output, line.to_string());
        }
    }

    pub fn error(&mut self, text: impl AsRef<str>) {
        self.push(LineKind::Error, format!("error: {}", text.as_ref()));
    }

    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    /// Lines appended after the first `start`
    pub fn lines_since(&self, start: usize) -> &[TranscriptLine] {
        self.lines.get(start..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn push(&mut self, kind: LineKind, text: String) {
        self.lines.push(TranscriptLine { text, kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_splits_lines() {
        let mut t = Transcript::new();
        t.input("vars");
        t.output("$0: 0x81000000\n%foo: 0x1000\n");
        t.error("bad");

        let texts: Vec<&str> = t.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["> vars", "$0: 0x81000000", "%foo: 0x1000", "error: bad"]
        );
        assert_eq!(t.lines_since(3).len(), 1);
        assert!(t.lines_since(10).is_empty());
    }
}
