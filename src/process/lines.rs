/// Splits arbitrary byte chunks from a pipe into newline-stripped lines.
///
/// The tail after the last newline is kept as a pending partial line: the
/// confirmation prompt (`Enter a value: `) is printed without a newline and
/// would otherwise never be seen.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the lines it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }

        lines
    }

    /// The incomplete line seen so far
    pub fn partial(&self) -> String {
        String::from_utf8_lossy(&self.pending).into_owned()
    }

    /// Take the incomplete line, leaving the splitter empty
    pub fn take_partial(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = self.partial();
        self.pending.clear();
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_across_chunks() {
        let mut splitter = LineSplitter::new();

        assert!(splitter.push(b"Plan: 1 to").is_empty());
        assert_eq!(splitter.push(b" add\r\nnext\n"), vec!["Plan: 1 to add", "next"]);
        assert_eq!(splitter.partial(), "");
    }

    #[test]
    fn test_partial_prompt() {
        let mut splitter = LineSplitter::new();

        let lines = splitter.push(b"\n  Enter a value: ");
        assert_eq!(lines, vec![""]);
        assert_eq!(splitter.partial(), "  Enter a value: ");
        assert_eq!(splitter.take_partial(), Some("  Enter a value: ".to_string()));
        assert_eq!(splitter.take_partial(), None);
    }
}
