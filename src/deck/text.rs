//! Splitting a text block into leveled paragraphs.

/// One line of a text block with its indentation level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentedLine {
    pub text: String,
    pub level: usize,
}

/// Decompose `block` into lines.
///
/// CRLF and CR are normalized to LF before splitting. The level of a line is
/// the number of leading tab characters; the visible text is the line with
/// those tabs and surrounding whitespace removed. Lines that are blank after
/// trimming are dropped.
pub fn indented_lines(block: &str) -> Vec<IndentedLine> {
    let normalized = block.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let level = line.bytes().take_while(|&b| b == b'\t').count();
            IndentedLine {
                text: line.trim().to_string(),
                level,
            }
        })
        .collect()
}
