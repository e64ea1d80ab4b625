use stacky_core::CodeWindow;

/// Split on `\n`, dropping one trailing `\r` per line. A trailing newline
/// yields a final empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Line-numbered excerpt of `bytes` around the 1-based `line`, with
/// `context_size` lines on each side.
///
/// Each line renders as `"{number}{marker} | {content}"`; numbers are
/// right-aligned to the width of the last number and the marker is `>` on
/// the target line. A target past the end of the file yields an empty window.
pub fn extract_code_window(bytes: &[u8], line: usize, context_size: usize) -> CodeWindow {
    let text = String::from_utf8_lossy(bytes);
    let lines = split_lines(&text);

    let start = line.saturating_sub(context_size).max(1);
    let end = line.saturating_add(context_size).min(lines.len());

    if start > end {
        return CodeWindow {
            start_line: start,
            end_line: end,
            rendered_text: String::new(),
        };
    }

    let width = end.to_string().len();
    let rendered_text = (start..=end)
        .map(|n| {
            let marker = if n == line { '>' } else { ' ' };
            format!("{:>width$}{} | {}", n, marker, lines[n - 1], width = width)
        })
        .collect::<Vec<_>>()
        .join("\n");

    CodeWindow {
        start_line: start,
        end_line: end,
        rendered_text,
    }
}
