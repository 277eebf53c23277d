use crate::editor::Buffer;

/// Represents a motion that can move the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    // Character motions
    Left,
    Right,
    Up,
    Down,

    // Word motions
    WordForward,  // w
    WordBackward, // b

    // Line motions
    LineStart, // 0
    LineEnd,   // $

    // File motions
    FileStart, // g
    FileEnd,   // G

    // Find char motions
    FindChar(char),     // f{char}
    FindCharBack(char), // F{char}
}

/// Check if a character is a "word" character (alphanumeric or underscore)
fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Character classification for word motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Whitespace,
    Word,    // alphanumeric + underscore
    Keyword, // punctuation, symbols
}

fn classify_char(ch: char) -> CharClass {
    if ch.is_whitespace() {
        CharClass::Whitespace
    } else if is_word_char(ch) {
        CharClass::Word
    } else {
        CharClass::Keyword
    }
}

/// Position after applying a motion `count` times, as (row, raw column).
///
/// Motions clamp at document and line boundaries; a find that fails leaves
/// the position unchanged.
pub fn apply_motion(buffer: &Buffer, motion: Motion, line: usize, col: usize, count: usize) -> (usize, usize) {
    let count = count.max(1);
    let last_line = buffer.len_lines().saturating_sub(1);
    let line = line.min(last_line);

    match motion {
        Motion::Left => (line, col.saturating_sub(count)),

        Motion::Right => (line, col.saturating_add(count).min(buffer.line_len(line))),

        Motion::Up => {
            let new_line = line.saturating_sub(count);
            (new_line, col.min(buffer.line_len(new_line)))
        }

        Motion::Down => {
            let new_line = line.saturating_add(count).min(last_line);
            (new_line, col.min(buffer.line_len(new_line)))
        }

        Motion::WordForward => {
            let mut pos = (line, col);
            for _ in 0..count {
                let next = find_word_forward(buffer, pos.0, pos.1);
                if next == pos {
                    break;
                }
                pos = next;
            }
            pos
        }

        Motion::WordBackward => {
            let mut pos = (line, col);
            for _ in 0..count {
                let next = find_word_backward(buffer, pos.0, pos.1);
                if next == pos {
                    break;
                }
                pos = next;
            }
            pos
        }

        Motion::LineStart => (line, 0),

        Motion::LineEnd => (line, buffer.line_len(line)),

        Motion::FileStart => (0, 0),

        Motion::FileEnd => (last_line, 0),

        Motion::FindChar(target) => {
            find_char_forward(buffer, line, col, target, count).unwrap_or((line, col))
        }

        Motion::FindCharBack(target) => {
            find_char_backward(buffer, line, col, target, count).unwrap_or((line, col))
        }
    }
}

/// Find the start of the next word (w motion)
fn find_word_forward(buffer: &Buffer, line: usize, col: usize) -> (usize, usize) {
    let total_lines = buffer.len_lines();
    let mut l = line;
    let mut c = col;

    // Phase 1: Move past current word (same class characters)
    if let Some(start_class) = buffer.char_at(l, c).map(classify_char) {
        if start_class != CharClass::Whitespace {
            while buffer.char_at(l, c).map(classify_char) == Some(start_class) {
                c += 1;
            }
        }
    }

    // Phase 2: Skip whitespace, crossing line ends
    loop {
        match buffer.char_at(l, c) {
            Some(ch) if ch.is_whitespace() => c += 1,
            Some(_) => return (l, c),
            None => {
                if l + 1 >= total_lines {
                    return (l, buffer.line_len(l));
                }
                l += 1;
                c = 0;
            }
        }
    }
}

/// Find the start of the previous word (b motion)
fn find_word_backward(buffer: &Buffer, line: usize, col: usize) -> (usize, usize) {
    let mut l = line;
    let mut c = col.min(buffer.line_len(l));

    // Phase 1: Step back over whitespace and line breaks
    loop {
        if c == 0 {
            if l == 0 {
                return (0, 0);
            }
            l -= 1;
            c = buffer.line_len(l);
            continue;
        }
        match buffer.char_at(l, c - 1) {
            Some(ch) if ch.is_whitespace() => c -= 1,
            _ => break,
        }
    }

    // Phase 2: Move back through same-class characters
    let target_class = buffer.char_at(l, c - 1).map(classify_char);
    while c > 0 && buffer.char_at(l, c - 1).map(classify_char) == target_class {
        c -= 1;
    }

    (l, c)
}

/// Find the count-th occurrence of `target` after `col` on the same line (f motion)
fn find_char_forward(buffer: &Buffer, line: usize, col: usize, target: char, count: usize) -> Option<(usize, usize)> {
    let text = buffer.line(line)?.raw();
    text.chars()
        .enumerate()
        .skip(col + 1)
        .filter(|(_, ch)| *ch == target)
        .nth(count - 1)
        .map(|(c, _)| (line, c))
}

/// Find the count-th occurrence of `target` before `col` on the same line (F motion)
fn find_char_backward(buffer: &Buffer, line: usize, col: usize, target: char, count: usize) -> Option<(usize, usize)> {
    let text = buffer.line(line)?.raw();
    let before: Vec<char> = text.chars().take(col).collect();
    before
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, ch)| **ch == target)
        .nth(count - 1)
        .map(|(c, _)| (line, c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(lines: &[&str]) -> Buffer {
        Buffer::from_lines(lines.to_vec())
    }

    #[test]
    fn test_vertical_moves_clamp_column() {
        let buf = buffer(&["a long line", "ab", "another long one"]);
        assert_eq!(apply_motion(&buf, Motion::Down, 0, 8, 1), (1, 2));
        assert_eq!(apply_motion(&buf, Motion::Down, 0, 8, 10), (2, 8));
        assert_eq!(apply_motion(&buf, Motion::Up, 2, 9, 1), (1, 2));
        assert_eq!(apply_motion(&buf, Motion::Up, 1, 0, 5), (0, 0));
    }

    #[test]
    fn test_horizontal_moves_clamp() {
        let buf = buffer(&["abc"]);
        assert_eq!(apply_motion(&buf, Motion::Left, 0, 1, 4), (0, 0));
        assert_eq!(apply_motion(&buf, Motion::Right, 0, 1, 4), (0, 3));
        assert_eq!(apply_motion(&buf, Motion::LineEnd, 0, 0, 1), (0, 3));
        assert_eq!(apply_motion(&buf, Motion::LineStart, 0, 2, 1), (0, 0));
    }

    #[test]
    fn test_word_forward() {
        let buf = buffer(&["foo.bar baz", "  next"]);
        assert_eq!(apply_motion(&buf, Motion::WordForward, 0, 0, 1), (0, 3));
        assert_eq!(apply_motion(&buf, Motion::WordForward, 0, 3, 1), (0, 4));
        assert_eq!(apply_motion(&buf, Motion::WordForward, 0, 4, 1), (0, 8));
        assert_eq!(apply_motion(&buf, Motion::WordForward, 0, 8, 1), (1, 2));
        assert_eq!(apply_motion(&buf, Motion::WordForward, 1, 2, 1), (1, 6));
        assert_eq!(apply_motion(&buf, Motion::WordForward, 0, 0, 3), (0, 8));
    }

    #[test]
    fn test_word_backward() {
        let buf = buffer(&["foo bar", "  baz"]);
        assert_eq!(apply_motion(&buf, Motion::WordBackward, 1, 2, 1), (0, 4));
        assert_eq!(apply_motion(&buf, Motion::WordBackward, 0, 5, 1), (0, 4));
        assert_eq!(apply_motion(&buf, Motion::WordBackward, 0, 4, 1), (0, 0));
        assert_eq!(apply_motion(&buf, Motion::WordBackward, 0, 0, 1), (0, 0));
    }

    #[test]
    fn test_file_motions_are_independent() {
        let buf = buffer(&["a", "b", "c"]);
        assert_eq!(apply_motion(&buf, Motion::FileEnd, 0, 0, 1), (2, 0));
        assert_eq!(apply_motion(&buf, Motion::FileStart, 2, 0, 1), (0, 0));
    }

    #[test]
    fn test_find_char() {
        let buf = buffer(&["a(b)c(d)"]);
        assert_eq!(apply_motion(&buf, Motion::FindChar('('), 0, 0, 1), (0, 1));
        assert_eq!(apply_motion(&buf, Motion::FindChar('('), 0, 1, 1), (0, 5));
        assert_eq!(apply_motion(&buf, Motion::FindChar('('), 0, 0, 2), (0, 5));
        assert_eq!(apply_motion(&buf, Motion::FindCharBack('('), 0, 7, 1), (0, 5));
        assert_eq!(apply_motion(&buf, Motion::FindCharBack('('), 0, 7, 2), (0, 1));
        // absent target leaves the cursor alone
        assert_eq!(apply_motion(&buf, Motion::FindChar('z'), 0, 2, 1), (0, 2));
        assert_eq!(apply_motion(&buf, Motion::FindCharBack('c'), 0, 2, 1), (0, 2));
    }
}
