//! Line-oriented syntax highlighting.
//!
//! [`highlight_line`] classifies every render column of one line. The only
//! state carried between lines is whether the line ends inside a block
//! comment; the buffer owns the cascade that propagates it downwards.

mod profile;
mod theme;

pub use profile::{select_profile, SyntaxFlags, SyntaxProfile, HLDB};
pub use theme::Theme;

/// Classification of a single render column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Highlight {
    #[default]
    Normal,
    Function,
    Comment,
    MlComment,
    Keyword1,
    Keyword2,
    String,
    Number,
    Macro,
    /// Search overlay, never produced by the scanner
    Match,
    /// Selection overlay, never produced by the scanner
    Visual,
}

/// Token boundary test (ASCII only)
pub fn is_separator(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\0' || ",.()+-/*=~%<>[];".contains(c)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn starts_with_at(render: &[char], at: usize, pattern: &str) -> bool {
    let mut idx = at;
    for pc in pattern.chars() {
        if render.get(idx) != Some(&pc) {
            return false;
        }
        idx += 1;
    }
    true
}

/// Scan one render line.
///
/// Returns one tag per render column and whether the line ends inside a
/// block comment. Without a profile every column is [`Highlight::Normal`].
pub fn highlight_line(
    render: &[char],
    profile: Option<&SyntaxProfile>,
    starts_in_comment: bool,
) -> (Vec<Highlight>, bool) {
    let len = render.len();
    let mut hl = vec![Highlight::Normal; len];
    let Some(profile) = profile else {
        return (hl, false);
    };

    let mut prev_sep = true;
    let mut in_string: Option<char> = None;
    let mut in_comment = starts_in_comment && profile.block_comment.is_some();

    let mut i = 0;
    'scan: while i < len {
        let c = render[i];
        let prev_hl = if i > 0 { hl[i - 1] } else { Highlight::Normal };

        if let Some(marker) = profile.line_comment {
            if in_string.is_none() && !in_comment && starts_with_at(render, i, marker) {
                hl[i..].fill(Highlight::Comment);
                break;
            }
        }

        if profile.flags.functions
            && c == '('
            && in_string.is_none()
            && !in_comment
            && (i == 0 || render[i - 1] != '\\')
        {
            let mut j = i;
            while j > 0 && !is_separator(render[j - 1]) && hl[j - 1] != Highlight::Macro {
                hl[j - 1] = Highlight::Function;
                j -= 1;
            }
        }

        if let Some((open, close)) = profile.block_comment {
            if in_string.is_none() {
                if in_comment {
                    if starts_with_at(render, i, close) {
                        let end = (i + close.chars().count()).min(len);
                        hl[i..end].fill(Highlight::MlComment);
                        i = end;
                        in_comment = false;
                        prev_sep = true;
                    } else {
                        hl[i] = Highlight::MlComment;
                        i += 1;
                    }
                    continue;
                } else if starts_with_at(render, i, open) {
                    let end = (i + open.chars().count()).min(len);
                    hl[i..end].fill(Highlight::MlComment);
                    i = end;
                    in_comment = true;
                    continue;
                }
            }
        }

        if profile.flags.strings {
            if let Some(quote) = in_string {
                hl[i] = Highlight::String;
                if c == '\\' && i + 1 < len {
                    hl[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }
                if c == quote {
                    in_string = None;
                }
                i += 1;
                prev_sep = true;
                continue;
            } else if profile.quotes.contains(&c) {
                in_string = Some(c);
                hl[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        if profile.flags.numbers
            && ((c.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (c == '.' && prev_hl == Highlight::Number))
        {
            hl[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        if profile.macro_marker == Some(c)
            && i > 0
            && is_ident_char(render[i - 1])
            && render.get(i + 1) != Some(&'=')
        {
            let mut j = i;
            while j > 0 && is_ident_char(render[j - 1]) {
                j -= 1;
            }
            hl[j..=i].fill(Highlight::Macro);
            i += 1;
            prev_sep = true;
            continue;
        }

        if prev_sep {
            for entry in profile.keywords {
                let (token, class2) = SyntaxProfile::keyword_token(entry);
                let klen = token.chars().count();
                if klen == 0 || !starts_with_at(render, i, token) {
                    continue;
                }
                if render.get(i + klen).map_or(true, |&next| is_separator(next)) {
                    let tag = if class2 {
                        Highlight::Keyword2
                    } else {
                        Highlight::Keyword1
                    };
                    hl[i..i + klen].fill(tag);
                    i += klen;
                    prev_sep = false;
                    continue 'scan;
                }
            }
        }

        prev_sep = is_separator(c);
        i += 1;
    }

    (hl, in_comment)
}
