//! Built-in language profiles.
//!
//! A profile is plain data: adding a language means adding an entry to
//! [`HLDB`], never touching the scanner. A keyword ending in `|` belongs to
//! the second keyword class (types, builtins, directives).

use std::path::Path;

/// Which optional scanner passes a profile enables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyntaxFlags {
    pub numbers: bool,
    pub strings: bool,
    /// Tag the identifier run before `(` as a call site
    pub functions: bool,
}

/// Static per-language rule set consumed by the highlighter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxProfile {
    pub filetype: &'static str,
    /// Entries starting with `.` match the extension, others match anywhere in the file name
    pub filematch: &'static [&'static str],
    pub keywords: &'static [&'static str],
    pub line_comment: Option<&'static str>,
    pub block_comment: Option<(&'static str, &'static str)>,
    pub quotes: &'static [char],
    /// Trailing character that turns the preceding identifier into a macro call
    pub macro_marker: Option<char>,
    pub flags: SyntaxFlags,
}

impl SyntaxProfile {
    /// Split a keyword entry into its token and whether it is class 2
    pub fn keyword_token(entry: &str) -> (&str, bool) {
        match entry.strip_suffix('|') {
            Some(token) => (token, true),
            None => (entry, false),
        }
    }

    fn matches(&self, file_name: &str) -> bool {
        let ext = file_name.rfind('.').map(|idx| &file_name[idx..]);
        self.filematch.iter().any(|pattern| {
            if pattern.starts_with('.') {
                ext == Some(*pattern)
            } else {
                file_name.contains(pattern)
            }
        })
    }
}

const C_LIKE: SyntaxFlags = SyntaxFlags {
    numbers: true,
    strings: true,
    functions: false,
};

const C_KEYWORDS: &[&str] = &[
    "switch", "if", "while", "for", "break", "continue", "return", "else", "struct", "union",
    "typedef", "static", "enum", "class", "case", "int|", "long|", "double|", "float|", "char|",
    "unsigned|", "signed|", "void|", "#define|", "#include|",
];

const GO_KEYWORDS: &[&str] = &[
    "switch", "if", "default", "for", "break", "continue", "return", "else", "struct", "package",
    "typedef", "static", "enum", "class", "case", "func", "var", "int|", "string|", "uint|",
    "float|", "char|", "int16|", "int32|", "int64|", "import|",
];

const MT_KEYWORDS: &[&str] = &[
    "if", "else", "fn", "print", "return", "class", "this", "break", "continue", "switch", "case",
    "default", "super", "init|", "len|", "printf|", "println|", "read|", "write|", "clock|", "use",
    "string|", "number|", "color|", "for", "while", "exit|", "clear|", "show|", "Cd|", "Ls|",
    "input|", "append|", "delete|", "var",
];

const PY_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "exec", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "not", "or",
    "pass", "print", "raise", "return", "try", "while", "with", "yield", "async", "await",
    "nonlocal", "range", "xrange", "reduce", "map", "filter", "all", "any", "sum", "dir", "abs",
    "breakpoint", "compile", "delattr", "divmod", "format", "eval", "getattr", "hasattr", "hash",
    "help", "id", "input", "isinstance", "issubclass", "len", "locals", "max", "min", "next",
    "open", "pow", "repr", "reversed", "round", "setattr", "slice", "sorted", "super", "vars",
    "zip", "__import__", "reload", "raw_input", "execfile", "file", "cmp", "basestring",
    "buffer|", "bytearray|", "bytes|", "complex|", "float|", "frozenset|", "int|", "list|",
    "long|", "None|", "set|", "str|", "chr|", "tuple|", "bool|", "False|", "True|", "type|",
    "unicode|", "dict|", "ascii|", "bin|", "callable|", "classmethod|", "enumerate|", "hex|",
    "oct|", "ord|", "iter|", "memoryview|", "object|", "property|", "staticmethod|", "unichr|",
];

const TEX_KEYWORDS: &[&str] = &[
    "\\usepackage", "\\documentclass", "\\author", "\\title", "\\centering", "\\maketitle",
    "\\begin", "\\end", "$$|", "\\newcommand", "equation|", "figure|", "theorem|", "tabular|",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "type", "unsafe", "use", "where",
    "while", "i8|", "i16|", "i32|", "i64|", "i128|", "isize|", "u8|", "u16|", "u32|", "u64|",
    "u128|", "usize|", "f32|", "f64|", "bool|", "char|", "str|", "String|", "Vec|", "Option|",
    "Result|", "Box|", "Self|", "Some|", "None|", "Ok|", "Err|", "true|", "false|",
];

/// Highlight database, searched in order
pub static HLDB: &[SyntaxProfile] = &[
    SyntaxProfile {
        filetype: "C",
        filematch: &[".c", ".h", ".cpp"],
        keywords: C_KEYWORDS,
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        quotes: &['"', '\''],
        macro_marker: None,
        flags: C_LIKE,
    },
    SyntaxProfile {
        filetype: "Go",
        filematch: &[".go"],
        keywords: GO_KEYWORDS,
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        quotes: &['"', '\''],
        macro_marker: None,
        flags: C_LIKE,
    },
    SyntaxProfile {
        filetype: "MT",
        filematch: &[".MT", ".mt", ".mtl"],
        keywords: MT_KEYWORDS,
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        quotes: &['"', '\''],
        macro_marker: None,
        flags: C_LIKE,
    },
    SyntaxProfile {
        filetype: "Python",
        filematch: &[".py"],
        keywords: PY_KEYWORDS,
        line_comment: Some("#"),
        block_comment: Some(("/*", "*/")),
        quotes: &['"', '\''],
        macro_marker: None,
        flags: C_LIKE,
    },
    SyntaxProfile {
        filetype: "LaTeX",
        filematch: &[".tex"],
        keywords: TEX_KEYWORDS,
        line_comment: Some("%%"),
        block_comment: None,
        quotes: &['"', '\''],
        macro_marker: None,
        flags: SyntaxFlags {
            numbers: false,
            strings: true,
            functions: false,
        },
    },
    SyntaxProfile {
        filetype: "Rust",
        filematch: &[".rs"],
        keywords: RUST_KEYWORDS,
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        // lifetimes make single quotes ambiguous
        quotes: &['"'],
        macro_marker: Some('!'),
        flags: SyntaxFlags {
            numbers: true,
            strings: true,
            functions: true,
        },
    },
];

/// Pick the profile for a file name, if any language claims it
pub fn select_profile(path: &Path) -> Option<&'static SyntaxProfile> {
    let file_name = path.file_name()?.to_string_lossy();
    HLDB.iter().find(|profile| profile.matches(&file_name))
}
