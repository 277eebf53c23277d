use std::path::PathBuf;

/// Parsed command from command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// :w [filename] - Write buffer to file
    Write(Option<PathBuf>),
    /// :q - Quit (refused once if unsaved changes)
    Quit,
    /// :q! - Force quit (discard changes)
    ForceQuit,
    /// :wq / :x - Write and quit
    WriteQuit,
    /// :e[!] filename - Edit a file
    Edit { path: Option<PathBuf>, force: bool },
    /// :source - Reload the configuration file
    Source,
    /// :[number] - Go to line number
    GotoLine(usize),
    /// Anything else, resolved against the user command table
    User(String),
    /// Empty input
    Nop,
}

/// Result of executing a command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Command executed successfully
    Ok,
    /// Command executed with a message to display
    Message(String),
    /// Command failed with an error
    Error(String),
    /// Quit the editor
    Quit,
}

/// Parse a command string into a Command
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();

    // Handle empty input
    if input.is_empty() {
        return Command::Nop;
    }

    // Handle line number
    if let Ok(line_num) = input.parse::<usize>() {
        return Command::GotoLine(line_num);
    }

    // Split into command and arguments
    let (cmd, args) = match input.split_once(char::is_whitespace) {
        Some((cmd, args)) => (cmd, args.trim()),
        None => (input, ""),
    };
    let path = (!args.is_empty()).then(|| PathBuf::from(args));

    match cmd {
        // Write commands
        "w" | "write" => Command::Write(path),

        // Quit commands
        "q" | "quit" => Command::Quit,
        "q!" | "quit!" => Command::ForceQuit,

        // Write and quit
        "wq" | "x" | "exit" => Command::WriteQuit,

        // Edit commands
        "e" | "edit" => Command::Edit { path, force: false },
        "e!" | "edit!" => Command::Edit { path, force: true },

        "so" | "source" => Command::Source,

        _ => Command::User(input.to_string()),
    }
}

/// Command line state
#[derive(Debug, Clone, Default)]
pub struct CommandLine {
    /// The current input buffer
    pub input: String,
    /// Cursor position in the input (in chars)
    pub cursor: usize,
}

impl CommandLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the command line
    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.input
            .char_indices()
            .nth(cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.input.len())
    }

    /// Insert a character at the cursor position
    pub fn insert_char(&mut self, ch: char) {
        let idx = self.byte_index(self.cursor);
        self.input.insert(idx, ch);
        self.cursor += 1;
    }

    /// Delete character before cursor (backspace)
    pub fn delete_char_before(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let idx = self.byte_index(self.cursor);
            self.input.remove(idx);
        }
    }

    /// Move cursor left
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right
    pub fn move_right(&mut self) {
        if self.cursor < self.input.chars().count() {
            self.cursor += 1;
        }
    }

    /// Parse the current input and clear the line
    pub fn execute(&mut self) -> Command {
        let cmd = parse_command(&self.input);
        self.clear();
        cmd
    }

    /// Get display string (with ':' prefix)
    pub fn display(&self) -> String {
        format!(":{}", self.input)
    }
}
