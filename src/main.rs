use std::env;
use std::path::PathBuf;

use charm::terminal::{handle_key, InputEvent};
use charm::{load_config, logging, Editor, Terminal};

fn main() -> anyhow::Result<()> {
    // Held until exit so buffered log lines are flushed
    let _log_guard = logging::init();

    // Load configuration
    let settings = load_config();

    // Initialize editor with settings
    let mut editor = Editor::new(settings);
    editor.set_status("HELP: :w = save | :q = quit | / = search | i = insert");

    // Open file from command line argument if provided
    if let Some(path) = env::args().nth(1).map(PathBuf::from) {
        if let Err(e) = editor.open_file(path) {
            tracing::warn!(error = %e, "could not open file");
            editor.set_status(e.to_string());
        }
    }

    // Initialize terminal
    let mut terminal = Terminal::new()?;

    // Get initial size
    let (width, height) = Terminal::size()?;
    editor.set_size(width, height);

    // Main event loop
    while !editor.should_quit() {
        editor.scroll();
        terminal.render(&editor)?;

        match terminal.read_event()? {
            InputEvent::Key(key) => handle_key(&mut editor, key),
            InputEvent::Resize(width, height) => editor.set_size(width, height),
        }
    }

    tracing::info!("exiting");
    Ok(())
}
