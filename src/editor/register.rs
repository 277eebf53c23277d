/// Single-slot line clipboard.
///
/// Every line kill overwrites the slot; there is no history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Register {
    content: Option<String>,
}

impl Register {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a killed line's raw content, replacing whatever was there
    pub fn set(&mut self, line: String) {
        self.content = Some(line);
    }

    pub fn get(&self) -> Option<&str> {
        self.content.as_deref()
    }
}
