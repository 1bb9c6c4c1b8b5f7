/// Terminal behavior requested on the command line.
///
/// Passed explicitly to logging and to the console reader at construction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerminalOptions {
    /// Prompted, line-editing style console reader (`--no-jline` turns it off).
    pub interactive_reader: bool,
    /// ANSI color codes in logs and prompts (`--no-color` turns it off).
    pub color: bool,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            interactive_reader: true,
            color: true,
        }
    }
}
