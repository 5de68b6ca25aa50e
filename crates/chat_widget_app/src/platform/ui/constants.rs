pub(crate) const CMD_TOGGLE: &str = "/toggle";
pub(crate) const CMD_CLOSE: &str = "/close";
pub(crate) const CMD_BACKDROP: &str = "/backdrop";
pub(crate) const CMD_ESCAPE: &str = "/esc";
pub(crate) const CMD_SELECT: &str = "/select";
pub(crate) const CMD_UNSELECT: &str = "/unselect";
pub(crate) const CMD_HELP: &str = "/help";
pub(crate) const CMD_QUIT: &str = "/quit";
/// Trailing marker that continues the message on the next line (Shift+Enter).
pub(crate) const LINE_CONTINUATION: char = '\\';

pub(crate) const HELP_TEXT: &str = "\
Commands:
  /toggle          open or close the chat window
  /close           close button
  /backdrop        click outside the chat window
  /esc             press Escape
  /select <text>   select text on the page
  /unselect        clear the page selection
  /quit            exit
Anything else is typed into the message box and sent with Enter.
End a line with \\ to continue the message on the next line.";
