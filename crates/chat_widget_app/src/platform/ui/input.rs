use super::constants::*;

/// One line of terminal input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Toggle,
    Close,
    Backdrop,
    Escape,
    Select(String),
    Unselect,
    Help,
    Quit,
    /// Text typed into the message box, submitted with Enter.
    Submit(String),
    /// Text typed into the message box followed by Shift+Enter.
    Continue(String),
}

pub(crate) fn parse_line(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    let (head, rest) = match line.split_once(' ') {
        Some((head, rest)) => (head, rest),
        None => (line, ""),
    };
    match head {
        CMD_TOGGLE => Command::Toggle,
        CMD_CLOSE => Command::Close,
        CMD_BACKDROP => Command::Backdrop,
        CMD_ESCAPE => Command::Escape,
        CMD_SELECT => Command::Select(rest.to_string()),
        CMD_UNSELECT => Command::Unselect,
        CMD_HELP => Command::Help,
        CMD_QUIT => Command::Quit,
        _ => match line.strip_suffix(LINE_CONTINUATION) {
            Some(partial) => Command::Continue(partial.to_string()),
            None => Command::Submit(line.to_string()),
        },
    }
}
