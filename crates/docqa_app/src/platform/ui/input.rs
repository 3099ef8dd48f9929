use std::path::PathBuf;

use docqa_core::Msg;

use super::constants::{CMD_FILE, CMD_HELP, CMD_QUIT, CMD_UPLOAD};

/// What one line typed at the prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// Messages applied together, then rendered once.
    Dispatch(Vec<Msg>),
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_line(line: &str) -> InputCommand {
    let line = line.trim_end_matches(['\r', '\n']);
    // A bare Enter submits whatever the input currently holds.
    if line.is_empty() {
        return InputCommand::Dispatch(vec![Msg::QuestionSubmitted]);
    }

    let Some(command) = line.trim_start().strip_prefix(':') else {
        return InputCommand::Dispatch(vec![
            Msg::QuestionChanged(line.to_string()),
            Msg::QuestionSubmitted,
        ]);
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, unquote(arg.trim())),
        None => (command, ""),
    };
    match name {
        CMD_QUIT | "q" | "exit" => InputCommand::Quit,
        CMD_HELP | "h" | "?" => InputCommand::Help,
        CMD_FILE if arg.is_empty() => InputCommand::Unknown(format!(":{CMD_FILE} needs a path")),
        CMD_FILE => InputCommand::Dispatch(vec![Msg::FileSelected(PathBuf::from(arg))]),
        CMD_UPLOAD if arg.is_empty() => InputCommand::Dispatch(vec![Msg::UploadClicked]),
        CMD_UPLOAD => InputCommand::Dispatch(vec![
            Msg::FileSelected(PathBuf::from(arg)),
            Msg::UploadClicked,
        ]),
        other => InputCommand::Unknown(format!("unknown command :{other}")),
    }
}

fn unquote(arg: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = arg
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    arg
}
