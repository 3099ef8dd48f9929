pub const CMD_FILE: &str = "file";
pub const CMD_UPLOAD: &str = "upload";
pub const CMD_HELP: &str = "help";
pub const CMD_QUIT: &str = "quit";

pub const HELP_TEXT: &str = "\
Commands:
  :file <path>      select a PDF
  :upload [path]    upload the selected PDF (or select and upload <path>)
  :help             show this help
  :quit             exit
Any other line is sent as a question about the loaded document.
An empty line resends the question kept after a failed request.";
