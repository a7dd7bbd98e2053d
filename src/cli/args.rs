//! Command-line argument parsing for `ragflow-chat`.

/// Arguments of a chat invocation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatArgs {
    /// Assistant (chat) ID to ask
    pub chat_id: String,
    /// Question text; remaining positional arguments joined by spaces
    pub question: String,
    /// Existing session to continue
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    /// Print only the final answer instead of streaming deltas
    pub quiet: bool,
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Ask a question
    Chat(ChatArgs),
    /// Arguments could not be parsed; carries the reason
    Invalid(String),
}

pub const USAGE: &str = "\
usage: ragflow-chat [options] <chat_id> <question>...

options:
  -s, --session <id>   continue an existing session
  -u, --user <id>      user ID to attach to the session
  -q, --quiet          wait for the whole answer instead of streaming it
  -V, --version        print version
  -h, --help           print this help

environment:
  RAGFLOW_BASE_URL     API address (default http://localhost:9380)
  RAGFLOW_API_KEY      API key
  RAGFLOW_TIMEOUT_SECS timeout for non-streaming requests
  RUST_LOG             log filter, e.g. ragflow=debug";

/// Parse command-line arguments and return the command to run.
///
/// # Examples
///
/// ```
/// use ragflow::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["ragflow-chat".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut chat = ChatArgs::default();
    let mut positional = Vec::new();
    // Skip the program name
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            "--quiet" | "-q" => chat.quiet = true,
            "--session" | "-s" => match args.next() {
                Some(id) => chat.session_id = Some(id),
                None => return CliCommand::Invalid(format!("{} requires a value", arg)),
            },
            "--user" | "-u" => match args.next() {
                Some(id) => chat.user_id = Some(id),
                None => return CliCommand::Invalid(format!("{} requires a value", arg)),
            },
            flag if flag.starts_with("--") => {
                return CliCommand::Invalid(format!("unknown option {}", flag))
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let Some(chat_id) = positional.next() else {
        return CliCommand::Invalid("missing <chat_id>".to_string());
    };
    let question = positional.collect::<Vec<_>>().join(" ");
    if question.trim().is_empty() {
        return CliCommand::Invalid("missing <question>".to_string());
    }

    chat.chat_id = chat_id;
    chat.question = question;
    CliCommand::Chat(chat)
}
