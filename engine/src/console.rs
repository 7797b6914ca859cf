//! Line commands typed on stdin by the runner binary.

use crate::mutation::Side;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Buy or sell with the raw amount text; parsing happens in the engine.
    Trade(Side, String),
    Show,
    Start,
    Stop,
    Quit,
}

/// `None` for blank or unknown lines.
pub fn parse_command(line: &str) -> Option<ConsoleCommand> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?.to_ascii_lowercase();
    let rest = parts.collect::<Vec<_>>().join(" ");

    match verb.as_str() {
        "buy" | "b" => Some(ConsoleCommand::Trade(Side::Buy, rest)),
        "sell" | "s" => Some(ConsoleCommand::Trade(Side::Sell, rest)),
        "show" => Some(ConsoleCommand::Show),
        "start" => Some(ConsoleCommand::Start),
        "stop" => Some(ConsoleCommand::Stop),
        "quit" | "exit" | "q" => Some(ConsoleCommand::Quit),
        _ => None,
    }
}
