//! Line parser: one input line to one [`Command`]

pub const UNKNOWN_COMMAND: &str = "Unknown command. Try: go, look, examine, request, initiate, quit";

pub const HELP: [&str; 4] = [
    "Move with go <direction> or just the direction: aft, fore, port, starboard, up, down, out, in.",
    "Look around with look, examine <item>, and i for your inventory.",
    "Handle gear with take, drop, wear and remove.",
    "On the bridge: request docking, initiate docking. In the airlock: cycle airlock. Leave with quit.",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Go(String),
    Look,
    Examine(String),
    Request(String),
    Initiate(String),
    Inventory,
    Take(String),
    Drop(String),
    Wear(String),
    Remove(String),
    Cycle(String),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    /// Lowercases and trims, then splits into verb and argument.
    pub fn parse(line: &str) -> Self {
        let input = line.trim().to_lowercase();
        let (verb, argument) = match input.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim().to_string()),
            None => (input.as_str(), String::new()),
        };

        match verb {
            "" => Command::Empty,
            "go" | "move" | "walk" => Command::Go(expand_direction(&argument).to_string()),
            "look" | "l" => Command::Look,
            "examine" | "x" => Command::Examine(argument),
            "request" => Command::Request(argument),
            "initiate" => Command::Initiate(argument),
            "i" | "inventory" => Command::Inventory,
            "get" | "take" => Command::Take(argument),
            "drop" => Command::Drop(argument),
            "wear" | "don" => Command::Wear(argument),
            "remove" | "doff" => Command::Remove(argument),
            "cycle" => Command::Cycle(argument),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => match direction_alias(other) {
                Some(direction) if argument.is_empty() => Command::Go(direction.to_string()),
                _ => Command::Unknown(input.clone()),
            },
        }
    }
}

fn direction_alias(word: &str) -> Option<&'static str> {
    let direction = match word {
        "a" | "aft" => "aft",
        "f" | "fore" => "fore",
        "p" | "port" => "port",
        "s" | "starboard" => "starboard",
        "u" | "up" => "up",
        "d" | "down" => "down",
        "o" | "out" => "out",
        "in" => "in",
        _ => return None,
    };
    Some(direction)
}

fn expand_direction(word: &str) -> &str {
    direction_alias(word).unwrap_or(word)
}
