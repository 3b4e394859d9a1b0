#[derive(Debug, Clone)]
pub enum Command {
    Panel(Option<String>), // /panel <id> | /panel | /panel -
    Panels,                // /panels
    Clear,                 // /clear
    Save,                  // /save
    Sessions(Option<String>), // /sessions [panel-id]
    Load(String),          // /load <session-id>
    Search(String),        // /search <query>
    Help,                  // /help
    Quit,                  // /quit or /exit
    Unknown(String),
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Command::Unknown(trimmed.to_string());
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match verb {
        "/panel" => match rest {
            None => Command::Panel(None),
            Some("-") => Command::Panel(Some(String::new())),
            Some(id) => Command::Panel(Some(id.to_string())),
        },
        "/panels" => Command::Panels,
        "/clear" => Command::Clear,
        "/save" => Command::Save,
        "/sessions" => Command::Sessions(rest.map(str::to_string)),
        "/load" => match rest {
            Some(id) => Command::Load(id.to_string()),
            None => Command::Unknown(trimmed.to_string()),
        },
        "/search" => match rest {
            Some(query) => Command::Search(query.to_string()),
            None => Command::Unknown(trimmed.to_string()),
        },
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_variants() {
        assert!(matches!(parse_command("/panel"), Command::Panel(None)));
        assert!(
            matches!(parse_command("/panel micro-lesson"), Command::Panel(Some(id)) if id == "micro-lesson")
        );
        assert!(matches!(parse_command("/panel -"), Command::Panel(Some(id)) if id.is_empty()));
    }

    #[test]
    fn search_requires_a_query() {
        assert!(matches!(parse_command("/search"), Command::Unknown(_)));
        assert!(
            matches!(parse_command("/search rust jobs"), Command::Search(q) if q == "rust jobs")
        );
    }
}
