/// One line of shell input: either an inspection command or an edit
/// instruction handed to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ShowPage,
    ShowCss,
    ShowEvents,
    ShowTranscript,
    Quit,
    Instruction(String),
}

pub fn parse_command(line: &str) -> Command {
    match line.trim() {
        ":page" => Command::ShowPage,
        ":css" => Command::ShowCss,
        ":events" => Command::ShowEvents,
        ":transcript" => Command::ShowTranscript,
        ":quit" | ":q" => Command::Quit,
        other => Command::Instruction(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colon_commands_are_recognized() {
        assert_eq!(parse_command(" :page "), Command::ShowPage);
        assert_eq!(parse_command(":q"), Command::Quit);
    }

    #[test]
    fn anything_else_is_an_instruction() {
        assert_eq!(
            parse_command("make the heading red"),
            Command::Instruction("make the heading red".to_string())
        );
        assert_eq!(parse_command("   "), Command::Instruction(String::new()));
    }
}
