//! Parsing of the single-line commands typed at the interactive prompt.

pub const HELP: &str = "\
Commands:
  1, 2                   choose the first or second item
  u, undo                undo the last choice
  r, replace <item>      re-ask every remembered choice involving <item>
  d, delete <item>       forget every remembered choice involving <item>
  n, rename <old> => <new>
                         rename an item everywhere
  o, optimize            reorder the ranking by win rate
  l, list                show the ranking so far
  a, all                 show every item, sorted
  s, save                save the session file
  ?, help                show this help
  q, quit                finish and print the ranking";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ChooseFirst,
    ChooseSecond,
    Undo,
    Replace(String),
    Delete(String),
    Rename { old: String, new: String },
    Optimize,
    List,
    All,
    Save,
    Help,
    Quit,
}

fn argument(verb: &str, rest: &str) -> Result<String, String> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(format!("'{verb}' needs an item name"));
    }
    Ok(rest.to_string())
}

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    match verb {
        "1" => Ok(Command::ChooseFirst),
        "2" => Ok(Command::ChooseSecond),
        "u" | "undo" => Ok(Command::Undo),
        "r" | "replace" => argument(verb, rest).map(Command::Replace),
        "d" | "delete" => argument(verb, rest).map(Command::Delete),
        "n" | "rename" => {
            let (old, new) = rest
                .split_once("=>")
                .ok_or_else(|| format!("usage: {verb} <old> => <new>"))?;
            Ok(Command::Rename { old: argument(verb, old)?, new: new.trim().to_string() })
        }
        "o" | "optimize" => Ok(Command::Optimize),
        "l" | "list" => Ok(Command::List),
        "a" | "all" => Ok(Command::All),
        "s" | "save" => Ok(Command::Save),
        "?" | "h" | "help" => Ok(Command::Help),
        "q" | "quit" | "exit" => Ok(Command::Quit),
        "" => Err("type 1 or 2 to choose, or ? for help".to_string()),
        other => Err(format!("unknown command '{other}', type ? for help")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("1"), Ok(Command::ChooseFirst));
        assert_eq!(parse(" 2 "), Ok(Command::ChooseSecond));
        assert_eq!(parse("undo"), Ok(Command::Undo));
        assert_eq!(parse("q"), Ok(Command::Quit));
    }

    #[test]
    fn test_item_arguments_keep_inner_spaces() {
        assert_eq!(parse("r  The Matrix "), Ok(Command::Replace("The Matrix".into())));
        assert_eq!(parse("delete Star Wars"), Ok(Command::Delete("Star Wars".into())));
    }

    #[test]
    fn test_missing_argument_is_rejected() {
        assert!(parse("r").is_err());
        assert!(parse("delete   ").is_err());
    }

    #[test]
    fn test_rename_splits_on_arrow() {
        assert_eq!(
            parse("n Star Wars => Star Wars IV"),
            Ok(Command::Rename { old: "Star Wars".into(), new: "Star Wars IV".into() })
        );
        assert!(parse("rename Star Wars").is_err());
    }

    #[test]
    fn test_unknown_and_empty_input() {
        assert!(parse("").unwrap_err().contains("type 1 or 2"));
        assert!(parse("jump").unwrap_err().contains("unknown command 'jump'"));
    }
}
