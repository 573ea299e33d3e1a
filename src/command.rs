use std::fmt;

/// The closed set of commands the UI can dispatch. String identifiers from
/// key tables or the command prompt resolve through [`Command::parse`];
/// anything unrecognized stays `None` and the caller logs and ignores it,
/// so a stale binding can never take the app down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Copy,
    Cut,
    Paste,
    Symlink,
    Hardlink,
    CopyPath,
    AddFavourite,
    ReadOnly,
    ReadWrite,
    NewFolder,
    NewFile,
    MoveToBin,
    DeleteForever,
    SelectAll,
    SelectNone,
    InvertSelection,
    Open,
    Edit,
    History,
    /// Runs the configured script in slot 1..=9.
    Script(u8),
    EditConfigFile,
    Back,
    Forward,
    Refresh,
    Up,
}

impl Command {
    pub fn parse(id: &str) -> Option<Command> {
        let cmd = match id {
            "copy" => Command::Copy,
            "cut" => Command::Cut,
            "paste" => Command::Paste,
            "symlink" => Command::Symlink,
            "hardlink" => Command::Hardlink,
            "copy-path" => Command::CopyPath,
            "add-favourite" => Command::AddFavourite,
            "read-only" => Command::ReadOnly,
            "read-write" => Command::ReadWrite,
            "new-folder" => Command::NewFolder,
            "new-file" => Command::NewFile,
            "move-to-bin" => Command::MoveToBin,
            "delete-forever" => Command::DeleteForever,
            "select-all" => Command::SelectAll,
            "select-none" => Command::SelectNone,
            "invert-selection" => Command::InvertSelection,
            "open" => Command::Open,
            "edit" => Command::Edit,
            "history" => Command::History,
            "edit-config-file" => Command::EditConfigFile,
            "back" => Command::Back,
            "forward" => Command::Forward,
            "refresh" => Command::Refresh,
            "up" => Command::Up,
            _ => {
                let slot = id.strip_prefix("script-")?.parse::<u8>().ok()?;
                if (1..=9).contains(&slot) {
                    Command::Script(slot)
                } else {
                    return None;
                }
            }
        };
        Some(cmd)
    }

    /// Commands that collect a name from the user before they can run.
    pub fn needs_name(self) -> bool {
        matches!(self, Command::NewFolder | Command::NewFile)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            Command::Copy => "copy",
            Command::Cut => "cut",
            Command::Paste => "paste",
            Command::Symlink => "symlink",
            Command::Hardlink => "hardlink",
            Command::CopyPath => "copy-path",
            Command::AddFavourite => "add-favourite",
            Command::ReadOnly => "read-only",
            Command::ReadWrite => "read-write",
            Command::NewFolder => "new-folder",
            Command::NewFile => "new-file",
            Command::MoveToBin => "move-to-bin",
            Command::DeleteForever => "delete-forever",
            Command::SelectAll => "select-all",
            Command::SelectNone => "select-none",
            Command::InvertSelection => "invert-selection",
            Command::Open => "open",
            Command::Edit => "edit",
            Command::History => "history",
            Command::Script(slot) => return write!(f, "script-{slot}"),
            Command::EditConfigFile => "edit-config-file",
            Command::Back => "back",
            Command::Forward => "forward",
            Command::Refresh => "refresh",
            Command::Up => "up",
        };
        f.write_str(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_identifier_round_trips_through_parse_and_display() {
        let ids = [
            "copy",
            "cut",
            "paste",
            "symlink",
            "hardlink",
            "copy-path",
            "add-favourite",
            "read-only",
            "read-write",
            "new-folder",
            "new-file",
            "move-to-bin",
            "delete-forever",
            "select-all",
            "select-none",
            "invert-selection",
            "open",
            "edit",
            "history",
            "script-1",
            "script-9",
            "edit-config-file",
            "back",
            "forward",
            "refresh",
            "up",
        ];
        for id in ids {
            let cmd = Command::parse(id).unwrap_or_else(|| panic!("{id} should parse"));
            assert_eq!(cmd.to_string(), id);
        }
    }

    #[test]
    fn unknown_identifiers_parse_to_none() {
        assert_eq!(Command::parse("rename"), None);
        assert_eq!(Command::parse("script-0"), None);
        assert_eq!(Command::parse("script-10"), None);
        assert_eq!(Command::parse("script-"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("Copy"), None);
    }

    #[test]
    fn only_the_creation_commands_need_a_name() {
        assert!(Command::NewFolder.needs_name());
        assert!(Command::NewFile.needs_name());
        assert!(!Command::Paste.needs_name());
        assert!(!Command::Script(3).needs_name());
    }
}
