use crate::command::Command;

/// Which pane keyboard input lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PaneFocus {
    Volumes,
    Favourites,
    Files,
}

impl PaneFocus {
    pub(super) fn next(self) -> Self {
        match self {
            PaneFocus::Volumes => PaneFocus::Favourites,
            PaneFocus::Favourites => PaneFocus::Files,
            PaneFocus::Files => PaneFocus::Volumes,
        }
    }

    pub(super) fn previous(self) -> Self {
        match self {
            PaneFocus::Volumes => PaneFocus::Files,
            PaneFocus::Favourites => PaneFocus::Volumes,
            PaneFocus::Files => PaneFocus::Favourites,
        }
    }
}

/// What the one-line prompt at the top is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PromptKind {
    /// A name for a command that creates something (new-folder, new-file).
    Name(Command),
    /// A raw command identifier.
    Command,
    /// A path to jump to.
    JumpTo,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub(super) enum AppMode {
    Normal,
    Prompt(PromptKind),
}
