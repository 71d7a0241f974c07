use crate::session::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Seconds moved by shift+arrow
pub const JUMP_SECONDS: f64 = 1.0;

/// Translate a key press into a session command.
///
/// Any character not bound to a command becomes [`Command::SelectHotkey`];
/// the session resolves it against whatever catalog it holds.
pub fn map_key(key: KeyEvent) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    let command = match key.code {
        KeyCode::Char('c') if ctrl => Command::Quit,
        KeyCode::Char('s') if ctrl => Command::Save,
        _ if ctrl => return None,

        KeyCode::Left if shift => Command::Jump(-JUMP_SECONDS),
        KeyCode::Right if shift => Command::Jump(JUMP_SECONDS),
        KeyCode::Left => Command::StepFrames(-1),
        KeyCode::Right => Command::StepFrames(1),
        KeyCode::Up => Command::ListUp,
        KeyCode::Down => Command::ListDown,
        KeyCode::Enter => Command::Commit,
        KeyCode::Backspace | KeyCode::Delete => Command::ClearMarks,
        KeyCode::Esc => Command::CancelSelection,

        KeyCode::Char(' ') => Command::TogglePlay,
        KeyCode::Char('[') => Command::MarkIn,
        KeyCode::Char(']') => Command::MarkOut,
        KeyCode::Char('+') | KeyCode::Char('=') => Command::ZoomIn,
        KeyCode::Char('-') => Command::ZoomOut,
        KeyCode::Char('<') | KeyCode::Char(',') => Command::SpeedDown,
        KeyCode::Char('>') | KeyCode::Char('.') => Command::SpeedUp,
        KeyCode::Char('?') => Command::ToggleHelp,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'n' => Command::NextVideo,
            'p' => Command::PreviousVideo,
            's' => Command::ToggleSort,
            'f' => Command::CycleFilter,
            'e' => Command::EditSelected,
            'x' => Command::DeleteSelected,
            'w' => Command::Export,
            'v' => Command::ToggleExportPreview,
            'c' => Command::ToggleComplete,
            'q' => Command::Quit,
            _ => Command::SelectHotkey(c),
        },
        _ => return None,
    };

    Some(command)
}

/// Rows shown in the help overlay
pub const HELP_ENTRIES: &[(&str, &str)] = &[
    ("Space", "Play / pause"),
    ("← / →", "Step one frame"),
    ("Shift+← / →", "Jump one second"),
    ("[", "Mark in at playhead"),
    ("]", "Mark out at playhead"),
    ("1-0, O, D, I", "Select action"),
    ("Enter", "Save segment"),
    ("Backspace", "Clear marks"),
    ("Esc", "Cancel selection / close overlay"),
    ("+ / -", "Zoom timeline"),
    ("< / >", "Playback speed"),
    ("↑ / ↓", "Move in segment list"),
    ("e / x", "Edit / delete highlighted segment"),
    ("s / f", "Sort / filter segment list"),
    ("n / p", "Next / previous video"),
    ("c", "Toggle video complete"),
    ("v", "Preview export"),
    ("w", "Write export file"),
    ("Ctrl+S", "Save progress"),
    ("?", "Toggle this help"),
    ("q", "Quit"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ch(c: char) -> Option<Command> {
        map_key(key(KeyCode::Char(c)))
    }

    #[test]
    fn test_transport_keys() {
        assert_eq!(ch(' '), Some(Command::TogglePlay));
        assert_eq!(map_key(key(KeyCode::Left)), Some(Command::StepFrames(-1)));
        assert_eq!(map_key(key(KeyCode::Right)), Some(Command::StepFrames(1)));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT)),
            Some(Command::Jump(-1.0))
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT)),
            Some(Command::Jump(1.0))
        );
    }

    #[test]
    fn test_marking_keys() {
        assert_eq!(ch('['), Some(Command::MarkIn));
        assert_eq!(ch(']'), Some(Command::MarkOut));
        assert_eq!(map_key(key(KeyCode::Enter)), Some(Command::Commit));
        assert_eq!(map_key(key(KeyCode::Backspace)), Some(Command::ClearMarks));
        assert_eq!(map_key(key(KeyCode::Delete)), Some(Command::ClearMarks));
        assert_eq!(map_key(key(KeyCode::Esc)), Some(Command::CancelSelection));
    }

    #[test]
    fn test_action_hotkeys_in_either_case() {
        for c in "1234567890".chars() {
            assert_eq!(ch(c), Some(Command::SelectHotkey(c)));
        }
        assert_eq!(ch('o'), Some(Command::SelectHotkey('o')));
        assert_eq!(ch('D'), Some(Command::SelectHotkey('D')));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('I'), KeyModifiers::SHIFT)),
            Some(Command::SelectHotkey('I'))
        );
    }

    #[test]
    fn test_view_and_list_keys() {
        assert_eq!(ch('+'), Some(Command::ZoomIn));
        assert_eq!(ch('='), Some(Command::ZoomIn));
        assert_eq!(ch('-'), Some(Command::ZoomOut));
        assert_eq!(ch('<'), Some(Command::SpeedDown));
        assert_eq!(ch('>'), Some(Command::SpeedUp));
        assert_eq!(ch('s'), Some(Command::ToggleSort));
        assert_eq!(ch('f'), Some(Command::CycleFilter));
        assert_eq!(map_key(key(KeyCode::Up)), Some(Command::ListUp));
        assert_eq!(map_key(key(KeyCode::Down)), Some(Command::ListDown));
        assert_eq!(ch('e'), Some(Command::EditSelected));
        assert_eq!(ch('x'), Some(Command::DeleteSelected));
    }

    #[test]
    fn test_session_keys() {
        assert_eq!(ch('n'), Some(Command::NextVideo));
        assert_eq!(ch('p'), Some(Command::PreviousVideo));
        assert_eq!(ch('?'), Some(Command::ToggleHelp));
        assert_eq!(ch('v'), Some(Command::ToggleExportPreview));
        assert_eq!(ch('w'), Some(Command::Export));
        assert_eq!(ch('c'), Some(Command::ToggleComplete));
        assert_eq!(ch('q'), Some(Command::Quit));
    }

    #[test]
    fn test_control_chords() {
        let ctrl = |c| map_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
        assert_eq!(ctrl('c'), Some(Command::Quit));
        assert_eq!(ctrl('s'), Some(Command::Save));
        assert_eq!(ctrl('1'), None);
    }

    #[test]
    fn test_unbound_characters_fall_through_to_hotkeys() {
        assert_eq!(ch('z'), Some(Command::SelectHotkey('z')));
        assert_eq!(ch('é'), Some(Command::SelectHotkey('é')));
        // command letters still win
        assert_eq!(ch('N'), Some(Command::NextVideo));
    }

    #[test]
    fn test_unbound_keys() {
        assert_eq!(map_key(key(KeyCode::Tab)), None);
        assert_eq!(map_key(key(KeyCode::F(1))), None);
    }
}
