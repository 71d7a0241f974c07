use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use strikemark::catalog::{ActionCatalog, ActionCategory, ActionId};

use super::timeline::category_color;

/// Actions grouped by category with their hotkeys
pub struct ActionPanel<'a> {
    pub catalog: &'a ActionCatalog,
    pub selected: Option<ActionId>,
    pub flashed: Option<char>,
}

impl ActionPanel<'_> {
    fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![];
        for category in ActionCategory::ALL {
            let color = category_color(Some(category));
            lines.push(Line::from(Span::styled(
                category.heading(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));

            for action in self.catalog.by_category(category) {
                let flashed = self.flashed.is_some_and(|k| action.matches_hotkey(k));
                let selected = self.selected == Some(action.id);

                let key_style = if flashed {
                    Style::default().fg(color).add_modifier(Modifier::REVERSED | Modifier::BOLD)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };
                let name_style = if selected {
                    Style::default().fg(color).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default()
                };

                lines.push(Line::from(vec![
                    Span::raw(if selected { "▶ " } else { "  " }),
                    Span::styled(format!("[{}]", action.hotkey), key_style),
                    Span::raw(" "),
                    Span::styled(action.name.clone(), name_style),
                ]));
            }
        }
        lines
    }
}

impl Widget for ActionPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Actions ({}) ", self.catalog.name()));
        Paragraph::new(self.lines()).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_lists_every_action_under_its_heading() {
        let catalog = ActionCatalog::boxing();
        let panel = ActionPanel {
            catalog: &catalog,
            selected: Some(4),
            flashed: None,
        };
        let lines = panel.lines();
        // 4 headings + 13 actions
        assert_eq!(lines.len(), 17);

        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(text[0], "STRAIGHTS");
        assert!(text.iter().any(|l| l == "▶ [5] Lead Hook to Head"));
        assert!(text.iter().any(|l| l == "  [O] Overhand"));
    }
}
