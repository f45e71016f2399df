use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy)]
pub struct ViewerRects {
    pub top: Rect,
    pub stage: Rect,
    pub status: Rect,
    pub log: Rect,
    pub help: Rect,
}

/// Split the screen into a title bar, a stage row (phase strip + status
/// panel) and a log tail, with a one-line key help at the bottom.
pub fn viewer_layout(area: Rect, log_height: u16) -> ViewerRects {
    let log_height = log_height.max(3).min(area.height.saturating_sub(6).max(3));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),          // title bar
            Constraint::Min(5),             // stage
            Constraint::Length(log_height), // log tail
            Constraint::Length(1),          // key help
        ])
        .split(area);

    let stage_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    ViewerRects {
        top: rows[0],
        stage: stage_cols[0],
        status: stage_cols[1],
        log: rows[2],
        help: rows[3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_cover_the_full_height() {
        let area = Rect::new(0, 0, 80, 30);
        let rects = viewer_layout(area, 8);
        assert_eq!(rects.top.height, 1);
        assert_eq!(rects.help.height, 1);
        assert_eq!(rects.log.height, 8);
        assert_eq!(rects.stage.height, 30 - 1 - 8 - 1);
        assert_eq!(rects.stage.width + rects.status.width, 80);
    }

    #[test]
    fn log_height_shrinks_on_small_screens() {
        let rects = viewer_layout(Rect::new(0, 0, 40, 10), 20);
        assert!(rects.log.height <= 4, "log height was {}", rects.log.height);
    }
}
