use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use std::collections::HashMap;

use crate::game::{AgentId, Position, World};
use crate::metrics::EpisodeMetrics;

use super::frames::agent_symbol;
use super::palette::AGENT_RGB;

/// Directions of the trails through a cell and the agent that passed last
#[derive(Debug, Clone, Copy, Default)]
struct TrailMark {
    horizontal: bool,
    vertical: bool,
    agent_id: AgentId,
}

impl TrailMark {
    fn glyph(&self) -> &'static str {
        match (self.horizontal, self.vertical) {
            (true, true) => "┼ ",
            (true, false) => "─ ",
            _ => "│ ",
        }
    }
}

/// Trail marks of every cell touched by a trail segment
fn trail_marks(world: &World) -> HashMap<Position, TrailMark> {
    let mut marks: HashMap<Position, TrailMark> = HashMap::new();
    for segment in world.trails() {
        let horizontal = segment.old_pos.row == segment.new_pos.row;
        for pos in [segment.old_pos, segment.new_pos] {
            let mark = marks.entry(pos).or_default();
            if horizontal {
                mark.horizontal = true;
            } else {
                mark.vertical = true;
            }
            mark.agent_id = segment.agent_id;
        }
    }
    marks
}

/// Mode-specific values shown next to the grid
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    pub mode: &'static str,
    pub episode: usize,
    pub paused: bool,
    pub speed: Option<&'static str>,
    pub done: bool,
    pub last_reward: f64,
}

pub struct Renderer {
    palette: Vec<Color>,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            palette: AGENT_RGB.iter().map(|&[r, g, b]| Color::Rgb(r, g, b)).collect(),
        }
    }

    pub fn agent_color(&self, id: AgentId) -> Color {
        self.palette[id % self.palette.len()]
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        world: &World,
        metrics: &EpisodeMetrics,
        status: &StatusLine,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Grid
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(chunks[0], world, metrics, status);
        frame.render_widget(stats, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
            .split(chunks[1]);

        let grid = self.render_grid(body[0], world, status);
        frame.render_widget(grid, body[0]);

        let agents = self.render_agents(body[1], world);
        frame.render_widget(agents, body[1]);

        let controls = self.render_controls(chunks[2], status);
        frame.render_widget(controls, chunks[2]);
    }

    fn cell_span(
        &self,
        world: &World,
        marks: &HashMap<Position, TrailMark>,
        pos: Position,
    ) -> Span<'static> {
        if world.has_wall_at(pos) {
            return Span::styled("█ ", Style::default().fg(Color::Gray));
        }
        if let Some(agent) = world.agent_at(pos) {
            let color = if agent.collided {
                Color::Red
            } else {
                self.agent_color(agent.id)
            };
            return Span::styled(
                format!("{} ", agent_symbol(agent.id)),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            );
        }
        if let Some(mark) = marks.get(&pos) {
            return Span::styled(mark.glyph(), Style::default().fg(self.agent_color(mark.agent_id)));
        }
        match world.seen_cell(pos) {
            Some(seen) => Span::styled(
                "· ",
                Style::default().fg(self.agent_color(seen.agent_id)),
            ),
            None => Span::styled(". ", Style::default().fg(Color::DarkGray)),
        }
    }

    fn render_grid(&self, _area: Rect, world: &World, status: &StatusLine) -> Paragraph<'_> {
        let marks = trail_marks(world);
        let mut lines = Vec::with_capacity(world.rows());

        for row in 0..world.rows() {
            let spans: Vec<Span> = (0..world.cols())
                .map(|col| self.cell_span(world, &marks, Position::new(row as i32, col as i32)))
                .collect();
            lines.push(Line::from(spans));
        }

        let border = if status.done { Color::Red } else { Color::White };
        let title = format!(" {}x{} Grid ", world.rows(), world.cols());

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(border))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_agents(&self, _area: Rect, world: &World) -> Paragraph<'_> {
        let coverage = world.coverage();
        let mut lines = vec![Line::from("")];

        for agent in world.agents() {
            let share = coverage.per_agent.get(agent.id).copied().unwrap_or(0);
            lines.push(Line::from(vec![
                Span::styled(
                    agent.name(),
                    Style::default()
                        .fg(self.agent_color(agent.id))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(": {share}% | {} steps", agent.steps_taken)),
            ]));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Agents "),
        )
    }

    fn render_stats(
        &self,
        _area: Rect,
        world: &World,
        metrics: &EpisodeMetrics,
        status: &StatusLine,
    ) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let mut spans = vec![
            Span::styled(format!("[{}] ", status.mode), Style::default().fg(Color::Cyan)),
            Span::styled("Coverage: ", label),
            Span::styled(
                format!("{}%", world.coverage().overall),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Episode: ", label),
            Span::styled(status.episode.to_string(), value),
            Span::raw("    "),
            Span::styled("Reward: ", label),
            Span::styled(format!("{:.2}", status.last_reward), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(format!("{}%", metrics.best_coverage), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
        ];

        if let Some(speed) = status.speed {
            spans.push(Span::raw("    "));
            spans.push(Span::styled("Speed: ", label));
            spans.push(Span::styled(speed, value));
        }
        if status.paused {
            spans.push(Span::styled(
                "  PAUSED",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        } else if status.done {
            spans.push(Span::styled(
                "  DONE",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ));
        }

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }

    fn render_controls(&self, _area: Rect, status: &StatusLine) -> Paragraph<'_> {
        let mut spans = Vec::new();
        if status.speed.is_some() {
            spans.extend([
                Span::styled("Space", Style::default().fg(Color::Cyan)),
                Span::raw(" pause | "),
                Span::styled("1-4", Style::default().fg(Color::Cyan)),
                Span::raw(" speed | "),
            ]);
        } else {
            spans.extend([
                Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
                Span::raw(" or "),
                Span::styled("WASD", Style::default().fg(Color::Cyan)),
                Span::raw(" to move | "),
                Span::styled("X", Style::default().fg(Color::Cyan)),
                Span::raw(" wait | "),
            ]);
        }
        spans.extend([
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" reset | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ]);

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
