#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for snake-pilot adapters.

use anyhow::Result as AnyResult;
use snake_pilot_core::{CellCoord, Command, Direction};
use std::{error::Error, fmt, ops::ControlFlow, str::FromStr, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Byte RGB channels with alpha premultiplied against black.
    #[must_use]
    pub fn to_rgb_u8(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
            .map(|channel| (channel * self.alpha * 255.0).round().clamp(0.0, 255.0) as u8)
    }
}

/// Colors assigned to every element of a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Color of empty cells.
    pub background: Color,
    /// Fill of trailing body segments.
    pub body: Color,
    /// Fill of the head segment.
    pub head: Color,
    /// Fill of the goal cell.
    pub goal: Color,
    /// Fill of obstacle cells.
    pub obstacle: Color,
    /// Banner text.
    pub text: Color,
    /// Score text.
    pub score_text: Color,
    /// Status text while the autopilot steers.
    pub autopilot_on: Color,
    /// Status text while the player steers.
    pub autopilot_off: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::from_rgb_u8(40, 40, 40),
            body: Color::from_rgb_u8(0, 255, 127),
            head: Color::from_rgb_u8(0, 200, 100),
            goal: Color::from_rgb_u8(255, 69, 0),
            obstacle: Color::from_rgb_u8(138, 43, 226),
            text: Color::from_rgb_u8(255, 255, 255),
            score_text: Color::from_rgb_u8(255, 215, 0),
            autopilot_on: Color::from_rgb_u8(0, 255, 0),
            autopilot_off: Color::from_rgb_u8(255, 0, 0),
        }
    }
}

/// Single key press understood by the adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Arrow key requesting a manual turn.
    Arrow(Direction),
    /// Flips the autopilot.
    ToggleAutopilot,
    /// Starts a fresh episode.
    Restart,
    /// Stops the adapter.
    Quit,
}

impl FromStr for Key {
    type Err = RenderingError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let key = match token.trim().to_ascii_lowercase().as_str() {
            "up" | "w" => Self::Arrow(Direction::Up),
            "down" | "s" => Self::Arrow(Direction::Down),
            "left" | "h" => Self::Arrow(Direction::Left),
            "right" | "l" => Self::Arrow(Direction::Right),
            "a" | "autopilot" => Self::ToggleAutopilot,
            "r" | "restart" => Self::Restart,
            "q" | "quit" | "esc" | "escape" => Self::Quit,
            other => {
                return Err(RenderingError::UnknownKey {
                    token: other.to_owned(),
                })
            }
        };
        Ok(key)
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Latest arrow key pressed on this frame.
    pub turn: Option<Direction>,
    /// Whether the adapter detected an autopilot toggle on this frame.
    pub toggle_autopilot: bool,
    /// Whether the adapter detected a restart request on this frame.
    pub restart: bool,
    /// Whether the adapter detected a quit request on this frame.
    pub quit: bool,
}

impl FrameInput {
    /// Records a key press; later arrow keys replace earlier ones.
    pub fn press(&mut self, key: Key) {
        match key {
            Key::Arrow(direction) => self.turn = Some(direction),
            Key::ToggleAutopilot => self.toggle_autopilot = !self.toggle_autopilot,
            Key::Restart => self.restart = true,
            Key::Quit => self.quit = true,
        }
    }

    /// Commands to apply before the frame's tick, in application order.
    ///
    /// A restart comes first so the remaining input targets the new episode.
    /// Quit never becomes a command.
    #[must_use]
    pub fn commands(&self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(3);
        if self.restart {
            commands.push(Command::Restart);
        }
        if self.toggle_autopilot {
            commands.push(Command::ToggleAutopilot);
        }
        if let Some(direction) = self.turn {
            commands.push(Command::Turn { direction });
        }
        commands
    }
}

/// Describes the lattice presented by an adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
}

impl GridPresentation {
    /// Creates a new grid descriptor.
    ///
    /// Returns an error when either extent is zero.
    pub fn new(columns: u32, rows: u32) -> Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyGrid { columns, rows });
        }

        Ok(Self { columns, rows })
    }
}

/// What a single cell shows in a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellRole {
    /// Nothing occupies the cell.
    Empty,
    /// A static obstacle.
    Obstacle,
    /// The goal.
    Goal,
    /// A trailing body segment.
    Body,
    /// The head segment.
    Head,
}

impl CellRole {
    /// Character used by text adapters.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Obstacle => '#',
            Self::Goal => '*',
            Self::Body => 'o',
            Self::Head => '@',
        }
    }

    /// Fill color of the glyph, if the cell is drawn at all.
    #[must_use]
    pub const fn fill(self, palette: &Palette) -> Option<Color> {
        match self {
            Self::Empty => None,
            Self::Obstacle => Some(palette.obstacle),
            Self::Goal => Some(palette.goal),
            Self::Body => Some(palette.body),
            Self::Head => Some(palette.head),
        }
    }
}

/// Status strip content shown below the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct StatusLine {
    /// Goals consumed this episode.
    pub score: u32,
    /// Whether the autopilot steers the agent.
    pub autopilot_on: bool,
    /// Whether the episode has ended.
    pub game_over: bool,
    /// Ticks per second the episode runs at.
    pub tick_rate: u32,
}

impl StatusLine {
    /// Score line, e.g. `SCORE: 3`.
    #[must_use]
    pub fn score_text(&self) -> String {
        format!("SCORE: {}", self.score)
    }

    /// Autopilot line.
    #[must_use]
    pub const fn autopilot_text(&self) -> &'static str {
        if self.autopilot_on {
            "AUTOPILOT: ON"
        } else {
            "AUTOPILOT: OFF"
        }
    }

    /// Color of the autopilot line.
    #[must_use]
    pub const fn autopilot_color(&self, palette: &Palette) -> Color {
        if self.autopilot_on {
            palette.autopilot_on
        } else {
            palette.autopilot_off
        }
    }

    /// Banner lines drawn over the grid once the episode is over.
    #[must_use]
    pub fn banner(&self) -> Option<[String; 3]> {
        self.game_over.then(|| {
            [
                "GAME OVER".to_owned(),
                format!("Final Score: {}", self.score),
                "Press 'R' to Restart".to_owned(),
            ]
        })
    }
}

/// Scene description combining the grid, its occupants, and the status strip.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid that composes the play area.
    pub grid: GridPresentation,
    /// Agent body segments, head first.
    pub agent: Vec<CellCoord>,
    /// Heading of the agent.
    pub heading: Direction,
    /// Cell holding the goal.
    pub goal: CellCoord,
    /// Obstacle cells.
    pub obstacles: Vec<CellCoord>,
    /// Status strip content.
    pub status: StatusLine,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        grid: GridPresentation,
        agent: Vec<CellCoord>,
        heading: Direction,
        goal: CellCoord,
        obstacles: Vec<CellCoord>,
        status: StatusLine,
    ) -> Self {
        Self {
            grid,
            agent,
            heading,
            goal,
            obstacles,
            status,
        }
    }

    /// Role of `cell` in this frame.
    ///
    /// The head wins over everything else so a crash stays visible.
    #[must_use]
    pub fn cell_role(&self, cell: CellCoord) -> CellRole {
        match self.agent.iter().position(|segment| *segment == cell) {
            Some(0) => CellRole::Head,
            Some(_) => CellRole::Body,
            None if self.goal == cell => CellRole::Goal,
            None if self.obstacles.contains(&cell) => CellRole::Obstacle,
            None => CellRole::Empty,
        }
    }

    /// Text rows of the grid, top row first.
    #[must_use]
    pub fn text_rows(&self) -> Vec<String> {
        (0..self.grid.rows)
            .map(|row| {
                (0..self.grid.columns)
                    .map(|column| self.cell_role(CellCoord::new(column, row)).glyph())
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.text_rows() {
            writeln!(f, "{row}")?;
        }
        writeln!(f, "{}", self.status.score_text())?;
        write!(f, "{}", self.status.autopilot_text())?;
        if let Some(banner) = self.status.banner() {
            for line in banner {
                write!(f, "\n{line}")?;
            }
        }
        Ok(())
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title printed before the first frame.
    pub window_title: String,
    /// Colors used for every element of a frame.
    pub palette: Palette,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, palette: Palette, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            palette,
            scene,
        }
    }
}

/// Rendering backend capable of presenting snake-pilot scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until `update_scene` breaks or the backend
    /// is requested to exit.
    ///
    /// The provided `update_scene` closure receives the delay since the
    /// previous frame, per-frame input captured by the adapter, and may mutate
    /// the scene before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> ControlFlow<()> + 'static;
}

/// Errors that can occur when constructing rendering descriptors or parsing input.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// The grid must have at least one row and one column.
    EmptyGrid {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// An input token did not name a known key.
    UnknownKey {
        /// Token as received.
        token: String,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { columns, rows } => {
                write!(f, "grid must not be empty (received {columns}x{rows})")
            }
            Self::UnknownKey { token } => write!(f, "unknown key `{token}`"),
        }
    }
}

impl Error for RenderingError {}
