//! Headless backend that writes frames as text.

use std::{
    collections::VecDeque,
    fmt::{self, Write as _},
    io::Write,
    ops::ControlFlow,
    thread,
    time::Duration,
};

use anyhow::{Context, Result as AnyResult};
use snake_pilot_core::{tick_interval, CellCoord};
use snake_pilot_rendering::{Color, FrameInput, Palette, Presentation, RenderingBackend, Scene};

const RESET: &str = "\x1b[0m";

/// How frames are printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FrameStyle {
    /// Nothing is printed.
    Hidden,
    /// Bare glyph grids.
    Plain,
    /// Glyph grids tinted with the palette through ANSI escapes.
    Colored,
}

/// Rendering backend that runs frames back to back, optionally at the
/// score-dependent tick rate, and prints them as glyph grids.
#[derive(Debug)]
pub(crate) struct TextBackend<W> {
    out: W,
    paced: bool,
    style: FrameStyle,
    inputs: VecDeque<FrameInput>,
}

impl<W: Write> TextBackend<W> {
    pub(crate) fn new<I>(out: W, paced: bool, style: FrameStyle, inputs: I) -> Self
    where
        I: IntoIterator<Item = FrameInput>,
    {
        Self {
            out,
            paced,
            style,
            inputs: inputs.into_iter().collect(),
        }
    }

    fn draw(&mut self, scene: &Scene, palette: &Palette) -> AnyResult<()> {
        let written = match self.style {
            FrameStyle::Hidden => return Ok(()),
            FrameStyle::Plain => writeln!(self.out, "{scene}\n"),
            FrameStyle::Colored => writeln!(self.out, "{}\n", paint(scene, palette)),
        };
        written.context("failed to write frame")
    }
}

fn tint(text: impl fmt::Display, color: Color) -> String {
    let [red, green, blue] = color.to_rgb_u8();
    format!("\x1b[38;2;{red};{green};{blue}m{text}{RESET}")
}

/// Scene rendered like its `Display` output, with every glyph and status line
/// wrapped in 24-bit foreground color escapes.
fn paint(scene: &Scene, palette: &Palette) -> String {
    let mut text = String::new();
    for row in 0..scene.grid.rows {
        for column in 0..scene.grid.columns {
            let role = scene.cell_role(CellCoord::new(column, row));
            let fill = role.fill(palette).unwrap_or(palette.background);
            text.push_str(&tint(role.glyph(), fill));
        }
        text.push('\n');
    }

    let status = &scene.status;
    let _ = writeln!(text, "{}", tint(status.score_text(), palette.score_text));
    text.push_str(&tint(status.autopilot_text(), status.autopilot_color(palette)));
    if let Some(banner) = status.banner() {
        for line in banner {
            text.push('\n');
            text.push_str(&tint(line, palette.text));
        }
    }
    text
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> ControlFlow<()> + 'static,
    {
        let Presentation {
            window_title,
            palette,
            mut scene,
        } = presentation;

        if self.style != FrameStyle::Hidden {
            writeln!(self.out, "{window_title}").context("failed to write title")?;
        }
        self.draw(&scene, &palette)?;

        let mut delay = Duration::ZERO;
        loop {
            if self.paced {
                thread::sleep(delay);
            }

            let input = self.inputs.pop_front().unwrap_or_default();
            let flow = update_scene(delay, input, &mut scene);
            self.draw(&scene, &palette)?;
            if flow.is_break() {
                break;
            }

            delay = tick_interval(scene.status.score);
        }

        self.out.flush().context("failed to flush output")
    }
}

#[cfg(test)]
mod tests {
    use snake_pilot_core::{CellCoord, Direction};
    use snake_pilot_rendering::{GridPresentation, Key, StatusLine};

    use super::*;

    fn presentation() -> Presentation {
        let grid = GridPresentation::new(3, 1).expect("valid grid");
        let scene = Scene::new(
            grid,
            vec![CellCoord::new(0, 0)],
            Direction::Right,
            CellCoord::new(2, 0),
            Vec::new(),
            StatusLine::default(),
        );
        Presentation::new("test", Palette::default(), scene)
    }

    #[test]
    fn renders_every_frame_until_break() {
        let mut out: Vec<u8> = Vec::new();
        let backend = TextBackend::new(&mut out, false, FrameStyle::Plain, Vec::<FrameInput>::new());
        let mut frames = 0;

        backend
            .run(presentation(), move |_, _, scene| {
                frames += 1;
                scene.agent[0] = CellCoord::new(frames, 0);
                if frames == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .expect("writing to a vec succeeds");

        let text = String::from_utf8(out).expect("utf-8 output");
        assert!(text.starts_with("test\n@.*\n"));
        assert!(text.contains(".@*\n"));
        assert!(text.contains("..@\n"));
    }

    #[test]
    fn silent_without_render_flag() {
        let mut out: Vec<u8> = Vec::new();
        TextBackend::new(&mut out, false, FrameStyle::Hidden, Vec::<FrameInput>::new())
            .run(presentation(), |_, _, _| ControlFlow::Break(()))
            .expect("writing to a vec succeeds");

        assert!(out.is_empty());
    }

    #[test]
    fn scripted_inputs_are_fed_one_per_frame() {
        let mut first = FrameInput::default();
        first.press(Key::Arrow(Direction::Up));
        let mut second = FrameInput::default();
        second.press(Key::Quit);

        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = std::rc::Rc::clone(&seen);
        TextBackend::new(std::io::sink(), false, FrameStyle::Hidden, [first, second])
            .run(presentation(), move |_, input, _| {
                sink.borrow_mut().push(input);
                if input.quit {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .expect("sink accepts everything");

        assert_eq!(*seen.borrow(), vec![first, second]);
    }

    #[test]
    fn colored_frames_tint_glyphs_with_the_palette() {
        let mut out: Vec<u8> = Vec::new();
        TextBackend::new(&mut out, false, FrameStyle::Colored, Vec::<FrameInput>::new())
            .run(presentation(), |_, _, _| ControlFlow::Break(()))
            .expect("writing to a vec succeeds");

        let text = String::from_utf8(out).expect("utf-8 output");
        assert!(text.starts_with("test\n"));
        assert!(text.contains("\x1b[38;2;0;200;100m@\x1b[0m"));
        assert!(text.contains("\x1b[38;2;40;40;40m.\x1b[0m"));
        assert!(text.contains("\x1b[38;2;255;69;0m*\x1b[0m"));
        assert!(text.contains("\x1b[38;2;255;0;0mAUTOPILOT: OFF\x1b[0m"));
    }
}
