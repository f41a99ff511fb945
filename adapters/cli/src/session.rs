//! Drives a world one frame at a time on behalf of a rendering backend.

use std::ops::ControlFlow;

use snake_pilot_core::{Command, EpisodeOverCause, Event};
use snake_pilot_rendering::{FrameInput, GridPresentation, Scene, StatusLine};
use snake_pilot_system_spawning::PlacementExhausted;
use snake_pilot_world::{self as world, query, World};
use tracing::info;

/// Totals collected over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Stats {
    pub(crate) ticks: u64,
    pub(crate) episodes: u32,
    pub(crate) goals: u32,
    pub(crate) best_score: u32,
    pub(crate) last_cause: Option<EpisodeOverCause>,
}

#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    grid: GridPresentation,
    ticks_left: u64,
    auto_restart: bool,
    stats: Stats,
    failure: Option<PlacementExhausted>,
}

impl Session {
    pub(crate) fn new(world: World, grid: GridPresentation, ticks: u64, auto_restart: bool) -> Self {
        Self {
            world,
            grid,
            ticks_left: ticks,
            auto_restart,
            stats: Stats {
                episodes: 1,
                ..Stats::default()
            },
            failure: None,
        }
    }

    pub(crate) fn scene(&self) -> Scene {
        let snapshot = query::render_snapshot(&self.world);
        Scene::new(
            self.grid,
            snapshot.body,
            snapshot.heading,
            snapshot.goal,
            snapshot.obstacles,
            StatusLine {
                score: snapshot.score,
                autopilot_on: snapshot.autopilot_on,
                game_over: snapshot.episode_over,
                tick_rate: snapshot.tick_rate,
            },
        )
    }

    /// Applies one frame of input followed by one tick.
    pub(crate) fn frame(&mut self, input: FrameInput, scene: &mut Scene) -> ControlFlow<()> {
        if input.quit || self.ticks_left == 0 {
            return ControlFlow::Break(());
        }

        let mut commands = input.commands();
        if self.auto_restart && !input.restart && query::episode_over(&self.world).is_some() {
            commands.insert(0, Command::Restart);
        }
        commands.push(Command::Tick);

        for command in commands {
            let mut events = Vec::new();
            if let Err(error) = world::apply(&mut self.world, command, &mut events) {
                self.failure = Some(error);
                return ControlFlow::Break(());
            }
            if command == Command::Tick {
                self.ticks_left -= 1;
                self.stats.ticks += 1;
            }
            self.record(&events);
        }

        *scene = self.scene();
        if scene.status.game_over && !self.auto_restart {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match *event {
                Event::EpisodeReset => self.stats.episodes += 1,
                Event::GoalConsumed { score, .. } => {
                    self.stats.goals += 1;
                    self.stats.best_score = self.stats.best_score.max(score);
                }
                Event::EpisodeEnded { cause } => {
                    self.stats.last_cause = Some(cause);
                    info!(
                        episode = self.stats.episodes,
                        ?cause,
                        "episode finished"
                    );
                }
                _ => {}
            }
        }
    }

    /// Totals of the run, or the placement failure that cut it short.
    pub(crate) fn outcome(&self) -> Result<Stats, PlacementExhausted> {
        match self.failure {
            Some(error) => Err(error),
            None => Ok(self.stats),
        }
    }
}

#[cfg(test)]
mod tests {
    use snake_pilot_core::{CellCoord, Direction, Goal, GridSize, ObstacleField};
    use snake_pilot_rendering::Key;
    use snake_pilot_world::{Agent, WorldConfig};

    use super::*;

    fn session(obstacles: &[CellCoord], ticks: u64, auto_restart: bool) -> Session {
        let config = WorldConfig::new(GridSize::square(6), 2, 9);
        let world = World::from_layout(
            config,
            Agent::spawn(CellCoord::new(1, 1), Direction::Right),
            ObstacleField::from_cells(obstacles.iter().copied()),
            Goal::at(CellCoord::new(3, 1)),
        );
        let grid = GridPresentation::new(6, 6).expect("valid grid");
        Session::new(world, grid, ticks, auto_restart)
    }

    fn pressed(key: Key) -> FrameInput {
        let mut input = FrameInput::default();
        input.press(key);
        input
    }

    #[test]
    fn frames_tick_until_budget_is_spent() {
        let mut session = session(&[], 2, false);
        let mut scene = session.scene();

        assert_eq!(
            session.frame(FrameInput::default(), &mut scene),
            ControlFlow::Continue(())
        );
        assert_eq!(scene.agent[0], CellCoord::new(2, 1));
        assert_eq!(
            session.frame(FrameInput::default(), &mut scene),
            ControlFlow::Continue(())
        );
        assert_eq!(scene.status.score, 1);
        assert_eq!(
            session.frame(FrameInput::default(), &mut scene),
            ControlFlow::Break(())
        );

        let stats = session.outcome().expect("no placement failure");
        assert_eq!(stats.ticks, 2);
        assert_eq!(stats.goals, 1);
        assert_eq!(stats.best_score, 1);
    }

    #[test]
    fn turn_keys_reach_the_world() {
        let mut session = session(&[], 5, false);
        let mut scene = session.scene();

        let _ = session.frame(pressed(Key::Arrow(Direction::Down)), &mut scene);

        assert_eq!(scene.heading, Direction::Down);
        assert_eq!(scene.agent[0], CellCoord::new(1, 2));
    }

    #[test]
    fn quit_stops_without_ticking() {
        let mut session = session(&[], 5, false);
        let mut scene = session.scene();

        assert_eq!(
            session.frame(pressed(Key::Quit), &mut scene),
            ControlFlow::Break(())
        );
        assert_eq!(session.outcome().map(|stats| stats.ticks), Ok(0));
    }

    #[test]
    fn game_over_stops_the_run_by_default() {
        let mut session = session(&[CellCoord::new(2, 1)], 5, false);
        let mut scene = session.scene();

        assert_eq!(
            session.frame(FrameInput::default(), &mut scene),
            ControlFlow::Break(())
        );
        assert!(scene.status.game_over);
        assert_eq!(
            session.outcome().map(|stats| stats.last_cause),
            Ok(Some(EpisodeOverCause::Obstacle))
        );
    }

    #[test]
    fn auto_restart_starts_a_new_episode() {
        let mut session = session(&[CellCoord::new(2, 1)], 5, true);
        let mut scene = session.scene();

        assert_eq!(
            session.frame(FrameInput::default(), &mut scene),
            ControlFlow::Continue(())
        );
        assert_eq!(
            session.frame(FrameInput::default(), &mut scene),
            ControlFlow::Continue(())
        );

        let stats = session.outcome().expect("no placement failure");
        assert_eq!(stats.episodes, 2);
        assert_eq!(stats.ticks, 2);
    }
}
