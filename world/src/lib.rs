#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative episode state for the snake simulation.
//!
//! The world owns the agent, obstacles, goal, and autopilot plan. Adapters
//! mutate it exclusively through [`apply`] and observe it through [`query`].

mod agent;
mod config;

use std::collections::HashSet;

use snake_pilot_core::{
    CellCoord, Command, Direction, EpisodeOverCause, Event, Goal, ObstacleField,
};
use snake_pilot_system_autopilot::{Autopilot, AutopilotView, PlannedPath};
use snake_pilot_system_spawning::{Config as SpawnerConfig, PlacementExhausted, Spawner};
use tracing::{debug, info};

pub use agent::Agent;
pub use config::WorldConfig;

/// Represents the authoritative state of one simulation run.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    spawner: Spawner,
    autopilot: Autopilot,
    agent: Agent,
    obstacles: ObstacleField,
    goal: Goal,
    plan: PlannedPath,
    autopilot_on: bool,
    episode_over: Option<EpisodeOverCause>,
    pending_turn: Option<Direction>,
    tick_index: u64,
}

impl World {
    /// Creates a world and sets up its first episode.
    pub fn new(config: WorldConfig) -> Result<Self, PlacementExhausted> {
        let mut spawner = spawner_for(&config);
        let episode = Episode::generate(&config, &mut spawner, None)?;
        info!(
            columns = config.grid.columns(),
            rows = config.grid.rows(),
            obstacles = episode.obstacles.len(),
            seed = config.seed,
            "episode started"
        );

        Ok(Self::assemble(config, spawner, episode))
    }

    /// Creates a world from an explicit layout instead of a random one.
    ///
    /// Later goals and restarts still draw from the configured seed.
    #[must_use]
    pub fn from_layout(
        config: WorldConfig,
        agent: Agent,
        obstacles: ObstacleField,
        goal: Goal,
    ) -> Self {
        let spawner = spawner_for(&config);
        Self::assemble(
            config,
            spawner,
            Episode {
                agent,
                obstacles,
                goal,
            },
        )
    }

    fn assemble(config: WorldConfig, spawner: Spawner, episode: Episode) -> Self {
        Self {
            config,
            spawner,
            autopilot: Autopilot::new(),
            agent: episode.agent,
            obstacles: episode.obstacles,
            goal: episode.goal,
            plan: PlannedPath::new(),
            autopilot_on: false,
            episode_over: None,
            pending_turn: None,
            tick_index: 0,
        }
    }

    /// Replaces the agent, obstacles, goal, and plan with a fresh episode.
    ///
    /// Nothing changes when placement fails. The autopilot flag survives.
    fn reset(&mut self) -> Result<(), PlacementExhausted> {
        let episode = Episode::generate(&self.config, &mut self.spawner, Some(self.goal))?;

        self.agent = episode.agent;
        self.obstacles = episode.obstacles;
        self.goal = episode.goal;
        self.plan.clear();
        self.episode_over = None;
        self.pending_turn = None;
        self.tick_index = 0;

        info!(
            obstacles = self.obstacles.len(),
            autopilot = self.autopilot_on,
            "episode reset"
        );
        Ok(())
    }

    fn toggle_autopilot(&mut self, out_events: &mut Vec<Event>) {
        self.autopilot_on = !self.autopilot_on;
        self.plan.clear();
        self.pending_turn = None;

        info!(enabled = self.autopilot_on, "autopilot toggled");
        out_events.push(Event::AutopilotToggled {
            enabled: self.autopilot_on,
        });
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) -> Result<(), PlacementExhausted> {
        if self.episode_over.is_some() {
            return Ok(());
        }
        self.tick_index = self.tick_index.saturating_add(1);

        let intent = if self.autopilot_on {
            let view = AutopilotView {
                grid: self.config.grid,
                body: self.agent.body(),
                heading: self.agent.heading(),
                length: self.agent.length(),
                goal: self.goal,
                obstacles: &self.obstacles,
            };
            let steering = self.autopilot.steer(&view, &mut self.plan);
            out_events.push(Event::Steered {
                mode: steering.mode,
                direction: steering.direction,
            });
            steering.direction
        } else {
            self.pending_turn.take()
        };

        if let Some(direction) = intent {
            if self.agent.turn(direction) {
                out_events.push(Event::HeadingChanged { heading: direction });
            }
        }

        let from = self.agent.head();
        let reaching_goal =
            self.config.grid.step_wrapped(from, self.agent.heading()) == Some(self.goal.cell());
        let before = reaching_goal.then(|| self.agent.clone());
        if self.agent.advance(self.config.grid) {
            self.end_episode(EpisodeOverCause::SelfCollision, out_events);
            return Ok(());
        }

        let head = self.agent.head();
        if self.obstacles.contains(head) {
            out_events.push(Event::AgentAdvanced { from, to: head });
            self.end_episode(EpisodeOverCause::Obstacle, out_events);
            return Ok(());
        }

        match before {
            Some(before) => self.consume_goal(before, from, out_events),
            None => {
                out_events.push(Event::AgentAdvanced { from, to: head });
                Ok(())
            }
        }
    }

    /// Grows the agent that just moved onto the goal and places the next one.
    ///
    /// The replacement is drawn before anything is committed. When no free
    /// cell is found the move is undone and the episode ends, so the goal never
    /// shares a cell with the body.
    fn consume_goal(
        &mut self,
        before: Agent,
        from: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), PlacementExhausted> {
        let occupied = occupied_cells(&self.agent, &self.obstacles);
        let next_goal = match self
            .spawner
            .spawn_goal(self.config.grid, &occupied, Some(self.goal))
        {
            Ok(goal) => goal,
            Err(error) => {
                self.agent = before;
                self.end_episode(EpisodeOverCause::BoardFull, out_events);
                return Err(error);
            }
        };

        let head = self.agent.head();
        self.agent.grow();
        out_events.push(Event::AgentAdvanced { from, to: head });
        out_events.push(Event::GoalConsumed {
            cell: head,
            score: self.agent.score(),
        });
        debug!(score = self.agent.score(), "goal consumed");

        self.goal = next_goal;
        self.plan.clear();
        out_events.push(Event::GoalSpawned {
            cell: self.goal.cell(),
        });
        Ok(())
    }

    fn end_episode(&mut self, cause: EpisodeOverCause, out_events: &mut Vec<Event>) {
        self.episode_over = Some(cause);
        self.plan.clear();

        info!(
            ?cause,
            score = self.agent.score(),
            ticks = self.tick_index,
            "episode over"
        );
        out_events.push(Event::EpisodeEnded { cause });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Only restarts and goal respawns place cells at random; when the retry cap
/// runs out the error is returned. A failed restart leaves the world as it
/// was, and a failed goal respawn undoes the move and ends the episode.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), PlacementExhausted> {
    match command {
        Command::Turn { direction } => {
            if world.episode_over.is_none() && !world.autopilot_on {
                world.pending_turn = Some(direction);
            }
        }
        Command::ToggleAutopilot => {
            if world.episode_over.is_none() {
                world.toggle_autopilot(out_events);
            }
        }
        Command::Restart => {
            world.reset()?;
            out_events.push(Event::EpisodeReset);
            out_events.push(Event::GoalSpawned {
                cell: world.goal.cell(),
            });
        }
        Command::Tick => world.tick(out_events)?,
    }

    Ok(())
}

struct Episode {
    agent: Agent,
    obstacles: ObstacleField,
    goal: Goal,
}

impl Episode {
    /// Spawns the agent at the centre, then obstacles, then the goal.
    fn generate(
        config: &WorldConfig,
        spawner: &mut Spawner,
        previous_goal: Option<Goal>,
    ) -> Result<Self, PlacementExhausted> {
        let grid = config.grid;
        let agent = Agent::spawn(grid.center(), spawner.random_heading());

        let mut forbidden: HashSet<CellCoord> = grid
            .chebyshev_neighborhood(agent.head(), config.spawn_safety_radius)
            .into_iter()
            .collect();
        forbidden.extend(agent.body().iter().copied());
        let obstacles = spawner.generate_obstacles(grid, config.obstacle_count, &forbidden)?;

        let occupied = occupied_cells(&agent, &obstacles);
        let goal = spawner.spawn_goal(grid, &occupied, previous_goal)?;

        Ok(Self {
            agent,
            obstacles,
            goal,
        })
    }
}

fn spawner_for(config: &WorldConfig) -> Spawner {
    Spawner::new(SpawnerConfig::new(config.seed, config.placement_attempts))
}

fn occupied_cells(agent: &Agent, obstacles: &ObstacleField) -> HashSet<CellCoord> {
    agent
        .body()
        .iter()
        .copied()
        .chain(obstacles.iter())
        .collect()
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use snake_pilot_core::{
        tick_rate as rate_for_score, CellCoord, Direction, EpisodeOverCause, Goal, GridSize,
        ObstacleField,
    };
    use snake_pilot_system_autopilot::PlannedPath;

    use super::{Agent, World};

    /// Dimensions of the lattice.
    #[must_use]
    pub fn grid(world: &World) -> GridSize {
        world.config.grid
    }

    /// Provides read-only access to the agent.
    #[must_use]
    pub fn agent(world: &World) -> &Agent {
        &world.agent
    }

    /// Provides read-only access to the obstacles of the current episode.
    #[must_use]
    pub fn obstacles(world: &World) -> &ObstacleField {
        &world.obstacles
    }

    /// Goal the agent is currently steering toward.
    #[must_use]
    pub fn goal(world: &World) -> Goal {
        world.goal
    }

    /// Remaining cells of the autopilot's active route.
    #[must_use]
    pub fn planned_path(world: &World) -> &PlannedPath {
        &world.plan
    }

    /// Reports whether the autopilot controls the agent.
    #[must_use]
    pub fn autopilot_enabled(world: &World) -> bool {
        world.autopilot_on
    }

    /// Reason the episode ended, if it is over.
    #[must_use]
    pub fn episode_over(world: &World) -> Option<EpisodeOverCause> {
        world.episode_over
    }

    /// Manual turn waiting for the next tick.
    #[must_use]
    pub fn pending_turn(world: &World) -> Option<Direction> {
        world.pending_turn
    }

    /// Ticks processed since the episode started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Ticks per second an interactive adapter should run at.
    #[must_use]
    pub fn tick_rate(world: &World) -> u32 {
        rate_for_score(world.agent.score())
    }

    /// Captures everything a renderer needs to draw one frame.
    #[must_use]
    pub fn render_snapshot(world: &World) -> RenderSnapshot {
        RenderSnapshot {
            grid: world.config.grid,
            body: world.agent.body().iter().copied().collect(),
            heading: world.agent.heading(),
            score: world.agent.score(),
            obstacles: world.obstacles.cells().to_vec(),
            goal: world.goal.cell(),
            autopilot_on: world.autopilot_on,
            episode_over: world.episode_over.is_some(),
            tick_rate: tick_rate(world),
        }
    }

    /// Read-only copy of the state presented to the player.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct RenderSnapshot {
        /// Dimensions of the lattice.
        pub grid: GridSize,
        /// Agent body segments, head first.
        pub body: Vec<CellCoord>,
        /// Heading the agent is moving in.
        pub heading: Direction,
        /// Goals consumed this episode.
        pub score: u32,
        /// Obstacle cells in placement order.
        pub obstacles: Vec<CellCoord>,
        /// Cell holding the goal.
        pub goal: CellCoord,
        /// Whether the autopilot controls the agent.
        pub autopilot_on: bool,
        /// Whether the episode has ended.
        pub episode_over: bool,
        /// Ticks per second for the current score.
        pub tick_rate: u32,
    }

    impl RenderSnapshot {
        /// Cell occupied by the head.
        #[must_use]
        pub fn head(&self) -> Option<CellCoord> {
            self.body.first().copied()
        }
    }
}
