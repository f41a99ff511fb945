//! World configuration assembled from an optional TOML file and flag overrides.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use snake_pilot_core::GridSize;
use snake_pilot_world::WorldConfig;

/// Values given on the command line that take precedence over the file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Overrides {
    pub(crate) size: Option<u32>,
    pub(crate) obstacles: Option<usize>,
    pub(crate) seed: Option<u64>,
}

impl Overrides {
    pub(crate) fn apply(self, mut config: WorldConfig) -> WorldConfig {
        if let Some(size) = self.size {
            config.grid = GridSize::square(size);
        }
        if let Some(obstacles) = self.obstacles {
            config.obstacle_count = obstacles;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config
    }
}

/// Loads the world configuration, falling back to defaults without a file.
pub(crate) fn load(path: Option<&Path>, overrides: Overrides) -> Result<WorldConfig> {
    let base = match path {
        Some(path) => {
            let contents = fs::read_to_string(path).with_context(|| {
                format!("failed to read world config at {}", path.display())
            })?;
            parse(&contents)
                .with_context(|| format!("invalid world config at {}", path.display()))?
        }
        None => WorldConfig::default(),
    };

    Ok(overrides.apply(base))
}

fn parse(contents: &str) -> Result<WorldConfig> {
    toml::from_str(contents).context("failed to parse world config toml contents")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_file_uses_defaults_with_overrides() {
        let config = load(
            None,
            Overrides {
                size: Some(12),
                obstacles: None,
                seed: Some(3),
            },
        )
        .expect("no file to read");

        assert_eq!(config.grid, GridSize::square(12));
        assert_eq!(config.obstacle_count, WorldConfig::default().obstacle_count);
        assert_eq!(config.seed, 3);
    }

    #[test]
    fn flags_override_file_values() {
        let parsed = parse("obstacle_count = 9\nseed = 4\n").expect("valid toml");
        let config = Overrides {
            size: None,
            obstacles: Some(2),
            seed: None,
        }
        .apply(parsed);

        assert_eq!(config.obstacle_count, 2);
        assert_eq!(config.seed, 4);
    }

    #[test]
    fn unreadable_file_reports_its_path() {
        let path = PathBuf::from("definitely/not/here/world.toml");
        let error = load(Some(&path), Overrides::default()).expect_err("file does not exist");

        assert!(format!("{error:#}").contains("definitely/not/here/world.toml"));
    }

    #[test]
    fn malformed_toml_is_reported() {
        let error = parse("grid = 5").expect_err("grid must be a table");

        assert!(error.to_string().contains("failed to parse world config"));
    }
}
