use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::GameConfig;
use crate::game_loop::testing::ManualScheduler;
use crate::game_loop::{FrameReport, Game};
use crate::input::{InputDispatcher, Key};
use crate::surface::testing::RecordingSurface;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_frame_ms")]
    pub frame_ms: f64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    /// Press the jump key just before this frame's tick.
    #[serde(default)]
    pub jump: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    pub fn expanded_jumps(&self) -> Vec<bool> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(frame.jump);
            }
        }
        out
    }

    /// Drives a fresh game through the whole sequence headlessly.
    pub fn run(&self, config: &GameConfig) -> (Game, Vec<FrameReport>) {
        let mut game = Game::new(config, (400.0, 600.0)).expect("replay surface is valid");
        let dispatcher = InputDispatcher::new();
        let mut scheduler = ManualScheduler::default();
        let mut surface = RecordingSurface::new(400.0, 600.0);

        // Start late enough that the first press clears the cooldown.
        let start_ms = 1_000.0;
        game.start(start_ms, &mut scheduler, &dispatcher);

        let mut reports = Vec::new();
        for (i, jump) in self.expanded_jumps().into_iter().enumerate() {
            let now = start_ms + (i as f64 + 1.0) * self.frame_ms;
            if jump {
                dispatcher.dispatch_key_down(Key::Space, now - 1.0);
            }
            if let Some(report) = game.tick(now, &mut scheduler, &mut surface) {
                reports.push(report);
            }
            surface.calls.clear();
        }
        (game, reports)
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frame_ms <= 0.0 {
        return Err("Replay validation failed: frame_ms must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_frame_ms() -> f64 {
    16.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "flap_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frame_ms": 16.0,
              "frames": [
                { "repeat": 3 },
                { "jump": true }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_jumps();
        assert_eq!(expanded, vec![false, false, false, true]);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_empty_frames() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");

        let err = load_replay_from_path(&path).expect_err("empty replay must fail");
        assert!(err.contains("frames list is empty"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "frame_ms": 16.0,
              "frames": [
                { "repeat": 20 },
                { "jump": true },
                { "repeat": 15 },
                { "jump": true },
                { "repeat": 30 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let config = GameConfig::default();
        let (run_a, reports_a) = replay.run(&config);
        let (run_b, reports_b) = replay.run(&config);

        assert_eq!(reports_a, reports_b);
        assert_eq!(run_a.bird().y, run_b.bird().y);
        assert_eq!(run_a.bird().velocity_y, run_b.bird().velocity_y);
        assert_eq!(run_a.bird().rotation, run_b.bird().rotation);
        assert_eq!(reports_a.iter().filter(|r| r.jumped).count(), 2);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn presses_inside_cooldown_collapse() {
        // Three presses 16ms apart: only the first clears the 100ms cooldown.
        let replay = ReplaySequence {
            frame_ms: 16.0,
            frames: vec![ReplayFrame {
                jump: true,
                repeat: 3,
            }],
        };
        let (_, reports) = replay.run(&GameConfig::default());
        let jumps: Vec<bool> = reports.iter().map(|r| r.jumped).collect();
        assert_eq!(jumps, vec![true, false, false]);
    }

    #[test]
    fn presses_past_cooldown_each_jump() {
        let replay = ReplaySequence {
            frame_ms: 16.0,
            frames: vec![
                ReplayFrame {
                    jump: true,
                    repeat: 1,
                },
                ReplayFrame {
                    jump: false,
                    repeat: 6,
                },
                ReplayFrame {
                    jump: true,
                    repeat: 1,
                },
            ],
        };
        let (game, reports) = replay.run(&GameConfig::default());
        assert!(reports[0].jumped);
        assert!(reports[7].jumped);
        assert_eq!(game.bird().velocity_y, -7.5);
    }
}
