//! In-memory scene list with the index-advancement policy.
//!
//! The engine only says "advance"; which scene comes next is decided here.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use beatscene_core::SceneStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvanceMode {
    #[default]
    Forward,
    PingPong,
    Random,
}

impl AdvanceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AdvanceMode::Forward => "forward",
            AdvanceMode::PingPong => "ping-pong",
            AdvanceMode::Random => "random",
        }
    }
}

impl fmt::Display for AdvanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdvanceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" | "fwd" => Ok(AdvanceMode::Forward),
            "ping-pong" | "pingpong" | "ping_pong" => Ok(AdvanceMode::PingPong),
            "random" | "rand" => Ok(AdvanceMode::Random),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

#[derive(Debug)]
pub struct SceneList {
    names: Vec<String>,
    mode: AdvanceMode,
    /// `None` until the first advance.
    current: Option<usize>,
    direction: Direction,
    rng_state: u64,
}

impl SceneList {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            mode: AdvanceMode::default(),
            current: None,
            direction: Direction::Forward,
            rng_state: 12345,
        }
    }

    /// `scene-1` .. `scene-n`
    pub fn numbered(count: usize) -> Self {
        Self::new(numbered_names(count))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn mode(&self) -> AdvanceMode {
        self.mode
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }

    pub fn set_names(&mut self, names: Vec<String>) {
        self.names = names;
        self.reset_index();
    }

    pub fn set_mode(&mut self, mode: AdvanceMode) {
        self.mode = mode;
        self.reset_index();
    }

    /// Back to "no scene", heading forward.
    pub fn reset_index(&mut self) {
        self.current = None;
        self.direction = Direction::Forward;
    }

    /// Move to the next scene and return its index.
    pub fn advance(&mut self) -> Option<usize> {
        let len = self.names.len();
        if len == 0 {
            self.current = None;
            return None;
        }

        let next = match self.current {
            None => {
                self.direction = Direction::Forward;
                0
            }
            Some(current) => match self.mode {
                AdvanceMode::Forward => (current + 1) % len,
                AdvanceMode::PingPong => self.ping_pong_step(current, len),
                AdvanceMode::Random => self.random_other(current, len),
            },
        };
        self.current = Some(next);
        Some(next)
    }

    fn ping_pong_step(&mut self, current: usize, len: usize) -> usize {
        match self.direction {
            Direction::Forward if current + 1 < len => current + 1,
            Direction::Forward => {
                self.direction = Direction::Backward;
                len.saturating_sub(2)
            }
            Direction::Backward if current > 0 => current - 1,
            Direction::Backward => {
                self.direction = Direction::Forward;
                1.min(len - 1)
            }
        }
    }

    fn random_other(&mut self, current: usize, len: usize) -> usize {
        if len == 1 {
            return 0;
        }
        loop {
            self.rng_state = self
                .rng_state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1);
            let pick = ((self.rng_state >> 33) as usize) % len;
            if pick != current {
                return pick;
            }
        }
    }
}

pub fn numbered_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("scene-{}", i)).collect()
}

/// Scene list shared between the command loop and the engine thread.
#[derive(Clone)]
pub struct SharedScenes(Arc<Mutex<SceneList>>);

impl SharedScenes {
    pub fn new(list: SceneList) -> Self {
        Self(Arc::new(Mutex::new(list)))
    }

    pub fn lock(&self) -> MutexGuard<'_, SceneList> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SceneStore for SharedScenes {
    fn scene_count(&self) -> usize {
        self.lock().len()
    }

    fn request_advance(&mut self) {
        let mut list = self.lock();
        match list.advance() {
            Some(index) => {
                let name = list.current_name().unwrap_or_default().to_string();
                log::info!(target: "scenes", "loading {} (index {})", name, index);
                println!("-> {}", name);
            }
            None => log::warn!(target: "scenes", "advance requested with no scenes"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(list: &mut SceneList, steps: usize) -> Vec<usize> {
        (0..steps).filter_map(|_| list.advance()).collect()
    }

    #[test]
    fn first_advance_lands_on_first_scene() {
        for mode in [AdvanceMode::Forward, AdvanceMode::PingPong, AdvanceMode::Random] {
            let mut list = SceneList::numbered(5);
            list.set_mode(mode);
            assert_eq!(list.advance(), Some(0));
        }
    }

    #[test]
    fn forward_wraps() {
        let mut list = SceneList::numbered(3);
        assert_eq!(sequence(&mut list, 7), vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn ping_pong_bounces_without_repeating_ends() {
        let mut list = SceneList::numbered(4);
        list.set_mode(AdvanceMode::PingPong);
        assert_eq!(sequence(&mut list, 9), vec![0, 1, 2, 3, 2, 1, 0, 1, 2]);
    }

    #[test]
    fn ping_pong_tiny_lists() {
        let mut list = SceneList::numbered(1);
        list.set_mode(AdvanceMode::PingPong);
        assert_eq!(sequence(&mut list, 4), vec![0, 0, 0, 0]);

        let mut list = SceneList::numbered(2);
        list.set_mode(AdvanceMode::PingPong);
        assert_eq!(sequence(&mut list, 5), vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn random_never_repeats_immediately() {
        let mut list = SceneList::numbered(3);
        list.set_mode(AdvanceMode::Random);
        let picks = sequence(&mut list, 50);
        assert!(picks.windows(2).all(|w| w[0] != w[1]));
        assert!(picks.iter().all(|&i| i < 3));
    }

    #[test]
    fn changes_reset_the_index() {
        let mut list = SceneList::numbered(3);
        sequence(&mut list, 2);
        assert_eq!(list.current(), Some(1));

        list.set_mode(AdvanceMode::PingPong);
        assert_eq!(list.current(), None);
        list.advance();
        list.set_names(numbered_names(5));
        assert_eq!(list.current(), None);
        assert_eq!(list.advance(), Some(0));
    }

    #[test]
    fn empty_list_has_nothing_to_advance() {
        let mut list = SceneList::numbered(0);
        assert_eq!(list.advance(), None);
        assert_eq!(list.current_name(), None);
    }

    #[test]
    fn parse_modes() {
        assert_eq!("ping-pong".parse::<AdvanceMode>(), Ok(AdvanceMode::PingPong));
        assert_eq!("Random".parse::<AdvanceMode>(), Ok(AdvanceMode::Random));
        assert!("sideways".parse::<AdvanceMode>().is_err());
    }
}
