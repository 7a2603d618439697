use crate::error::GridError;

/// Number of discrete choices available to every agent
pub const NUM_ACTIONS: usize = 5;

/// Discrete action an agent can take on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    /// Stay on the current cell
    Wait,
}

impl Action {
    /// All actions in index order
    pub const ALL: [Action; NUM_ACTIONS] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Wait,
    ];

    /// Returns the (d_row, d_col) delta for this action
    ///
    /// Up/Down move along the row axis, Left/Right along the column axis.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
            Action::Wait => (0, 0),
        }
    }

    /// Convert a discrete action index into an action
    ///
    /// - 0 → Up
    /// - 1 → Down
    /// - 2 → Left
    /// - 3 → Right
    /// - 4 → Wait
    pub fn from_index(idx: usize) -> Result<Self, GridError> {
        Self::ALL
            .get(idx)
            .copied()
            .ok_or(GridError::InvalidAction(idx))
    }

    /// Discrete index of this action
    pub fn index(&self) -> usize {
        match self {
            Action::Up => 0,
            Action::Down => 1,
            Action::Left => 2,
            Action::Right => 3,
            Action::Wait => 4,
        }
    }
}

/// Discrete multi-agent action space: one choice out of `NUM_ACTIONS` per agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpace {
    pub nvec: Vec<usize>,
}

impl ActionSpace {
    pub fn new(num_agents: usize) -> Self {
        Self {
            nvec: vec![NUM_ACTIONS; num_agents],
        }
    }

    pub fn num_agents(&self) -> usize {
        self.nvec.len()
    }

    /// Sample one action per agent uniformly
    pub fn sample<R: rand::Rng>(&self, rng: &mut R) -> Vec<Action> {
        self.nvec
            .iter()
            .map(|&n| Action::ALL[rng.gen_range(0..n)])
            .collect()
    }

    pub fn contains(&self, indices: &[usize]) -> bool {
        indices.len() == self.nvec.len()
            && indices.iter().zip(&self.nvec).all(|(&v, &n)| v < n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_action_delta() {
        assert_eq!(Action::Up.delta(), (-1, 0));
        assert_eq!(Action::Down.delta(), (1, 0));
        assert_eq!(Action::Left.delta(), (0, -1));
        assert_eq!(Action::Right.delta(), (0, 1));
        assert_eq!(Action::Wait.delta(), (0, 0));
    }

    #[test]
    fn test_action_mapping() {
        assert_eq!(Action::from_index(0).unwrap(), Action::Up);
        assert_eq!(Action::from_index(1).unwrap(), Action::Down);
        assert_eq!(Action::from_index(2).unwrap(), Action::Left);
        assert_eq!(Action::from_index(3).unwrap(), Action::Right);
        assert_eq!(Action::from_index(4).unwrap(), Action::Wait);
        assert!(matches!(
            Action::from_index(5),
            Err(GridError::InvalidAction(5))
        ));

        for action in Action::ALL {
            assert_eq!(Action::from_index(action.index()).unwrap(), action);
        }
    }

    #[test]
    fn test_action_space_sampling() {
        let space = ActionSpace::new(3);
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let actions = space.sample(&mut rng);
            assert_eq!(actions.len(), 3);
            let indices: Vec<usize> = actions.iter().map(Action::index).collect();
            assert!(space.contains(&indices));
        }

        assert!(!space.contains(&[0, 1]));
        assert!(!space.contains(&[0, 1, 5]));
    }
}
