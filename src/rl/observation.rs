use burn::tensor::{Tensor, TensorData, backend::Backend};

use crate::game::{AgentId, World};

/// Channel set when the cell holds the observing agent
pub const SELF_CHANNEL: usize = 0;
/// Channel set when any agent has ever visited the cell
pub const SEEN_CHANNEL: usize = 1;
/// Channel set when another agent stands on the cell
pub const OTHER_AGENT_CHANNEL: usize = 2;
/// Channel set when the cell is a wall
pub const WALL_CHANNEL: usize = 3;
/// Value written to every channel of an off-grid cell
pub const OUT_OF_BOUNDS: f32 = -1.0;

/// Flattened `[2r+1, 2r+1, channels]` view around one agent
///
/// Offset `(i, j)` maps to world cell `(row + i, col + j)` and is stored at
/// `[(i + r), (j + r)]`. Channels beyond the four defined ones stay zero.
pub fn local_view(world: &World, agent_id: AgentId, radius: usize, channels: usize) -> Vec<f32> {
    let size = 2 * radius + 1;
    let r = radius as i32;
    let mut data = vec![0.0; size * size * channels];
    let center = world.agent(agent_id).pos;

    for i in -r..=r {
        for j in -r..=r {
            let cell = center.moved_by(i, j);
            let base = (((i + r) as usize) * size + (j + r) as usize) * channels;
            let slot = &mut data[base..base + channels];

            if !world.is_in_bounds(cell) {
                slot.fill(OUT_OF_BOUNDS);
                continue;
            }

            if world.is_visited(cell) {
                slot[SEEN_CHANNEL] = 1.0;
            }
            if world.has_wall_at(cell) {
                slot[WALL_CHANNEL] = 1.0;
            }
            if let Some(occupant) = world.agent_at(cell) {
                if occupant.id == agent_id {
                    slot[SELF_CHANNEL] = 1.0;
                } else {
                    slot[OTHER_AGENT_CHANNEL] = 1.0;
                }
            }
        }
    }

    data
}

/// Observation of a single agent
///
/// Returns: Tensor<B, 3> with shape [2r+1, 2r+1, channels]
pub fn agent_observation<B: Backend>(
    world: &World,
    agent_id: AgentId,
    radius: usize,
    channels: usize,
    device: &B::Device,
) -> Tensor<B, 3> {
    let size = 2 * radius + 1;
    let data = local_view(world, agent_id, radius, channels);
    Tensor::<B, 3>::from_data(TensorData::new(data, [size, size, channels]), device)
}

/// Stacked observations of all agents in id order
///
/// Returns: Tensor<B, 4> with shape [num_agents, 2r+1, 2r+1, channels]
pub fn create_observation<B: Backend>(
    world: &World,
    radius: usize,
    channels: usize,
    device: &B::Device,
) -> Tensor<B, 4> {
    let size = 2 * radius + 1;
    let num_agents = world.agents().len();

    let mut data = Vec::with_capacity(num_agents * size * size * channels);
    for agent in world.agents() {
        data.extend(local_view(world, agent.id, radius, channels));
    }

    Tensor::<B, 4>::from_data(
        TensorData::new(data, [num_agents, size, size, channels]),
        device,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Topology;
    use burn::backend::NdArray;
    use burn::backend::ndarray::NdArrayDevice;

    type TestBackend = NdArray<f32>;

    fn world(map: &str) -> World {
        World::from_topology(&map.parse::<Topology>().unwrap())
    }

    /// Value of `channel` at offset `(i, j)` in a radius-1, 4-channel view
    fn at(view: &[f32], i: i32, j: i32, channel: usize) -> f32 {
        let idx = (((i + 1) as usize) * 3 + (j + 1) as usize) * 4 + channel;
        view[idx]
    }

    #[test]
    fn test_observation_shape() {
        let device = NdArrayDevice::default();
        let world = world("A...\n....\n...A\n");

        let obs = create_observation::<TestBackend>(&world, 1, 4, &device);
        assert_eq!(obs.shape().dims, [2, 3, 3, 4]);

        let obs = create_observation::<TestBackend>(&world, 2, 6, &device);
        assert_eq!(obs.shape().dims, [2, 5, 5, 6]);

        let single = agent_observation::<TestBackend>(&world, 0, 1, 4, &device);
        assert_eq!(single.shape().dims, [3, 3, 4]);
    }

    #[test]
    fn test_self_and_seen_channels() {
        let world = world("...\n.A.\n...\n");
        let view = local_view(&world, 0, 1, 4);

        assert_eq!(at(&view, 0, 0, SELF_CHANNEL), 1.0);
        assert_eq!(at(&view, 0, 0, SEEN_CHANNEL), 1.0);
        assert_eq!(at(&view, 0, 0, OTHER_AGENT_CHANNEL), 0.0);

        // Nothing else is known yet
        let sum: f32 = view.iter().sum();
        assert_eq!(sum, 2.0);
    }

    #[test]
    fn test_out_of_bounds_sentinel() {
        let world = world("A..\n...\n...\n");
        let view = local_view(&world, 0, 1, 4);

        // Top row and left column of the window are off the grid
        for j in -1..=1 {
            for c in 0..4 {
                assert_eq!(at(&view, -1, j, c), OUT_OF_BOUNDS);
            }
        }
        for c in 0..4 {
            assert_eq!(at(&view, 0, -1, c), OUT_OF_BOUNDS);
            assert_eq!(at(&view, 1, -1, c), OUT_OF_BOUNDS);
        }

        // In-bounds unseen cells stay at zero
        for c in 0..4 {
            assert_eq!(at(&view, 1, 1, c), 0.0);
        }
    }

    #[test]
    fn test_other_agent_and_wall_channels() {
        // Agent 0 at (1,0), agent 1 at (1,1), wall at (0,1)
        let world = world(".#.\nAA.\n...\n");
        let view = local_view(&world, 0, 1, 4);

        assert_eq!(at(&view, 0, 0, SELF_CHANNEL), 1.0);
        assert_eq!(at(&view, 0, 1, OTHER_AGENT_CHANNEL), 1.0);
        assert_eq!(at(&view, 0, 1, SELF_CHANNEL), 0.0);
        assert_eq!(at(&view, 0, 1, SEEN_CHANNEL), 1.0);
        assert_eq!(at(&view, -1, 1, WALL_CHANNEL), 1.0);
        assert_eq!(at(&view, -1, 1, SEEN_CHANNEL), 0.0);

        let other = local_view(&world, 1, 1, 4);
        assert_eq!(at(&other, 0, 0, SELF_CHANNEL), 1.0);
        assert_eq!(at(&other, 0, -1, OTHER_AGENT_CHANNEL), 1.0);
    }

    #[test]
    fn test_extra_channels_stay_zero() {
        let world = world(".#.\nAA.\n...\n");
        let view = local_view(&world, 0, 1, 6);

        for (idx, &value) in view.iter().enumerate() {
            if idx % 6 >= 4 && value != OUT_OF_BOUNDS {
                assert_eq!(value, 0.0);
            }
        }
    }

    #[test]
    fn test_stacked_tensor_matches_local_views() {
        let device = NdArrayDevice::default();
        let world = world(".#.\nAA.\n...\n");

        let obs = create_observation::<TestBackend>(&world, 1, 4, &device);
        let data = obs.to_data();
        let values = data.as_slice::<f32>().unwrap();

        let mut expected = local_view(&world, 0, 1, 4);
        expected.extend(local_view(&world, 1, 1, 4));
        assert_eq!(values, expected.as_slice());
    }

    #[test]
    fn test_observation_values_in_range() {
        let device = NdArrayDevice::default();
        let world = world("A.#\n...\n#.A\n");

        let obs = create_observation::<TestBackend>(&world, 2, 4, &device);
        let data = obs.to_data();

        for &value in data.as_slice::<f32>().unwrap() {
            assert!(value == -1.0 || value == 0.0 || value == 1.0);
        }
    }
}
