//! FORM — geometric formation control (`spec.md` §4.3).
//!
//! Pure computation over agent-state snapshots: no tables, no locks, no
//! async. `FormationController` just bundles the configuration the
//! control law needs; callers (ORCH) pass it fresh snapshots each tick.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::geometry::{Quat, Scalar, Vec3};
use crate::domain::ids::AgentId;
use crate::domain::models::agent::AgentState;

/// Geometric pattern the swarm should hold, per `spec.md` §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormationType {
    Line,
    Column,
    Wedge,
    Diamond,
    Circle,
    BoxGrid,
    Custom,
}

impl FormationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Column => "column",
            Self::Wedge => "wedge",
            Self::Diamond => "diamond",
            Self::Circle => "circle",
            Self::BoxGrid => "box_grid",
            Self::Custom => "custom",
        }
    }
}

/// Per-follower output of the control law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormationCommand {
    pub agent_id_index: usize,
    pub velocity_cmd: Vec3,
    pub acceleration_cmd: Vec3,
    pub orientation_cmd: Quat,
}

/// Configuration bundle the control law reads; mirrors `FormConfig` in
/// shape but lives next to the algorithm it parameterizes.
#[derive(Debug, Clone)]
pub struct FormationParams {
    pub formation_type: FormationType,
    pub spacing: Scalar,
    pub collision_radius: Scalar,
    pub max_velocity: Scalar,
    pub max_acceleration: Scalar,
    pub k_position: Scalar,
    pub k_velocity: Scalar,
    pub k_separation: Scalar,
    pub k_cohesion: Scalar,
    pub k_alignment: Scalar,
    pub formation_radius: Scalar,
    pub formation_angle: Scalar,
    pub custom_positions: HashMap<usize, Vec3>,
    pub update_rate_hz: Scalar,
}

impl Default for FormationParams {
    fn default() -> Self {
        Self {
            formation_type: FormationType::Line,
            spacing: 5.0,
            collision_radius: 2.0,
            max_velocity: 10.0,
            max_acceleration: 5.0,
            k_position: 1.0,
            k_velocity: 1.0,
            k_separation: 1.0,
            k_cohesion: 0.5,
            k_alignment: 0.5,
            formation_radius: 10.0,
            formation_angle: std::f32::consts::FRAC_PI_4,
            custom_positions: HashMap::new(),
            update_rate_hz: 10.0,
        }
    }
}

/// Leader-frame desired offset for follower index `i` out of `n` total
/// vehicles, per the per-type rule in `spec.md` §4.3.
fn desired_offset(params: &FormationParams, i: usize, n: usize) -> Vec3 {
    let i_f = i as Scalar;
    let n_f = n.max(1) as Scalar;
    match params.formation_type {
        FormationType::Line => {
            let lateral = params.spacing * (i_f - (n_f - 1.0) / 2.0);
            Vec3::new(0.0, lateral, 0.0)
        }
        FormationType::Column => Vec3::new(-params.spacing * i_f, 0.0, 0.0),
        FormationType::Wedge => {
            let arm_sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            let arm_index = (i / 2) as Scalar + 1.0;
            let dx = -params.spacing * arm_index * params.formation_angle.cos();
            let dy = arm_sign * params.spacing * arm_index * params.formation_angle.sin();
            Vec3::new(dx, dy, 0.0)
        }
        FormationType::Diamond => match i % 4 {
            0 => Vec3::new(params.spacing, 0.0, 0.0),
            1 => Vec3::new(0.0, params.spacing, 0.0),
            2 => Vec3::new(-params.spacing, 0.0, 0.0),
            _ => Vec3::new(0.0, -params.spacing, 0.0),
        },
        FormationType::Circle => {
            let phase = 2.0 * std::f32::consts::PI * i_f / n_f;
            Vec3::new(
                params.formation_radius * phase.cos(),
                params.formation_radius * phase.sin(),
                0.0,
            )
        }
        FormationType::BoxGrid => {
            let cols = (n_f.sqrt()).ceil().max(1.0);
            let row = (i_f / cols).floor();
            let col = i_f - row * cols;
            Vec3::new(-params.spacing * row, params.spacing * col, 0.0)
        }
        FormationType::Custom => params
            .custom_positions
            .get(&i)
            .copied()
            .unwrap_or(Vec3::ZERO),
    }
}

/// Computes every follower's desired command for the current snapshot.
/// `leader` and `followers` are `(AgentId, AgentState)` pairs so callers
/// need not look anything up twice; `n` is total vehicle count including
/// the leader, per `spec.md` §4.3.
pub fn compute_formation_commands(
    params: &FormationParams,
    leader: &AgentState,
    followers: &[(AgentId, AgentState)],
    n: usize,
) -> Vec<(AgentId, FormationCommand)> {
    let dt_nominal = if params.update_rate_hz > 0.0 {
        1.0 / params.update_rate_hz
    } else {
        0.1
    };
    let leader_yaw = leader.orientation.yaw();

    let mean_velocity: Vec3 = if followers.is_empty() {
        Vec3::ZERO
    } else {
        followers.iter().map(|(_, s)| s.velocity).sum::<Vec3>() / followers.len() as Scalar
    };
    let centroid: Vec3 = if followers.is_empty() {
        leader.position
    } else {
        followers.iter().map(|(_, s)| s.position).sum::<Vec3>() / followers.len() as Scalar
    };

    followers
        .iter()
        .enumerate()
        .map(|(i, (id, state))| {
            let offset = desired_offset(params, i, n);
            let rotated = Quat::from_yaw(leader_yaw).rotate(offset);
            let p_desired = leader.position + rotated;

            let e_p = p_desired - state.position;
            let e_v = leader.velocity - state.velocity;

            let mut f_sep = Vec3::ZERO;
            if params.collision_radius > 0.0 {
                for (other_id, other) in followers {
                    if other_id == id {
                        continue;
                    }
                    let delta = state.position - other.position;
                    let d = delta.norm();
                    if d > crate::domain::geometry::EPSILON && d < params.collision_radius {
                        f_sep = f_sep + delta.normalize() * (1.0 / (d * d));
                    }
                }
            }

            let neighbor_count = followers.len().saturating_sub(1);
            let f_coh = if neighbor_count == 0 {
                Vec3::ZERO
            } else {
                let neighbor_centroid = (centroid * followers.len() as Scalar - state.position)
                    / neighbor_count as Scalar;
                neighbor_centroid - state.position
            };
            let f_ali = if neighbor_count == 0 {
                Vec3::ZERO
            } else {
                let neighbor_mean_velocity = (mean_velocity * followers.len() as Scalar
                    - state.velocity)
                    / neighbor_count as Scalar;
                neighbor_mean_velocity - state.velocity
            };

            let raw_v_cmd = e_p * params.k_position
                + e_v * params.k_velocity
                + f_sep * params.k_separation
                + f_coh * params.k_cohesion
                + f_ali * params.k_alignment;
            let v_cmd = raw_v_cmd.clamp_norm(params.max_velocity);

            let raw_a_cmd = (v_cmd - state.velocity) / dt_nominal;
            let a_cmd = raw_a_cmd.clamp_norm(params.max_acceleration);

            let orientation_cmd = if v_cmd.norm() > crate::domain::geometry::EPSILON {
                let dir = v_cmd.normalize();
                Quat::from_yaw(dir.y.atan2(dir.x))
            } else {
                state.orientation
            };

            (
                id.clone(),
                FormationCommand {
                    agent_id_index: i,
                    velocity_cmd: v_cmd,
                    acceleration_cmd: a_cmd,
                    orientation_cmd,
                },
            )
        })
        .collect()
}
