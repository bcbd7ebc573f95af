//! Bouncing projectiles colliding with the point cloud.
//!
//! Projectiles fly under gravity and reflect off cloud points with a
//! bounciness factor. An implicit ground plane at y = 0 bounces the vertical
//! component and bleeds horizontal speed with friction; once a ground bounce
//! leaves a projectile slower than the rest threshold it stops simulating
//! and lies still until its lifetime expires.

use glam::Vec3;
use splatnav_core::{PointCloudStore, ProjectileOptions};

/// One live projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    /// World position.
    pub position: Vec3,
    /// World velocity.
    pub velocity: Vec3,
    /// Pool time at spawn, for age computation.
    pub spawn_time: f32,
    /// Number of bounces so far (points and ground both count).
    pub bounce_count: u32,
    /// Came to rest on the ground plane; no longer simulated.
    pub resting: bool,
}

/// Owns and simulates all live projectiles.
#[derive(Debug)]
pub struct ProjectilePool {
    projectiles: Vec<Projectile>,
    elapsed: f32,
    opts: ProjectileOptions,
}

impl ProjectilePool {
    /// Creates an empty pool with the given tuning.
    #[must_use]
    pub fn new(opts: ProjectileOptions) -> Self {
        Self {
            projectiles: Vec::new(),
            elapsed: 0.0,
            opts,
        }
    }

    /// Number of live projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    /// True when no projectiles are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Iterates live projectiles (render feed).
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    /// Destroys all projectiles (mode teardown).
    pub fn clear(&mut self) {
        self.projectiles.clear();
    }

    /// Spawns a projectile flying along `direction` at the configured muzzle
    /// speed. A zero direction spawns nothing and returns false.
    pub fn spawn(&mut self, origin: Vec3, direction: Vec3) -> bool {
        let dir = direction.normalize_or_zero();
        if dir.length_squared() < 1e-12 {
            log::debug!("projectile spawn ignored, zero direction");
            return false;
        }
        self.projectiles.push(Projectile {
            position: origin,
            velocity: dir * self.opts.speed,
            spawn_time: self.elapsed,
            bounce_count: 0,
            resting: false,
        });
        true
    }

    /// Advances every projectile one tick and culls expired ones.
    pub fn update(&mut self, dt: f32, store: &PointCloudStore) {
        self.elapsed += dt;

        for p in &mut self.projectiles {
            if p.resting {
                continue;
            }
            step_projectile(p, dt, store, &self.opts);
        }

        let elapsed = self.elapsed;
        let lifetime = self.opts.lifetime;
        self.projectiles
            .retain(|p| elapsed - p.spawn_time <= lifetime);
    }
}

fn step_projectile(p: &mut Projectile, dt: f32, store: &PointCloudStore, opts: &ProjectileOptions) {
    p.velocity.y -= opts.gravity * dt;
    let candidate = p.position + p.velocity * dt;

    // Nearest visible point inside the bullet radius gives the most stable
    // reflection normal.
    let mut nearest: Option<(f32, Vec3)> = None;
    store.for_each_visible_in_sphere(candidate, opts.bullet_radius, |index| {
        if let Some(point) = store.world_position(index) {
            let dist_sq = (point - candidate).length_squared();
            if nearest.is_none_or(|(best, _)| dist_sq < best) {
                nearest = Some((dist_sq, point));
            }
        }
        true
    });

    if let Some((_, point)) = nearest {
        // Reflect about the normal from the hit point toward the projectile
        // and keep the pre-move position.
        let normal = (p.position - point).normalize_or_zero();
        let normal = if normal.length_squared() < 1e-12 {
            Vec3::Y
        } else {
            normal
        };
        let v = p.velocity;
        p.velocity = (v - 2.0 * v.dot(normal) * normal) * opts.bounciness;
        p.bounce_count += 1;
        return;
    }

    if candidate.y <= 0.0 && p.velocity.y < 0.0 {
        p.position = Vec3::new(candidate.x, 0.0, candidate.z);
        p.velocity.y = -p.velocity.y * opts.bounciness;
        p.velocity.x *= opts.ground_friction;
        p.velocity.z *= opts.ground_friction;
        p.bounce_count += 1;

        if p.velocity.length() < opts.rest_threshold {
            p.velocity = Vec3::ZERO;
            p.resting = true;
        }
        return;
    }

    p.position = candidate;
}
