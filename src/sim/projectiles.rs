//! Projectile lifecycle: expiry, steering, motion and hit detection

use super::bullet::{Bullet, Motion, VOLUME_HIT_INTERVAL};
use super::combat::apply_damage;
use super::entity::Entity;
use super::state::{Particle, ParticleKind, World};
use crate::{direction_to, polar_to_cartesian};

/// Whether `bullet` may damage `e`
fn qualifies(bullet: &Bullet, e: &Entity) -> bool {
    !e.dead && e.id != bullet.owner && e.is_enemy_of(bullet.owner)
}

/// Advance every bullet by `dt` and resolve its hits
pub fn update_bullets(world: &mut World, dt: f32) {
    let mut bullets = std::mem::take(&mut world.bullets);
    for bullet in bullets.iter_mut() {
        step(world, bullet, dt);
    }
    bullets.retain(|b| !b.dead);
    // Anything fired while the list was detached goes after the survivors
    bullets.append(&mut world.bullets);
    world.bullets = bullets;
}

fn step(world: &mut World, b: &mut Bullet, dt: f32) {
    b.lifetime -= dt;
    if b.lifetime <= 0.0 {
        b.dead = true;
        if let Motion::Fuse { blast_radius } = b.motion {
            detonate(world, b, blast_radius);
        }
        return;
    }

    match &mut b.motion {
        // Warning marker until the fuse runs out
        Motion::Fuse { .. } => return,
        Motion::Homing {
            target,
            turn_rate,
            speed,
        } => {
            // A gone target leaves the bullet flying straight
            if let Some(t) = world.alive(*target) {
                let ideal = direction_to(b.pos, t.pos) * *speed;
                b.vel += (ideal - b.vel) * *turn_rate * dt;
            }
        }
        Motion::Orbit {
            angle,
            radius,
            angular_speed,
        } => {
            let Some(owner) = world.alive(b.owner) else {
                b.dead = true;
                return;
            };
            *angle += *angular_speed * dt;
            b.pos = owner.pos + polar_to_cartesian(*radius, *angle);
        }
        Motion::Aura => {
            let Some(owner) = world.alive(b.owner) else {
                b.dead = true;
                return;
            };
            b.pos = owner.pos;
        }
        Motion::Linear | Motion::Pool => {}
    }

    if matches!(b.motion, Motion::Linear | Motion::Homing { .. }) {
        b.pos += b.vel * dt;
    }

    if b.motion.is_volume() {
        pulse(world, b, dt);
    } else {
        strike(world, b);
    }
}

/// Standard bullet: each entity at most once, one pierce per hit
fn strike(world: &mut World, b: &mut Bullet) {
    let len = world.entities.len();
    for i in 0..len {
        let e = &world.entities[i];
        if !qualifies(b, e) || b.struck.contains(&e.id) || e.pos.distance(b.pos) >= e.radius + b.radius {
            continue;
        }
        b.struck.push(e.id);
        apply_damage(world, i, b.damage, Some(b.owner), b.crit);
        b.pierce -= 1;
        if b.pierce < 0 {
            b.dead = true;
            return;
        }
    }
}

/// Volume: damage everything overlapping whenever the hit timer has elapsed
fn pulse(world: &mut World, b: &mut Bullet, dt: f32) {
    b.hit_timer -= dt;
    if b.hit_timer > 0.0 {
        return;
    }
    let mut hit = false;
    let len = world.entities.len();
    for i in 0..len {
        let e = &world.entities[i];
        if !qualifies(b, e) || e.pos.distance(b.pos) >= e.radius + b.radius {
            continue;
        }
        apply_damage(world, i, b.damage, Some(b.owner), b.crit);
        hit = true;
    }
    if hit {
        b.hit_timer = VOLUME_HIT_INTERVAL;
    }
}

/// Single-tick blast at the end of a fuse
fn detonate(world: &mut World, b: &Bullet, blast_radius: f32) {
    world.emit(
        Particle::new(b.pos, ParticleKind::Explosion {
            radius: blast_radius,
        })
        .with_decay(2.5),
    );
    let len = world.entities.len();
    for i in 0..len {
        let e = &world.entities[i];
        if qualifies(b, e) && e.pos.distance(b.pos) < blast_radius + e.radius {
            apply_damage(world, i, b.damage, Some(b.owner), b.crit);
        }
    }
}
