//! Shape generation and frame assembly
//!
//! Everything is emitted as a triangle list in playfield pixel space (origin
//! top-left, y down). The pipeline maps pixels to NDC at upload time.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::sim::snake::CELL_SIZE;
use crate::sim::{GameState, InvaderKind, SnakeState};

/// One frame worth of geometry, in draw order
#[derive(Debug, Clone)]
pub struct Frame {
    /// Background clear colour
    pub clear: [f32; 4],
    /// Pixel size of the playfield the vertices live in
    pub width: f32,
    pub height: f32,
    pub vertices: Vec<Vertex>,
}

impl Frame {
    pub fn new(width: f32, height: f32, clear: [f32; 4]) -> Self {
        Self {
            clear,
            width,
            height,
            vertices: Vec::new(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Axis-aligned filled rectangle (two triangles)
pub fn rect(out: &mut Vec<Vertex>, min: Vec2, size: Vec2, color: [f32; 4]) {
    let max = min + size;
    out.push(Vertex::new(min.x, min.y, color));
    out.push(Vertex::new(max.x, min.y, color));
    out.push(Vertex::new(min.x, max.y, color));

    out.push(Vertex::new(min.x, max.y, color));
    out.push(Vertex::new(max.x, min.y, color));
    out.push(Vertex::new(max.x, max.y, color));
}

pub fn triangle(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));
}

/// Filled circle as a triangle fan
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
    let segments = segments.max(3);
    out.reserve((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        out.push(Vertex::new(center.x, center.y, color));
        out.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        out.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }
}

/// Player ship: hull triangle plus a cannon on top
fn ship(out: &mut Vec<Vertex>, pos: Vec2, size: Vec2) {
    let hull_top = pos.y + size.y * 0.3;
    triangle(
        out,
        Vec2::new(pos.x + size.x / 2.0, hull_top),
        Vec2::new(pos.x, pos.y + size.y),
        Vec2::new(pos.x + size.x, pos.y + size.y),
        colors::PLAYER,
    );
    let cannon_w = size.x * 0.1;
    rect(
        out,
        Vec2::new(pos.x + size.x / 2.0 - cannon_w / 2.0, pos.y),
        Vec2::new(cannon_w, hull_top - pos.y),
        colors::PLAYER,
    );
}

/// Invader: body, two eyes, two antennae
fn invader(out: &mut Vec<Vertex>, pos: Vec2, size: Vec2, kind: InvaderKind) {
    let color = match kind {
        InvaderKind::Strong => colors::INVADER_STRONG,
        InvaderKind::Normal => colors::INVADER_NORMAL,
    };
    let antenna = Vec2::new(size.x * 0.1, size.y * 0.25);
    let body_min = Vec2::new(pos.x, pos.y + antenna.y);
    let body_size = Vec2::new(size.x, size.y - antenna.y);
    rect(out, body_min, body_size, color);

    let eye = Vec2::splat(size.x * 0.15);
    let eye_y = body_min.y + body_size.y * 0.25;
    rect(out, Vec2::new(pos.x + size.x * 0.2, eye_y), eye, colors::INVADER_EYE);
    rect(out, Vec2::new(pos.x + size.x * 0.65, eye_y), eye, colors::INVADER_EYE);

    rect(out, Vec2::new(pos.x + size.x * 0.2, pos.y), antenna, color);
    rect(out, Vec2::new(pos.x + size.x * 0.7, pos.y), antenna, color);
}

/// Invaders round: background, player, alive invaders, player bullets, enemy bullets
///
/// Read-only: the state is never touched.
pub fn invaders_frame(state: &GameState) -> Frame {
    let tuning = &state.tuning;
    let mut frame = Frame::new(
        tuning.playfield_width,
        tuning.playfield_height,
        colors::BACKGROUND,
    );
    let out = &mut frame.vertices;

    ship(out, state.player.pos, state.player.size);

    for alive in state.alive_invaders() {
        invader(out, alive.pos, alive.size, alive.kind);
    }

    for bullet in &state.player_bullets {
        rect(out, bullet.pos, bullet.size, colors::PLAYER_BULLET);
    }
    for bullet in &state.enemy_bullets {
        rect(out, bullet.pos, bullet.size, colors::ENEMY_BULLET);
    }

    frame
}

/// Snake round: board, food, body (head last so it overlays)
pub fn snake_frame(state: &SnakeState) -> Frame {
    let mut frame = Frame::new(
        state.size.x as f32 * CELL_SIZE,
        state.size.y as f32 * CELL_SIZE,
        colors::SNAKE_BOARD,
    );
    let out = &mut frame.vertices;
    let cell = Vec2::splat(CELL_SIZE);
    // 1 px gap between segments
    let inset = Vec2::splat(1.0);

    if let Some(food) = state.food {
        let center = food.as_vec2() * CELL_SIZE + cell / 2.0;
        circle(out, center, CELL_SIZE / 2.0 - 1.0, colors::FOOD, 12);
    }

    for segment in state.body.iter().skip(1).rev() {
        rect(out, segment.as_vec2() * CELL_SIZE + inset, cell - inset * 2.0, colors::SNAKE_BODY);
    }
    rect(out, state.head().as_vec2() * CELL_SIZE + inset, cell - inset * 2.0, colors::SNAKE_HEAD);

    frame
}
