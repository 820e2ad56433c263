use arcade::{
    Commands, Edge, Entity, EntityBuilder, EntityDefaults, Key, Registry, Scene, Velocity,
};
use tracing::{info, warn};

use super::config::PongConfig;

const LEFT_PADDLE: &str = "left_paddle";
const RIGHT_PADDLE: &str = "right_paddle";
const BALL: &str = "ball";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum PongKind {
    Paddle,
    Ball,
}

pub(crate) struct PongScene {
    config: PongConfig,
}

impl PongScene {
    pub(crate) fn new(config: PongConfig) -> Self {
        Self { config }
    }

    fn paddle(&self, name: &str, x: f32, y: f32, up: Key, down: Key) -> Option<Entity<PongKind>> {
        let speed = self.config.paddle_speed;
        let defaults = EntityDefaults {
            color: self.config.paddle_color,
            ..EntityDefaults::default()
        };
        let built = EntityBuilder::with_defaults(PongKind::Paddle, &defaults)
            .name(name)
            .position(x, y)
            .size(self.config.paddle_width, self.config.paddle_height)
            .on_keypress(up, move |paddle, _| paddle.move_up(speed))
            .on_keypress(down, move |paddle, _| paddle.move_down(speed))
            .on_hit_edge(move |paddle, edge, _| match edge {
                Edge::Top => paddle.move_down(speed),
                Edge::Bottom => paddle.move_up(speed),
                Edge::Left | Edge::Right => {}
            })
            .build();
        match built {
            Ok(paddle) => Some(paddle),
            Err(error) => {
                warn!(name, error = %error, "pong_entity_rejected");
                None
            }
        }
    }

    fn ball(&self, center_x: f32, center_y: f32) -> Option<Entity<PongKind>> {
        let size = self.config.ball_size;
        let serve_x = center_x - size / 2.0;
        let serve_y = center_y - size / 2.0;
        let built = Entity::builder(PongKind::Ball)
            .name(BALL)
            .position(serve_x, serve_y)
            .size(size, size)
            .color(self.config.ball_color)
            .velocity(Velocity::new(
                self.config.ball_speed_x,
                self.config.ball_speed_y,
            ))
            .on_collides_with(PongKind::Paddle, |ball, paddle, _| {
                if moving_toward(ball, paddle) {
                    ball.velocity = ball.velocity.reflect_vertically();
                }
            })
            .on_hit_edge(move |ball, edge, commands| match edge {
                Edge::Top if ball.velocity.y < 0.0 => {
                    ball.velocity = ball.velocity.reflect_horizontally();
                }
                Edge::Bottom if ball.velocity.y > 0.0 => {
                    ball.velocity = ball.velocity.reflect_horizontally();
                }
                Edge::Left => award_point(ball, RIGHT_PADDLE, serve_x, serve_y, commands),
                Edge::Right => award_point(ball, LEFT_PADDLE, serve_x, serve_y, commands),
                Edge::Top | Edge::Bottom => {}
            })
            .build();
        match built {
            Ok(ball) => Some(ball),
            Err(error) => {
                warn!(name = BALL, error = %error, "pong_entity_rejected");
                None
            }
        }
    }
}

impl Scene for PongScene {
    type Kind = PongKind;

    fn load(&mut self, registry: &mut Registry<PongKind>) {
        let field = registry.play_field();
        let paddle_y = (field.height - self.config.paddle_height) / 2.0;
        let left_x = self.config.paddle_margin;
        let right_x = field.width - self.config.paddle_margin - self.config.paddle_width;

        let entities = [
            self.paddle(LEFT_PADDLE, left_x, paddle_y, Key::W, Key::S),
            self.paddle(RIGHT_PADDLE, right_x, paddle_y, Key::Up, Key::Down),
            self.ball(field.width / 2.0, field.height / 2.0),
        ];
        for entity in entities.into_iter().flatten() {
            registry.register(entity);
        }
        info!(
            field_width = field.width,
            field_height = field.height,
            entity_count = registry.len(),
            "pong_loaded"
        );
    }

    fn unload(&mut self, registry: &mut Registry<PongKind>) {
        let (left, right) = scores(registry);
        info!(left_score = left, right_score = right, "pong_final_score");
    }

    fn debug_title(&self, registry: &Registry<PongKind>) -> Option<String> {
        let (left, right) = scores(registry);
        Some(format!("{}  {left} : {right}", self.config.window_title))
    }
}

fn moving_toward(ball: &Entity<PongKind>, paddle: &Entity<PongKind>) -> bool {
    let ball_center = ball.left() + ball.width() / 2.0;
    let paddle_center = paddle.left() + paddle.width() / 2.0;
    (ball_center < paddle_center && ball.velocity.x > 0.0)
        || (ball_center > paddle_center && ball.velocity.x < 0.0)
}

/// Credits `scorer`, puts the ball back at its serve spot and sends it toward the side that
/// conceded.
fn award_point(
    ball: &mut Entity<PongKind>,
    scorer: &'static str,
    serve_x: f32,
    serve_y: f32,
    commands: &mut Commands<PongKind>,
) {
    commands.modify(scorer, |paddle| paddle.score = paddle.score.saturating_add(1));
    ball.x = serve_x;
    ball.y = serve_y;
    ball.velocity = ball.velocity.reflect_vertically();
    info!(scorer, "point_scored");
}

fn scores(registry: &Registry<PongKind>) -> (u32, u32) {
    let score_of = |name: &str| registry.get(name).map_or(0, |paddle| paddle.score);
    (score_of(LEFT_PADDLE), score_of(RIGHT_PADDLE))
}
