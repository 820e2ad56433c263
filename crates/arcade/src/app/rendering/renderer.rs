use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::sim::{Color, Entity, Kind, Registry};

use super::Viewport;

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    clear_color: Color,
}

impl Renderer {
    pub fn new(window: Arc<Window>, clear_color: Color) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            clear_color,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    /// Draws every entity's box in registration order; later entities paint over earlier ones.
    pub fn render_registry<K: Kind>(&mut self, registry: &Registry<K>) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let frame = self.pixels.frame_mut();
        draw_registry(frame, self.viewport, self.clear_color, registry);
        self.pixels.render()
    }
}

fn draw_registry<K: Kind>(
    frame: &mut [u8],
    viewport: Viewport,
    clear_color: Color,
    registry: &Registry<K>,
) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&clear_color.rgba());
    }
    for entity in registry.entities() {
        draw_entity(frame, viewport, entity);
    }
}

fn draw_entity<K: Kind>(frame: &mut [u8], viewport: Viewport, entity: &Entity<K>) {
    let left = entity.left().round() as i64;
    let top = entity.top().round() as i64;
    let right = entity.right().round() as i64;
    let bottom = entity.bottom().round() as i64;
    fill_rect(frame, viewport, left, top, right, bottom, entity.color);
}

/// Fills `[left, right) × [top, bottom)` clipped to the viewport.
fn fill_rect(
    frame: &mut [u8],
    viewport: Viewport,
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
    color: Color,
) {
    let x_start = left.clamp(0, viewport.width as i64) as usize;
    let x_end = right.clamp(0, viewport.width as i64) as usize;
    let y_start = top.clamp(0, viewport.height as i64) as usize;
    let y_end = bottom.clamp(0, viewport.height as i64) as usize;
    if x_start >= x_end || y_start >= y_end {
        return;
    }

    let stride = viewport.width as usize * 4;
    let rgba = color.rgba();
    for y in y_start..y_end {
        let row_start = y * stride + x_start * 4;
        let row_end = y * stride + x_end * 4;
        let Some(row) = frame.get_mut(row_start..row_end) else {
            return;
        };
        for pixel in row.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::PlayField;

    const VIEWPORT: Viewport = Viewport {
        width: 8,
        height: 6,
    };

    fn blank_frame() -> Vec<u8> {
        vec![0; VIEWPORT.width as usize * VIEWPORT.height as usize * 4]
    }

    fn pixel(frame: &[u8], x: usize, y: usize) -> [u8; 4] {
        let offset = (y * VIEWPORT.width as usize + x) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn fill_rect_covers_half_open_box() {
        let mut frame = blank_frame();
        fill_rect(&mut frame, VIEWPORT, 1, 1, 3, 2, Color::RED);

        assert_eq!(pixel(&frame, 1, 1), Color::RED.rgba());
        assert_eq!(pixel(&frame, 2, 1), Color::RED.rgba());
        assert_eq!(pixel(&frame, 3, 1), [0; 4]);
        assert_eq!(pixel(&frame, 1, 2), [0; 4]);
    }

    #[test]
    fn fill_rect_clips_to_viewport() {
        let mut frame = blank_frame();
        fill_rect(&mut frame, VIEWPORT, -4, -4, 100, 100, Color::BLUE);
        assert!(frame
            .chunks_exact(4)
            .all(|pixel| pixel == Color::BLUE.rgba()));
    }

    #[test]
    fn fill_rect_fully_outside_draws_nothing() {
        let mut frame = blank_frame();
        fill_rect(&mut frame, VIEWPORT, 20, 0, 30, 4, Color::BLUE);
        fill_rect(&mut frame, VIEWPORT, 0, -9, 4, -1, Color::BLUE);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn registry_draw_clears_then_paints_entities_in_order() {
        let mut registry: Registry<()> = Registry::new(PlayField::new(8.0, 6.0));
        for (name, x, color) in [("under", 0.0, Color::RED), ("over", 1.0, Color::GREEN)] {
            registry.register(
                Entity::builder(())
                    .name(name)
                    .position(x, 0.0)
                    .size(2.0, 2.0)
                    .color(color)
                    .build()
                    .expect("entity"),
            );
        }
        let mut frame = blank_frame();

        draw_registry(&mut frame, VIEWPORT, Color::BLACK, &registry);

        assert_eq!(pixel(&frame, 0, 0), Color::RED.rgba());
        assert_eq!(pixel(&frame, 1, 0), Color::GREEN.rgba());
        assert_eq!(pixel(&frame, 2, 1), Color::GREEN.rgba());
        assert_eq!(pixel(&frame, 5, 5), Color::BLACK.rgba());
    }
}
