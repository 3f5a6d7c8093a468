//! Per-frame, read-only copy of simulated poses onto visual elements.

use alloc::vec::Vec as AllocVec;

use crate::float::Float;
use crate::layout::RestLayout;
use crate::registry::{EntityId, EntityMode, Registry};
use crate::tween::Returns;
use crate::vec::Vec2;
use crate::world::World;

/// Pose of one on-screen element for this frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Visual<F: Float> {
    pub entity: EntityId,
    pub pos: Vec2<F>,
    pub angle: F,
    pub scale: F,
    /// Mid fly-back; renderers may highlight it.
    pub returning: bool,
    pub mode: EntityMode,
}

/// Sink for per-frame poses. The DOM implementation writes transforms;
/// tests record calls.
pub trait Renderer<F: Float> {
    fn begin_frame(&mut self) {}

    fn draw(&mut self, visual: &Visual<F>);

    fn end_frame(&mut self) {}

    /// Called once on teardown; drop any references to visual elements.
    fn detach(&mut self) {}
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderSync<F: Float> {
    returning_scale: F,
}

impl<F: Float> RenderSync<F> {
    pub fn new(returning_scale: F) -> Self {
        RenderSync { returning_scale }
    }

    /// Poses for every entity that has a body or an active fly-back.
    pub fn collect(
        &self,
        world: &World<F>,
        registry: &Registry<F>,
        returns: &Returns<F>,
        layout: &RestLayout<F>,
        now_ms: f64,
    ) -> AllocVec<Visual<F>> {
        let mut visuals = AllocVec::with_capacity(registry.len());
        for (entity, mode, body) in registry.iter() {
            if let Some(pose) = returns.pose(entity, now_ms, layout) {
                visuals.push(Visual {
                    entity,
                    pos: pose.pos,
                    angle: pose.angle,
                    scale: self.returning_scale,
                    returning: true,
                    mode,
                });
                continue;
            }
            let Some(body) = body.and_then(|b| world.body(b)) else { continue };
            visuals.push(Visual {
                entity,
                pos: body.pos,
                angle: body.angle,
                scale: F::one(),
                returning: false,
                mode,
            });
        }
        visuals
    }

    /// Pushes this frame's poses to the renderer. Returns how many were drawn.
    pub fn sync<R: Renderer<F> + ?Sized>(
        &self,
        world: &World<F>,
        registry: &Registry<F>,
        returns: &Returns<F>,
        layout: &RestLayout<F>,
        now_ms: f64,
        renderer: &mut R,
    ) -> usize {
        let visuals = self.collect(world, registry, returns, layout, now_ms);
        renderer.begin_frame();
        for visual in visuals.iter() {
            renderer.draw(visual);
        }
        renderer.end_frame();
        visuals.len()
    }
}
