//! Configuration types for the world, the scene and the cursor follower.

use alloc::string::String;

use crate::error::SceneError;
use crate::float::Float;
use crate::vec::Vec2;

/// Configuration for the physics world and its fixed-step runner.
///
/// Lengths are viewport pixels, time is milliseconds at the runner boundary
/// and seconds inside the integrator. The y axis points down.
///
/// # Builder Pattern
/// ```
/// use letterfall::config::WorldConfig;
/// use letterfall::vec::Vec2;
///
/// let config: WorldConfig<f32> = WorldConfig::new()
///     .with_iterations(8)
///     .with_gravity(Vec2::new(0.0, 800.0))
///     .with_damping(0.8)
///     .with_sub_steps(2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig<F: Float> {
    /// Gravity acceleration in px/s². Default: (0, 1000).
    pub gravity: Vec2<F>,
    /// Contact solver iterations per sub-step. Default: 4.
    pub iterations: usize,
    /// Sub-steps per fixed step. Default: 2.
    pub sub_steps: usize,
    /// Fraction of linear and angular velocity kept after one second of
    /// simulated time, independent of the step rate. Default: 0.75.
    pub damping: F,
    /// Fixed step length in milliseconds. Default: 1000/120.
    pub fixed_step_ms: F,
    /// Largest frame delta the runner will simulate. Default: 50 ms.
    pub max_frame_ms: F,
    /// Upper bound on fixed steps per frame. Default: 6.
    pub max_steps_per_frame: u32,
    /// Normal approach speed (px/s) below which contacts do not bounce. Default: 60.
    pub bounce_threshold: F,
}

impl<F: Float> WorldConfig<F> {
    pub fn new() -> Self {
        WorldConfig {
            gravity: Vec2::new(F::zero(), F::from_f32(1000.0)),
            iterations: 4,
            sub_steps: 2,
            damping: F::from_f32(0.75),
            fixed_step_ms: F::from_f64(1000.0 / 120.0),
            max_frame_ms: F::from_f32(50.0),
            max_steps_per_frame: 6,
            bounce_threshold: F::from_f32(60.0),
        }
    }

    pub fn with_gravity(mut self, gravity: Vec2<F>) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_sub_steps(mut self, sub_steps: usize) -> Self {
        self.sub_steps = sub_steps.max(1);
        self
    }

    pub fn with_damping(mut self, damping: F) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_fixed_step_ms(mut self, ms: F) -> Self {
        self.fixed_step_ms = ms;
        self
    }

    pub fn with_max_frame_ms(mut self, ms: F) -> Self {
        self.max_frame_ms = ms;
        self
    }

    pub fn with_max_steps_per_frame(mut self, steps: u32) -> Self {
        self.max_steps_per_frame = steps.max(1);
        self
    }

    pub fn with_bounce_threshold(mut self, speed: F) -> Self {
        self.bounce_threshold = speed;
        self
    }

    /// Fixed step in seconds.
    pub fn step_seconds(&self) -> F {
        self.fixed_step_ms / F::from_f32(1000.0)
    }

    /// Sub-step in seconds; implicit Verlet velocities are measured against this.
    pub fn sub_step_seconds(&self) -> F {
        self.step_seconds() / F::from_f32(self.sub_steps.max(1) as f32)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        if !(self.fixed_step_ms > F::zero()) || !self.fixed_step_ms.is_finite() {
            return Err(SceneError::InvalidConfig("fixed_step_ms must be positive"));
        }
        if self.max_frame_ms < self.fixed_step_ms {
            return Err(SceneError::InvalidConfig("max_frame_ms must cover one fixed step"));
        }
        if self.damping < F::zero() || self.damping > F::one() {
            return Err(SceneError::InvalidConfig("damping must lie in [0, 1]"));
        }
        if !self.gravity.is_finite() {
            return Err(SceneError::InvalidConfig("gravity must be finite"));
        }
        Ok(())
    }
}

impl<F: Float> Default for WorldConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Decorative ball layout for one viewport class.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BallLayout<F: Float> {
    pub radius: F,
    pub count: u16,
    /// Vertical spacing of the spawn stack above the first ball.
    pub offset: F,
}

/// Cubic-bezier control points `(x1, y1, x2, y2)` for the fly-back easing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Easing<F: Float> {
    pub x1: F,
    pub y1: F,
    pub x2: F,
    pub y2: F,
}

impl<F: Float> Easing<F> {
    /// The standard "ease" curve used for the returning letters.
    pub fn standard() -> Self {
        Easing {
            x1: F::from_f32(0.4),
            y1: F::zero(),
            x2: F::from_f32(0.2),
            y2: F::one(),
        }
    }
}

/// Everything a scene needs beyond the world: composition, materials, input
/// tuning and timing.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig<F: Float> {
    pub world: WorldConfig<F>,

    /// Text laid out as letters. Whitespace keeps its slot but gets no body.
    pub letters: String,
    pub letter_width: F,
    pub letter_height: F,
    pub letter_spacing: F,
    /// Vertical position of the letter row as a fraction of viewport height.
    pub row_fraction: F,

    pub desktop_balls: BallLayout<F>,
    pub mobile_balls: BallLayout<F>,
    /// Viewports narrower than this use `mobile_balls`.
    pub mobile_breakpoint: F,

    pub wall_thickness: F,
    pub ground_height: F,

    pub letter_restitution: F,
    pub ball_restitution: F,
    pub friction: F,
    /// Mass per px² of shape area.
    pub density: F,

    /// Peak pointer push in mass·px/s².
    pub pointer_force: F,
    /// Extra reach around a body's bounding circle for the pointer push.
    pub hit_radius: F,
    /// Largest random spin (rad/s) given to a pushed body.
    pub max_spin: F,
    pub drag_stiffness: F,
    /// Collision categories the drag constraint may grab.
    pub drag_mask: u32,

    pub wheel_debounce_ms: F,
    pub fly_back_ms: F,
    pub returning_scale: F,
    pub easing: Easing<F>,
    /// Delay the routing collaborator waits for the exit animation.
    pub nav_exit_delay_ms: F,

    pub seed: u64,
}

impl<F: Float> SceneConfig<F> {
    pub fn new() -> Self {
        SceneConfig {
            world: WorldConfig::new(),
            letters: String::from("PORTFOLIO"),
            letter_width: F::from_f32(32.0),
            letter_height: F::from_f32(48.0),
            letter_spacing: F::from_f32(32.0),
            row_fraction: F::one() / F::from_f32(3.0),
            desktop_balls: BallLayout {
                radius: F::from_f32(70.0),
                count: 10,
                offset: F::from_f32(60.0),
            },
            mobile_balls: BallLayout {
                radius: F::from_f32(35.0),
                count: 5,
                offset: F::from_f32(30.0),
            },
            mobile_breakpoint: F::from_f32(600.0),
            wall_thickness: F::two(),
            ground_height: F::from_f32(60.0),
            letter_restitution: F::half(),
            ball_restitution: F::zero(),
            friction: F::from_f32(0.1),
            density: F::from_f32(0.001),
            pointer_force: F::from_f32(80_000.0),
            hit_radius: F::from_f32(40.0),
            max_spin: F::from_f32(60.0),
            drag_stiffness: F::from_f32(0.2),
            drag_mask: 0x0001,
            wheel_debounce_ms: F::from_f32(700.0),
            fly_back_ms: F::from_f32(700.0),
            returning_scale: F::from_f32(1.2),
            easing: Easing::standard(),
            nav_exit_delay_ms: F::from_f32(500.0),
            seed: 0x5eed_1e77_e2fa_11,
        }
    }

    pub fn with_world(mut self, world: WorldConfig<F>) -> Self {
        self.world = world;
        self
    }

    pub fn with_letters(mut self, letters: &str) -> Self {
        self.letters = String::from(letters);
        self
    }

    pub fn with_letter_size(mut self, width: F, height: F) -> Self {
        self.letter_width = width;
        self.letter_height = height;
        self
    }

    pub fn with_letter_spacing(mut self, spacing: F) -> Self {
        self.letter_spacing = spacing;
        self
    }

    pub fn with_balls(mut self, desktop: BallLayout<F>, mobile: BallLayout<F>) -> Self {
        self.desktop_balls = desktop;
        self.mobile_balls = mobile;
        self
    }

    /// Letters only, no decorative balls.
    pub fn without_balls(mut self) -> Self {
        self.desktop_balls.count = 0;
        self.mobile_balls.count = 0;
        self
    }

    pub fn with_mobile_breakpoint(mut self, width: F) -> Self {
        self.mobile_breakpoint = width;
        self
    }

    pub fn with_pointer_force(mut self, force: F) -> Self {
        self.pointer_force = force;
        self
    }

    pub fn with_hit_radius(mut self, radius: F) -> Self {
        self.hit_radius = radius;
        self
    }

    pub fn with_max_spin(mut self, spin: F) -> Self {
        self.max_spin = spin;
        self
    }

    pub fn with_drag(mut self, stiffness: F, mask: u32) -> Self {
        self.drag_stiffness = stiffness;
        self.drag_mask = mask;
        self
    }

    pub fn with_wheel_debounce_ms(mut self, ms: F) -> Self {
        self.wheel_debounce_ms = ms;
        self
    }

    pub fn with_fly_back_ms(mut self, ms: F) -> Self {
        self.fly_back_ms = ms;
        self
    }

    pub fn with_easing(mut self, easing: Easing<F>) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        self.world.validate()?;
        if !(self.letter_width > F::zero()) || !(self.letter_height > F::zero()) {
            return Err(SceneError::InvalidConfig("letter size must be positive"));
        }
        if self.letter_spacing < F::zero() {
            return Err(SceneError::InvalidConfig("letter spacing must not be negative"));
        }
        if !(self.wall_thickness > F::zero()) || !(self.ground_height > F::zero()) {
            return Err(SceneError::InvalidConfig("walls and ground need thickness"));
        }
        if !(self.density > F::zero()) {
            return Err(SceneError::InvalidMass);
        }
        if !(self.fly_back_ms > F::zero()) {
            return Err(SceneError::InvalidConfig("fly_back_ms must be positive"));
        }
        if self.wheel_debounce_ms < F::zero() {
            return Err(SceneError::InvalidConfig("wheel_debounce_ms must not be negative"));
        }
        if self.drag_stiffness < F::zero() || self.drag_stiffness > F::one() {
            return Err(SceneError::InvalidConfig("drag stiffness must lie in [0, 1]"));
        }
        Ok(())
    }
}

impl<F: Float> Default for SceneConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the cursor follower.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FollowerConfig<F: Float> {
    /// Fraction of the remaining distance covered per frame while idle. Default: 0.15.
    pub idle_factor: F,
    /// Same, while magnetized to a hover target. Default: 0.18.
    pub magnet_factor: F,
    /// Upper bound for either stretch axis. Default: 1.7.
    pub max_stretch: F,
    /// Pointer distance (px) that maps to full idle scale. Default: 100.
    pub speed_normalizer: F,
    /// Target distance (px) that maps to one unit of magnetized stretch. Default: 80.
    pub distance_normalizer: F,
    pub idle_size: F,
    pub hover_size: F,
    /// Per-frame smoothing for the size transition. Default: 0.2.
    pub size_factor: F,
    /// Number of trailing blobs. Default: 0.
    pub trail_count: usize,
    /// Each trailing blob follows with `previous factor × trail_decay`. Default: 0.75.
    pub trail_decay: F,
}

impl<F: Float> FollowerConfig<F> {
    pub fn new() -> Self {
        FollowerConfig {
            idle_factor: F::from_f32(0.15),
            magnet_factor: F::from_f32(0.18),
            max_stretch: F::from_f32(1.7),
            speed_normalizer: F::from_f32(100.0),
            distance_normalizer: F::from_f32(80.0),
            idle_size: F::from_f32(80.0),
            hover_size: F::from_f32(100.0),
            size_factor: F::from_f32(0.2),
            trail_count: 0,
            trail_decay: F::from_f32(0.75),
        }
    }

    pub fn with_factors(mut self, idle: F, magnetized: F) -> Self {
        self.idle_factor = idle;
        self.magnet_factor = magnetized;
        self
    }

    pub fn with_max_stretch(mut self, max_stretch: F) -> Self {
        self.max_stretch = max_stretch;
        self
    }

    pub fn with_sizes(mut self, idle: F, hovered: F) -> Self {
        self.idle_size = idle;
        self.hover_size = hovered;
        self
    }

    pub fn with_trail(mut self, count: usize, decay: F) -> Self {
        self.trail_count = count;
        self.trail_decay = decay;
        self
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        let unit = |f: F| f > F::zero() && f <= F::one();
        if !unit(self.idle_factor) || !unit(self.magnet_factor) || !unit(self.size_factor) {
            return Err(SceneError::InvalidConfig("follow factors must lie in (0, 1]"));
        }
        if !unit(self.trail_decay) {
            return Err(SceneError::InvalidConfig("trail_decay must lie in (0, 1]"));
        }
        if self.max_stretch < F::one() {
            return Err(SceneError::InvalidConfig("max_stretch must be at least 1"));
        }
        if !(self.speed_normalizer > F::zero()) || !(self.distance_normalizer > F::zero()) {
            return Err(SceneError::InvalidConfig("normalizers must be positive"));
        }
        Ok(())
    }
}

impl<F: Float> Default for FollowerConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}
