//! Physics-driven navigation letters and cursor follower.
//!
//! `letterfall` runs a small 2D rigid-body world behind a page: the letters of
//! a name sit as static bodies until hovered, then fall, tumble and get pushed
//! around by the pointer. A scroll gesture flies them back to their rest
//! positions. A separate cursor follower trails the pointer and snaps to
//! hovered navigation links.
//!
//! # Features
//!
//! - **Verlet rigid bodies**: circles and convex polygons, implicit velocity
//! - **Contact solver**: SAT narrow phase, position projection, restitution and friction
//! - **Fixed-step runner**: capped frame delta and step count per frame
//! - **Entity registry**: anchored / free / detached with at most one body each
//! - **Headless**: input handlers take plain coordinates, rendering goes through a trait
//! - **Observable**: monitor physics steps via the `StepObserver` trait
//! - **`no_std` compatible**: runs in WASM without std

#![no_std]

extern crate alloc;

pub mod float;
pub mod vec;
pub mod rng;
pub mod error;
pub mod config;
pub mod observer;
pub mod shape;
pub mod body;
pub mod collision;
pub mod constraint;
pub mod world;
pub mod runner;
pub mod layout;
pub mod registry;
pub mod hover;
pub mod tween;
pub mod input;
pub mod render;
pub mod follower;
pub mod scene;

// Re-export primary API
pub use float::Float;
pub use vec::{Vec, Scalar, Vec2};
pub use rng::XorShift64;
pub use error::SceneError;
pub use config::{BallLayout, Easing, FollowerConfig, SceneConfig, WorldConfig};
pub use observer::{NoOpStepObserver, StepCounter, StepObserver};
pub use shape::Shape;
pub use body::{Body, BodyDesc, BodyKind, CollisionFilter};
pub use collision::Contact;
pub use constraint::{BoundsConstraint, DragConstraint};
pub use world::{BodyId, World};
pub use runner::Runner;
pub use layout::{RestLayout, Slab, Viewport};
pub use registry::{EntityId, EntityMode, EntitySpec, Registry};
pub use hover::{HoverSlot, HoverState, SubscriptionId};
pub use tween::{CubicBezier, Returns, TweenPose};
pub use input::{default_nav, HoverTarget, InputAdapter, InputContext, InputTuning, NavItem, NavigateRequest};
pub use render::{RenderSync, Renderer, Visual};
pub use follower::{CursorFollower, CursorState, ExpFilter, FollowMode};
pub use scene::{FrameReport, PhysicsScene, SimulationHandle};
