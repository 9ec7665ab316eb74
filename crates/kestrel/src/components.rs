//! # Game Components
//!
//! | id | component   | purpose                                   |
//! |----|-------------|-------------------------------------------|
//! | 0  | `Transform` | position, heading and speed               |
//! | 1  | `Sprite`    | texture region drawn by the renderer      |
//! | 2  | `Animation` | named sprite-sheet clips                  |
//! | 3  | `Collider`  | box, tag and collision handler            |
//! | 4  | `Despawn`   | marks an entity for end-of-tick removal   |

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use kestrel_collision::Aabb;
use kestrel_core::{Component, EcsResult, EntityId, World};
use kestrel_shared::{Rect, Vec2, Vector2D};

// =============================================================================
// Transform
// =============================================================================

/// Position, heading and speed of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    /// Min corner in world units.
    pub position: Vec2,
    /// Heading. Usually unit length, zero when standing still.
    pub direction: Vector2D,
    /// Base speed in world units per second.
    pub speed: f64,
    /// Speed applied this tick; starts equal to `speed`.
    pub current_speed: f64,
}

impl Component for Transform {
    const ID: u8 = 0;
}

impl Transform {
    /// Stationary transform at `(x, y)` that moves at `speed` once given a
    /// direction.
    #[must_use]
    pub fn new(x: f32, y: f32, speed: f64) -> Self {
        Self {
            position: Vec2::new(x, y),
            direction: Vector2D::ZERO,
            speed,
            current_speed: speed,
        }
    }

    /// Sets the heading, normalized.
    #[must_use]
    pub fn heading(mut self, x: f64, y: f64) -> Self {
        self.direction = Vector2D::new(x, y).normalize();
        self
    }
}

// =============================================================================
// Sprite
// =============================================================================

/// Opaque texture id owned by the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Texture region to draw and where to draw it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sprite {
    /// Texture to sample.
    pub texture: TextureHandle,
    /// Source region in the texture (one frame).
    pub src: Rect,
    /// Destination region on screen.
    pub dst: Rect,
}

impl Component for Sprite {
    const ID: u8 = 1;
}

// =============================================================================
// Animation
// =============================================================================

/// One row of a sprite sheet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clip {
    /// Sheet row.
    pub row: i32,
    /// Frames in the row.
    pub frames: i32,
    /// Milliseconds per frame.
    pub frame_ms: i32,
}

/// Named clips plus the one currently playing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animation {
    clips: HashMap<String, Clip>,
    current: Clip,
    elapsed_ms: f64,
}

impl Component for Animation {
    const ID: u8 = 2;
}

impl Animation {
    /// Creates an animation with no clips.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a clip.
    #[must_use]
    pub fn with_clip(mut self, name: impl Into<String>, clip: Clip) -> Self {
        self.clips.insert(name.into(), clip);
        self
    }

    /// Switches to a clip. Returns `false` if no clip has that name.
    pub fn play(&mut self, name: &str) -> bool {
        match self.clips.get(name) {
            Some(&clip) => {
                self.current = clip;
                true
            }
            None => false,
        }
    }

    /// Clip currently playing.
    #[must_use]
    pub const fn current(&self) -> Clip {
        self.current
    }

    /// Advances the clock by `dt` seconds and returns the frame to show.
    pub fn advance(&mut self, dt: f64) -> i32 {
        self.elapsed_ms += dt * 1000.0;
        if self.current.frames <= 0 || self.current.frame_ms <= 0 {
            return 0;
        }
        let step = (self.elapsed_ms / f64::from(self.current.frame_ms)) as i64;
        (step % i64::from(self.current.frames)) as i32
    }
}

// =============================================================================
// Collider
// =============================================================================

/// One side of a collision, as seen by a handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contact {
    /// The entity whose handler is running.
    pub this: EntityId,
    /// The entity it touched.
    pub other: EntityId,
    /// Tag of `other`'s collider.
    pub other_tag: String,
}

/// Collision callback. Receives the world so it can mutate either entity.
pub type CollisionHandler = Rc<dyn Fn(&mut World, &Contact) -> EcsResult<()>>;

/// Collision box with an optional tag and handler.
///
/// The box is moved to the entity's `Transform` every tick before the
/// broad-phase runs.
#[derive(Clone, Default)]
pub struct Collider {
    /// Current box.
    pub aabb: Aabb,
    /// Free-form label passed to the other side's handler.
    pub tag: String,
    handler: Option<CollisionHandler>,
}

impl Component for Collider {
    const ID: u8 = 3;
}

impl Collider {
    /// Collider of the given size with no handler.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            aabb: Aabb::from_xywh(0.0, 0.0, width, height),
            tag: String::new(),
            handler: None,
        }
    }

    /// Sets the tag.
    #[must_use]
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Sets the handler.
    #[must_use]
    pub fn on_collision<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut World, &Contact) -> EcsResult<()> + 'static,
    {
        self.handler = Some(Rc::new(handler));
        self
    }

    /// Moves the box's min corner, keeping its size.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.aabb.set_position(x, y);
    }

    /// Handler, if any.
    #[must_use]
    pub fn handler(&self) -> Option<&CollisionHandler> {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Collider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collider")
            .field("aabb", &self.aabb)
            .field("tag", &self.tag)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

// =============================================================================
// Despawn
// =============================================================================

/// Marker: destroy this entity at the end of the tick.
///
/// Lets collision handlers retire entities without invalidating the pair
/// list being dispatched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Despawn;

impl Component for Despawn {
    const ID: u8 = 4;
}
