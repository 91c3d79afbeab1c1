use glam::Vec3;
use serde::{Deserialize, Serialize};

/// First-person camera. Rotation is in degrees: x = pitch, y = yaw, z = roll.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Camera {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    /// Move relative to the current heading.
    ///
    /// `offset.z` moves along the facing direction (negative is forward),
    /// `offset.x` strafes, `offset.y` is applied as-is.
    pub fn move_position(&mut self, offset: Vec3) {
        let yaw = self.rotation.y.to_radians();
        if offset.z != 0.0 {
            self.position.x += -yaw.sin() * offset.z;
            self.position.z += yaw.cos() * offset.z;
        }
        if offset.x != 0.0 {
            let strafe = (self.rotation.y - 90.0).to_radians();
            self.position.x += -strafe.sin() * offset.x;
            self.position.z += strafe.cos() * offset.x;
        }
        self.position.y += offset.y;
    }

    /// Add to the rotation, in degrees.
    pub fn move_rotation(&mut self, offset: Vec3) {
        self.rotation += offset;
    }
}
