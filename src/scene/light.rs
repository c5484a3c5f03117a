use nalgebra::{Point3, Vector3};

/// Represents a light source in the scene.
#[derive(Debug, Clone)]
pub enum Light {
    /// Uniform light reaching every surface regardless of orientation.
    Ambient { color: Vector3<f32>, intensity: f32 },
    /// A light source that is infinitely far away (e.g., Sun).
    /// Rays are parallel.
    Directional {
        direction: Vector3<f32>,
        color: Vector3<f32>,
        intensity: f32,
    },
}

impl Light {
    pub fn new_ambient(color: Vector3<f32>, intensity: f32) -> Self {
        Self::Ambient { color, intensity }
    }

    /// Creates a simple directional light.
    pub fn new_directional(direction: Vector3<f32>, color: Vector3<f32>, intensity: f32) -> Self {
        Self::Directional {
            direction: direction.normalize(),
            color,
            intensity,
        }
    }

    /// Directional light placed at `position` and aimed at `target`.
    pub fn directional_from(
        position: Point3<f32>,
        target: Point3<f32>,
        color: Vector3<f32>,
        intensity: f32,
    ) -> Self {
        Self::new_directional(target - position, color, intensity)
    }

    /// Direction FROM the surface TO the light, or `None` for ambient light.
    pub fn direction_to_light(&self) -> Option<Vector3<f32>> {
        match self {
            Light::Ambient { .. } => None,
            Light::Directional { direction, .. } => Some(-direction),
        }
    }

    /// Radiance arriving at any surface point.
    pub fn radiance(&self) -> Vector3<f32> {
        match self {
            Light::Ambient { color, intensity } | Light::Directional { color, intensity, .. } => {
                color * *intensity
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directional_from_points_at_target() {
        let light = Light::directional_from(
            Point3::new(5.0, 3.0, 5.0),
            Point3::origin(),
            Vector3::new(1.0, 1.0, 1.0),
            0.8,
        );
        let to_light = light.direction_to_light().unwrap();
        assert!((to_light - Vector3::new(5.0, 3.0, 5.0).normalize()).norm() < 1e-6);
        assert!((light.radiance() - Vector3::repeat(0.8)).norm() < 1e-6);
        assert!(Light::new_ambient(Vector3::zeros(), 1.0).direction_to_light().is_none());
    }
}
