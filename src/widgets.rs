pub mod cursor_trail;
pub mod floating_field;
pub mod orbit_body;
pub mod wireframe_cube;
