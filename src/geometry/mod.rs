pub mod coords;
pub mod hit_testing;
pub mod layout;

pub use coords::{CoordinateMapper, to_scene_space};
pub use hit_testing::{HitTester, hit_test_layout};
pub use layout::{ImagePlacement, SceneLayout, TextPlacement, printable_area};
