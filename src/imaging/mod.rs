pub mod edges;
pub use edges::find_edges;
pub mod window;
pub use window::{calibrate, rescale, to_u8};
pub mod phantom;
pub use phantom::{PhantomGeometry, locate_phantom};
pub mod integrate;
pub use integrate::{IntegrationError, circle_offsets, integrate_circles};
pub mod overlay;
pub use overlay::{annotate_phantom, display_image};
