pub mod image_dir_camera;
pub mod synthetic_camera;
