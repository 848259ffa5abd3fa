pub mod controller;
pub mod event;
pub mod inference_loop;
pub mod state;
pub mod training_session;
