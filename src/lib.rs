pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod media;
pub mod meta;
pub mod pipeline;
pub mod playlist;
pub mod scan;
pub mod platform {
    pub mod gst_backend;
    pub mod surface;
}
pub mod tasks {
    pub mod viewer;
}
