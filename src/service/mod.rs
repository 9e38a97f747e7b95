//! Remote service layer: the [`KbService`] seam, its HTTP implementation and
//! payload shaping helpers.

pub mod client;
pub mod http;
pub mod payload;

pub use client::{ApiResponse, DocumentListData, Endpoint, KbService, Method};
pub use http::HttpKbService;
pub use payload::Payload;
