// ABOUTME: Response module - unwraps raw replies from either transport into
// ABOUTME: one result-or-error shape.

mod normalizer;

pub use normalizer::{NormalizedResponse, extract_payload, is_event_stream, normalize, render_text};
