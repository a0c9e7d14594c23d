//! Built-in exporters.

mod image;
mod passthrough;
mod sound;
mod text;

pub use self::image::ImageExporter;
pub use passthrough::PassthroughExporter;
pub use sound::SoundExporter;
pub use text::TextExporter;
