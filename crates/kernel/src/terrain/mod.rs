pub mod height_field;

pub use height_field::HeightField;
