pub mod angle;
pub mod bezier;
pub mod frame;
pub mod point;
pub mod quaternion;
pub mod vector;

pub use angle::normalize_degrees;
pub use bezier::BezierSpine;
pub use frame::AffineFrame;
pub use point::{BoundingBox, Point2d, Point3d};
pub use quaternion::Quaternion;
pub use vector::Vec3;
