pub mod entities;
pub mod repositories;
pub mod upi;
pub mod value_objects;
