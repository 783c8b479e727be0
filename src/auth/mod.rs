pub mod material;
pub mod passwords;
pub mod session;
pub mod tokens;

pub use material::AuthMaterial;
