pub mod cookies;
pub mod descriptor;
pub mod rows;
pub mod types;
