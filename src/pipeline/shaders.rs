pub mod basic;
pub mod phong;
