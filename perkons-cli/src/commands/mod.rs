pub mod delete;
pub mod inspect;
pub mod list;
pub mod mix;
pub mod randomise;
pub mod set;
pub mod vary;
