pub mod archive;
pub mod browser;
pub mod compose;
pub mod image_convert;
pub mod kace;
pub mod password;
pub mod pdf;
pub mod qr;
pub mod rack;
pub mod regex_tester;
pub mod subnet;
pub mod text;
