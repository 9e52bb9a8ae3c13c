pub mod compose;
pub mod image_converter;
pub mod kace;
pub mod layout;
pub mod notifications;
pub mod password;
pub mod pdf;
pub mod qr;
pub mod rack;
pub mod regex_tester;
pub mod subnet;
pub mod text_tools;
pub mod widgets;
