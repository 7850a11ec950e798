pub mod katana;
