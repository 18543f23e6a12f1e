pub mod registers;
pub mod addressing;
pub mod word;
pub mod opcode;
pub mod source;
