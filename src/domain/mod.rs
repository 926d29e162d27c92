pub mod answers;
pub mod slug;
pub mod text;
pub mod track;
