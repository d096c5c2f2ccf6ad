pub mod thornode;
