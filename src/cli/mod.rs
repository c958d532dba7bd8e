//! Terminal output for the `meshguard` binary

mod console;

pub use console::Console;
