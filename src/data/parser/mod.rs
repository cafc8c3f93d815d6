pub mod measurements;

// Expose the ParseError type
pub use measurements::ParseError;
// Expose the main parsing function
pub use measurements::parse_measurements;
