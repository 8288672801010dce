pub mod context;
mod error;
pub mod formatter;
mod tree;

pub use error::{RuntimeError, RuntimeErrorKind};
pub use tree::TreeWalkInterpreter;

/// Destination of everything a program prints.
pub trait SystemContext {
    fn write(&mut self, text: &str);

    fn writeln(&mut self, text: &str) {
        self.write(text);
        self.write("\n");
    }
}
