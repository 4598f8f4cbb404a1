pub mod error;
pub mod reader;
pub mod resolver;
pub mod staging;
pub mod writer;

#[cfg(test)]
mod test_utils;
